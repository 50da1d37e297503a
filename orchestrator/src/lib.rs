//! Generation job orchestration.
//!
//! Every prompt submission becomes a client-local [`ActiveJob`]: dispatched
//! immediately (no queueing), tracked while `Processing`, and removed the
//! moment it reaches a terminal outcome. Jobs are independent; the failure
//! or timeout of one never affects another, and completions may arrive in
//! any order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use gallery::{GalleryAction, GalleryItem, GalleryStore, MediaKind};
use providers::{GenerationRequest, ModelCatalog, Provider};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),
    #[error("Other Error: {0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

/// Transient, orchestrator-owned representation of one in-flight request.
/// Never persisted; gone from the active list once terminal.
#[derive(Debug, Clone)]
pub struct ActiveJob {
    pub id: String,
    pub prompt: String,
    pub model: String,
    pub status: JobStatus,
    pub progress: Option<u8>,
    pub backend_progress: Option<u8>,
    pub started_at: DateTime<Utc>,
}

/// Ambient job lifecycle feed, in the order each job produced them. There
/// is no cross-job ordering.
#[derive(Debug, Clone)]
pub enum JobEvent {
    Started { job_id: String, model: String },
    Progress { job_id: String, percent: u8 },
    BackendProgress { job_id: String, percent: u8 },
    Completed { job_id: String, item: GalleryItem },
    Failed { job_id: String, error: String },
    TimedOut { job_id: String },
}

/// Upper bound per job class; a hung provider call is surfaced as
/// [`JobEvent::TimedOut`] instead of leaving the job processing forever.
#[derive(Debug, Clone, Copy)]
pub struct JobTimeouts {
    pub image: Duration,
    pub video: Duration,
}

impl Default for JobTimeouts {
    fn default() -> Self {
        JobTimeouts {
            image: Duration::from_secs(120),
            video: Duration::from_secs(600),
        }
    }
}

pub struct Orchestrator {
    catalog: Arc<ModelCatalog>,
    store: Arc<Mutex<GalleryStore>>,
    jobs: Arc<Mutex<Vec<ActiveJob>>>,
    events: mpsc::UnboundedSender<JobEvent>,
    timeouts: JobTimeouts,
    next_job: AtomicU64,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<ModelCatalog>,
        store: Arc<Mutex<GalleryStore>>,
        timeouts: JobTimeouts,
    ) -> (Self, mpsc::UnboundedReceiver<JobEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let orchestrator = Orchestrator {
            catalog,
            store,
            jobs: Arc::new(Mutex::new(Vec::new())),
            events,
            timeouts,
            next_job: AtomicU64::new(1),
        };
        (orchestrator, receiver)
    }

    pub fn active_jobs(&self) -> Vec<ActiveJob> {
        self.jobs.lock().expect("job list poisoned").clone()
    }

    /// Record client-side display progress for a job. The surface driving
    /// the progress animation owns the cadence; this only mirrors it onto
    /// the job and the event feed. No-op once the job is terminal.
    pub fn set_progress(&self, job_id: &str, percent: u8) {
        let percent = percent.min(100);
        let known = {
            let mut jobs = self.jobs.lock().expect("job list poisoned");
            match jobs.iter_mut().find(|j| j.id == job_id) {
                Some(job) => {
                    job.progress = Some(percent);
                    true
                }
                None => false,
            }
        };
        if known {
            let _ = self.events.send(JobEvent::Progress {
                job_id: job_id.to_string(),
                percent,
            });
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Dispatch a generation request. Returns the client-local job id; the
    /// outcome arrives on the event channel.
    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self, request)))]
    pub fn submit(
        &self,
        model: &str,
        request: GenerationRequest,
    ) -> Result<String, OrchestratorError> {
        let provider = self
            .catalog
            .provider(model)
            .ok_or_else(|| OrchestratorError::UnknownModel(model.to_string()))?;

        let job_id = format!("gen-{}", self.next_job.fetch_add(1, Ordering::SeqCst));
        {
            let mut jobs = self.jobs.lock().expect("job list poisoned");
            jobs.push(ActiveJob {
                id: job_id.clone(),
                prompt: request.prompt.clone(),
                model: model.to_string(),
                status: JobStatus::Processing,
                progress: None,
                backend_progress: None,
                started_at: Utc::now(),
            });
        }
        let _ = self.events.send(JobEvent::Started {
            job_id: job_id.clone(),
            model: model.to_string(),
        });
        tracing::info!(%job_id, %model, "generation job dispatched");

        self.spawn_forwarder(provider.clone(), job_id.clone(), model.to_string(), request);
        Ok(job_id)
    }

    fn spawn_forwarder(
        &self,
        provider: Arc<dyn Provider>,
        job_id: String,
        model: String,
        request: GenerationRequest,
    ) {
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let jobs = self.jobs.clone();
        let events = self.events.clone();
        let store = self.store.clone();
        let deadline = match provider.kind() {
            MediaKind::Image => self.timeouts.image,
            MediaKind::Video => self.timeouts.video,
        };
        tokio::spawn(async move {
            let prompt = request.prompt.clone();
            let aspect_ratio = request.aspect_ratio.clone();
            let avatar_id = request.avatar_id.clone();
            let product_id = request.product_id.clone();
            let style_id = request.style_id.clone();

            let report = |percent: u8| {
                {
                    let mut jobs = jobs.lock().expect("job list poisoned");
                    if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
                        job.backend_progress = Some(percent);
                    }
                }
                let _ = events.send(JobEvent::BackendProgress { job_id: job_id.clone(), percent });
            };

            // One task drives both the provider call and its progress feed,
            // so every BackendProgress event precedes the terminal event.
            let generate = timeout(deadline, provider.generate(&request, Some(progress_tx)));
            tokio::pin!(generate);
            let mut progress_open = true;
            let outcome = loop {
                tokio::select! {
                    maybe = progress_rx.recv(), if progress_open => {
                        match maybe {
                            Some(percent) => report(percent),
                            None => progress_open = false,
                        }
                    }
                    outcome = &mut generate => break outcome,
                }
            };
            while let Ok(percent) = progress_rx.try_recv() {
                report(percent);
            }
            // Terminal either way: stamp the final status and take the job
            // out of the list before the terminal event is observable.
            let status = if matches!(outcome, Ok(Ok(_))) {
                JobStatus::Completed
            } else {
                JobStatus::Failed
            };
            {
                let mut jobs = jobs.lock().expect("job list poisoned");
                if let Some(pos) = jobs.iter().position(|j| j.id == job_id) {
                    let mut job = jobs.remove(pos);
                    job.status = status;
                    tracing::debug!(job_id = %job.id, status = ?job.status, "generation job finished");
                }
            }
            match outcome {
                Ok(Ok(output)) => {
                    let mut item = GalleryItem::new(output.kind, output.url, prompt, model)
                        .with_job_id(output.job_id);
                    item.aspect_ratio = aspect_ratio;
                    item.avatar_id = avatar_id;
                    item.product_id = product_id;
                    item.style_id = style_id;
                    {
                        let mut store = store.lock().expect("gallery store poisoned");
                        match item.kind {
                            MediaKind::Image => store.dispatch(GalleryAction::AddImage(item.clone())),
                            MediaKind::Video => store.dispatch(GalleryAction::AddVideo(item.clone())),
                        }
                    }
                    tracing::info!(%job_id, "generation job completed");
                    let _ = events.send(JobEvent::Completed { job_id, item });
                }
                Ok(Err(e)) => {
                    tracing::warn!(%job_id, error = %e, "generation job failed");
                    let _ = events.send(JobEvent::Failed { job_id, error: e.to_string() });
                }
                Err(_) => {
                    tracing::warn!(%job_id, "generation job timed out");
                    let _ = events.send(JobEvent::TimedOut { job_id });
                }
            }
        });
    }
}
