//! Cross-surface action dispatch.
//!
//! Gallery actions like "edit" or "make video" hand an item off to the
//! prompt composer, which lives on another surface and may not be mounted
//! yet when the action fires. The channel therefore carries an explicit
//! readiness handshake: senders wait a bounded time for the composer to
//! register, and anything still undelivered is stashed and drained on the
//! next registration instead of being dropped.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use gallery::{identify, GalleryItem, MediaKind};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;

use crate::{Composer, SessionError};

/// Instruction delivered to the prompt composer surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerSignal {
    SetReferenceImage(String),
    SetPromptText(String),
}

/// How a signal reached (or will reach) the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The composer was mounted and received the signal immediately.
    Direct,
    /// The composer was not mounted in time; the signal is held and will
    /// be drained when it next registers.
    Stashed,
}

#[derive(Default)]
struct Inner {
    tx: Option<UnboundedSender<ComposerSignal>>,
    stash: Vec<ComposerSignal>,
}

/// Point-to-point channel between action sources and the composer surface.
pub struct SurfaceChannel {
    inner: Mutex<Inner>,
    readiness: Notify,
}

impl SurfaceChannel {
    pub fn new() -> Self {
        SurfaceChannel {
            inner: Mutex::new(Inner::default()),
            readiness: Notify::new(),
        }
    }

    /// Mount the composer end. Any signals stashed while unmounted are
    /// queued onto the fresh channel before waiting senders are released.
    pub fn register(&self) -> UnboundedReceiver<ComposerSignal> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().expect("surface channel poisoned");
        for signal in inner.stash.drain(..) {
            let _ = tx.send(signal);
        }
        inner.tx = Some(tx);
        drop(inner);
        self.readiness.notify_waiters();
        rx
    }

    /// Unmount the composer end. Signals sent afterwards are stashed.
    pub fn deregister(&self) {
        self.inner.lock().expect("surface channel poisoned").tx = None;
    }

    pub fn is_ready(&self) -> bool {
        self.inner
            .lock()
            .expect("surface channel poisoned")
            .tx
            .is_some()
    }

    /// Attempt immediate delivery. Returns the signal back when the
    /// composer is unmounted; a send failure means the receiver was
    /// dropped without deregistering, which counts as unmounted too.
    fn try_deliver(&self, signal: ComposerSignal) -> Option<ComposerSignal> {
        let mut inner = self.inner.lock().expect("surface channel poisoned");
        match inner.tx.as_ref() {
            Some(tx) => match tx.send(signal) {
                Ok(()) => None,
                Err(e) => {
                    inner.tx = None;
                    Some(e.0)
                }
            },
            None => Some(signal),
        }
    }

    fn stash(&self, signal: ComposerSignal) {
        tracing::debug!(?signal, "composer not mounted, stashing signal");
        self.inner
            .lock()
            .expect("surface channel poisoned")
            .stash
            .push(signal);
    }

    /// Deliver `signal`, waiting up to `wait` for the composer to mount.
    pub async fn send(&self, signal: ComposerSignal, wait: Duration) -> Delivery {
        let Some(signal) = self.try_deliver(signal) else {
            return Delivery::Direct;
        };

        // Arm the permit before re-checking so a registration landing
        // between the check and the await is not missed.
        let notified = self.readiness.notified();
        tokio::pin!(notified);
        let Some(signal) = self.try_deliver(signal) else {
            return Delivery::Direct;
        };

        match tokio::time::timeout(wait, notified).await {
            Ok(()) => match self.try_deliver(signal) {
                None => Delivery::Direct,
                Some(signal) => {
                    self.stash(signal);
                    Delivery::Stashed
                }
            },
            Err(_) => {
                self.stash(signal);
                Delivery::Stashed
            }
        }
    }
}

impl Default for SurfaceChannel {
    fn default() -> Self {
        SurfaceChannel::new()
    }
}

/// How long action sources wait for the composer surface to mount before
/// falling back to the stash.
pub const DEFAULT_MOUNT_WAIT: Duration = Duration::from_millis(500);

/// Item-level actions that cross from the gallery to the composer.
pub struct ActionDispatcher {
    channel: Arc<SurfaceChannel>,
    mount_wait: Duration,
}

impl ActionDispatcher {
    pub fn new(channel: Arc<SurfaceChannel>) -> Self {
        ActionDispatcher {
            channel,
            mount_wait: DEFAULT_MOUNT_WAIT,
        }
    }

    pub fn with_mount_wait(mut self, wait: Duration) -> Self {
        self.mount_wait = wait;
        self
    }

    /// Copy the item's prompt into the composer without touching the
    /// surface or model selection.
    pub async fn reuse_prompt(&self, item: &GalleryItem) -> Delivery {
        self.channel
            .send(ComposerSignal::SetPromptText(item.prompt.clone()), self.mount_wait)
            .await
    }

    /// Attach the item as the composer's reference image.
    pub async fn use_as_reference(&self, item: &GalleryItem) -> Result<Delivery, SessionError> {
        let key = identify(item).ok_or_else(|| SessionError::UnknownItem(item.url.clone()))?;
        Ok(self
            .channel
            .send(ComposerSignal::SetReferenceImage(key), self.mount_wait)
            .await)
    }

    /// Open the item for editing: image surface, item as reference,
    /// original prompt prefilled.
    pub async fn edit(
        &self,
        composer: &mut Composer,
        item: &GalleryItem,
    ) -> Result<Delivery, SessionError> {
        composer.set_surface(MediaKind::Image);
        let delivery = self.use_as_reference(item).await?;
        self.channel
            .send(ComposerSignal::SetPromptText(item.prompt.clone()), self.mount_wait)
            .await;
        Ok(delivery)
    }

    /// Animate the item: video surface (model coerced if needed) with the
    /// item as reference.
    pub async fn make_video(
        &self,
        composer: &mut Composer,
        item: &GalleryItem,
    ) -> Result<Delivery, SessionError> {
        composer.set_surface(MediaKind::Video);
        self.use_as_reference(item).await
    }
}
