use std::path::PathBuf;
use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub backend_base_url: String,
    pub provider_base_url: String,
    pub image_timeout_secs: u64,
    pub video_timeout_secs: u64,
    pub trace_spans: bool,
    pub mock_services: bool,
    pub data_dir: PathBuf,
}

pub struct AppConfigOverrides {
    pub log_level: Option<String>,
    pub backend_base_url: Option<String>,
    pub provider_base_url: Option<String>,
    pub image_timeout_secs: Option<u64>,
    pub video_timeout_secs: Option<u64>,
    pub trace_spans: bool,
    pub mock_services: bool,
}

impl AppConfig {
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let mut builder = config::Config::builder();
        let path = match path {
            Some(p) => p,
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".genstudio")
                .join("config"),
        };
        builder = builder.add_source(config::File::from(path).required(false));
        let cfg = builder.build().unwrap_or_default();

        let log_level = cfg
            .get_string("log_level")
            .unwrap_or_else(|_| "info".to_string());
        let backend_base_url = cfg
            .get_string("backend_base_url")
            .unwrap_or_else(|_| "https://api.genstudio.app".to_string());
        let provider_base_url = cfg
            .get_string("provider_base_url")
            .unwrap_or_else(|_| "https://api.genstudio.app".to_string());
        let image_timeout_secs = cfg.get_int("image_timeout_secs").unwrap_or(120) as u64;
        let video_timeout_secs = cfg.get_int("video_timeout_secs").unwrap_or(600) as u64;
        let trace_spans = cfg.get_bool("trace_spans").unwrap_or(false);
        let mock_services = cfg.get_bool("mock_services").unwrap_or(false);
        let data_dir = cfg
            .get_string("data_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".genstudio")
            });

        Self {
            log_level,
            backend_base_url,
            provider_base_url,
            image_timeout_secs,
            video_timeout_secs,
            trace_spans,
            mock_services,
            data_dir,
        }
    }

    pub fn apply_overrides(mut self, ov: &AppConfigOverrides) -> Self {
        if let Some(l) = &ov.log_level {
            self.log_level = l.clone();
        }
        if let Some(b) = &ov.backend_base_url {
            self.backend_base_url = b.clone();
        }
        if let Some(p) = &ov.provider_base_url {
            self.provider_base_url = p.clone();
        }
        if let Some(t) = ov.image_timeout_secs {
            self.image_timeout_secs = t;
        }
        if let Some(t) = ov.video_timeout_secs {
            self.video_timeout_secs = t;
        }
        if ov.trace_spans {
            self.trace_spans = true;
        }
        if ov.mock_services {
            self.mock_services = true;
        }
        self
    }

    pub fn save_to(&self, path: Option<PathBuf>) -> std::io::Result<()> {
        let path = match path {
            Some(p) => p,
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".genstudio")
                .join("config"),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}
