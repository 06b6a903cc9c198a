pub mod command_handler;
pub mod listener;
pub mod render;
pub mod views;

use crate::auth::{CredentialStore, Session};
use crate::cache::{Clock, DatasetCache};
use crate::export::ExportFile;
use crate::registry::Registry;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Text to print back, and whether the session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }

    pub fn quit(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: true,
        }
    }
}

/// State of one interactive dashboard session.
pub struct Dashboard {
    pub cache: DatasetCache,
    pub registry: Arc<Registry>,
    pub credentials: CredentialStore,
    pub session: Session,
    pub clock: Box<dyn Clock>,
    pub search_threshold: f64,
    pub export_dir: PathBuf,
    pub last_export: Option<ExportFile>,
    pub started_at: DateTime<Utc>,
}

impl Dashboard {
    pub fn new(
        cache: DatasetCache,
        registry: Arc<Registry>,
        credentials: CredentialStore,
        clock: Box<dyn Clock>,
        search_threshold: f64,
        export_dir: PathBuf,
    ) -> Self {
        let started_at = clock.now();
        Self {
            cache,
            registry,
            credentials,
            session: Session::new(),
            clock,
            search_threshold,
            export_dir,
            last_export: None,
            started_at,
        }
    }

    pub async fn handle(&mut self, line: &str) -> Reply {
        command_handler::handle_command(line, self).await
    }

    pub fn status_text(&self) -> String {
        let now = self.clock.now();
        let uptime = now - self.started_at;
        let mut lines = vec![format!(
            "⏱ Uptime: {}h {}m {}s",
            uptime.num_hours(),
            uptime.num_minutes() % 60,
            uptime.num_seconds() % 60
        )];

        match self.session.require() {
            Ok(user) => lines.push(format!(
                "👤 Logged in as {} since {} (session {})",
                user.username,
                user.since.format("%Y-%m-%d %H:%M:%S UTC"),
                user.session_id
            )),
            Err(_) => lines.push("👤 Not logged in".to_string()),
        }

        match self.cache.status() {
            Some(status) => lines.push(format!(
                "📦 Dataset: {} rows, loaded {}, refreshes after {}",
                status.rows,
                status.loaded_at.format("%H:%M:%S"),
                status.expires_at.format("%H:%M:%S")
            )),
            None => lines.push("📦 Dataset not loaded yet".to_string()),
        }
        lines.join("\n")
    }
}
