mod analyzer;
mod auth;
mod cache;
mod config;
mod console;
mod export;
mod feed;
mod model;
mod normalizer;
mod parser;
mod registry;
mod utils;

use auth::CredentialStore;
use cache::{DatasetCache, DatasetLoader, SystemClock};
use config::{AppConfig, load_from_env};
use console::Dashboard;
use console::command_handler::HELP;
use console::listener::listen_for_commands;
use feed::{FeedSource, HttpFeed};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Logs go to stderr so the console output stays readable
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config = match load_from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let registry = Arc::new(config.registry());
    info!(
        "Registry: {} campuses, {} certifications",
        registry.campuses.len(),
        registry.certifications.len()
    );

    let feed = match HttpFeed::new(config.feed_url.clone(), config.request_timeout()) {
        Ok(feed) => feed,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };
    info!("Feed: {}", feed.describe());

    let loader = DatasetLoader::new(Box::new(feed), registry.clone(), config.retry_policy());
    let cache = DatasetCache::new(loader, config.cache_ttl());
    let credentials = load_credentials(&config);

    let mut dashboard = Dashboard::new(
        cache,
        registry,
        credentials,
        Box::new(SystemClock),
        config.search_threshold,
        config.export_dir.clone(),
    );

    println!("🚀 Sustainable procurement dashboard\n\n{}\n", HELP);
    listen_for_commands(&mut dashboard).await;
    info!("Dashboard closed.");
}

/// Inline YAML wins over the file path; without either nobody can log in.
fn load_credentials(config: &AppConfig) -> CredentialStore {
    let loaded = if let Some(yaml) = &config.auth_config_yaml {
        CredentialStore::from_yaml(yaml)
    } else if let Some(path) = &config.auth_config_path {
        CredentialStore::load(path)
    } else {
        warn!("No credential store configured; logins will be rejected.");
        return CredentialStore::empty();
    };

    match loaded {
        Ok(store) if store.is_empty() => {
            warn!("Credential store has no users; logins will be rejected.");
            store
        }
        Ok(store) => {
            info!("Loaded {} user(s) into the credential store", store.len());
            store
        }
        Err(e) => {
            error!("Credential store unavailable: {}", e);
            CredentialStore::empty()
        }
    }
}
