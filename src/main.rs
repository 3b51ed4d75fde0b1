use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::mpsc;

use rust_social_app::backend::{BackendClient, DevAuth, seed};
use rust_social_app::config;
use rust_social_app::store::MemoryStore;
use rust_social_app::ui::SocialApp;

#[derive(Parser)]
#[command(
    name = "rust_social_app",
    version,
    about = "Desktop client for a hosted social network"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(DevAuth::new(app_config.identity.clone()));

    if app_config.seed_demo {
        if let Err(err) = seed::seed_demo_data(store.as_ref()).await {
            log::warn!("Demo seeding failed: {err}");
        }
    }

    // UI -> Backend
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Backend -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    let client = BackendClient::new(store, auth, event_tx, cmd_rx, &app_config);
    tokio::spawn(async move {
        client.run().await;
        log::info!("Backend client terminated");
    });

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "Rust Social",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("SocialApp should only be initialized once");

            Ok(Box::new(SocialApp::new(cc, cmd_tx.clone(), event_receiver)))
        }),
    )
}
