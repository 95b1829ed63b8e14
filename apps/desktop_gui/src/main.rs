mod backend_bridge;
mod controller;
mod media;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{load_settings, HttpDuckClient};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::DuckGeneratorApp;

/// Only one generation and one health check are ever queued at a time.
const COMMAND_QUEUE_CAPACITY: usize = 8;
const EVENT_QUEUE_CAPACITY: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "duck-desktop", about = "Duck Generator desktop front-end")]
struct Args {
    /// Overrides DUCK_AGENT_ENDPOINT / duck.toml.
    #[arg(long)]
    agent_endpoint: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(endpoint) = args.agent_endpoint {
        settings.agent_endpoint = endpoint;
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout_secs = secs;
    }
    let client = HttpDuckClient::from_settings(&settings).context("invalid client settings")?;
    let base_url = client.base_url().to_string();
    tracing::info!(%base_url, timeout = ?client.timeout(), "starting duck generator");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(COMMAND_QUEUE_CAPACITY);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(EVENT_QUEUE_CAPACITY);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Duck Generator")
            .with_inner_size([720.0, 860.0])
            .with_min_inner_size([420.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Duck Generator",
        options,
        Box::new(move |cc| {
            backend_bridge::runtime::launch(cmd_rx, ui_tx, client, cc.egui_ctx.clone());
            Ok(Box::new(DuckGeneratorApp::new(cmd_tx, ui_rx, base_url)))
        }),
    )
    .map_err(|err| anyhow!("duck generator window failed: {err}"))
}
