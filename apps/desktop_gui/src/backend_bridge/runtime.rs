//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::{DuckGenerator, HttpDuckClient};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{domain::RequestId, error::GenerationError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::media::decode_duck_image;

/// Event sender that wakes the window after every event, so idle frames still pick it up.
#[derive(Clone)]
struct UiNotifier {
    ui_tx: Sender<UiEvent>,
    ctx: egui::Context,
}

impl UiNotifier {
    fn send(&self, event: UiEvent) -> bool {
        let delivered = self.ui_tx.send(event).is_ok();
        self.ctx.request_repaint();
        delivered
    }
}

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    client: HttpDuckClient,
    ctx: egui::Context,
) {
    let ui = UiNotifier { ui_tx, ctx };
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui.ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "backend worker startup failure: {err}"
                )));
                ui.ctx.request_repaint();
                return;
            }
        };

        for cmd in cmd_rx.iter() {
            let client = client.clone();
            let ui = ui.clone();
            match cmd {
                BackendCommand::Generate {
                    request_id,
                    description,
                } => {
                    runtime.spawn(async move {
                        run_generation(&client, &ui, request_id, &description).await;
                    });
                }
                BackendCommand::CheckHealth => {
                    runtime.spawn(async move {
                        let status = client.check_health().await;
                        ui.send(UiEvent::HealthChecked(status));
                    });
                }
            }
        }

        tracing::info!("ui command queue closed; backend worker stopping");
    });
}

async fn run_generation(
    client: &HttpDuckClient,
    ui: &UiNotifier,
    request_id: RequestId,
    description: &str,
) {
    let outcome = client.generate(description).await;
    let image = outcome.as_ref().ok().map(|result| result.image.clone());
    if !ui.send(UiEvent::GenerationFinished {
        request_id,
        outcome,
    }) {
        return;
    }

    let Some(image) = image else {
        return;
    };
    let event = match load_and_decode(client, &image).await {
        Ok((bytes, decoded)) => UiEvent::DuckImageLoaded {
            request_id,
            image: decoded,
            original_bytes: bytes,
        },
        Err(reason) => {
            tracing::warn!(request_id = request_id.0, "duck image could not be drawn: {reason}");
            UiEvent::DuckImageFailed { request_id, reason }
        }
    };
    ui.send(event);
}

async fn load_and_decode(
    client: &HttpDuckClient,
    image: &str,
) -> Result<(Vec<u8>, crate::media::DecodedDuck), String> {
    let bytes = client
        .load_image_bytes(image)
        .await
        .map_err(|err: GenerationError| err.to_string())?;
    let decoded = decode_duck_image(&bytes)?;
    Ok((bytes, decoded))
}
