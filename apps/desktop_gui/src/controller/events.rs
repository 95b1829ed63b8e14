//! Events flowing from the backend worker back to the UI thread.

use client_core::{GenerationController, GenerationResult};
use shared::{domain::RequestId, error::GenerationError};

use crate::media::DecodedDuck;

#[derive(Debug)]
pub enum UiEvent {
    GenerationFinished {
        request_id: RequestId,
        outcome: Result<GenerationResult, GenerationError>,
    },
    DuckImageLoaded {
        request_id: RequestId,
        image: DecodedDuck,
        original_bytes: Vec<u8>,
    },
    DuckImageFailed {
        request_id: RequestId,
        reason: String,
    },
    HealthChecked(Result<(), GenerationError>),
    BackendFailed(String),
}

/// Status-bar text for a health check result.
pub fn describe_health(status: &Result<(), GenerationError>, base_url: &str) -> String {
    match status {
        Ok(()) => format!("Duck pond at {base_url} is open"),
        Err(err) => format!("{} ({base_url})", err.user_message()),
    }
}

/// What the window must do to its picture or status bar after an event.
#[derive(Debug, PartialEq, Eq)]
pub enum EventEffect {
    None,
    ShowPicture {
        request_id: RequestId,
        image: DecodedDuck,
        original_bytes: Vec<u8>,
    },
    PictureUnavailable(RequestId),
    ClearPicture,
    Status(String),
}

/// Feeds one backend event into `controller`.
///
/// `shown_picture` is the request the window's picture slot belongs to. Image
/// events only land while that request's result is still on screen; anything
/// older is dropped.
pub fn apply_ui_event(
    controller: &mut GenerationController,
    shown_picture: Option<RequestId>,
    event: UiEvent,
    base_url: &str,
) -> EventEffect {
    let is_current = |controller: &GenerationController, request_id: RequestId| {
        controller.result().is_some() && shown_picture == Some(request_id)
    };

    match event {
        UiEvent::GenerationFinished {
            request_id,
            outcome,
        } => {
            let succeeded = outcome.is_ok();
            if controller.resolve(request_id, outcome) && !succeeded {
                EventEffect::ClearPicture
            } else {
                EventEffect::None
            }
        }
        UiEvent::DuckImageLoaded {
            request_id,
            image,
            original_bytes,
        } => {
            if is_current(controller, request_id) {
                EventEffect::ShowPicture {
                    request_id,
                    image,
                    original_bytes,
                }
            } else {
                tracing::debug!(request_id = request_id.0, "dropping picture for an old duck");
                EventEffect::None
            }
        }
        UiEvent::DuckImageFailed { request_id, reason } => {
            tracing::debug!(request_id = request_id.0, %reason, "duck picture unavailable");
            if is_current(controller, request_id) {
                EventEffect::PictureUnavailable(request_id)
            } else {
                EventEffect::None
            }
        }
        UiEvent::HealthChecked(status) => EventEffect::Status(describe_health(&status, base_url)),
        UiEvent::BackendFailed(message) => {
            tracing::error!("{message}");
            EventEffect::Status(message)
        }
    }
}
