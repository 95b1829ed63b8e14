//! Command orchestration helpers from UI actions to backend command queue.

use client_core::GenerationController;
use crossbeam_channel::{Sender, TrySendError};
use shared::error::GenerationError;

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the backend. If the queue cannot take it, a pending generation is
/// resolved as a transport failure so the controller never stays in flight forever.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    controller: &mut GenerationController,
) {
    let cmd_name = cmd.name();
    let request_id = cmd.request_id();

    let failure = match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            return;
        }
        Err(TrySendError::Full(_)) => "ui command queue is full",
        Err(TrySendError::Disconnected(_)) => "backend command processor disconnected",
    };

    tracing::warn!(command = cmd_name, "{failure}");
    if let Some(request_id) = request_id {
        controller.resolve(request_id, Err(GenerationError::transport(failure)));
    }
}
