//! Backend commands queued from UI to backend worker.

use shared::domain::RequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Generate {
        request_id: RequestId,
        description: String,
    },
    CheckHealth,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Generate { .. } => "generate",
            BackendCommand::CheckHealth => "check_health",
        }
    }

    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            BackendCommand::Generate { request_id, .. } => Some(*request_id),
            BackendCommand::CheckHealth => None,
        }
    }
}
