//! Request lifecycle for one description-to-image flow.
//!
//! The controller owns the prompt text and a single [`RequestState`]. Front-ends read it
//! through `&self` accessors and drive it with [`GenerationController::submit`],
//! [`GenerationController::resolve`] and [`GenerationController::generate_another`].

use shared::{
    domain::{prompt_length, validate_prompt, GenerationResult, RequestId, MAX_PROMPT_CHARS},
    error::{ErrorKind, GenerationError},
};
use tracing::{debug, info, warn};

use crate::DuckGenerator;

pub const LOADING_LABEL: &str = "Hatching your duck...";
pub const TOO_LONG_HINT: &str = "Quack! That's too much duck description";

/// Warning starts once the prompt passes 90% of the limit.
const WARNING_THRESHOLD: usize = MAX_PROMPT_CHARS * 9 / 10;

/// Severity of the live character counter under the prompt field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthLevel {
    Normal,
    Warning,
    Error,
}

impl LengthLevel {
    pub fn for_length(length: usize) -> Self {
        if length > MAX_PROMPT_CHARS {
            LengthLevel::Error
        } else if length > WARNING_THRESHOLD {
            LengthLevel::Warning
        } else {
            LengthLevel::Normal
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight {
        request_id: RequestId,
    },
    Succeeded(GenerationResult),
    Failed {
        kind: ErrorKind,
        message: String,
    },
}

/// A submission that passed validation and now needs exactly one client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGeneration {
    pub request_id: RequestId,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Started(PendingGeneration),
    Rejected(GenerationError),
    /// A request is already in flight; nothing changed.
    Busy,
}

#[derive(Debug, Default)]
pub struct GenerationController {
    prompt: String,
    state: RequestState,
    last_request_id: Option<RequestId>,
}

impl GenerationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Editable prompt buffer for text widgets. Editing never touches the request state.
    pub fn prompt_mut(&mut self) -> &mut String {
        &mut self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        match &self.state {
            RequestState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RequestState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, RequestState::InFlight { .. })
    }

    /// False while a request is in flight. Triggers (button, Enter key) must check this.
    pub fn can_submit(&self) -> bool {
        !self.is_in_flight()
    }

    /// The submit button additionally stays disabled for a blank prompt.
    pub fn submit_button_enabled(&self) -> bool {
        self.can_submit() && !self.prompt.trim().is_empty()
    }

    pub fn loading_label(&self) -> Option<&'static str> {
        self.is_in_flight().then_some(LOADING_LABEL)
    }

    /// Counts the prompt the same way validation does.
    pub fn prompt_length_hint(&self) -> (usize, LengthLevel) {
        let length = prompt_length(&self.prompt);
        (length, LengthLevel::for_length(length))
    }

    /// Counter text, e.g. `"12 / 1024"`, with the themed warning once over the limit.
    pub fn prompt_counter_text(&self) -> String {
        match self.prompt_length_hint() {
            (length, LengthLevel::Error) => {
                format!("{length} / {MAX_PROMPT_CHARS} {TOO_LONG_HINT}")
            }
            (length, _) => format!("{length} / {MAX_PROMPT_CHARS}"),
        }
    }

    pub fn submit(&mut self) -> Submission {
        if let RequestState::InFlight { request_id } = &self.state {
            debug!(request_id = request_id.0, "submit ignored while a duck is hatching");
            return Submission::Busy;
        }

        let description = match validate_prompt(&self.prompt) {
            Ok(description) => description.to_string(),
            Err(failure) => {
                info!(reason = %failure, "prompt rejected before reaching the network");
                let err = GenerationError::from(failure);
                self.fail(&err);
                return Submission::Rejected(err);
            }
        };

        let request_id = self
            .last_request_id
            .map_or(RequestId(1), RequestId::next);
        self.last_request_id = Some(request_id);
        self.state = RequestState::InFlight { request_id };
        debug!(
            request_id = request_id.0,
            chars = description.chars().count(),
            "duck generation started"
        );

        Submission::Started(PendingGeneration {
            request_id,
            description,
        })
    }

    /// Applies a settled client outcome. Returns `false`, changing nothing, when
    /// `request_id` is not the request currently in flight.
    pub fn resolve(
        &mut self,
        request_id: RequestId,
        outcome: Result<GenerationResult, GenerationError>,
    ) -> bool {
        match &self.state {
            RequestState::InFlight { request_id: current } if *current == request_id => {}
            _ => {
                warn!(request_id = request_id.0, "dropping stale generation outcome");
                return false;
            }
        }

        match outcome {
            Ok(result) => {
                info!(
                    request_id = request_id.0,
                    is_fallback = result.is_fallback,
                    "duck hatched"
                );
                self.state = RequestState::Succeeded(result);
            }
            Err(err) => self.fail(&err),
        }
        true
    }

    /// Back to `Idle` from `Succeeded` only; the prompt is kept as typed.
    pub fn generate_another(&mut self) -> bool {
        if !matches!(self.state, RequestState::Succeeded(_)) {
            return false;
        }
        self.state = RequestState::Idle;
        true
    }

    /// Submits, awaits `generator` once and resolves.
    pub async fn run(&mut self, generator: &dyn DuckGenerator) -> &RequestState {
        if let Submission::Started(pending) = self.submit() {
            let outcome = generator.generate(&pending.description).await;
            self.resolve(pending.request_id, outcome);
        }
        &self.state
    }

    fn fail(&mut self, err: &GenerationError) {
        self.state = RequestState::Failed {
            kind: err.kind(),
            message: err.user_message(),
        };
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
