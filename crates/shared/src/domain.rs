use serde::{Deserialize, Serialize};

use crate::error::ValidationFailure;

pub const MAX_PROMPT_CHARS: usize = 1024;
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Quack! Here's your duck!";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(RequestId);

impl RequestId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A finished generation. Replaced wholesale by the next success, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub image: String,
    pub message: String,
    pub is_fallback: bool,
    pub prompt_used: Option<String>,
}

/// Length of a prompt as validation sees it: `char`s after trimming surrounding whitespace.
pub fn prompt_length(raw: &str) -> usize {
    raw.trim().chars().count()
}

/// Checks a raw prompt and returns the trimmed description that goes on the wire.
pub fn validate_prompt(raw: &str) -> Result<&str, ValidationFailure> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationFailure::EmptyPrompt);
    }

    let length = prompt_length(trimmed);
    if length > MAX_PROMPT_CHARS {
        return Err(ValidationFailure::PromptTooLong {
            length,
            max: MAX_PROMPT_CHARS,
        });
    }

    Ok(trimmed)
}

/// Where a generated image lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// `data:<mime>;base64,<payload>`
    DataUri {
        mime_type: &'a str,
        base64_payload: &'a str,
    },
    Url(&'a str),
}

impl<'a> ImageSource<'a> {
    pub fn parse(image: &'a str) -> Option<Self> {
        if let Some(rest) = image.strip_prefix("data:") {
            let (meta, payload) = rest.split_once(',')?;
            let mime_type = meta.strip_suffix(";base64")?;
            return Some(Self::DataUri {
                mime_type,
                base64_payload: payload,
            });
        }

        if image.starts_with("http://") || image.starts_with("https://") {
            return Some(Self::Url(image));
        }

        None
    }
}
