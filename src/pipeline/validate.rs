//! Input validation: reject unusable text before any tokenization or I/O.

use crate::config::DEFAULT_MAX_TEXT_CHARS;
use crate::error::ValidationError;

/// Checks raw text before the pipeline spends any work on it.
pub trait TextValidator: Send + Sync {
    fn validate(&self, text: &str) -> Result<(), ValidationError>;
}

/// Default rules: non-blank, at most `max_chars` characters, at least one
/// letter or digit.
#[derive(Debug, Clone)]
pub struct DefaultValidator {
    max_chars: usize,
}

impl DefaultValidator {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for DefaultValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TEXT_CHARS)
    }
}

impl TextValidator for DefaultValidator {
    fn validate(&self, text: &str) -> Result<(), ValidationError> {
        validate_text(text, self.max_chars)
    }
}

/// Pure validation function behind [`DefaultValidator`].
pub fn validate_text(text: &str, max_chars: usize) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    // Count lazily: stop once past the limit so huge inputs fail fast.
    let len = text.chars().take(max_chars + 1).count();
    if len > max_chars {
        return Err(ValidationError::TooLong {
            len: text.chars().count(),
            max: max_chars,
        });
    }

    if !text.chars().any(char::is_alphanumeric) {
        return Err(ValidationError::NoAnalyzableContent);
    }

    Ok(())
}
