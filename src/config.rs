//! Configuration types for the ingestion pipeline.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. Callers set only what they care about and
//! rely on the documented defaults for the rest.

use crate::error::Text2PdfError;
use crate::pipeline::tokenize::{tokens, Token};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Default upper bound on input length, in characters.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 20_000;

/// Configuration for a [`crate::ingest::TextPipeline`].
///
/// # Example
/// ```rust
/// use edgequake_text2pdf::{CountMetric, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .output_dir("/tmp/text2pdf")
///     .count_metric(CountMetric::Words)
///     .max_text_chars(5_000)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory receiving generated PDFs. Created on demand. Default: `./artifacts`.
    pub output_dir: PathBuf,

    /// SQLite database file. `None` keeps records in memory for the lifetime
    /// of the store. Default: `None`.
    pub database_path: Option<PathBuf>,

    /// Maximum accepted input length in characters. Default: 20 000.
    pub max_text_chars: usize,

    /// Which metric the artifact generator reports as `count`. Default: characters.
    pub count_metric: CountMetric,

    /// Prefix of generated file names. Default: `"text"`.
    pub file_prefix: String,

    /// Body font size in points. Range: 6–32. Default: 11.
    pub font_size: f32,

    /// Characters per rendered line before wrapping. Default: 90.
    pub wrap_width: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("artifacts"),
            database_path: None,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            count_metric: CountMetric::default(),
            file_prefix: "text".to_string(),
            font_size: 11.0,
            wrap_width: 90,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = Some(path.into());
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.config.database_path = None;
        self
    }

    pub fn max_text_chars(mut self, n: usize) -> Self {
        self.config.max_text_chars = n;
        self
    }

    pub fn count_metric(mut self, metric: CountMetric) -> Self {
        self.config.count_metric = metric;
        self
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_prefix = prefix.into();
        self
    }

    pub fn font_size(mut self, pt: f32) -> Self {
        self.config.font_size = pt.clamp(6.0, 32.0);
        self
    }

    pub fn wrap_width(mut self, chars: usize) -> Self {
        self.config.wrap_width = chars.max(10);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, Text2PdfError> {
        let c = &self.config;
        if c.max_text_chars == 0 {
            return Err(Text2PdfError::InvalidConfig(
                "max_text_chars must be ≥ 1".into(),
            ));
        }
        if c.file_prefix.is_empty()
            || !c
                .file_prefix
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(Text2PdfError::InvalidConfig(format!(
                "file_prefix must be non-empty ASCII alphanumerics, '-' or '_', got {:?}",
                c.file_prefix
            )));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(Text2PdfError::InvalidConfig(
                "output_dir must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Size metric reported by the artifact generator and stored as `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMetric {
    /// Unicode scalar values in the input text. (default)
    #[default]
    Characters,
    /// Word tokens in the input text, as counted by the tokenizer.
    Words,
}

impl CountMetric {
    /// Measure `text` with this metric.
    pub fn measure(&self, text: &str) -> u64 {
        match self {
            CountMetric::Characters => text.chars().count() as u64,
            CountMetric::Words => tokens(text).filter(Token::is_word).count() as u64,
        }
    }
}

impl FromStr for CountMetric {
    type Err = Text2PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "characters" | "chars" => Ok(CountMetric::Characters),
            "words" => Ok(CountMetric::Words),
            other => Err(Text2PdfError::InvalidConfig(format!(
                "unknown count metric {other:?}: expected 'characters' or 'words'"
            ))),
        }
    }
}
