//! Knowledge-base repository configuration.

use serde::{Deserialize, Serialize};

/// Storage backend for the KB repository.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KbBackend {
    #[default]
    Memory,
}

impl KbBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            KbBackend::Memory => "memory",
        }
    }
}

/// Repository configuration. The weights are part of the observable scoring
/// contract: a title-only hit outranks a body-only hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: KbBackend,

    /// N-gram size in code points (minimum 2)
    #[serde(default = "default_ngram_n")]
    pub ngram_n: usize,

    /// Score weight for title postings
    #[serde(default = "default_title_weight")]
    pub title_weight: f64,

    /// Score weight for body postings
    #[serde(default = "default_body_weight")]
    pub body_weight: f64,

    /// Maximum snippet length in code points
    #[serde(default = "default_snippet_max")]
    pub snippet_max_code_points: usize,

    /// Result count when the caller passes no usable limit
    #[serde(default = "default_search_limit")]
    pub search_default_limit: usize,

    /// Upper bound the HTTP layer applies to requested limits
    #[serde(default = "default_search_max_limit")]
    pub search_max_limit: usize,
}

fn default_ngram_n() -> usize {
    2
}

fn default_title_weight() -> f64 {
    2.0
}

fn default_body_weight() -> f64 {
    1.0
}

fn default_snippet_max() -> usize {
    120
}

fn default_search_limit() -> usize {
    10
}

fn default_search_max_limit() -> usize {
    50
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            backend: KbBackend::Memory,
            ngram_n: default_ngram_n(),
            title_weight: default_title_weight(),
            body_weight: default_body_weight(),
            snippet_max_code_points: default_snippet_max(),
            search_default_limit: default_search_limit(),
            search_max_limit: default_search_max_limit(),
        }
    }
}

/// Builder for KbConfig
pub struct KbConfigBuilder {
    config: KbConfig,
}

impl KbConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: KbConfig::default(),
        }
    }

    /// N-gram size; values below 2 are coerced to 2.
    pub fn ngram_n(mut self, n: usize) -> Self {
        self.config.ngram_n = n.max(2);
        self
    }

    pub fn snippet_max_code_points(mut self, max: usize) -> Self {
        self.config.snippet_max_code_points = max;
        self
    }

    pub fn search_default_limit(mut self, limit: usize) -> Self {
        self.config.search_default_limit = limit;
        self
    }

    pub fn search_max_limit(mut self, limit: usize) -> Self {
        self.config.search_max_limit = limit;
        self
    }

    pub fn build(self) -> KbConfig {
        self.config
    }
}

impl Default for KbConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
