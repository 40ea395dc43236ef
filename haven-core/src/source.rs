//! Provenance of responses handed back to pages.

use std::fmt;

use smol_str::SmolStr;

/// Where a response handed to a page came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseSource {
    /// Live network response.
    #[default]
    Network,
    /// Served from the named cache partition.
    Cache(SmolStr),
    /// Built by the worker itself (offline page, offline JSON, placeholder).
    Synthesized,
}

impl ResponseSource {
    /// Whether the response was read from a cache partition.
    pub fn is_cache(&self) -> bool {
        matches!(self, ResponseSource::Cache(_))
    }

    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache(name) => name.as_str(),
            ResponseSource::Synthesized => "synthesized",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
