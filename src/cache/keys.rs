//! Cache key derivation.
//!
//! A key is the operation name plus a SHA-256 digest of the canonical query
//! description, so logically identical criteria always land on the same entry.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::application::query::TradingQuery;

/// Cached read operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LastTradingDates,
    FilterTradingResults,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::LastTradingDates => "get_last_trading_dates",
            Operation::FilterTradingResults => "filter_trading_results",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-independent key; backends add their namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: Operation,
    digest: String,
}

impl CacheKey {
    pub fn for_query(operation: Operation, query: &TradingQuery) -> Self {
        Self {
            operation,
            digest: digest(&query.canonical()),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// `{prefix}:{operation}:{digest}`
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{prefix}:{}:{}", self.operation, self.digest)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operation, self.digest)
    }
}

fn digest(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
