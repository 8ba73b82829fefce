//! Valuation models: discounted cash flow, relative multiples, asset and
//! dividend based estimates, peer percentiles and fair-value ranges.

pub mod dcf;
pub mod fair_value;
pub mod models;
pub mod peers;

pub use dcf::*;
pub use fair_value::*;
pub use models::*;
pub use peers::*;

use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};

/// A computed block, or the reason it could not be computed.
///
/// Serializes as the value itself or as `{"error": "..."}` so partial
/// results still render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Value(T),
    Error { error: String },
}

impl<T> Outcome<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error {
            error: message.into(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Error { .. } => None,
        }
    }
}

impl<T> From<Result<T, AnalysisError>> for Outcome<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(value) => Outcome::Value(value),
            Err(e) => Outcome::error(e.detail()),
        }
    }
}
