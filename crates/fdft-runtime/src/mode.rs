#![forbid(unsafe_code)]

//! Runtime mode definitions for Strict (reference-compatible) and Hardened operation.

use serde::{Deserialize, Serialize};

/// Operational mode governing how much input validation a transform performs.
///
/// - **Strict**: Behave exactly like the direct-sum reference; NaN and Inf
///   samples flow through the arithmetic untouched.
/// - **Hardened**: Reject non-finite samples before any arithmetic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuntimeMode {
    #[default]
    Strict,
    Hardened,
}

impl RuntimeMode {
    #[must_use]
    pub const fn rejects_non_finite(self) -> bool {
        matches!(self, Self::Hardened)
    }
}
