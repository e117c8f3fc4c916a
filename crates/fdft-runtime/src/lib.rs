#![forbid(unsafe_code)]

//! fdft runtime: operating modes and the shared structured-logging and
//! tolerance helpers used by every crate's test suite.
//!
//! ## Module layout
//!
//! | Module | Contents                                  |
//! |--------|-------------------------------------------|
//! | `mode` | [`RuntimeMode`] enum (Strict / Hardened)  |

pub mod mode;

pub use mode::RuntimeMode;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch, saturating to 0 on clock skew.
#[must_use]
pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

// ═══════════════════════════════════════════════════════════════════
// Test helpers: shared assertion and logging utilities
// ═══════════════════════════════════════════════════════════════════

/// Structured test log entry for forensic comparison across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestLogEntry {
    pub test_id: String,
    pub timestamp_ms: u64,
    pub level: TestLogLevel,
    pub module: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RuntimeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TestResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestLogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    Pass,
    Fail,
    Skip,
}

impl TestResult {
    #[must_use]
    pub const fn from_pass(pass: bool) -> Self {
        if pass { Self::Pass } else { Self::Fail }
    }
}

impl TestLogEntry {
    #[must_use]
    pub fn new(
        test_id: impl Into<String>,
        module: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            timestamp_ms: now_unix_ms(),
            level: TestLogLevel::Info,
            module: module.into(),
            message: message.into(),
            seed: None,
            fixture_id: None,
            mode: None,
            n: None,
            result: None,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: TestLogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_result(mut self, result: TestResult) -> Self {
        self.result = Some(result);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_len(mut self, n: usize) -> Self {
        self.n = Some(n);
        self
    }

    #[must_use]
    pub fn with_fixture(mut self, fixture_id: impl Into<String>) -> Self {
        self.fixture_id = Some(fixture_id.into());
        self
    }

    /// Serialize to JSON line for structured logging.
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Write the JSON line to stderr, where `cargo test` captures it per test.
    pub fn emit(&self) {
        eprintln!("{}", self.to_json_line());
    }
}

/// Panic unless `|actual - expected| <= atol + rtol * |expected|`.
///
/// Used by the kernel tests for scalar outputs such as bin frequencies.
pub fn assert_close(actual: f64, expected: f64, atol: f64, rtol: f64) {
    assert!(
        within_tolerance(actual, expected, atol, rtol),
        "assert_close: actual={actual} expected={expected} diff={} (atol={atol}, rtol={rtol})",
        (actual - expected).abs()
    );
}

/// Element-wise [`assert_close`] over two real slices of equal length.
pub fn assert_close_slice(actual: &[f64], expected: &[f64], atol: f64, rtol: f64) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "assert_close_slice: {} values, expected {}",
        actual.len(),
        expected.len()
    );
    for (idx, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            within_tolerance(a, e, atol, rtol),
            "assert_close_slice[{idx}]: actual={a} expected={e} diff={} (atol={atol}, rtol={rtol})",
            (a - e).abs()
        );
    }
}

/// Assert two sequences of `(re, im)` pairs are element-wise close.
///
/// Real and imaginary parts are checked independently against the same
/// tolerance.
pub fn assert_close_complex_slice(
    actual: &[(f64, f64)],
    expected: &[(f64, f64)],
    atol: f64,
    rtol: f64,
) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "assert_close_complex_slice: length mismatch: actual={} expected={}",
        actual.len(),
        expected.len()
    );
    for (idx, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let tol_re = atol + rtol * e.0.abs();
        let tol_im = atol + rtol * e.1.abs();
        assert!(
            (a.0 - e.0).abs() <= tol_re && (a.1 - e.1).abs() <= tol_im,
            "assert_close_complex_slice[{idx}]: actual=({}, {}) expected=({}, {}) tol=({tol_re}, {tol_im})",
            a.0,
            a.1,
            e.0,
            e.1
        );
    }
}

/// Largest component-wise absolute difference between two complex sequences.
///
/// Returns `None` when the lengths differ. Any NaN difference makes the result
/// NaN, so a `diff <= atol` check fails instead of silently passing.
#[must_use]
pub fn max_complex_diff(actual: &[(f64, f64)], expected: &[(f64, f64)]) -> Option<f64> {
    if actual.len() != expected.len() {
        return None;
    }
    Some(
        actual
            .iter()
            .zip(expected.iter())
            .flat_map(|(a, e)| [(a.0 - e.0).abs(), (a.1 - e.1).abs()])
            .fold(0.0, |worst: f64, diff| {
                if worst.is_nan() || diff.is_nan() {
                    f64::NAN
                } else {
                    worst.max(diff)
                }
            }),
    )
}

/// `|actual - expected| <= atol + rtol * |expected|`; false whenever either side is NaN.
#[must_use]
pub fn within_tolerance(actual: f64, expected: f64, atol: f64, rtol: f64) -> bool {
    let tol = atol + rtol * expected.abs();
    (actual - expected).abs() <= tol
}
