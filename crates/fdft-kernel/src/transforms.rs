use std::collections::VecDeque;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use fdft_runtime::RuntimeMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Direction, Normalization, TransformKind};

/// Complex sample as a `(real, imaginary)` pair.
pub type Complex64 = (f64, f64);

/// Backends that can serve transform requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Term-by-term evaluation of the defining sum, O(N²).
    #[default]
    DirectSum,
}

pub trait DftBackend {
    fn kind(&self) -> BackendKind;

    /// Append the unscaled transform of `input` to `output`.
    ///
    /// `output` arrives empty with capacity for `input.len()` values.
    fn transform_1d_unscaled(
        &self,
        input: &[Complex64],
        direction: Direction,
        output: &mut Vec<Complex64>,
    );
}

#[derive(Debug, Default)]
pub struct DirectSumBackend;

impl DftBackend for DirectSumBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::DirectSum
    }

    fn transform_1d_unscaled(
        &self,
        input: &[Complex64],
        direction: Direction,
        output: &mut Vec<Complex64>,
    ) {
        let n = input.len();
        // theta is identically zero for a single sample
        if n <= 1 {
            output.extend_from_slice(input);
            return;
        }

        let sign = direction.sign();
        let n_as_f64 = n as f64;
        for k in 0..n {
            let mut acc = (0.0, 0.0);
            for (t, &value) in input.iter().enumerate() {
                let theta = sign * 2.0 * PI * (k as f64) * (t as f64) / n_as_f64;
                acc = complex_add(acc, complex_mul(value, (theta.cos(), theta.sin())));
            }
            output.push(acc);
        }
    }
}

static DIRECT_SUM_BACKEND: DirectSumBackend = DirectSumBackend;

/// Options shared by every transform entrypoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DftOptions {
    pub mode: RuntimeMode,
    pub normalization: Normalization,
    pub backend: BackendKind,
    pub check_finite: bool,
    pub trace: bool,
}

impl Default for DftOptions {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::Strict,
            normalization: Normalization::Backward,
            backend: BackendKind::DirectSum,
            check_finite: false,
            trace: false,
        }
    }
}

impl DftOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    #[must_use]
    pub fn with_check_finite(mut self, check_finite: bool) -> Self {
        self.check_finite = check_finite;
        self
    }

    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    fn should_check_finite(&self) -> bool {
        self.check_finite || self.mode.rejects_non_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DftError {
    #[error("invalid input at index {index}: {detail}")]
    InvalidInput { index: usize, detail: &'static str },
    #[error("expected a sequence of samples")]
    NotASequence,
    #[error("cannot allocate storage for {requested} samples")]
    ResourceExhausted { requested: usize },
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("sample rate must be finite and greater than zero")]
    NonPositiveSampleRate,
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Structured record of one completed transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformTrace {
    pub operation_id: String,
    pub kind: TransformKind,
    pub direction: Direction,
    pub n: usize,
    pub backend: BackendKind,
    pub mode: RuntimeMode,
    pub normalization: Normalization,
    pub timing_ns: u128,
}

impl TransformTrace {
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

const TRACE_CAPACITY: usize = 1024;

static TRACE_LOG: OnceLock<Mutex<VecDeque<TransformTrace>>> = OnceLock::new();
static OPERATION_COUNTER: AtomicU64 = AtomicU64::new(1);

fn trace_log() -> &'static Mutex<VecDeque<TransformTrace>> {
    TRACE_LOG.get_or_init(|| Mutex::new(VecDeque::with_capacity(TRACE_CAPACITY)))
}

fn next_operation_id() -> String {
    let next = OPERATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("dft-op-{next:016x}")
}

fn record_trace(trace: TransformTrace) {
    if let Ok(mut log) = trace_log().lock() {
        if log.len() == TRACE_CAPACITY {
            let _ = log.pop_front();
        }
        log.push_back(trace);
    }
}

/// Drain every trace recorded so far, oldest first.
#[must_use]
pub fn take_transform_traces() -> Vec<TransformTrace> {
    if let Ok(mut log) = trace_log().lock() {
        return log.drain(..).collect();
    }
    Vec::new()
}

/// Forward DFT with default options: strict mode, no scaling, no trace record.
///
/// For each `k` in `0..N` the output is
/// `X[k] = Σ_{n=0}^{N-1} x[n] · exp(-i·2π·k·n/N)`, accumulated with plain
/// floating-point addition. An empty input yields an empty output and a
/// single sample is returned unchanged. Nothing outside the returned vector
/// is touched, so concurrent callers never contend.
///
/// # Errors
///
/// [`DftError::ResourceExhausted`] if the output vector cannot be allocated.
pub fn transform(x: &[Complex64]) -> Result<Vec<Complex64>, DftError> {
    dft(x, &DftOptions::default())
}

/// Forward DFT.
pub fn dft(input: &[Complex64], options: &DftOptions) -> Result<Vec<Complex64>, DftError> {
    run_complex_1d(TransformKind::Dft, input, options, Direction::Forward)
}

/// Inverse DFT, `x[n] = s · Σ_k X[k] · exp(+i·2π·k·n/N)`.
pub fn idft(input: &[Complex64], options: &DftOptions) -> Result<Vec<Complex64>, DftError> {
    run_complex_1d(TransformKind::Idft, input, options, Direction::Inverse)
}

/// Forward DFT of a real signal. All `N` bins are returned.
pub fn dft_real(input: &[f64], options: &DftOptions) -> Result<Vec<Complex64>, DftError> {
    let mut widened = allocate(input.len())?;
    widened.extend(input.iter().map(|&re| (re, 0.0)));
    run_complex_1d(TransformKind::DftReal, &widened, options, Direction::Forward)
}

fn run_complex_1d(
    kind: TransformKind,
    input: &[Complex64],
    options: &DftOptions,
    direction: Direction,
) -> Result<Vec<Complex64>, DftError> {
    if options.should_check_finite() {
        validate_finite_complex(input)?;
    }

    let backend = resolve_backend(options.backend);
    let mut output = allocate(input.len())?;

    let started = Instant::now();
    backend.transform_1d_unscaled(input, direction, &mut output);
    apply_normalization(&mut output, options.normalization, direction);

    if options.trace {
        record_trace(TransformTrace {
            operation_id: next_operation_id(),
            kind,
            direction,
            n: input.len(),
            backend: backend.kind(),
            mode: options.mode,
            normalization: options.normalization,
            timing_ns: started.elapsed().as_nanos(),
        });
    }

    Ok(output)
}

pub(crate) fn allocate(n: usize) -> Result<Vec<Complex64>, DftError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(n)
        .map_err(|_| DftError::ResourceExhausted { requested: n })?;
    Ok(buffer)
}

fn resolve_backend(kind: BackendKind) -> &'static dyn DftBackend {
    match kind {
        BackendKind::DirectSum => &DIRECT_SUM_BACKEND,
    }
}

fn validate_finite_complex(input: &[Complex64]) -> Result<(), DftError> {
    match input
        .iter()
        .position(|&(re, im)| !re.is_finite() || !im.is_finite())
    {
        Some(index) => Err(DftError::InvalidInput {
            index,
            detail: "non-finite component rejected by policy",
        }),
        None => Ok(()),
    }
}

fn normalization_scale(normalization: Normalization, n: usize, direction: Direction) -> f64 {
    if n == 0 {
        return 1.0;
    }
    let n_as_f64 = n as f64;
    match (normalization, direction) {
        (Normalization::Backward, Direction::Inverse)
        | (Normalization::Forward, Direction::Forward) => 1.0 / n_as_f64,
        (Normalization::Backward, Direction::Forward)
        | (Normalization::Forward, Direction::Inverse) => 1.0,
        (Normalization::Ortho, _) => 1.0 / n_as_f64.sqrt(),
    }
}

fn apply_normalization(data: &mut [Complex64], normalization: Normalization, direction: Direction) {
    let scale = normalization_scale(normalization, data.len(), direction);
    if scale == 1.0 {
        return;
    }
    for value in data.iter_mut() {
        *value = complex_scale(*value, scale);
    }
}

pub(crate) fn complex_add(lhs: Complex64, rhs: Complex64) -> Complex64 {
    (lhs.0 + rhs.0, lhs.1 + rhs.1)
}

fn complex_mul(lhs: Complex64, rhs: Complex64) -> Complex64 {
    (lhs.0 * rhs.0 - lhs.1 * rhs.1, lhs.0 * rhs.1 + lhs.1 * rhs.0)
}

fn complex_scale(value: Complex64, scale: f64) -> Complex64 {
    (value.0 * scale, value.1 * scale)
}

#[cfg(test)]
mod tests {
    use fdft_runtime::{RuntimeMode, assert_close_complex_slice};

    use super::{
        BackendKind, Complex64, DftError, DftOptions, TransformKind, allocate, dft, dft_real,
        idft, take_transform_traces, transform,
    };
    use crate::{Direction, Normalization};

    const TOL: f64 = 1e-12;

    #[test]
    fn options_default_to_strict_backward_mode() {
        let opts = DftOptions::default();
        assert_eq!(opts.mode, RuntimeMode::Strict);
        assert_eq!(opts.normalization, Normalization::Backward);
        assert_eq!(opts.backend, BackendKind::DirectSum);
        assert!(!opts.check_finite);
        assert!(!opts.trace);
    }

    #[test]
    fn options_fill_missing_fields_from_defaults() {
        let opts: DftOptions =
            serde_json::from_str(r#"{"normalization":"forward"}"#).expect("options parse");
        assert_eq!(opts, DftOptions::default().with_normalization(Normalization::Forward));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(transform(&[]).expect("empty transform"), Vec::<Complex64>::new());
        assert!(idft(&[], &DftOptions::default()).expect("empty inverse").is_empty());
    }

    #[test]
    fn single_sample_is_returned_unchanged() {
        for sample in [(3.5, -2.25), (f64::INFINITY, 1.0), (0.0, -0.0)] {
            let out = transform(&[sample]).expect("n=1 transform");
            assert_eq!(out.len(), 1);
            assert_eq!(out[0].0.to_bits(), sample.0.to_bits());
            assert_eq!(out[0].1.to_bits(), sample.1.to_bits());
        }
    }

    #[test]
    fn impulse_gives_flat_spectrum() {
        let out = transform(&[(1.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)]).expect("impulse");
        assert_close_complex_slice(&out, &[(1.0, 0.0); 4], TOL, 0.0);
    }

    #[test]
    fn constant_gives_dc_only() {
        let out = transform(&[(1.0, 0.0); 4]).expect("constant");
        assert_close_complex_slice(
            &out,
            &[(4.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)],
            TOL,
            0.0,
        );
    }

    #[test]
    fn ramp_matches_hand_computed_bins() {
        let out = dft_real(&[0.0, 1.0, 2.0, 3.0], &DftOptions::default()).expect("ramp");
        assert_close_complex_slice(
            &out,
            &[(6.0, 0.0), (-2.0, 2.0), (-2.0, 0.0), (-2.0, -2.0)],
            TOL,
            0.0,
        );
    }

    #[test]
    fn forward_normalization_scales_by_length() {
        let opts = DftOptions::default().with_normalization(Normalization::Forward);
        let out = dft_real(&[0.0, 1.0, 0.0, -1.0], &opts).expect("sine");
        assert_close_complex_slice(
            &out,
            &[(0.0, 0.0), (0.0, -0.5), (0.0, 0.0), (0.0, 0.5)],
            TOL,
            0.0,
        );
    }

    #[test]
    fn inverse_recovers_input_for_every_normalization() {
        let input = vec![(1.0, 0.0), (2.0, -1.0), (0.5, 0.25), (-3.0, 2.0), (0.0, 7.5)];
        for norm in [Normalization::Backward, Normalization::Forward, Normalization::Ortho] {
            let opts = DftOptions::default().with_normalization(norm);
            let spectrum = dft(&input, &opts).expect("forward");
            let recovered = idft(&spectrum, &opts).expect("inverse");
            assert_close_complex_slice(&recovered, &input, 1e-12, 0.0);
        }
    }

    #[test]
    fn strict_mode_passes_nan_through() {
        let out = transform(&[(f64::NAN, 0.0), (1.0, 0.0)]).expect("strict accepts nan");
        assert!(out.iter().all(|&(re, _)| re.is_nan()));
    }

    #[test]
    fn hardened_mode_rejects_non_finite_input() {
        let opts = DftOptions::default().with_mode(RuntimeMode::Hardened);
        let err = dft(&[(1.0, 0.0), (0.0, f64::INFINITY)], &opts)
            .expect_err("hardened mode should reject inf");
        assert!(matches!(err, DftError::InvalidInput { index: 1, .. }));

        let strict_checked = DftOptions::default().with_check_finite(true);
        let err = dft_real(&[f64::NAN], &strict_checked).expect_err("check_finite rejects nan");
        assert!(matches!(err, DftError::InvalidInput { index: 0, .. }));
    }

    #[test]
    fn impossible_allocation_reports_resource_exhaustion() {
        let err = allocate(usize::MAX).expect_err("allocation must fail");
        assert_eq!(err, DftError::ResourceExhausted { requested: usize::MAX });
        assert!(err.to_string().contains("cannot allocate"));
    }

    #[test]
    fn input_is_not_mutated() {
        let input = vec![(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)];
        let snapshot = input.clone();
        let _ = transform(&input).expect("transform");
        assert_eq!(input, snapshot);
    }

    #[test]
    fn traced_calls_are_recorded_and_untraced_calls_are_not() {
        let input = (0..13usize)
            .map(|i| (i as f64, (i % 3) as f64 - 1.0))
            .collect::<Vec<_>>();
        let _ = dft(&input, &DftOptions::default().with_trace(true)).expect("traced");
        let _ = idft(&input, &DftOptions::default()).expect("untraced");

        let traces = take_transform_traces()
            .into_iter()
            .filter(|trace| trace.n == 13)
            .collect::<Vec<_>>();
        assert!(traces.iter().any(|t| t.kind == TransformKind::Dft));
        assert!(traces.iter().all(|t| t.direction == Direction::Forward));

        let line = traces[0].to_json_line();
        assert!(line.contains("\"operation_id\":\"dft-op-"));
        assert!(line.contains("\"backend\":\"direct_sum\""));
    }

    #[test]
    fn plain_transform_leaves_trace_log_untouched() {
        let input = (0..19usize).map(|i| (i as f64, 0.0)).collect::<Vec<_>>();
        let _ = transform(&input).expect("transform");
        let _ = dft(&input, &DftOptions::default()).expect("default dft");
        assert!(take_transform_traces().iter().all(|trace| trace.n != 19));
    }
}
