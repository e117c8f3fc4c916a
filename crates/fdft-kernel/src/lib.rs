#![forbid(unsafe_code)]

//! Direct-summation discrete Fourier transform.
//!
//! Every transform here evaluates
//! `X[k] = Σ x[n] · exp(∓i·2π·k·n/N)` term by term in O(N²). Nothing in this
//! crate is a fast transform, and the public names say DFT accordingly.
//!
//! - `transforms`: the kernel, its options, error type and trace log
//! - `boundary`: conversion from dynamically typed (JSON) sample lists
//! - `helpers`: bin frequencies, magnitudes and framing utilities

pub mod boundary;
pub mod helpers;
pub mod transforms;

use serde::{Deserialize, Serialize};

pub use boundary::{calculate_dft, samples_from_value, samples_to_value};
pub use helpers::{Spectrum, add_sequences, chunk_samples, dftfreq, magnitude, power, spectrum};
pub use transforms::{
    BackendKind, Complex64, DftBackend, DftError, DftOptions, DirectSumBackend, TransformTrace,
    dft, dft_real, idft, take_transform_traces, transform,
};

/// Normalization modes matching SciPy/PocketFFT conventions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Forward transform scaled by `1/N`.
    Forward,
    /// Inverse transform scaled by `1/N`; forward is the raw sum.
    #[default]
    Backward,
    /// Both directions scaled by `1/sqrt(N)`.
    Ortho,
}

/// Sign of the exponent in the summation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Inverse,
}

impl Direction {
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Forward => -1.0,
            Self::Inverse => 1.0,
        }
    }
}

/// Transform entrypoints that show up in trace records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Dft,
    Idft,
    DftReal,
}
