use serde::{Deserialize, Serialize};

use crate::transforms::{Complex64, DftError, complex_add};

/// Sample frequencies for a length-`n` transform, in SciPy bin order.
///
/// Bins `0..ceil(n/2)` are non-negative; the rest are negative frequencies.
pub fn dftfreq(n: usize, sample_spacing: f64) -> Result<Vec<f64>, DftError> {
    if !(sample_spacing.is_finite() && sample_spacing > 0.0) {
        return Err(DftError::NonPositiveSampleRate);
    }
    if n == 0 {
        return Ok(Vec::new());
    }
    let scale = 1.0 / (n as f64 * sample_spacing);
    let split = n.div_ceil(2);

    Ok((0..n)
        .map(|idx| {
            if idx < split {
                idx as f64 * scale
            } else {
                -((n - idx) as f64) * scale
            }
        })
        .collect())
}

/// `|X[k]|` for every bin.
#[must_use]
pub fn magnitude(values: &[Complex64]) -> Vec<f64> {
    values.iter().map(|&(re, im)| re.hypot(im)).collect()
}

/// `|X[k]|²` for every bin.
#[must_use]
pub fn power(values: &[Complex64]) -> Vec<f64> {
    values.iter().map(|&(re, im)| re * re + im * im).collect()
}

/// One-sided amplitude spectrum of a transformed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub amplitudes: Vec<f64>,
    pub total_samples: usize,
    pub sample_rate: u32,
    /// Offset of the frame in seconds. Set to one sample period for a
    /// non-empty frame; callers stitching frames together overwrite it.
    pub start_time: f64,
}

/// Frequencies and amplitudes of the first `N/2` bins of `values`.
///
/// # Errors
///
/// [`DftError::NonPositiveSampleRate`] when `sample_rate` is zero.
pub fn spectrum(values: &[Complex64], sample_rate: u32) -> Result<Spectrum, DftError> {
    if sample_rate == 0 {
        return Err(DftError::NonPositiveSampleRate);
    }
    let n = values.len();
    let rate = f64::from(sample_rate);
    let half = &values[..n / 2];

    let frequencies = (0..half.len())
        .map(|bin| bin as f64 * rate / n as f64)
        .collect();
    let amplitudes = magnitude(half);
    let start_time = if n > 0 { 1.0 / rate } else { 0.0 };

    Ok(Spectrum {
        frequencies,
        amplitudes,
        total_samples: n,
        sample_rate,
        start_time,
    })
}

/// Split a real signal into `chunk_size` frames, zero-padding the last one.
pub fn chunk_samples(signal: &[f64], chunk_size: usize) -> Result<Vec<Vec<Complex64>>, DftError> {
    if chunk_size == 0 {
        return Err(DftError::InvalidChunkSize);
    }
    Ok(signal
        .chunks(chunk_size)
        .map(|chunk| {
            let mut frame = chunk.iter().map(|&re| (re, 0.0)).collect::<Vec<_>>();
            frame.resize(chunk_size, (0.0, 0.0));
            frame
        })
        .collect())
}

/// Element-wise sum of two equal-length sequences.
pub fn add_sequences(lhs: &[Complex64], rhs: &[Complex64]) -> Result<Vec<Complex64>, DftError> {
    if lhs.len() != rhs.len() {
        return Err(DftError::LengthMismatch {
            expected: lhs.len(),
            actual: rhs.len(),
        });
    }
    Ok(lhs
        .iter()
        .zip(rhs)
        .map(|(&a, &b)| complex_add(a, b))
        .collect())
}

#[cfg(test)]
mod tests {
    use fdft_runtime::{assert_close, assert_close_slice};

    use super::{add_sequences, chunk_samples, dftfreq, magnitude, power, spectrum};
    use crate::transforms::DftError;

    #[test]
    fn dftfreq_even_length_matches_expected_ordering() {
        let freqs = dftfreq(8, 1.0).expect("dftfreq should succeed");
        assert_eq!(
            freqs,
            vec![0.0, 0.125, 0.25, 0.375, -0.5, -0.375, -0.25, -0.125]
        );
    }

    #[test]
    fn dftfreq_odd_length_with_spacing() {
        let freqs = dftfreq(5, 0.5).expect("dftfreq should succeed");
        assert_close_slice(&freqs, &[0.0, 0.4, 0.8, -0.8, -0.4], 1e-15, 0.0);
    }

    #[test]
    fn dftfreq_rejects_bad_spacing() {
        assert_eq!(dftfreq(4, 0.0), Err(DftError::NonPositiveSampleRate));
        assert_eq!(dftfreq(4, f64::NAN), Err(DftError::NonPositiveSampleRate));
        assert_eq!(dftfreq(0, 1.0), Ok(Vec::new()));
    }

    #[test]
    fn magnitude_and_power_agree() {
        let values = [(3.0, 4.0), (0.0, -2.0)];
        assert_eq!(magnitude(&values), vec![5.0, 2.0]);
        assert_eq!(power(&values), vec![25.0, 4.0]);
    }

    #[test]
    fn spectrum_covers_lower_half() {
        let bins = [(4.0, 0.0), (0.0, -2.0), (1.0, 0.0), (0.0, 2.0)];
        let s = spectrum(&bins, 8000).expect("spectrum");
        assert_eq!(s.frequencies, vec![0.0, 2000.0]);
        assert_eq!(s.amplitudes, vec![4.0, 2.0]);
        assert_eq!(s.total_samples, 4);
        assert_close(s.start_time, 1.25e-4, 1e-18, 0.0);
    }

    #[test]
    fn empty_spectrum_has_zero_start_time() {
        let s = spectrum(&[], 44_100).expect("empty spectrum");
        assert!(s.frequencies.is_empty());
        assert_eq!(s.total_samples, 0);
        assert_eq!(s.start_time, 0.0);
        assert_eq!(spectrum(&[], 0), Err(DftError::NonPositiveSampleRate));
    }

    #[test]
    fn chunks_are_zero_padded() {
        let frames = chunk_samples(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).expect("chunks");
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2], vec![(5.0, 0.0), (0.0, 0.0)]);
        assert_eq!(chunk_samples(&[1.0], 0), Err(DftError::InvalidChunkSize));
    }

    #[test]
    fn add_sequences_requires_equal_lengths() {
        assert_eq!(
            add_sequences(&[(1.0, 1.0)], &[(2.0, -1.0)]),
            Ok(vec![(3.0, 0.0)])
        );
        assert_eq!(
            add_sequences(&[(1.0, 1.0)], &[]),
            Err(DftError::LengthMismatch {
                expected: 1,
                actual: 0
            })
        );
    }
}
