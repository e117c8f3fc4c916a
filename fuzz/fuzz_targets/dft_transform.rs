#![no_main]

use arbitrary::Arbitrary;
use fdft_kernel::{DftOptions, Normalization, dft, idft};
use fdft_runtime::RuntimeMode;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct TransformInput {
    hardened: bool,
    inverse: bool,
    normalization: u8,
    samples: Vec<(f64, f64)>,
}

fuzz_target!(|input: TransformInput| {
    let mode = if input.hardened {
        RuntimeMode::Hardened
    } else {
        RuntimeMode::Strict
    };
    let normalization = match input.normalization % 3 {
        0 => Normalization::Backward,
        1 => Normalization::Forward,
        _ => Normalization::Ortho,
    };
    let samples = input.samples.into_iter().take(64).collect::<Vec<_>>();
    let options = DftOptions::default()
        .with_mode(mode)
        .with_normalization(normalization);

    let result = if input.inverse {
        idft(&samples, &options)
    } else {
        dft(&samples, &options)
    };
    match result {
        Ok(out) => assert_eq!(out.len(), samples.len()),
        Err(_) => assert!(
            mode == RuntimeMode::Hardened
                && samples
                    .iter()
                    .any(|&(re, im)| !re.is_finite() || !im.is_finite())
        ),
    }
});
