#![no_main]

use fdft_kernel::{calculate_dft, samples_from_value};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(samples) = samples_from_value(&value) {
        if samples.len() > 64 {
            return;
        }
        let rendered = calculate_dft(&value).expect("parsed samples must transform");
        assert_eq!(rendered.as_array().map(Vec::len), Some(samples.len()));
    }
});
