#![forbid(unsafe_code)]

//! Fixture-driven conformance harness for `fdft-kernel`.
//!
//! A fixture packet is a JSON file holding cases with raw (untyped) inputs and
//! either the expected spectrum or the expected error kind. Inputs go through
//! the same JSON boundary a dynamically typed caller would use, so malformed
//! samples are exercised end to end.

use std::fs;
use std::io;
use std::path::PathBuf;

use blake3::hash;
use fdft_kernel::{
    Complex64, DftError, DftOptions, Normalization, dft, idft, samples_from_value,
};
use fdft_runtime::{RuntimeMode, max_complex_diff, now_unix_ms};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub fixture_root: PathBuf,
    pub artifact_root: PathBuf,
}

impl HarnessConfig {
    #[must_use]
    pub fn default_paths() -> Self {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        Self {
            fixture_root: manifest.join("fixtures"),
            artifact_root: manifest.join("fixtures/artifacts"),
        }
    }

    #[must_use]
    pub fn artifact_dir_for(&self, packet_id: &str) -> PathBuf {
        self.artifact_root.join(packet_id)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::default_paths()
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("fixture load failed for {path}: {source}")]
    FixtureIo { path: PathBuf, source: io::Error },
    #[error("fixture parse failed for {path}: {source}")]
    FixtureParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("artifact write failed for {path}: {source}")]
    ArtifactIo { path: PathBuf, source: io::Error },
    #[error("report serialization failed: {0}")]
    ReportSerialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DftExpectedOutcome {
    Ok { output: Vec<[f64; 2]>, atol: f64 },
    Error { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DftCase {
    pub case_id: String,
    #[serde(default)]
    pub mode: RuntimeMode,
    #[serde(default)]
    pub normalization: Normalization,
    #[serde(default)]
    pub inverse: bool,
    /// Left untyped on purpose so that malformed samples reach the kernel boundary.
    pub input: serde_json::Value,
    pub expected: DftExpectedOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DftPacketFixture {
    pub packet_id: String,
    pub family: String,
    pub cases: Vec<DftCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseResult {
    pub case_id: String,
    pub passed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_diff: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PacketReport {
    pub packet_id: String,
    pub family: String,
    pub fixture_blake3: String,
    pub case_results: Vec<CaseResult>,
    pub passed_cases: usize,
    pub failed_cases: usize,
    pub generated_unix_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PacketSummary {
    pub packet_id: String,
    pub family: String,
    pub passed_cases: usize,
    pub failed_cases: usize,
    pub total_cases: usize,
}

/// Stable snake_case name of an error variant, as written in fixtures.
#[must_use]
pub fn error_kind(error: &DftError) -> &'static str {
    match error {
        DftError::InvalidInput { .. } => "invalid_input",
        DftError::NotASequence => "not_a_sequence",
        DftError::ResourceExhausted { .. } => "resource_exhausted",
        DftError::LengthMismatch { .. } => "length_mismatch",
        DftError::NonPositiveSampleRate => "non_positive_sample_rate",
        DftError::InvalidChunkSize => "invalid_chunk_size",
    }
}

/// Load a fixture packet relative to `config.fixture_root`.
pub fn load_dft_fixture(
    config: &HarnessConfig,
    fixture_name: &str,
) -> Result<(DftPacketFixture, String), HarnessError> {
    let fixture_path = config.fixture_root.join(fixture_name);
    let raw = fs::read(&fixture_path).map_err(|source| HarnessError::FixtureIo {
        path: fixture_path.clone(),
        source,
    })?;
    let digest = hash(&raw).to_hex().to_string();
    let fixture =
        serde_json::from_slice(&raw).map_err(|source| HarnessError::FixtureParse {
            path: fixture_path,
            source,
        })?;
    Ok((fixture, digest))
}

/// Run every case of a fixture packet and collect a report.
pub fn run_dft_packet(
    config: &HarnessConfig,
    fixture_name: &str,
) -> Result<PacketReport, HarnessError> {
    let (fixture, fixture_blake3) = load_dft_fixture(config, fixture_name)?;
    let case_results = fixture.cases.iter().map(run_case).collect::<Vec<_>>();
    let passed_cases = case_results.iter().filter(|r| r.passed).count();
    let failed_cases = case_results.len() - passed_cases;

    Ok(PacketReport {
        packet_id: fixture.packet_id,
        family: fixture.family,
        fixture_blake3,
        case_results,
        passed_cases,
        failed_cases,
        generated_unix_ms: now_unix_ms(),
    })
}

#[must_use]
pub fn packet_summary(report: &PacketReport) -> PacketSummary {
    PacketSummary {
        packet_id: report.packet_id.clone(),
        family: report.family.clone(),
        passed_cases: report.passed_cases,
        failed_cases: report.failed_cases,
        total_cases: report.case_results.len(),
    }
}

/// Write `report.json` under the packet's artifact directory.
pub fn write_packet_report(
    config: &HarnessConfig,
    report: &PacketReport,
) -> Result<PathBuf, HarnessError> {
    let dir = config.artifact_dir_for(&report.packet_id);
    fs::create_dir_all(&dir).map_err(|source| HarnessError::ArtifactIo {
        path: dir.clone(),
        source,
    })?;
    let path = dir.join("report.json");
    let bytes = serde_json::to_vec_pretty(report)?;
    fs::write(&path, bytes).map_err(|source| HarnessError::ArtifactIo {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn run_case(case: &DftCase) -> CaseResult {
    let observed = execute_case(case);
    match (&case.expected, observed) {
        (DftExpectedOutcome::Ok { output, atol }, Ok(actual)) => {
            let expected = output.iter().map(|&[re, im]| (re, im)).collect::<Vec<_>>();
            compare_output(&case.case_id, &actual, &expected, *atol)
        }
        (DftExpectedOutcome::Ok { .. }, Err(error)) => CaseResult {
            case_id: case.case_id.clone(),
            passed: false,
            message: format!("expected output, got error: {error}"),
            max_diff: None,
        },
        (DftExpectedOutcome::Error { error }, Err(observed)) => {
            let kind = error_kind(&observed);
            let passed = kind == error.as_str();
            CaseResult {
                case_id: case.case_id.clone(),
                passed,
                message: if passed {
                    format!("rejected as expected: {observed}")
                } else {
                    format!("expected error `{error}`, got `{kind}`: {observed}")
                },
                max_diff: None,
            }
        }
        (DftExpectedOutcome::Error { error }, Ok(actual)) => CaseResult {
            case_id: case.case_id.clone(),
            passed: false,
            message: format!("expected error `{error}`, got {} output bins", actual.len()),
            max_diff: None,
        },
    }
}

fn execute_case(case: &DftCase) -> Result<Vec<Complex64>, DftError> {
    let input = samples_from_value(&case.input)?;
    let options = DftOptions::default()
        .with_mode(case.mode)
        .with_normalization(case.normalization);
    if case.inverse {
        idft(&input, &options)
    } else {
        dft(&input, &options)
    }
}

fn compare_output(
    case_id: &str,
    actual: &[Complex64],
    expected: &[Complex64],
    atol: f64,
) -> CaseResult {
    match max_complex_diff(actual, expected) {
        None => CaseResult {
            case_id: case_id.to_owned(),
            passed: false,
            message: format!(
                "length mismatch: expected {}, got {}",
                expected.len(),
                actual.len()
            ),
            max_diff: None,
        },
        Some(diff) => {
            let passed = diff <= atol;
            CaseResult {
                case_id: case_id.to_owned(),
                passed,
                message: if passed {
                    format!("within atol={atol}")
                } else {
                    format!("max_diff={diff} exceeds atol={atol}")
                },
                max_diff: Some(diff),
            }
        }
    }
}

/// File names of every JSON fixture directly under `config.fixture_root`, sorted.
pub fn discover_fixtures(config: &HarnessConfig) -> Result<Vec<String>, HarnessError> {
    let entries =
        fs::read_dir(&config.fixture_root).map_err(|source| HarnessError::FixtureIo {
            path: config.fixture_root.clone(),
            source,
        })?;
    let mut names = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(str::to_owned))
        .collect::<Vec<_>>();
    names.sort();
    Ok(names)
}
