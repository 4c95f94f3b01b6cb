use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use serde_json::Value;

use classblur_core::detection::infrastructure::model_resolver::{self, ModelSpec};
use classblur_core::detection::infrastructure::onnx_embedding_provider::OnnxEmbeddingProvider;
use classblur_core::detection::infrastructure::onnx_face_detector::DEFAULT_CONFIDENCE;
use classblur_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use classblur_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use classblur_core::matching::domain::match_config::MatchConfig;
use classblur_core::pipeline::redact_face_use_case::RedactFaceUseCase;
use classblur_core::pipeline::redact_group_photo_use_case::{RedactGroupPhotoUseCase, TargetReport};
use classblur_core::pipeline::redact_photo_file_use_case::{ReferenceFile, RedactPhotoFileUseCase};
use classblur_core::pipeline::redaction_config::{MissPolicy, RedactionConfig};
use classblur_core::redaction::infrastructure::gaussian_region_redactor::{
    GaussianRegionRedactor, RedactionShape,
};
use classblur_core::shared::constants::{
    DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL,
    IMAGE_EXTENSIONS,
};

const DETECTOR_MODEL: ModelSpec = ModelSpec {
    name: DETECTOR_MODEL_NAME,
    url: DETECTOR_MODEL_URL,
};
const EMBEDDING_MODEL: ModelSpec = ModelSpec {
    name: EMBEDDING_MODEL_NAME,
    url: EMBEDDING_MODEL_URL,
};

/// Blur selected people out of a group photo, identified by reference portraits.
#[derive(Parser, Debug)]
#[command(name = "classblur")]
struct Cli {
    /// Group photo to redact.
    input: PathBuf,

    /// Where to write the redacted photo.
    output: PathBuf,

    /// Reference portrait of a person to blur, as PATH or NAME=PATH (repeatable).
    #[arg(long = "reference", short = 'r', required = true, value_parser = parse_reference)]
    references: Vec<ReferenceFile>,

    /// JSON file with redaction settings; missing fields keep the ArcFace
    /// defaults and flags below take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Embedding distance at or above which a face is never considered.
    #[arg(long)]
    soft_threshold: Option<f64>,

    /// Maximum distance when only one face is a candidate.
    #[arg(long)]
    single_threshold: Option<f64>,

    /// Maximum distance of the best face when several are candidates.
    #[arg(long)]
    multi_threshold: Option<f64>,

    /// Required distance gap between the best and second-best face.
    #[arg(long)]
    ambiguity_margin: Option<f64>,

    /// Gaussian blur kernel size (must be odd).
    #[arg(long)]
    blur_strength: Option<usize>,

    /// Blur shape: rect or ellipse.
    #[arg(long)]
    blur_shape: Option<RedactionShape>,

    /// What to do when a person is not found: abort or best-effort.
    #[arg(long)]
    on_miss: Option<MissPolicy>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Directory holding the ONNX models, checked before downloading.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Write a JSON summary of every reference to this file.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let config = build_config(&cli)?;

    let provider = build_provider(&cli)?;
    let redactor = GaussianRegionRedactor::new(config.blur_shape);
    let face = RedactFaceUseCase::new(
        Box::new(provider),
        Box::new(redactor),
        config.matching,
        config.blur_intensity,
    );
    let mut use_case = RedactPhotoFileUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        RedactGroupPhotoUseCase::new(face, config.miss_policy),
    );

    let reports = use_case.execute(&cli.input, &cli.references, &cli.output)?;
    for report in &reports {
        eprintln!("{}", summarize(report));
    }
    log::info!("Output written to {}", cli.output.display());

    if let Some(report_path) = &cli.report {
        fs::write(report_path, serde_json::to_string_pretty(&reports)?)?;
        log::info!("Report written to {}", report_path.display());
    }
    Ok(())
}

fn build_provider(cli: &Cli) -> Result<OnnxEmbeddingProvider, Box<dyn std::error::Error>> {
    let mut paths = Vec::with_capacity(2);
    for model in [DETECTOR_MODEL, EMBEDDING_MODEL] {
        log::info!("Resolving model: {}", model.name);
        paths.push(model_resolver::resolve(
            model,
            cli.model_dir.as_deref(),
            Some(Box::new(download_progress)),
        )?);
    }
    eprintln!();
    OnnxEmbeddingProvider::from_models(&paths[0], &paths[1], cli.confidence)
}

/// Matching tuned for the ArcFace embedder, then `--config`, then explicit flags.
fn build_config(cli: &Cli) -> Result<RedactionConfig, Box<dyn std::error::Error>> {
    let mut config = RedactionConfig {
        matching: MatchConfig::arcface(),
        ..RedactionConfig::default()
    };
    if let Some(path) = &cli.config {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config {}: {e}", path.display()))?;
        config = merge_config_file(config, &text)
            .map_err(|e| format!("Invalid config {}: {e}", path.display()))?;
    }
    let config = apply_overrides(config, cli);
    config.validate()?;
    Ok(config)
}

/// Fields present in `text` replace those of `base`; absent ones are kept.
fn merge_config_file(
    base: RedactionConfig,
    text: &str,
) -> Result<RedactionConfig, serde_json::Error> {
    let file: Value = serde_json::from_str(text)?;
    let mut merged = serde_json::to_value(base)?;
    merge_json(&mut merged, file);
    serde_json::from_value(merged)
}

fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge_json(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch,
    }
}

fn apply_overrides(mut config: RedactionConfig, cli: &Cli) -> RedactionConfig {
    if let Some(v) = cli.soft_threshold {
        config.matching.soft_threshold = v;
    }
    if let Some(v) = cli.single_threshold {
        config.matching.single_match_threshold = v;
    }
    if let Some(v) = cli.multi_threshold {
        config.matching.multi_match_threshold = v;
    }
    if let Some(v) = cli.ambiguity_margin {
        config.matching.ambiguity_margin = v;
    }
    if let Some(v) = cli.blur_strength {
        config.blur_intensity = v;
    }
    if let Some(v) = cli.blur_shape {
        config.blur_shape = v;
    }
    if let Some(v) = cli.on_miss {
        config.miss_policy = v;
    }
    config
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !is_image(&cli.input) {
        return Err(format!("Input is not a supported image: {}", cli.input.display()).into());
    }
    if !is_image(&cli.output) {
        return Err(format!(
            "Output must have an image extension ({}), got {}",
            IMAGE_EXTENSIONS.join(", "),
            cli.output.display()
        )
        .into());
    }
    for reference in &cli.references {
        if !reference.path.exists() {
            return Err(format!(
                "Reference photo for {} not found: {}",
                reference.name,
                reference.path.display()
            )
            .into());
        }
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    Ok(())
}

/// Parses `NAME=PATH`, or a bare `PATH` named after its file stem.
fn parse_reference(arg: &str) -> Result<ReferenceFile, String> {
    if let Some((name, path)) = arg.split_once('=') {
        if name.is_empty() || path.is_empty() {
            return Err(format!("Expected NAME=PATH, got '{arg}'"));
        }
        return Ok(ReferenceFile::new(name, path));
    }
    let path = PathBuf::from(arg);
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Cannot derive a name from '{arg}'"))?
        .to_string();
    Ok(ReferenceFile::new(name, path))
}

fn summarize(report: &TargetReport) -> String {
    match (report.redacted, report.distance, report.reason) {
        (true, Some(d), _) => format!("{}: blurred (distance {d:.3})", report.name),
        (true, None, _) => format!("{}: blurred", report.name),
        (false, _, Some(reason)) => format!("{}: not found ({reason:?})", report.name),
        (false, _, None) => format!("{}: not found", report.name),
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model... {pct}%");
    } else {
        eprint!("\rDownloading model... {downloaded} bytes");
    }
}
