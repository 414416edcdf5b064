use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use glob::glob;
use log::LevelFilter;
use thiserror::Error;

use bump_detector::classify::BoundMode;
use bump_detector::{
    BumpDetector, Detector, DetectorError, PipelineConfig, PointCloudTransformer,
    PreprocessTransformBuilder, TransformBuilder, Transformer,
};
use pcd_exporter::{write_csv, write_las, write_report, LasExportOptions};
use pcd_parser::parsers::csv::CsvParserProvider;
use pcd_parser::parsers::las::LasParserProvider;
use pcd_parser::parsers::{get_extension, CoordinateMode, Extension, ParserProvider as _};

#[derive(Parser, Debug)]
#[command(
    name = "bumpfinder",
    about = "Flags speed bumps in mobile LiDAR road corridor scans",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    input: Vec<String>,

    /// Annotated cloud, `.las`/`.laz` or `.csv`/`.txt`
    #[arg(short, long, required = true, value_name = "FILE")]
    output: String,

    /// Pipeline configuration (JSON); missing fields keep their defaults
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Per-window report (JSON)
    #[arg(long, value_name = "JSON")]
    report: Option<PathBuf>,

    #[arg(long, value_name = "N")]
    segments: Option<usize>,

    #[arg(long, value_name = "FRACTION")]
    overlap: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Use LAS integer record units instead of scaled coordinates
    #[arg(long)]
    raw_coordinates: bool,

    #[arg(long)]
    skip_preprocess: bool,

    /// Accept statistics equal to a threshold band limit
    #[arg(long)]
    inclusive_bounds: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("no input file matched {0:?}")]
    NoInput(Vec<String>),

    #[error("{0}")]
    Input(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error("failed to parse point cloud: {0}")]
    Parse(String),

    #[error("failed to write {path}: {message}")]
    Export { path: PathBuf, message: String },
}

fn check_and_get_extension(paths: &[PathBuf]) -> Result<Extension, AppError> {
    let mut extensions = vec![];
    for path in paths.iter() {
        let extension = path.extension().and_then(OsStr::to_str);
        match extension {
            Some(ext) => extensions.push(ext.to_lowercase()),
            None => {
                return Err(AppError::Input(format!(
                    "file extension is not found: {}",
                    path.display()
                )))
            }
        }
    }
    extensions.sort();
    extensions.dedup();

    match extensions.as_slice() {
        [] => Err(AppError::Input("no input files".to_string())),
        [ext] => get_extension(ext)
            .ok_or_else(|| AppError::Input(format!("unsupported input extension: {}", ext))),
        _ => Err(AppError::Input(format!(
            "multiple extensions are not supported: {:?}",
            extensions
        ))),
    }
}

fn expand_globs(input_patterns: &[String]) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for pattern in input_patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let entries = glob(pattern)
                .map_err(|e| AppError::Input(format!("bad glob pattern {}: {}", pattern, e)))?;
            for entry in entries {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => log::warn!("skipping unreadable path: {:?}", e),
                }
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    if paths.is_empty() {
        return Err(AppError::NoInput(input_patterns.to_vec()));
    }
    Ok(paths)
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, AppError> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| AppError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_overrides(config: &mut PipelineConfig, args: &Cli) {
    if let Some(segments) = args.segments {
        config.detector.segment_count = segments;
    }
    if let Some(overlap) = args.overlap {
        config.detector.overlap_fraction = overlap;
    }
    if let Some(seed) = args.seed {
        config.detector.seed = Some(seed);
    }
    if args.inclusive_bounds {
        config.detector.bound_mode = BoundMode::Inclusive;
    }
}

fn run(args: Cli) -> Result<(), AppError> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;
    log::debug!("configuration: {:?}", config);

    let input_files = expand_globs(&args.input)?;
    log::info!("Expanded input files: {:?}", input_files);
    let output_path = PathBuf::from(&args.output);
    let output_extension = check_and_get_extension(std::slice::from_ref(&output_path))?;

    log::info!("start parsing...");
    let start_local = std::time::Instant::now();
    let coordinates = if args.raw_coordinates {
        CoordinateMode::Raw
    } else {
        CoordinateMode::Scaled
    };
    let parser = match check_and_get_extension(&input_files)? {
        Extension::Las | Extension::Laz => LasParserProvider {
            filenames: input_files,
            coordinates,
        }
        .get_parser(),
        Extension::Csv | Extension::Txt => CsvParserProvider {
            filenames: input_files,
        }
        .get_parser(),
    };
    let point_cloud = parser
        .parse()
        .map_err(|e| AppError::Parse(e.to_string()))?;
    log::info!(
        "finish parsing {} points in {:?}",
        point_cloud.len(),
        start_local.elapsed()
    );

    let point_cloud = if args.skip_preprocess {
        point_cloud
    } else {
        log::info!("start preprocessing...");
        let start_local = std::time::Instant::now();
        let transform = PreprocessTransformBuilder::new(config.preprocess.clone()).build();
        let transformer = PointCloudTransformer::new(transform);
        let preprocessed = transformer.execute(point_cloud)?;
        log::info!(
            "finish preprocessing, {} points left in {:?}",
            preprocessed.len(),
            start_local.elapsed()
        );
        preprocessed
    };

    log::info!("start detecting...");
    let start_local = std::time::Instant::now();
    let detector = BumpDetector::new(config.detector)?;
    let report = detector.execute(&point_cloud)?;
    log::info!(
        "finish detecting in {:?}: {} segments flagged",
        start_local.elapsed(),
        report.flagged_segments
    );

    let export_error = |path: &Path, e: Box<dyn std::error::Error>| AppError::Export {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    match output_extension {
        Extension::Las | Extension::Laz => {
            let options = if args.raw_coordinates {
                LasExportOptions::record_units()
            } else {
                LasExportOptions::default()
            };
            write_las(&output_path, &report.cloud, &options)
                .map_err(|e| export_error(output_path.as_path(), e))?;
        }
        Extension::Csv | Extension::Txt => {
            write_csv(&output_path, &report.cloud).map_err(|e| export_error(output_path.as_path(), e))?;
        }
    }
    if let Some(report_path) = &args.report {
        write_report(report_path, &report).map_err(|e| export_error(report_path.as_path(), e))?;
    }

    Ok(())
}

fn main() {
    let args = Cli::parse();

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(
            None,
            if args.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        )
        .init();

    log::info!("input files: {:?}", args.input);
    log::info!("output file: {}", args.output);

    let start = std::time::Instant::now();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
    log::info!("Elapsed: {:?}", start.elapsed());
}
