//! Gaze CLI - Command-line interface for Synheart Gaze
//!
//! Commands:
//! - replay: Drive the attention pipeline from a recorded sample stream
//! - validate: Validate a recorded sample stream
//! - doctor: Diagnose configuration and layout files
//! - config: Print the default configuration
//! - layout: Print the demo surveillance-wall layout

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use synheart_gaze::encoder::{AttentionPayload, SnapshotEncoder};
use synheart_gaze::schema::{LayoutFile, SampleAdapter, SCHEMA_VERSION};
use synheart_gaze::types::RawSample;
use synheart_gaze::{replay, GazeConfig, GazeError, GazeProcessor, OUTPUT_SCHEMA_VERSION};
use synheart_gaze::{GAZE_VERSION, PRODUCER_NAME};

/// Gaze - Attention engine for gaze-driven surveillance walls
#[derive(Parser)]
#[command(name = "gaze")]
#[command(author = "Synheart AI Inc")]
#[command(version = GAZE_VERSION)]
#[command(about = "Turn gaze predictions into region attention signals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded samples through the pipeline
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Region layout file
        #[arg(long)]
        layout: PathBuf,

        /// Configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Emit only the snapshot after the last tick
        #[arg(long)]
        final_only: bool,
    },

    /// Validate a recorded sample stream
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and layout
    Doctor {
        /// Check a configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Check a layout file
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration as JSON
    Config,

    /// Print the demo layout as JSON
    Layout {
        #[arg(long, default_value = "1280")]
        width: f64,

        #[arg(long, default_value = "720")]
        height: f64,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one sample per line)
    Ndjson,
    /// JSON array of samples
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one payload per line)
    Ndjson,
    /// JSON array of payloads
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), GazeCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            layout,
            config,
            input_format,
            output_format,
            final_only,
        } => cmd_replay(
            &input,
            &output,
            &layout,
            config.as_deref(),
            input_format,
            output_format,
            final_only,
        ),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor {
            config,
            layout,
            json,
        } => cmd_doctor(config.as_deref(), layout.as_deref(), json),

        Commands::Config => {
            println!("{}", GazeConfig::default().to_json()?);
            Ok(())
        }

        Commands::Layout { width, height } => {
            println!("{}", LayoutFile::demo(width, height).to_json()?);
            Ok(())
        }
    }
}

fn read_input(input: &Path) -> Result<String, GazeCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_samples(data: &str, format: &InputFormat) -> Result<Vec<RawSample>, GazeCliError> {
    let samples = match format {
        InputFormat::Ndjson => SampleAdapter::parse_ndjson(data)?,
        InputFormat::Json => SampleAdapter::parse_array(data)?,
    };
    Ok(samples)
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    layout: &Path,
    config: Option<&Path>,
    input_format: InputFormat,
    output_format: OutputFormat,
    final_only: bool,
) -> Result<(), GazeCliError> {
    let samples = parse_samples(&read_input(input)?, &input_format)?;
    if samples.is_empty() {
        return Err(GazeCliError::NoSamples);
    }
    let invalid = SampleAdapter::validate_stream(&samples);
    if !invalid.is_empty() {
        warn!(
            "{} samples failed validation (first at index {}); run 'gaze validate' for details",
            invalid.len(),
            invalid[0].index
        );
    }

    let config = match config {
        Some(path) => GazeConfig::from_json(&fs::read_to_string(path)?)?,
        None => GazeConfig::default(),
    };
    let layout = LayoutFile::from_json(&fs::read_to_string(layout)?)?;

    let mut processor = GazeProcessor::new(config, layout.regions)?;
    processor.set_viewport(layout.viewport.width, layout.viewport.height);

    let reports = replay(&mut processor, &samples);
    info!(
        "replayed {} samples over {} ticks, {} log events",
        samples.len(),
        reports.len(),
        processor.log().len()
    );
    for event in processor.log() {
        debug!("tick {}: {}", event.tick, event.message);
    }

    let encoder = SnapshotEncoder::new();
    let payloads: Vec<AttentionPayload> = if final_only {
        vec![encoder.encode(&processor.snapshot())]
    } else {
        reports.iter().map(|r| encoder.encode(&r.snapshot)).collect()
    };

    let output_data = format_output(&payloads, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), GazeCliError> {
    let samples = parse_samples(&read_input(input)?, &input_format)?;
    let results = SampleAdapter::validate_stream(&samples);

    let report = ValidationReport {
        schema_version: SCHEMA_VERSION.to_string(),
        total_samples: samples.len(),
        valid_samples: samples.len() - results.len(),
        invalid_samples: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report ({})", report.schema_version);
        println!("=================");
        println!("Total samples:   {}", report.total_samples);
        println!("Valid samples:   {}", report.valid_samples);
        println!("Invalid samples: {}", report.invalid_samples);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Sample {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_samples > 0 {
        Err(GazeCliError::ValidationFailed(report.invalid_samples))
    } else {
        Ok(())
    }
}

fn check_file<T>(
    name: &str,
    path: &Path,
    load: impl Fn(&str) -> Result<T, GazeError>,
    describe: impl Fn(&T) -> String,
) -> DoctorCheck {
    if !path.exists() {
        return DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: format!("{} file does not exist", name),
        };
    }

    match fs::read_to_string(path) {
        Ok(content) => match load(&content) {
            Ok(value) => DoctorCheck {
                name: name.to_string(),
                status: CheckStatus::Ok,
                message: describe(&value),
            },
            Err(e) => DoctorCheck {
                name: name.to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        },
        Err(e) => DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: format!("Cannot read {} file: {}", name, e),
        },
    }
}

fn cmd_doctor(config: Option<&Path>, layout: Option<&Path>, json: bool) -> Result<(), GazeCliError> {
    let mut checks = vec![
        DoctorCheck {
            name: "gaze_version".to_string(),
            status: CheckStatus::Ok,
            message: format!("Gaze version {}", GAZE_VERSION),
        },
        DoctorCheck {
            name: "schema_version".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Input schema: {}, output schema: {}",
                SCHEMA_VERSION, OUTPUT_SCHEMA_VERSION
            ),
        },
    ];

    if let Some(path) = config {
        checks.push(check_file("config", path, GazeConfig::from_json, |c| {
            format!("Config valid (tick {}ms)", c.tick_interval_ms)
        }));
    }

    if let Some(path) = layout {
        checks.push(check_file(
            "layout",
            path,
            |json| {
                let layout = LayoutFile::from_json(json)?;
                // Registration rejects duplicate ids
                GazeProcessor::with_regions(layout.regions.clone())?;
                Ok(layout)
            },
            |l| {
                format!(
                    "Layout valid ({} regions on {}x{})",
                    l.regions.len(),
                    l.viewport.width,
                    l.viewport.height
                )
            },
        ));
    }

    checks.push(if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass -i <file> to replay)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (replay -i - ready)".to_string(),
        }
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: GAZE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Gaze Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    if report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error))
    {
        Err(GazeCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn format_output(
    payloads: &[AttentionPayload],
    format: &OutputFormat,
) -> Result<String, GazeCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for payload in payloads {
                lines.push(serde_json::to_string(payload)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(payloads)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(payloads)?),
    }
}

// Error types

#[derive(Debug)]
enum GazeCliError {
    Io(io::Error),
    Gaze(GazeError),
    Json(serde_json::Error),
    NoSamples,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for GazeCliError {
    fn from(e: io::Error) -> Self {
        GazeCliError::Io(e)
    }
}

impl From<GazeError> for GazeCliError {
    fn from(e: GazeError) -> Self {
        GazeCliError::Gaze(e)
    }
}

impl From<serde_json::Error> for GazeCliError {
    fn from(e: serde_json::Error) -> Self {
        GazeCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<GazeCliError> for CliError {
    fn from(e: GazeCliError) -> Self {
        match e {
            GazeCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            GazeCliError::Gaze(e) => {
                let (code, hint) = match &e {
                    GazeError::InvalidConfig(_) => {
                        ("CONFIG_ERROR", "Run 'gaze config' for a valid starting point")
                    }
                    GazeError::DuplicateRegion(_) | GazeError::UnknownRegion(_) => {
                        ("LAYOUT_ERROR", "Run 'gaze doctor --layout <file>' for details")
                    }
                    GazeError::ParseError(_) => {
                        ("PARSE_ERROR", "Ensure input matches the gaze.sample.v1 schema")
                    }
                    GazeError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
                    _ => ("GAZE_ERROR", "Run 'gaze doctor' to check your setup"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            GazeCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            GazeCliError::NoSamples => CliError {
                code: "NO_SAMPLES".to_string(),
                message: "No samples found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            GazeCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} samples failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            GazeCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    schema_version: String,
    total_samples: usize,
    valid_samples: usize,
    invalid_samples: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
