//! Headmotion CLI - Command-line interface for headmotion
//!
//! Commands:
//! - run: Process a stream of motion events into delimited rows
//! - validate: Validate stream event structure
//! - resolve: Resolve a header into a sensor variant and channel positions
//! - euler: Convert a quaternion to Euler angles
//! - convert: Convert a raw ADC code into physical units

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use headmotion::schema::{
    StreamEvent, StreamEventAdapter, StreamHeader, StreamTally, DEFAULT_STREAM,
};
use headmotion::sink::DelimitedWriter;
use headmotion::types::Quaternion;
use headmotion::units::PhysicalQuantity;
use headmotion::{quaternion_to_euler, MotionSession, SessionOptions, HEADMOTION_VERSION};

/// Headmotion - Head gesture detection for headset motion streams
#[derive(Parser)]
#[command(name = "headmotion")]
#[command(version = HEADMOTION_VERSION)]
#[command(about = "Turn headset motion streams into gesture rows", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process stream events (NDJSON) into delimited rows
    Run {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Stream name to consume
        #[arg(long, default_value = DEFAULT_STREAM)]
        stream: String,

        /// Append roll/pitch/yaw to quaternion frames
        #[arg(long)]
        euler: bool,

        /// Flush output after each row
        #[arg(long)]
        flush: bool,

        /// Write a JSON session summary to this path on exit
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Validate stream event structure
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

    /// Resolve header columns into a sensor variant
    Resolve {
        /// Header column names (space or comma separated)
        #[arg(required = true, value_delimiter = ',')]
        columns: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a quaternion (w x y z) to roll/pitch/yaw
    Euler {
        #[arg(allow_negative_numbers = true)]
        w: f64,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,

        /// Report angles in degrees instead of radians
        #[arg(long)]
        degrees: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a raw ADC code into physical units
    Convert {
        /// Raw ADC code
        #[arg(allow_negative_numbers = true)]
        raw: f64,

        /// Quantity measured by the channel
        #[arg(long, value_enum, default_value = "angular-rate")]
        quantity: Quantity,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Quantity {
    /// Gyroscope, deg/s
    AngularRate,
    /// Accelerometer, g
    Acceleration,
    /// Magnetometer, gauss
    MagneticField,
}

impl From<Quantity> for PhysicalQuantity {
    fn from(q: Quantity) -> Self {
        match q {
            Quantity::AngularRate => PhysicalQuantity::AngularRate,
            Quantity::Acceleration => PhysicalQuantity::Acceleration,
            Quantity::MagneticField => PhysicalQuantity::MagneticField,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(&cli.log_level);

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

fn init_logger(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn run(cli: Cli) -> Result<(), HmCliError> {
    match cli.command {
        Commands::Run {
            input,
            output,
            stream,
            euler,
            flush,
            summary,
        } => {
            let options = SessionOptions {
                stream,
                append_euler: euler,
            };
            cmd_run(&input, &output, options, flush, summary.as_deref())
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Resolve { columns, json } => cmd_resolve(&columns, json),

        Commands::Euler {
            w,
            x,
            y,
            z,
            degrees,
            json,
        } => cmd_euler(Quaternion::new(w, x, y, z), degrees, json),

        Commands::Convert { raw, quantity } => cmd_convert(raw, quantity.into()),
    }
}

fn cmd_run(
    input: &Path,
    output: &Path,
    options: SessionOptions,
    flush: bool,
    summary_path: Option<&Path>,
) -> Result<(), HmCliError> {
    let reader: Box<dyn BufRead> = if is_stdio(input) {
        if atty::is(atty::Stream::Stdin) {
            warn!("Reading stream events from an interactive terminal; end input with Ctrl-D");
        }
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(input)?))
    };

    let writer: Box<dyn Write> = if is_stdio(output) {
        Box::new(io::stdout())
    } else {
        Box::new(BufWriter::new(File::create(output)?))
    };

    let mut sink = DelimitedWriter::new(writer).with_flush(flush);
    let mut session = MotionSession::with_options(options);

    info!("Consuming stream '{}'", session.options().stream);

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let event = match StreamEventAdapter::parse_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                return Err(HmCliError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )))
            }
        };

        session.process_event(event, &mut sink)?;
    }

    sink.close()?;

    let summary = session.summary();
    info!(
        "Session finished: {} frames ({} classified, {} passed through)",
        summary.frames_processed, summary.frames_classified, summary.frames_passed_through
    );

    if let Some(path) = summary_path {
        fs::write(path, serde_json::to_string_pretty(&summary)?)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), HmCliError> {
    let input_data = if is_stdio(input) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let events: Vec<StreamEvent> = match input_format {
        InputFormat::Ndjson => StreamEventAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => StreamEventAdapter::parse_array(&input_data)?,
    };

    if events.is_empty() {
        return Err(HmCliError::NoEvents);
    }

    let failures = StreamEventAdapter::validate_events(&events);
    let report = ValidationReport {
        total_events: events.len(),
        malformed_events: failures
            .iter()
            .map(|f| MalformedEvent {
                index: f.index,
                stream: f.stream.clone(),
                error: f.error.to_string(),
            })
            .collect(),
        streams: StreamEventAdapter::tally_streams(&events),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} events, {} streams", report.total_events, report.streams.len());

        for tally in &report.streams {
            let variant = tally
                .variant
                .map(|v| v.to_string())
                .unwrap_or_else(|| "no header".to_string());
            println!(
                "  {}: {} header(s), {} frame(s), {}",
                tally.stream, tally.headers, tally.frames, variant
            );
            for err in &tally.sequence_errors {
                println!("    [{}] {}", err.index, err.error);
            }
        }

        for err in &report.malformed_events {
            println!("  [{}] stream '{}': {}", err.index, err.stream, err.error);
        }
    }

    let problems = report.problem_count();
    if problems > 0 {
        return Err(HmCliError::ValidationFailed(problems));
    }

    Ok(())
}

fn cmd_resolve(columns: &[String], json: bool) -> Result<(), HmCliError> {
    let header = StreamHeader::resolve(columns);

    if json {
        println!("{}", serde_json::to_string_pretty(&header)?);
    } else {
        println!("Variant:    {}", header.variant());
        println!("Columns:    {}", header.columns.join(", "));
        println!(
            "Classified: {}",
            if header.variant().is_classified() { "yes" } else { "no" }
        );
        println!("Schema:     {}", serde_json::to_string(&header.schema)?);
    }

    Ok(())
}

fn cmd_euler(q: Quaternion, degrees: bool, json: bool) -> Result<(), HmCliError> {
    let angles = quaternion_to_euler(&q);
    let angles = if degrees { angles.to_degrees() } else { angles };

    if json {
        println!("{}", serde_json::to_string(&angles)?);
    } else {
        let unit = if degrees { "deg" } else { "rad" };
        println!("Roll:  {} {}", angles.roll, unit);
        println!("Pitch: {} {}", angles.pitch, unit);
        println!("Yaw:   {} {}", angles.yaw, unit);
    }

    Ok(())
}

fn cmd_convert(raw: f64, quantity: PhysicalQuantity) -> Result<(), HmCliError> {
    println!("{} {}", quantity.convert(raw), quantity.unit());
    Ok(())
}

// Helper functions

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

// Error types

#[derive(Debug)]
enum HmCliError {
    Io(io::Error),
    Motion(headmotion::MotionError),
    Json(serde_json::Error),
    NoEvents,
    ValidationFailed(usize),
    ParseError(String),
}

impl From<io::Error> for HmCliError {
    fn from(e: io::Error) -> Self {
        HmCliError::Io(e)
    }
}

impl From<headmotion::MotionError> for HmCliError {
    fn from(e: headmotion::MotionError) -> Self {
        HmCliError::Motion(e)
    }
}

impl From<serde_json::Error> for HmCliError {
    fn from(e: serde_json::Error) -> Self {
        HmCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HmCliError> for CliError {
    fn from(e: HmCliError) -> Self {
        match e {
            HmCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HmCliError::Motion(headmotion::MotionError::SinkUnavailable) => CliError {
                code: "SINK_UNAVAILABLE".to_string(),
                message: "Output sink stopped accepting rows".to_string(),
                hint: Some("Check that the output destination is still writable".to_string()),
            },
            HmCliError::Motion(headmotion::MotionError::InvalidEvent(e)) => CliError {
                code: "INVALID_EVENT".to_string(),
                message: e.to_string(),
                hint: Some("Run 'headmotion validate' to list malformed events".to_string()),
            },
            HmCliError::Motion(e) => CliError {
                code: "STREAM_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure the header precedes frames and frames match its arity".to_string()),
            },
            HmCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HmCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "Input holds no stream events".to_string(),
                hint: Some("Expect one header or frame event per line".to_string()),
            },
            HmCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} events would be rejected by a session", count),
                hint: Some("Send each stream's header once, before its frames".to_string()),
            },
            HmCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_events: usize,
    malformed_events: Vec<MalformedEvent>,
    streams: Vec<StreamTally>,
}

impl ValidationReport {
    fn problem_count(&self) -> usize {
        self.malformed_events.len()
            + self
                .streams
                .iter()
                .map(|t| t.sequence_errors.len())
                .sum::<usize>()
    }
}

#[derive(serde::Serialize)]
struct MalformedEvent {
    index: usize,
    stream: String,
    error: String,
}
