//! Huffman file codec.
//!
//! ```bash
//! # in-memory self test
//! huffstream
//!
//! # encode input.txt into input.txt__compressed, then decode that into copy.txt
//! huffstream input.txt copy.txt
//!
//! # one direction only
//! huffstream --mode encode input.txt input.huff
//! huffstream --mode decode input.huff input.txt
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use huffstream::{CodecConfig, Report};

const SELF_TEST_INPUT: &str = "This is a test string!";

#[derive(Parser, Debug)]
#[command(name = "huffstream")]
#[command(version)]
#[command(about = "Huffman encode and decode files", long_about = None)]
struct Args {
    /// File to read
    #[arg(requires = "output")]
    input: Option<PathBuf>,

    /// File to write
    output: Option<PathBuf>,

    /// What to do with the two files [default: round-trip]
    #[arg(short, long, value_enum, requires = "input")]
    mode: Option<Mode>,

    /// Bytes buffered per file read or write
    #[arg(long, default_value_t = huffstream::stream::BLOCK_SIZE)]
    block_size: usize,

    /// Keep a partially written output file when an operation fails
    #[arg(long)]
    keep_partial: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Encode INPUT to INPUT__compressed, then decode it to OUTPUT
    RoundTrip,
    /// Encode INPUT into the container OUTPUT
    Encode,
    /// Decode the container INPUT into OUTPUT
    Decode,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(args.log_level))
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to install log subscriber");
    }

    let (Some(input), Some(output)) = (args.input, args.output) else {
        return self_test();
    };

    let config = CodecConfig::default()
        .with_block_size(args.block_size)
        .with_keep_partial_output(args.keep_partial);

    let result = match args.mode.unwrap_or(Mode::RoundTrip) {
        Mode::RoundTrip => huffstream::round_trip_file(&input, &output, &config).map(
            |(container, report)| {
                println!("container: {}", container.display());
                report
            },
        ),
        Mode::Encode => huffstream::encode_file(&input, &output, &config),
        Mode::Decode => huffstream::decode_file(&input, &output, &config),
    };

    match result {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(kind = err.category(), "{err}");
            eprintln!("huffstream: {err}");
            ExitCode::FAILURE
        }
    }
}

fn self_test() -> ExitCode {
    let decoded = huffstream::encode_bytes(SELF_TEST_INPUT.as_bytes())
        .and_then(|container| huffstream::decode_bytes(&container));

    match decoded {
        Ok(decoded) if decoded == SELF_TEST_INPUT.as_bytes() => {
            println!("The strings are equal.");
            ExitCode::SUCCESS
        }
        Ok(_) => {
            println!("The strings are not equal.");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(kind = err.category(), "{err}");
            println!("The strings are not equal.");
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &Report) {
    println!(
        "{} bytes <-> {} byte container ({} distinct, ratio {:.3})",
        report.original_bytes,
        report.container_bytes,
        report.distinct_bytes,
        report.ratio()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_selects_the_self_test() {
        let args = Args::try_parse_from(["huffstream"]).unwrap();
        assert!(args.input.is_none());
        assert_eq!(args.mode, None);
        assert_eq!(args.log_level, LogLevel::Warn);
    }

    #[test]
    fn mode_without_paths_is_rejected() {
        assert!(Args::try_parse_from(["huffstream", "--mode", "encode"]).is_err());
    }

    #[test]
    fn input_without_output_is_rejected() {
        assert!(Args::try_parse_from(["huffstream", "in.txt"]).is_err());
    }

    #[test]
    fn paths_and_mode_parse() {
        let args =
            Args::try_parse_from(["huffstream", "-m", "decode", "in.huff", "out.txt"]).unwrap();
        assert_eq!(args.mode, Some(Mode::Decode));
        assert_eq!(args.input, Some(PathBuf::from("in.huff")));
        assert_eq!(args.output, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        assert!(Args::try_parse_from(["huffstream", "--log-level", "verbose"]).is_err());
        let args = Args::try_parse_from(["huffstream", "--log-level", "debug"]).unwrap();
        assert_eq!(Level::from(args.log_level), Level::DEBUG);
    }
}
