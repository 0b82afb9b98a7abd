use std::path::PathBuf;

use clap::Parser;

/// Command line; every option left unset falls back to the settings file,
/// then to built-in defaults.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "linkcheck",
    version,
    about = "Check a column of URLs in a CSV sheet and mark each row VÁLIDO, NO VÁLIDO or VALIDAR"
)]
pub struct Cli {
    #[arg(value_name = "INPUT.csv")]
    pub input: PathBuf,

    /// Column holding the URLs (A, B, ..., AA).
    #[arg(short, long, value_name = "LETTER")]
    pub column: Option<String>,

    /// First sheet row to check, 1-based.
    #[arg(long, value_name = "ROW")]
    pub start_row: Option<u32>,

    /// Last sheet row to check, inclusive.
    #[arg(long, value_name = "ROW")]
    pub end_row: Option<u32>,

    /// Column that receives the result tokens.
    #[arg(long, value_name = "LETTER")]
    pub status_column: Option<String>,

    /// Where to save the marked sheet; defaults to overwriting the input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Seconds to wait after each checked row.
    #[arg(long, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Connect and request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Reject invalid or self-signed certificates.
    #[arg(long, default_value_t = false)]
    pub verify_certificates: bool,

    /// RON settings file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Write a JSON report of every checked row.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Log to the file only and skip the status line.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
