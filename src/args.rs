use clap::Parser;

use crate::api::DEFAULT_API_ROOT;

#[derive(Parser, Clone, Debug)]
#[command(
    display_name = "CF Rating Predictor",
    long_about = "Computes the rating change a participant would have received in a finished contest"
)]
pub struct Args {
    /// Handle of the participant. If the handle took part in the contest, its
    /// official result is replaced by the given one.
    #[arg(long, env = "CF_HANDLE")]
    pub handle: String,

    #[arg(short, long, help = "Contest id")]
    pub contest_id: u32,

    /// Rating before the contest. Looked up through the API when omitted.
    #[arg(short, long)]
    pub rating: Option<i32>,

    /// Points earned. Taken from the handle's own standings row when omitted.
    #[arg(short, long)]
    pub points: Option<f64>,

    /// Penalty used to break ties on points (ICPC and IOI contests). Taken
    /// from the handle's own standings row when omitted.
    #[arg(long)]
    pub penalty: Option<i64>,

    #[arg(
        long,
        env = "CF_API_ROOT",
        default_value = DEFAULT_API_ROOT,
        help = "Root URL of the contest data API"
    )]
    pub api_root: String,

    /// Minimum spacing between two API requests
    #[arg(long, env = "CF_REQUEST_INTERVAL_MS", default_value_t = 2000)]
    pub request_interval_ms: u64,

    /// Print the result as JSON
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String
}
