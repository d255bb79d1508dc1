use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "mpdw", version, about = "Music Player Daemon Watcher TUI")]
pub struct Cli {
    /// Daemon address
    #[arg(short, long, default_value = "127.0.0.1:6680")]
    pub address: String,

    /// Location to open at startup, e.g. "#/Queue/Current!0/-/-/-/"
    #[arg(short, long)]
    pub open: Option<String>,

    /// Seconds between automatic refreshes of the visible view
    #[arg(short, long, default_value_t = 5)]
    pub interval: u64,

    /// Rows fetched per page
    #[arg(short, long, default_value_t = 50)]
    pub limit: u64,

    /// Disable desktop notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Write debug logs to the state directory
    #[arg(short, long)]
    pub verbose: bool,
}
