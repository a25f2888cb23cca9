use std::path::PathBuf;

use argh::FromArgs;

/// Stream geolocated events from the analysis service to stdout.
#[derive(Debug, FromArgs)]
pub struct RootCommand {
    /// read configuration from this file
    #[argh(option, short = 'c', default = "PathBuf::from(\"sitrep.yaml\")")]
    pub config: PathBuf,

    /// log level: trace, debug, info, warn, error or off
    #[argh(option, default = "String::from(\"info\")")]
    pub log_level: String,

    /// print version information
    #[argh(switch)]
    pub version: bool,

    #[argh(subcommand)]
    pub sub_commands: Option<SubCommands>,
}

impl RootCommand {
    pub fn show_version(&self) {
        println!("sitrep {}", env!("CARGO_PKG_VERSION"));
    }
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
pub enum SubCommands {
    Generate(Generate),
}

/// Produce synthetic events through the same pipeline, no network needed.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "generate")]
pub struct Generate {
    /// how many events to produce, overriding the config
    #[argh(option, short = 'n')]
    pub count: Option<usize>,
}
