use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[clap(name = "psiscan")]
#[clap(about = "psiscan reads PAT/PMT program tables from a DVB demux character device. ", long_about = None)]
#[clap(version)]
pub(crate) struct Cli {
    /// The demux device node.{n}
    /// The canonical path of the DVB demux character device,
    /// e.g. `/dev/dvb/adapter0/demux0`.
    #[clap(short, long, value_name = "CANONICAL_PATH", required = true)]
    pub device: PathBuf,

    /// Wait bound per section delivery, in seconds.{n}
    /// A stream that stays silent for this long fails the read:
    /// fatally for the PAT, per-program for a PMT.
    #[clap(short, long, default_value = "10")]
    pub timeout: u64,

    /// Raise log verbosity (-v: debug, -vv: trace).
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
