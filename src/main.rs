//! psiscan: PAT/PMT program table scanner for DVB demux devices.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use log::error;

use psiscan::demux::DemuxDevice;
use psiscan::scan::{scan_tables, ScanError, ScanOptions};
use psiscan::tables::TsTables;

mod context;

use context::Cli;

fn main() -> ExitCode {
    let args = Cli::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(tables) => {
            print_tables(&tables);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> Result<TsTables, ScanError> {
    let mut demux = DemuxDevice::open(&args.device).map_err(ScanError::DeviceUnavailable)?;
    let options = ScanOptions {
        timeout: Duration::from_secs(args.timeout),
    };
    scan_tables(&mut demux, &options)
}

fn print_tables(tables: &TsTables) {
    let pat = &tables.pat;
    println!(
        "{} 0x{:04x}  PAT version {}  {} program(s)",
        "transport stream".bold(),
        pat.transport_stream_id,
        pat.version,
        pat.programs.len()
    );

    for entry in &pat.programs {
        match &entry.pmt {
            Some(pmt) => {
                println!(
                    "  {} 0x{:04x}  pmt pid 0x{:04x}  version {}  pcr pid 0x{:04x}",
                    "program".green(),
                    entry.program_number,
                    entry.pid,
                    pmt.version,
                    pmt.pcr_pid
                );
                if !pmt.video_pids.is_empty() {
                    println!("    video: {}", format_pids(&pmt.video_pids));
                }
                if !pmt.audio_pids.is_empty() {
                    println!("    audio: {}", format_pids(&pmt.audio_pids));
                }
            }
            None => {
                let note = if entry.is_reserved() {
                    "(reserved)".dimmed()
                } else {
                    "(no PMT)".yellow()
                };
                println!(
                    "  {} 0x{:04x}  pmt pid 0x{:04x}  {}",
                    "program".green(),
                    entry.program_number,
                    entry.pid,
                    note
                );
            }
        }
    }
}

fn format_pids(pids: &[u16]) -> String {
    pids.iter()
        .map(|p| format!("0x{:04x}", p))
        .collect::<Vec<_>>()
        .join(" ")
}
