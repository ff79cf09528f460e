//! Table scan driver.
//!
//! Walks a tuned transport stream in three phases: the PAT on PID
//! 0x0000, then one PMT read per discovered program, then the NIT and
//! SAT/BAT probes whose payloads are left undecoded.
//!
//! Failure policy: no PAT means no known programs, so a PAT-phase
//! failure aborts the whole scan. A failed PMT or probe read is
//! logged and the scan moves on; partial PMT coverage is a normal
//! result, not an error.

use std::fmt::Write as _;
use std::io;
use std::time::Duration;

use log::{debug, trace, warn};
use thiserror::Error;

use crate::demux::{ReadOutcome, SectionDemux, SectionFilter, WaitOutcome};
use crate::tables::{pid, table_id, PatTable, PmtTable, ProgramEntry, Section, TsTables};

/// Largest delivery the demux hands back in one read.
const SECTION_BUF_LEN: usize = 4096;

/// Default wait bound for one section delivery.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced by a scan.
///
/// Driver overruns and malformed section lengths are handled inside
/// the read loop and never reach the caller.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("opening demux device failed: {0}")]
    DeviceUnavailable(#[source] io::Error),

    #[error("setting section filter for pid 0x{pid:04x}, table 0x{table_id:02x} failed: {source}")]
    FilterSetup {
        pid: u16,
        table_id: u8,
        #[source]
        source: io::Error,
    },

    #[error("timeout while waiting for pid 0x{pid:04x}, table 0x{table_id:02x}")]
    Timeout { pid: u16, table_id: u8 },

    #[error("read error on pid 0x{pid:04x}, table 0x{table_id:02x}: {source}")]
    Io {
        pid: u16,
        table_id: u8,
        #[source]
        source: io::Error,
    },
}

/// Scan tuning knobs.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Wait bound for each section delivery.
    pub timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Where a decoded section lands.
enum SectionSink<'a> {
    /// PAT records append to the shared PAT table.
    Pat(&'a mut PatTable),
    /// PMT records fill exactly one program's entry.
    Pmt(&'a mut ProgramEntry),
    /// NIT/SAT probes: sections are read and logged, never decoded.
    Probe,
}

/// Run the full PAT -> PMT -> NIT/SAT scan against an opened device.
pub fn scan_tables<D: SectionDemux>(
    demux: &mut D,
    options: &ScanOptions,
) -> Result<TsTables, ScanError> {
    let mut tables = TsTables::default();

    read_table(
        demux,
        pid::PAT,
        table_id::PAT,
        SectionSink::Pat(&mut tables.pat),
        options.timeout,
    )?;

    for entry in tables.pat.programs.iter_mut() {
        if entry.is_reserved() {
            debug!("skipping reserved program 0x{:04x}", entry.program_number);
            continue;
        }
        let pmt_pid = entry.pid;
        let program_number = entry.program_number;
        if let Err(e) = read_table(
            demux,
            pmt_pid,
            table_id::PMT,
            SectionSink::Pmt(entry),
            options.timeout,
        ) {
            warn!("PMT read for program 0x{:04x} failed: {}", program_number, e);
        }
    }

    // NIT and SAT/BAT probes; payload decoding is not implemented.
    const PROBES: [(u16, u8); 4] = [
        (pid::NIT, table_id::NIT_ACTUAL),
        (pid::NIT, table_id::NIT_OTHER),
        (pid::SDT, table_id::SDT_ACTUAL),
        (pid::SDT, table_id::SDT_OTHER),
    ];
    for (probe_pid, probe_table) in PROBES {
        if let Err(e) = read_table(
            demux,
            probe_pid,
            probe_table,
            SectionSink::Probe,
            options.timeout,
        ) {
            warn!(
                "probe read for pid 0x{:04x}, table 0x{:02x} failed: {}",
                probe_pid, probe_table, e
            );
        }
    }

    Ok(tables)
}

/// Read one table: arm a filter, then consume sections until the one
/// marked last. The filter is dropped, and thereby released, on every
/// exit path.
fn read_table<D: SectionDemux>(
    demux: &mut D,
    pid: u16,
    table: u8,
    mut sink: SectionSink<'_>,
    timeout: Duration,
) -> Result<(), ScanError> {
    let mut filter = demux
        .open_filter(pid, table)
        .map_err(|source| ScanError::FilterSetup {
            pid,
            table_id: table,
            source,
        })?;

    let mut buf = [0u8; SECTION_BUF_LEN];
    loop {
        let count = next_delivery(&mut filter, pid, table, timeout, &mut buf)?;

        // Partial or misaligned captures happen on a live feed; drop
        // them and poll again.
        let Some(section) = Section::parse(&buf[..count]) else {
            trace!(
                "discarding {}-byte delivery on pid 0x{:04x}: inconsistent section_length",
                count,
                pid
            );
            continue;
        };

        debug!(
            "pid 0x{:04x}, table 0x{:02x}, id 0x{:04x}, version {}, section {}/{}",
            pid,
            section.table_id,
            section.id,
            section.version,
            section.section_number,
            section.last_section_number
        );
        trace!("{}", hexdump(&buf[..count]));

        match (section.table_id, &mut sink) {
            (table_id::PAT, SectionSink::Pat(pat)) => pat.extend_from_section(&section),
            (table_id::PMT, SectionSink::Pmt(entry)) => {
                entry
                    .pmt
                    .get_or_insert_with(PmtTable::default)
                    .extend_from_section(&section);
            }
            // NIT and SAT/BAT sections are accepted so the loop can
            // terminate, but their payloads stay undecoded.
            _ => {}
        }

        if section.is_last() {
            return Ok(());
        }
    }
}

/// Wait for one delivery and read it.
///
/// Waiting and reading are one small state machine: a timeout is
/// fatal to the call, a driver overrun re-arms the wait without
/// counting against the timeout, and a hard fault propagates.
fn next_delivery<F: SectionFilter>(
    filter: &mut F,
    pid: u16,
    table: u8,
    timeout: Duration,
    buf: &mut [u8],
) -> Result<usize, ScanError> {
    loop {
        let outcome = filter.wait(timeout).map_err(|source| ScanError::Io {
            pid,
            table_id: table,
            source,
        })?;
        if outcome == WaitOutcome::TimedOut {
            return Err(ScanError::Timeout {
                pid,
                table_id: table,
            });
        }

        match filter.read_section(buf).map_err(|source| ScanError::Io {
            pid,
            table_id: table,
            source,
        })? {
            ReadOutcome::Section(count) => return Ok(count),
            ReadOutcome::Overrun => {
                trace!("overrun on pid 0x{:04x}, re-arming wait", pid);
            }
        }
    }
}

/// Render a delivery the way the demux handed it over, 16 bytes per
/// row.
fn hexdump(buf: &[u8]) -> String {
    let mut out = format!("size {}", buf.len());
    for (i, byte) in buf.iter().enumerate() {
        if i % 16 == 0 {
            out.push_str("\n\t");
        }
        let _ = write!(out, "{:02x} ", byte);
    }
    out
}
