//! Demux device access.
//!
//! A demux device hands back whole PSI sections matching a
//! (PID, table id) filter, with CRC validation done by the driver.
//! On Linux this is the DVB demux character device; other platforms
//! get a stub that fails at open time.

use std::io;
use std::time::Duration;

#[cfg(target_os = "linux")]
pub use self::linux::{DemuxDevice, SectionStream};
#[cfg(not(target_os = "linux"))]
pub use self::unsupported::{DemuxDevice, SectionStream};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod unsupported;

/// Outcome of waiting on a section filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A delivery is ready to be read.
    Ready,
    /// The wait bound elapsed with no data.
    TimedOut,
}

/// Outcome of reading one delivery from a section filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One delivery of the given length was stored in the buffer.
    Section(usize),
    /// The driver dropped data; the caller should re-arm its wait
    /// without counting it against the timeout.
    Overrun,
}

/// A device that can open filtered section streams.
pub trait SectionDemux {
    type Filter: SectionFilter;

    /// Arm a CRC-checked, immediately started filter matching exactly
    /// one table id byte on one PID.
    fn open_filter(&mut self, pid: u16, table_id: u8) -> io::Result<Self::Filter>;
}

/// One armed section filter. The filter is released when dropped, so
/// every exit path of a read loop gives the device back.
pub trait SectionFilter {
    /// Block until a delivery is ready or the bound elapses.
    fn wait(&mut self, timeout: Duration) -> io::Result<WaitOutcome>;

    /// Read one delivery into `buf`.
    fn read_section(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;
}
