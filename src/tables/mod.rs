//! PSI/SI table decoding.
//!
//! Decoders for the tables a scan assembles from a broadcast stream:
//! - PAT (Program Association Table) - PID 0x0000
//! - PMT (Program Map Table) - variable PIDs from the PAT
//!
//! NIT and SAT/BAT streams are probed by the scan driver but their
//! payloads are not decoded here.

pub mod pat;
pub mod pmt;
pub mod section;

pub use pat::{PatTable, ProgramEntry};
pub use pmt::PmtTable;
pub use section::Section;

/// Well-known PIDs in MPEG-TS.
pub mod pid {
    /// Program Association Table PID.
    pub const PAT: u16 = 0x0000;
    /// Network Information Table (actual) PID.
    pub const NIT: u16 = 0x0010;
    /// Service Description Table / SAT-BAT PID.
    pub const SDT: u16 = 0x0011;
    /// Null packet PID (stuffing).
    pub const NULL: u16 = 0x1FFF;
}

/// Table IDs for PSI/SI sections.
pub mod table_id {
    /// Program Association Section.
    pub const PAT: u8 = 0x00;
    /// Program Map Section.
    pub const PMT: u8 = 0x02;
    /// Network Information Section - actual.
    pub const NIT_ACTUAL: u8 = 0x40;
    /// Network Information Section - other.
    pub const NIT_OTHER: u8 = 0x41;
    /// Service Description Section - actual.
    pub const SDT_ACTUAL: u8 = 0x42;
    /// Service Description Section - other.
    pub const SDT_OTHER: u8 = 0x46;
}

/// The result tree for one scan: the PAT plus, inside each of its
/// entries, the PMT read for that program.
///
/// Created empty when the scan starts, mutated in place by the
/// decoders, and handed to the caller when the scan returns.
#[derive(Debug, Clone, Default)]
pub struct TsTables {
    /// The assembled PAT.
    pub pat: PatTable,
}
