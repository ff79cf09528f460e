//! psiscan library - PSI program table scanning for DVB demux devices
//!
//! The scan opens a demux device once, reads the PAT on PID 0x0000,
//! follows it with one PMT read per discovered program, then probes
//! the NIT and SAT/BAT streams before handing the assembled tables
//! back to the caller.

pub mod demux;
pub mod scan;
pub mod tables;

// Re-export commonly used types
pub use demux::{DemuxDevice, SectionDemux, SectionFilter};
pub use scan::{scan_tables, ScanError, ScanOptions};
pub use tables::{PatTable, PmtTable, ProgramEntry, TsTables};
