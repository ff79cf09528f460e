//! PAT (Program Association Table) decoding.
//!
//! The PAT is carried on PID 0x0000 and maps program numbers to the
//! PID carrying each program's PMT. A PAT may span several sections;
//! every section appends to the same table.

use log::debug;

use super::pmt::PmtTable;
use super::section::Section;

/// One PAT record: a program and the PID its PMT is carried on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramEntry {
    /// Program number (0 = NIT reference, others = service).
    pub program_number: u16,
    /// PMT PID (13 bits).
    pub pid: u16,
    /// Filled in once this program's PMT has been read.
    pub pmt: Option<PmtTable>,
}

impl ProgramEntry {
    /// Reserved and null program numbers stay listed in the PAT but
    /// never get a PMT read: 0x0000-0x000F cover the NIT reference
    /// and reserved tables, 0x1FFF matches the null packet PID.
    pub fn is_reserved(&self) -> bool {
        self.program_number < 0x0010 || self.program_number == 0x1FFF
    }
}

/// Parsed PAT, accumulated across all of its sections.
#[derive(Debug, Clone, Default)]
pub struct PatTable {
    /// Transport stream ID.
    pub transport_stream_id: u16,
    /// Version number (5 bits).
    pub version: u8,
    /// Programs in the order their records arrived across sections.
    /// No dedup; reserved entries stay listed and are only skipped
    /// when PMTs are looked up.
    pub programs: Vec<ProgramEntry>,
}

impl PatTable {
    /// Append the records of one PAT section.
    ///
    /// Append-only: entries from earlier sections, possibly already
    /// holding a PMT, are never moved or replaced.
    pub fn extend_from_section(&mut self, sec: &Section) {
        self.transport_stream_id = sec.id;
        self.version = sec.version;

        // Capacity from the declared length, bounds from the slice.
        self.programs.reserve(sec.remaining / 4);

        let mut buf = sec.payload;
        let mut remaining = sec.remaining;
        // The budget leaves the 1-3 byte CRC remainder unparsed.
        while remaining > 3 && buf.len() >= 4 {
            let program_number = ((buf[0] as u16) << 8) | buf[1] as u16;
            let pid = (((buf[2] & 0x1F) as u16) << 8) | buf[3] as u16;

            debug!("service_id 0x{:04x}, pmt_pid 0x{:04x}", program_number, pid);

            self.programs.push(ProgramEntry {
                program_number,
                pid,
                pmt: None,
            });

            buf = &buf[4..];
            remaining -= 4;
        }
    }

    /// Look up the PMT PID recorded for a program number.
    pub fn pmt_pid(&self, program_number: u16) -> Option<u16> {
        self.programs
            .iter()
            .find(|p| p.program_number == program_number)
            .map(|p| p.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::section::tests::section_bytes;
    use crate::tables::table_id;

    fn pat_section(records: &[u8], section_number: u8, last: u8) -> Vec<u8> {
        section_bytes(table_id::PAT, 0x7FE1, 3, section_number, last, records)
    }

    #[test]
    fn test_decode_two_records() {
        let data = pat_section(&[0x00, 0x00, 0x00, 0x10, 0x00, 0x01, 0x00, 0x20], 0, 0);
        let sec = Section::parse(&data).unwrap();

        let mut pat = PatTable::default();
        pat.extend_from_section(&sec);

        assert_eq!(pat.transport_stream_id, 0x7FE1);
        assert_eq!(pat.version, 3);
        assert_eq!(pat.programs.len(), 2);
        assert_eq!(pat.programs[0].program_number, 0x0000);
        assert_eq!(pat.programs[0].pid, 0x0010);
        assert_eq!(pat.programs[1].program_number, 0x0001);
        assert_eq!(pat.programs[1].pid, 0x0020);
        // Record 0 references the NIT; it is kept in the table.
        assert!(pat.programs[0].is_reserved());
    }

    #[test]
    fn test_pid_masked_to_13_bits() {
        let data = pat_section(&[0x01, 0x01, 0xE1, 0x00], 0, 0);
        let sec = Section::parse(&data).unwrap();

        let mut pat = PatTable::default();
        pat.extend_from_section(&sec);

        assert_eq!(pat.programs[0].pid, 0x0100);
    }

    #[test]
    fn test_record_count_from_remaining_budget() {
        for n in 0..8usize {
            let mut records = Vec::new();
            for i in 0..n {
                records.extend_from_slice(&[0x01, i as u8, 0xE1, i as u8]);
            }
            let data = pat_section(&records, 0, 0);
            let sec = Section::parse(&data).unwrap();

            let mut pat = PatTable::default();
            pat.extend_from_section(&sec);
            // remaining = 4n + 1, so exactly floor(remaining / 4)
            // records are consumed and the CRC tail is untouched.
            assert_eq!(pat.programs.len(), sec.remaining / 4);
            assert_eq!(pat.programs.len(), n);
        }
    }

    #[test]
    fn test_append_across_sections_preserves_existing() {
        let first = pat_section(&[0x01, 0x01, 0xE1, 0x00], 0, 1);
        let second = pat_section(&[0x01, 0x02, 0xE2, 0x00], 1, 1);

        let mut pat = PatTable::default();
        pat.extend_from_section(&Section::parse(&first).unwrap());

        // A PMT attached between sections must survive the second
        // append untouched.
        pat.programs[0].pmt = Some(PmtTable {
            program_number: 0x0101,
            ..Default::default()
        });

        pat.extend_from_section(&Section::parse(&second).unwrap());

        assert_eq!(pat.programs.len(), 2);
        assert_eq!(pat.programs[0].program_number, 0x0101);
        assert!(pat.programs[0].pmt.is_some());
        assert_eq!(pat.programs[1].program_number, 0x0102);
        assert_eq!(pat.programs[1].pid, 0x0200);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let data = pat_section(&[0x01, 0x01, 0xE1, 0x00, 0x01, 0x02, 0xE2, 0x00], 0, 0);
        let sec = Section::parse(&data).unwrap();

        let mut a = PatTable::default();
        a.extend_from_section(&sec);
        let mut b = PatTable::default();
        b.extend_from_section(&sec);

        assert_eq!(a.programs, b.programs);
    }

    #[test]
    fn test_reserved_program_numbers() {
        let entry = |program_number| ProgramEntry {
            program_number,
            pid: 0x0100,
            pmt: None,
        };
        assert!(entry(0x0000).is_reserved());
        assert!(entry(0x000F).is_reserved());
        assert!(!entry(0x0010).is_reserved());
        assert!(!entry(0x0101).is_reserved());
        assert!(entry(0x1FFF).is_reserved());
    }

    #[test]
    fn test_pmt_pid_lookup() {
        let data = pat_section(&[0x01, 0x01, 0xE1, 0x00], 0, 0);
        let mut pat = PatTable::default();
        pat.extend_from_section(&Section::parse(&data).unwrap());

        assert_eq!(pat.pmt_pid(0x0101), Some(0x0100));
        assert_eq!(pat.pmt_pid(0x0102), None);
    }
}
