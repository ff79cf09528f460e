//! PSI section framing.
//!
//! A demux delivery is supposed to carry exactly one whole section.
//! Framing checks the declared 12-bit `section_length` against the
//! actual byte count before any field past the length is trusted;
//! a mismatched delivery is dropped so a misaligned capture on a live
//! feed never reaches the decoders.

/// Fixed PSI header bytes skipped before the table payload.
const HEADER_LEN: usize = 8;

/// One framed PSI section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    /// Table ID (byte 0).
    pub table_id: u8,
    /// Table ID extension: transport stream ID for the PAT, program
    /// number for a PMT.
    pub id: u16,
    /// Version number (5 bits).
    pub version: u8,
    /// Section number.
    pub section_number: u8,
    /// Last section number of this table.
    pub last_section_number: u8,
    /// Bytes after the fixed header, CRC tail included.
    pub payload: &'a [u8],
    /// Record-loop byte budget; the decoders count it down so the
    /// CRC tail is never consumed as a record.
    pub remaining: usize,
}

impl<'a> Section<'a> {
    /// Frame one delivery.
    ///
    /// Returns `None` when the delivery cannot be a whole section
    /// (fewer than 3 bytes, or a byte count that disagrees with
    /// `section_length`); the caller just polls again.
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        if data.len() < 3 {
            return None;
        }

        let section_length = (((data[1] & 0x0F) as usize) << 8) | data[2] as usize;
        if data.len() != section_length + 3 {
            return None;
        }
        if data.len() < HEADER_LEN {
            return None;
        }

        Some(Section {
            table_id: data[0],
            id: ((data[3] as u16) << 8) | data[4] as u16,
            version: (data[5] >> 1) & 0x1F,
            section_number: data[6],
            last_section_number: data[7],
            payload: &data[HEADER_LEN..],
            remaining: section_length.saturating_sub(HEADER_LEN),
        })
    }

    /// Whether this section closes its table.
    pub fn is_last(&self) -> bool {
        self.section_number == self.last_section_number
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a section delivery: 3-byte prefix, 5 header bytes, body,
    /// 4 CRC placeholder bytes.
    pub(crate) fn section_bytes(
        table_id: u8,
        id: u16,
        version: u8,
        section_number: u8,
        last_section_number: u8,
        body: &[u8],
    ) -> Vec<u8> {
        let section_length = 5 + body.len() + 4;
        let mut data = vec![
            table_id,
            0x80 | ((section_length >> 8) as u8 & 0x0F),
            section_length as u8,
            (id >> 8) as u8,
            id as u8,
            (version << 1) | 0x01,
            section_number,
            last_section_number,
        ];
        data.extend_from_slice(body);
        data.extend_from_slice(&[0u8; 4]);
        data
    }

    #[test]
    fn test_parse_header_fields() {
        let data = section_bytes(0x00, 0x1234, 5, 0, 1, &[0, 1, 0xE0, 0x20]);
        let sec = Section::parse(&data).unwrap();

        assert_eq!(sec.table_id, 0x00);
        assert_eq!(sec.id, 0x1234);
        assert_eq!(sec.version, 5);
        assert_eq!(sec.section_number, 0);
        assert_eq!(sec.last_section_number, 1);
        assert!(!sec.is_last());
        // Payload carries the body plus the 4 CRC bytes; the record
        // budget stops 3 bytes into the CRC.
        assert_eq!(sec.payload.len(), 8);
        assert_eq!(sec.remaining, 5);
    }

    #[test]
    fn test_last_section() {
        let data = section_bytes(0x02, 0x0101, 0, 2, 2, &[]);
        let sec = Section::parse(&data).unwrap();
        assert!(sec.is_last());
    }

    #[test]
    fn test_short_delivery_rejected() {
        assert!(Section::parse(&[]).is_none());
        assert!(Section::parse(&[0x00, 0x80]).is_none());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut data = section_bytes(0x00, 0x0001, 0, 0, 0, &[0, 1, 0xE0, 0x20]);

        // Truncated capture.
        let short = &data[..data.len() - 1];
        assert!(Section::parse(short).is_none());

        // Extra trailing byte.
        data.push(0xFF);
        assert!(Section::parse(&data).is_none());
    }

    #[test]
    fn test_declared_length_below_header_rejected() {
        // section_length = 2: total byte count matches but there is
        // no room for the fixed header.
        let data = [0x00, 0x80, 0x02, 0xAA, 0xBB];
        assert!(Section::parse(&data).is_none());
    }
}
