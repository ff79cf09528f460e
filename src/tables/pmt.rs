//! PMT (Program Map Table) decoding.
//!
//! The PMT lists one program's elementary streams. The decoder keeps
//! only the video and audio PIDs; every other stream type is logged
//! and discarded, and descriptors (conditional access, language) are
//! skipped without being decoded.

use log::debug;

use super::section::Section;

/// Stream type constants.
pub mod stream_type {
    /// MPEG-1 Video.
    pub const MPEG1_VIDEO: u8 = 0x01;
    /// MPEG-2 Video.
    pub const MPEG2_VIDEO: u8 = 0x02;
    /// MPEG-4 Part 2 Video.
    pub const MPEG4_VIDEO: u8 = 0x10;
    /// H.264/AVC Video.
    pub const H264_VIDEO: u8 = 0x1B;
    /// MPEG-1 Audio.
    pub const MPEG1_AUDIO: u8 = 0x03;
    /// MPEG-2 Audio.
    pub const MPEG2_AUDIO: u8 = 0x04;
    /// AAC Audio (ADTS).
    pub const AAC_AUDIO: u8 = 0x0F;
    /// AAC Audio (LATM).
    pub const AAC_LATM: u8 = 0x11;
    /// AC-3 Audio (ATSC private).
    pub const AC3_AUDIO: u8 = 0x81;
}

fn is_video(stream_type: u8) -> bool {
    matches!(
        stream_type,
        stream_type::MPEG1_VIDEO
            | stream_type::MPEG2_VIDEO
            | stream_type::MPEG4_VIDEO
            | stream_type::H264_VIDEO
    )
}

fn is_audio(stream_type: u8) -> bool {
    matches!(
        stream_type,
        stream_type::MPEG1_AUDIO
            | stream_type::MPEG2_AUDIO
            | stream_type::AAC_AUDIO
            | stream_type::AAC_LATM
            | stream_type::AC3_AUDIO
    )
}

/// Parsed PMT (Program Map Table).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PmtTable {
    /// Program number (service ID).
    pub program_number: u16,
    /// Version number (5 bits).
    pub version: u8,
    /// PCR PID (13 bits).
    pub pcr_pid: u16,
    /// Video elementary PIDs, in PMT order.
    pub video_pids: Vec<u16>,
    /// Audio elementary PIDs, in PMT order.
    pub audio_pids: Vec<u16>,
}

impl PmtTable {
    /// Append the elementary streams of one PMT section.
    pub fn extend_from_section(&mut self, sec: &Section) {
        self.program_number = sec.id;
        self.version = sec.version;

        let buf = sec.payload;
        if buf.len() < 4 || sec.remaining < 4 {
            return;
        }

        self.pcr_pid = (((buf[0] & 0x1F) as u16) << 8) | buf[1] as u16;
        let program_info_length = (((buf[2] & 0x0F) as usize) << 8) | buf[3] as usize;

        debug!(
            "PN 0x{:04x}, version {}, PCR PID 0x{:04x}, program info {} bytes",
            self.program_number, self.version, self.pcr_pid, program_info_length
        );

        // CA and language descriptors are skipped, not decoded.
        let mut idx = 4 + program_info_length;
        let mut remaining = sec.remaining.saturating_sub(program_info_length + 4);

        // The budget leaves the 1-4 byte CRC remainder unparsed, like
        // the PAT record loop.
        while remaining >= 5 && idx + 5 <= buf.len() {
            let stream_type = buf[idx];
            let pid = (((buf[idx + 1] & 0x1F) as u16) << 8) | buf[idx + 2] as u16;
            let es_info_length = (((buf[idx + 3] & 0x0F) as usize) << 8) | buf[idx + 4] as usize;

            if is_video(stream_type) {
                debug!("video pid 0x{:04x}", pid);
                self.video_pids.push(pid);
            } else if is_audio(stream_type) {
                // Audio language descriptors inside es_info are discarded.
                debug!("audio pid 0x{:04x}", pid);
                self.audio_pids.push(pid);
            } else {
                debug!("other pid (type 0x{:02x}) 0x{:04x}", stream_type, pid);
            }

            idx += es_info_length + 5;
            remaining = remaining.saturating_sub(es_info_length + 5);
        }
    }
}
