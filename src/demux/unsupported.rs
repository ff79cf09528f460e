use std::io;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use super::{ReadOutcome, SectionDemux, SectionFilter, WaitOutcome};

const UNSUPPORTED_MSG: &str = "DVB demux device access is only supported on Linux";

pub struct DemuxDevice {
    _private: (),
}

impl DemuxDevice {
    pub fn open(_path: impl AsRef<Path>) -> io::Result<Self> {
        Err(io::Error::new(ErrorKind::Unsupported, UNSUPPORTED_MSG))
    }
}

impl SectionDemux for DemuxDevice {
    type Filter = SectionStream;

    fn open_filter(&mut self, _pid: u16, _table_id: u8) -> io::Result<SectionStream> {
        Err(io::Error::new(ErrorKind::Unsupported, UNSUPPORTED_MSG))
    }
}

pub struct SectionStream {
    _private: (),
}

impl SectionFilter for SectionStream {
    fn wait(&mut self, _timeout: Duration) -> io::Result<WaitOutcome> {
        Err(io::Error::new(ErrorKind::Unsupported, UNSUPPORTED_MSG))
    }

    fn read_section(&mut self, _buf: &mut [u8]) -> io::Result<ReadOutcome> {
        Err(io::Error::new(ErrorKind::Unsupported, UNSUPPORTED_MSG))
    }
}
