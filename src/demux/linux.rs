//! Linux DVB demux backend.
//!
//! Talks to `/dev/dvb/adapterN/demuxN` through the dmx ioctl
//! interface. The device node is opened once for the whole scan;
//! each filter duplicates the handle so `DMX_STOP` runs when the
//! filter is dropped, on every exit path.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd};
use std::path::Path;
use std::time::Duration;

use log::debug;
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use super::{ReadOutcome, SectionDemux, SectionFilter, WaitOutcome};

const DMX_FILTER_SIZE: usize = 16;

/// Mirrors `struct dmx_filter` from linux/dvb/dmx.h.
#[repr(C)]
#[derive(Clone, Copy)]
struct DmxFilter {
    filter: [u8; DMX_FILTER_SIZE],
    mask: [u8; DMX_FILTER_SIZE],
    mode: [u8; DMX_FILTER_SIZE],
}

/// Mirrors `struct dmx_sct_filter_params` from linux/dvb/dmx.h.
#[repr(C)]
#[derive(Clone, Copy)]
struct DmxSctFilterParams {
    pid: u16,
    filter: DmxFilter,
    timeout: u32,
    flags: u32,
}

const DMX_CHECK_CRC: u32 = 1;
const DMX_IMMEDIATE_START: u32 = 4;

nix::ioctl_none!(dmx_stop, b'o', 42);
nix::ioctl_write_ptr!(dmx_set_filter, b'o', 43, DmxSctFilterParams);

fn errno_to_io(errno: Errno) -> io::Error {
    io::Error::from_raw_os_error(errno as i32)
}

/// A DVB demux character device.
pub struct DemuxDevice {
    file: File,
}

impl DemuxDevice {
    /// Open the demux node. Held open until the device is dropped.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::options().read(true).write(true).open(path)?;
        debug!("opened demux device {}", path.display());
        Ok(Self { file })
    }
}

impl SectionDemux for DemuxDevice {
    type Filter = SectionStream;

    fn open_filter(&mut self, pid: u16, table_id: u8) -> io::Result<SectionStream> {
        let mut filter = DmxFilter {
            filter: [0; DMX_FILTER_SIZE],
            mask: [0; DMX_FILTER_SIZE],
            mode: [0; DMX_FILTER_SIZE],
        };
        // Exact match on the table id byte only.
        filter.filter[0] = table_id;
        filter.mask[0] = 0xFF;

        let params = DmxSctFilterParams {
            pid,
            filter,
            // The wait bound lives in userspace; the driver never
            // times the filter out on its own.
            timeout: 0,
            flags: DMX_CHECK_CRC | DMX_IMMEDIATE_START,
        };

        let file = self.file.try_clone()?;
        unsafe { dmx_set_filter(file.as_raw_fd(), &params) }.map_err(errno_to_io)?;
        debug!(
            "armed section filter: pid 0x{:04x}, table 0x{:02x}",
            pid, table_id
        );

        Ok(SectionStream { file })
    }
}

/// One armed section filter on the demux device.
pub struct SectionStream {
    file: File,
}

impl SectionFilter for SectionStream {
    fn wait(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let mut fds = [PollFd::new(self.file.as_fd(), PollFlags::POLLIN)];
        loop {
            match poll(&mut fds, PollTimeout::from(millis)) {
                Ok(0) => return Ok(WaitOutcome::TimedOut),
                Ok(_) => return Ok(WaitOutcome::Ready),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(errno_to_io(e)),
            }
        }
    }

    fn read_section(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        match (&self.file).read(buf) {
            Ok(count) => Ok(ReadOutcome::Section(count)),
            Err(e) if e.raw_os_error() == Some(Errno::EOVERFLOW as i32) => {
                Ok(ReadOutcome::Overrun)
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for SectionStream {
    fn drop(&mut self) {
        // Leaves the shared demux handle idle until the next filter
        // arms it again.
        if let Err(e) = unsafe { dmx_stop(self.file.as_raw_fd()) } {
            debug!("DMX_STOP failed: {}", e);
        }
    }
}
