//! # Device Node Transport
//!
//! Writes raster jobs to a printer exposed by the Linux `usblp` kernel
//! driver (`/dev/usb/lpN`). The same backend works for any character device
//! or plain file, which makes it handy for capturing jobs to disk.
//!
//! ## Permissions
//!
//! `/dev/usb/lp*` is usually owned by the `lp` group:
//!
//! ```bash
//! $ sudo usermod -aG lp $USER
//! ```
//!
//! ## Chunked Writes
//!
//! Large jobs are written in 4096-byte chunks so a slow printer can drain
//! its receive buffer between writes.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::Backend;
use crate::error::LabelError;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// # Device Node Backend
///
/// ## Example
///
/// ```no_run
/// use qlabel::transport::{Backend, FileBackend};
/// use qlabel::protocol::commands;
///
/// let mut backend = FileBackend::open("/dev/usb/lp0")?;
/// backend.write_all(&commands::invalidate(200))?;
///
/// # Ok::<(), qlabel::error::LabelError>(())
/// ```
pub struct FileBackend {
    path: PathBuf,
    file: File,
    chunk_size: usize,
}

impl FileBackend {
    /// Open a device node for writing (and reading, when the node allows it).
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist (printer unplugged or usblp not loaded)
    /// - Permission denied (needs root or the `lp` group)
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, LabelError> {
        let path = device.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .or_else(|_| OpenOptions::new().write(true).open(path))
            .map_err(|e| {
                LabelError::Transport(format!("Failed to open {}: {}", path.display(), e))
            })?;

        debug!(device = %path.display(), "opened printer device");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            chunk_size: CHUNK_SIZE,
        })
    }

    /// Set the chunk size for large writes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for FileBackend {
    fn write_all(&mut self, data: &[u8]) -> Result<(), LabelError> {
        for chunk in data.chunks(self.chunk_size) {
            self.file
                .write_all(chunk)
                .map_err(|e| LabelError::Transport(format!("Write failed: {}", e)))?;
        }

        self.file
            .flush()
            .map_err(|e| LabelError::Transport(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, LabelError> {
        if !wait_readable(&self.file, timeout)? {
            return Ok(0);
        }

        match self.file.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(LabelError::Transport(format!("Read failed: {}", e))),
        }
    }
}

/// Wait until the descriptor has data, or the timeout passes.
#[cfg(unix)]
fn wait_readable(file: &File, timeout: Duration) -> Result<bool, LabelError> {
    use std::os::unix::io::AsRawFd;

    let mut pfd = libc::pollfd {
        fd: file.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = timeout.as_millis().min(i32::MAX as u128) as libc::c_int;

    let result = unsafe { libc::poll(&mut pfd, 1, millis) };
    if result < 0 {
        return Err(LabelError::Transport(format!(
            "poll failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(result > 0 && pfd.revents & libc::POLLIN != 0)
}

#[cfg(not(unix))]
fn wait_readable(_file: &File, _timeout: Duration) -> Result<bool, LabelError> {
    Ok(true)
}
