//! Pseudo-terminal link publication.
//!
//! Allocates a pseudo-terminal, switches the slave side to raw mode so the
//! line discipline cannot mangle frame bytes, and publishes the slave's
//! device path at a caller-chosen symlink, giving programmer tools a stable
//! name to open. The master side feeds the engine's polling loop as a
//! [`HostStream`].

use std::io;
use std::os::fd::{AsRawFd, OwnedFd};
use std::path::{Path, PathBuf};

use log::debug;
use nix::pty::openpty;
use nix::sys::termios::{self, SetArg};
use thiserror::Error;

use crate::stream::{errno_to_io, HostStream};

/// Failures while setting up the pseudo-terminal link
#[derive(Debug, Error)]
pub enum PtyError {
    /// Pty allocation or configuration failed
    #[error("pseudo-terminal setup failed: {0}")]
    Setup(#[from] io::Error),
    /// The slave symlink could not be created
    #[error("could not link pty at {path}: {source}")]
    Link {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A published pseudo-terminal link
///
/// Dropping the link removes the symlink; the pty itself disappears with
/// the descriptors.
pub struct PtyLink {
    stream: HostStream,
    // Kept open so the master never reads EOF while no tool is attached,
    // as the slave path is handed out for tools to open at will.
    _slave: OwnedFd,
    link: PathBuf,
}

impl PtyLink {
    /// Allocate a pty and publish its slave side at `link`
    ///
    /// An existing file at `link` is replaced.
    pub fn create(link: impl AsRef<Path>) -> Result<Self, PtyError> {
        let link = link.as_ref().to_path_buf();
        let pty = openpty(None, None).map_err(errno_to_io)?;

        let mut tc = termios::tcgetattr(&pty.slave).map_err(errno_to_io)?;
        termios::cfmakeraw(&mut tc);
        termios::tcsetattr(&pty.slave, SetArg::TCSANOW, &tc).map_err(errno_to_io)?;

        let slave_path = std::fs::read_link(format!("/proc/self/fd/{}", pty.slave.as_raw_fd()))
            .map_err(PtyError::Setup)?;

        match std::fs::remove_file(&link) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                return Err(PtyError::Link {
                    path: link,
                    source: e,
                });
            }
            _ => {}
        }
        std::os::unix::fs::symlink(&slave_path, &link).map_err(|source| PtyError::Link {
            path: link.clone(),
            source,
        })?;
        debug!(
            "pty slave {} linked at {}",
            slave_path.display(),
            link.display()
        );

        let stream = HostStream::from_duplex(pty.master)?;
        Ok(Self {
            stream,
            _slave: pty.slave,
            link,
        })
    }

    /// Path of the published symlink
    pub fn path(&self) -> &Path {
        &self.link
    }

    /// The engine-facing stream over the master side
    pub fn stream(&mut self) -> &mut HostStream {
        &mut self.stream
    }
}

impl Drop for PtyLink {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isplink_protocol::{Frame, Framer, MAX_FRAME_SIZE};
    use nix::fcntl::OFlag;
    use std::fs::OpenOptions;
    use std::io::Read;
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    use std::time::{Duration, Instant};

    #[test]
    fn test_pty_link_end_to_end() {
        let link_path = std::env::temp_dir().join(format!("isplink-test-{}", std::process::id()));
        let mut link = PtyLink::create(&link_path).unwrap();
        assert_eq!(link.path(), link_path);

        // Open the published name the way a programmer tool would
        let mut tool = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(&link_path)
            .unwrap();

        let mut framer: Framer<_, MAX_FRAME_SIZE> =
            Framer::new(|_buf: &mut [u8], len: usize| len);

        let request = Frame::new(0x31, b"sync").unwrap().encode_to_vec().unwrap();
        tool.write_all(&request).unwrap();

        // Poll the engine until the echoed response comes back through the pty
        let mut response = vec![0u8; request.len()];
        let mut filled = 0;
        let deadline = Instant::now() + Duration::from_secs(5);
        while filled < response.len() {
            assert!(Instant::now() < deadline, "no response from engine");
            framer.service(link.stream()).unwrap();
            match tool.read(&mut response[filled..]) {
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(e) => panic!("tool read failed: {e}"),
            }
        }
        assert_eq!(&response[..], &request[..]);

        drop(link);
        assert!(!link_path.exists());
    }
}
