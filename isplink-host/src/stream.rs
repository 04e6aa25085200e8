//! Non-blocking byte stream over file descriptors.
//!
//! The engine's polling loop needs reads and writes that stall instead of
//! suspending; `WouldBlock` from the descriptor maps to the transport
//! contract's "nothing happened" results.

use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd, OwnedFd};

use nix::fcntl::{fcntl, FcntlArg, OFlag};

use isplink_protocol::Transport;

/// Byte stream over a pair of file descriptors
///
/// Input is non-blocking; output stalls are reported as zero-byte writes
/// and absorbed by the engine's transmit cursor.
pub struct HostStream {
    input: File,
    output: File,
}

impl HostStream {
    /// Stream over this process's stdin/stdout
    ///
    /// Useful when the process is wired to the link by its parent (a
    /// terminal multiplexer, a socket wrapper). Input is switched to
    /// non-blocking; when stdin and stdout share one terminal, the flag
    /// applies to both, which the write path tolerates.
    pub fn stdio() -> io::Result<Self> {
        let input = io::stdin().as_fd().try_clone_to_owned()?;
        let output = io::stdout().as_fd().try_clone_to_owned()?;
        set_nonblocking(&input)?;
        Ok(Self {
            input: File::from(input),
            output: File::from(output),
        })
    }

    /// Stream over one duplex descriptor, e.g. a pty master
    pub(crate) fn from_duplex(fd: OwnedFd) -> io::Result<Self> {
        set_nonblocking(&fd)?;
        let input = File::from(fd);
        let output = input.try_clone()?;
        Ok(Self { input, output })
    }
}

impl Transport for HostStream {
    type Error = io::Error;

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.input.read(&mut byte) {
            // End of file: the other side of the link is gone
            Ok(0) => Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if stalled(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        match self.output.write(bytes) {
            Ok(n) => Ok(n),
            Err(e) if stalled(&e) => Ok(0),
            Err(e) => Err(e),
        }
    }
}

fn stalled(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

pub(crate) fn set_nonblocking(fd: &impl AsFd) -> io::Result<()> {
    let raw = fd.as_fd().as_raw_fd();
    let flags = fcntl(raw, FcntlArg::F_GETFL).map_err(errno_to_io)?;
    let flags = OFlag::from_bits_retain(flags) | OFlag::O_NONBLOCK;
    fcntl(raw, FcntlArg::F_SETFL(flags)).map_err(errno_to_io)?;
    Ok(())
}

pub(crate) fn errno_to_io(err: nix::errno::Errno) -> io::Error {
    io::Error::from_raw_os_error(err as i32)
}
