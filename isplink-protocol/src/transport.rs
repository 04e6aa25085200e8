//! Byte link abstraction.
//!
//! Provides the non-blocking transport contract the [`Framer`] engine is
//! driven over. Implementations exist per deployment: a UART on the device,
//! a pseudo-terminal stream on a host.
//!
//! [`Framer`]: crate::framer::Framer

/// Non-blocking byte transport
///
/// Both operations are best-effort and must never suspend: "nothing
/// happened" is a distinguished result, not an error. An `Err` return is
/// reserved for genuine link faults (a closed descriptor, a bus error) and
/// ends the current service pass.
pub trait Transport {
    /// Error type for link faults
    type Error;

    /// Read a single byte from the link
    ///
    /// Returns `Ok(None)` when no byte is currently available.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Write as much of `bytes` as the link will currently accept
    ///
    /// Returns the number of bytes accepted, which may be zero when the
    /// link is saturated. A short write is not an error.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        (**self).read_byte()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(bytes)
    }
}
