//! Frame dispatch engine.
//!
//! [`Framer`] owns one fixed-capacity buffer shared, in place, between the
//! decoded request payload and the encoded response payload, plus a
//! byte-wise parsing state machine and a transmit cursor for draining the
//! response under non-blocking write semantics.
//!
//! Receive and transmit are multiplexed half-duplex over a single
//! transport, regardless of what the physical link supports: while a
//! response is pending, no new input is parsed, so responses always leave
//! in the order their requests completed.
//!
//! The engine is single-context: it holds no locks and must be driven by
//! exactly one polling loop or task. It also carries no clock — a peer that
//! stalls mid-frame leaves the parser waiting until the peer's next start
//! byte, or until a supervisor that owns time calls [`Framer::reset`] on
//! its own deadline.

use crate::frame::{
    checksum, ANSWER_CKSUM_ERROR, FRAME_HEAD, FRAME_START, FRAME_TAIL, FRAME_TOKEN,
    STATUS_CKSUM_ERROR,
};
use crate::processor::Processor;
use crate::transport::Transport;

/// Parser positions within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Scanning for the start byte
    Start,
    /// Got START, waiting for the sequence byte
    WaitSeq,
    /// Waiting for the length high byte
    WaitLenMsb,
    /// Waiting for the length low byte
    WaitLenLsb,
    /// Waiting for the header terminator
    WaitToken,
    /// Reading payload bytes
    Data,
    /// Waiting for the trailing checksum
    WaitCksum,
}

/// Framing and dispatch engine over one logical channel
///
/// `N` is the frame buffer capacity in bytes; the writable payload region
/// is `N` minus the reserved head and tail margins. A deployment typically
/// uses [`MAX_FRAME_SIZE`](crate::frame::MAX_FRAME_SIZE).
///
/// Created once per channel and driven by repeated [`Framer::service`]
/// calls from a single polling context.
pub struct Framer<P, const N: usize> {
    processor: P,
    state: ParseState,
    cksum: u8,
    seq: u8,
    len: usize,
    count: usize,
    buffer: [u8; N],
    tx_len: usize,
    tx_cursor: Option<usize>,
}

impl<P: Processor, const N: usize> Framer<P, N> {
    /// Create a new engine around a processor
    ///
    /// # Panics
    ///
    /// Panics if `N` cannot hold the framing margins plus the two-byte
    /// checksum-error response, the smallest frame the engine ever emits.
    pub fn new(processor: P) -> Self {
        assert!(
            N >= FRAME_HEAD + 2 + FRAME_TAIL,
            "frame buffer too small for the checksum-error response"
        );
        Self {
            processor,
            state: ParseState::Start,
            cksum: 0,
            seq: 0,
            len: 0,
            count: 0,
            buffer: [0; N],
            tx_len: 0,
            tx_cursor: None,
        }
    }

    /// Writable payload capacity of the frame buffer
    pub const fn payload_capacity(&self) -> usize {
        N - FRAME_HEAD - FRAME_TAIL
    }

    /// True while a response frame is still draining to the transport
    pub fn is_transmitting(&self) -> bool {
        self.tx_cursor.is_some()
    }

    /// True when no frame is in progress in either direction
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::Start && self.tx_cursor.is_none()
    }

    /// Access the processor
    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Access the processor mutably
    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }

    /// Drop any in-progress frame and any pending response
    ///
    /// For supervisors that apply their own idle deadline to a wedged peer;
    /// the engine never times out on its own.
    pub fn reset(&mut self) {
        self.state = ParseState::Start;
        self.tx_cursor = None;
    }

    /// Advance the parser by exactly one input byte
    ///
    /// May, as a side effect, invoke the processor and arm a response for
    /// transmission. Callers using [`Framer::service`] never call this
    /// directly; it is public for byte sources that are not a
    /// [`Transport`], such as an interrupt-driven receiver. Such callers
    /// own the half-duplex discipline: no byte may be fed while
    /// [`Framer::is_transmitting`] holds.
    pub fn accept_byte(&mut self, byte: u8) {
        match self.state {
            ParseState::Start => {
                if byte == FRAME_START {
                    self.cksum = byte;
                    self.state = ParseState::WaitSeq;
                }
            }
            ParseState::WaitSeq => {
                self.cksum ^= byte;
                self.seq = byte;
                self.state = ParseState::WaitLenMsb;
            }
            ParseState::WaitLenMsb => {
                self.cksum ^= byte;
                self.len = (byte as usize) << 8;
                self.state = ParseState::WaitLenLsb;
            }
            ParseState::WaitLenLsb => {
                self.cksum ^= byte;
                self.len |= byte as usize;
                self.count = 0;
                // Unrepresentable lengths drop the frame; the peer is
                // expected to time out and retransmit.
                if self.len == 0 || self.len > self.payload_capacity() {
                    self.state = ParseState::Start;
                } else {
                    self.state = ParseState::WaitToken;
                }
            }
            ParseState::WaitToken => {
                if byte == FRAME_TOKEN {
                    self.cksum ^= byte;
                    self.state = ParseState::Data;
                } else {
                    // The offending byte is consumed, even when it equals
                    // the start sentinel.
                    self.state = ParseState::Start;
                }
            }
            ParseState::Data => {
                self.cksum ^= byte;
                self.buffer[FRAME_HEAD + self.count] = byte;
                self.count += 1;
                if self.count == self.len {
                    self.state = ParseState::WaitCksum;
                }
            }
            ParseState::WaitCksum => {
                self.cksum ^= byte;
                self.state = ParseState::Start;
                self.dispatch();
            }
        }
    }

    /// Service the link until it stalls in the active direction
    ///
    /// While no response is pending, reads and parses bytes until the
    /// transport has none. While a response is pending, writes the
    /// remainder of the frame until the transport accepts nothing; once the
    /// frame is fully drained the engine drops back to receive mode and
    /// keeps going within the same call.
    ///
    /// Never blocks and carries no timers; meant to be polled from an
    /// external scheduler or event loop. Protocol-level malformation is
    /// handled internally and never reported here; only transport faults
    /// surface as errors.
    pub fn service<T: Transport>(&mut self, transport: &mut T) -> Result<(), T::Error> {
        loop {
            match self.tx_cursor {
                None => match transport.read_byte()? {
                    Some(byte) => self.accept_byte(byte),
                    None => return Ok(()),
                },
                Some(sent) => {
                    let accepted = transport.write(&self.buffer[sent..self.tx_len])?;
                    if accepted == 0 {
                        return Ok(());
                    }
                    let sent = sent + accepted;
                    self.tx_cursor = if sent == self.tx_len { None } else { Some(sent) };
                }
            }
        }
    }

    /// Route a completed frame: checksum diagnostic or processor dispatch
    fn dispatch(&mut self) {
        if self.cksum != 0 {
            self.buffer[FRAME_HEAD] = ANSWER_CKSUM_ERROR;
            self.buffer[FRAME_HEAD + 1] = STATUS_CKSUM_ERROR;
            self.arm_response(2);
        } else {
            let payload = &mut self.buffer[FRAME_HEAD..N - FRAME_TAIL];
            let response_len = self.processor.accept(payload, self.len);
            if response_len > 0 {
                self.arm_response(response_len);
            }
        }
    }

    /// Frame the `len` payload bytes already in place and start draining
    ///
    /// Prepends the header into the reserved head margin, echoing the
    /// request's sequence byte, recomputes the checksum over the whole
    /// frame and appends it in the tail margin.
    fn arm_response(&mut self, len: usize) {
        self.buffer[0] = FRAME_START;
        self.buffer[1] = self.seq;
        self.buffer[2] = (len >> 8) as u8;
        self.buffer[3] = len as u8;
        self.buffer[4] = FRAME_TOKEN;
        self.buffer[FRAME_HEAD + len] = checksum(&self.buffer[..FRAME_HEAD + len]);
        self.tx_len = FRAME_HEAD + len + FRAME_TAIL;
        self.tx_cursor = Some(0);
    }
}
