//! Frame layout and request encoding.
//!
//! Frame format:
//! - START (1 byte): 0x1B synchronization byte
//! - SEQ (1 byte): sequence number, echoed verbatim in the response
//! - LEN (2 bytes): payload length, big-endian, must be non-zero
//! - TOKEN (1 byte): 0x0E header terminator
//! - PAYLOAD (LEN bytes): command or response body
//! - CKSUM (1 byte): XOR of every preceding byte, START included

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0x1b;

/// Header terminator byte
pub const FRAME_TOKEN: u8 = 0x0e;

/// Answer identifier of the fixed checksum-error response
pub const ANSWER_CKSUM_ERROR: u8 = 0xb0;

/// Status byte of the fixed checksum-error response
pub const STATUS_CKSUM_ERROR: u8 = 0xc1;

/// Bytes reserved ahead of the payload region: START, SEQ, LEN, TOKEN
pub const FRAME_HEAD: usize = 5;

/// Bytes reserved after the payload region: the checksum
pub const FRAME_TAIL: usize = 1;

/// Conventional maximum payload size for programmer links
pub const MAX_PAYLOAD_SIZE: usize = 275;

/// Complete frame size at the conventional payload ceiling
pub const MAX_FRAME_SIZE: usize = FRAME_HEAD + MAX_PAYLOAD_SIZE + FRAME_TAIL;

/// Errors that can occur while building or encoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// A frame must carry at least one payload byte
    EmptyPayload,
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// XOR of all bytes, the protocol's integrity check
pub(crate) fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |sum, &b| sum ^ b)
}

/// A request frame, as built by the peer driving the programmer
///
/// The engine side never constructs one of these; it parses and responds in
/// its own fixed buffer. `Frame` exists for the requesting peer and for
/// exercising an engine end to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Sequence byte, echoed verbatim by the responder
    pub seq: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given sequence byte and payload
    ///
    /// The payload must hold at least one byte; an engine silently drops
    /// zero-length frames, so one could never be answered.
    pub fn new(seq: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.is_empty() {
            return Err(FrameError::EmptyPayload);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            seq,
            payload: payload_vec,
        })
    }

    /// Encoded size of this frame on the wire
    pub fn encoded_len(&self) -> usize {
        FRAME_HEAD + self.payload.len() + FRAME_TAIL
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let len = self.payload.len();
        buffer[0] = FRAME_START;
        buffer[1] = self.seq;
        buffer[2] = (len >> 8) as u8;
        buffer[3] = len as u8;
        buffer[4] = FRAME_TOKEN;
        buffer[FRAME_HEAD..FRAME_HEAD + len].copy_from_slice(&self.payload);
        buffer[FRAME_HEAD + len] = checksum(&buffer[..FRAME_HEAD + len]);

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let frame = Frame::new(0x05, &[0x01, 0x02, 0x03]).unwrap();
        let mut buffer = [0u8; 16];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 9);
        assert_eq!(
            &buffer[..len],
            &[0x1b, 0x05, 0x00, 0x03, 0x0e, 0x01, 0x02, 0x03, 0x13]
        );
    }

    #[test]
    fn test_encode_checksum_folds_to_zero() {
        let frame = Frame::new(0xa7, &[0xde, 0xad, 0xbe, 0xef]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(checksum(&encoded), 0);
    }

    #[test]
    fn test_encode_long_payload_length_split() {
        let payload = [0x42u8; 260];
        let frame = Frame::new(0, &payload).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        // 260 = 0x0104
        assert_eq!(encoded[2], 0x01);
        assert_eq!(encoded[3], 0x04);
        assert_eq!(encoded.len(), FRAME_HEAD + 260 + FRAME_TAIL);
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert_eq!(Frame::new(0, &[]), Err(FrameError::EmptyPayload));
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        let result = Frame::new(0, &large_payload);
        assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_buffer_too_small() {
        let frame = Frame::new(0, &[1, 2, 3]).unwrap();
        let mut buffer = [0u8; 8];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }
}
