//! Programmer Link Protocol
//!
//! This crate implements the byte-stream framing used between a programmer
//! device and the tool driving it. Discrete command/response messages are
//! carved out of (and reassembled into) an arbitrary byte link: a UART, a
//! USB CDC channel, or a pseudo-terminal on a host.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌───────┬─────┬──────────┬───────┬─────────────┬──────────┐
//! │ START │ SEQ │ LEN      │ TOKEN │ PAYLOAD     │ CKSUM    │
//! │ 1B    │ 1B  │ 2B (BE)  │ 1B    │ LEN bytes   │ 1B       │
//! └───────┴─────┴──────────┴───────┴─────────────┴──────────┘
//! ```
//!
//! `SEQ` is chosen by the requester and echoed verbatim in the response.
//! `CKSUM` is the XOR of every preceding frame byte, `START` included, so a
//! receiver that folds the trailing checksum into its running accumulator
//! ends up with zero for an intact frame.
//!
//! The [`Framer`] engine consumes the link one byte at a time, validates
//! frames, hands payloads to a [`Processor`], and drains the response back
//! out under non-blocking write semantics. Malformed input is dropped and
//! the parser resynchronizes on the next start byte; only a checksum
//! mismatch is reported to the peer, with a fixed two-byte diagnostic
//! response.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod framer;
pub mod processor;
pub mod transport;

pub use frame::{
    Frame, FrameError, ANSWER_CKSUM_ERROR, FRAME_HEAD, FRAME_START, FRAME_TAIL, FRAME_TOKEN,
    MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, STATUS_CKSUM_ERROR,
};
pub use framer::Framer;
pub use processor::Processor;
pub use transport::Transport;
