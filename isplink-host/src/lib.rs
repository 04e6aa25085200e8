//! Host-side transports for the isplink programmer link
//!
//! On a development host the link engine is exercised against real
//! programmer tools through a pseudo-terminal: [`PtyLink`] allocates a pty,
//! publishes its slave side at a well-known symlink for the tool to open,
//! and hands back a non-blocking [`HostStream`] over the master side for
//! the engine's polling loop. [`HostStream`] can also sit directly on
//! stdin/stdout when the process is wired up by something else (a terminal
//! multiplexer, a socket wrapper).
//!
//! Both satisfy the engine's [`Transport`](isplink_protocol::Transport)
//! contract: reads and writes never block, and a stalled link is a
//! distinguished result rather than an error.

pub mod pty;
pub mod stream;

pub use pty::{PtyError, PtyLink};
pub use stream::HostStream;
