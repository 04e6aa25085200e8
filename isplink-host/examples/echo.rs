//! Echo responder over a pseudo-terminal link.
//!
//! Publishes a pty at the given path (default `./isplink-pty`) and answers
//! every request frame by echoing its payload back, useful for exercising
//! programmer tools against the link without hardware:
//!
//! ```text
//! cargo run --example echo -- /tmp/isplink-pty
//! ```

use std::thread::sleep;
use std::time::Duration;

use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use isplink_host::PtyLink;
use isplink_protocol::{Framer, MAX_FRAME_SIZE};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let link_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "isplink-pty".into());
    let mut link = PtyLink::create(&link_path)?;
    info!("link ready at {link_path}, echoing frames");

    let mut framer: Framer<_, MAX_FRAME_SIZE> = Framer::new(|buf: &mut [u8], len: usize| {
        info!("request of {len} bytes, first 0x{:02x}", buf[0]);
        len
    });

    loop {
        framer.service(link.stream())?;
        sleep(Duration::from_millis(1));
    }
}
