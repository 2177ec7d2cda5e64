//! # Events Module
//!
//! Progress and audit reporting for a single organizing run.
//!
//! ## Design
//! The core emits events through a channel handed to each component when it
//! is built. The CLI subscribes to draw progress; tests subscribe to check
//! what was reported; headless callers pass [`null_sender`].
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Dedup(DedupEvent::RedundantFound { key, paths }) = event {
//!             println!("{}: {} copies", key, paths.len());
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
