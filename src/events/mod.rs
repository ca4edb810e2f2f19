//! # Events Module
//!
//! Event-driven progress reporting.
//!
//! ## Design
//! The core library emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress. Scan and execution
//! progress counts arrive in strictly increasing order.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Scan(ScanEvent::Progress(p)) => println!("Scanned {}/{}", p.processed, p.total),
//!             Event::Organize(OrganizeEvent::Progress(p)) => println!("Done {}/{}", p.completed, p.total),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender, &CancellationToken::new())?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
