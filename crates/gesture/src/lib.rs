//! # MemeMaker Gesture
//!
//! Turns drag, rotate, and pinch gesture streams into layer transform
//! updates, and describes what the live preview should draw.
//!
//! ## Lifecycle
//!
//! ```text
//! Began(channel) -> *Changed ... -> Ended(channel)
//!        |                              |
//!   snapshot committed            commit live value
//!        \--------- Cancelled: restore snapshot ---------/
//! ```

pub mod mapper;
pub mod preview;

pub use mapper::*;
pub use preview::*;
