//! MemeMaker Editor
//!
//! The editing session a UI drives: pick a background, add overlays, feed
//! gestures, draw frames, and save through the render service.

pub mod session;

pub use session::EditorSession;
