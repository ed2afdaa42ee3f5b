//! MemeMaker Render Engine
//!
//! Flattens a meme document into a single image at the base image's pixel
//! size, and runs that work off the caller's thread.
//!
//! # Pipeline Architecture
//!
//! ```text
//! base image ──── decode ──┐
//!                          ├── image layers (rotated, stretched blits)
//! overlay images ──────────┘         │
//!                                    ├── text layers (wrapped, centered tiles)
//! fonts ─────────────────────────────┘         │
//!                                              ▼
//!                                         Encode (PNG)
//!                                              │
//!                                              ▼
//!                              thumbnail / exported file
//! ```

pub mod compositor;
pub mod export;
pub mod fonts;
pub mod raster;
pub mod text;

pub use compositor::*;
pub use export::*;
pub use fonts::FontCatalog;
