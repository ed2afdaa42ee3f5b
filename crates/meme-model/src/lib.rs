//! MemeMaker Meme Model
//!
//! Defines the core data contracts for memes:
//! - **Geometry:** Offsets, canvas sizes, and layer transforms
//! - **Layers:** Image and text overlays with their transforms
//! - **Meme:** The document tying a base image to ordered layers
//! - **Library:** The persisted meme list and the store behind it
//!
//! All layer geometry is expressed in preview-canvas units. The compositor
//! maps canvas units onto the base image's pixels when flattening.

pub mod bitmap;
pub mod color;
pub mod geometry;
pub mod layer;
pub mod library;
pub mod meme;
pub mod source;

pub use bitmap::*;
pub use color::*;
pub use geometry::*;
pub use layer::*;
pub use library::*;
pub use meme::*;
pub use source::*;
