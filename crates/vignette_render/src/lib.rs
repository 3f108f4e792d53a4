//! Text compositing renderer for carousel slides.
//!
//! Takes raw image bytes (generated or stock) and burns slide text into
//! them inside the platform safe zones, producing the final 1080x1920 PNG
//! for each slide. Rendering is deterministic: the same image bytes and
//! slide text always produce the same output pixels.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod compositor;
mod layout;

pub use compositor::{Compositor, SLIDE_HEIGHT, SLIDE_WIDTH};
