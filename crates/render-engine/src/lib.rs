//! Shadowcaster Render Engine
//!
//! Composites a base portrait with an optional decorative overlay into a
//! fixed-size square buffer and exports it as PNG.
//!
//! # Pipeline Architecture
//!
//! ```text
//! base source ────── decode ── fit ── draw (opacity 1.0)
//!                                          │
//! overlay source ─── decode ── fit ────────┴── draw (opacity 0.5)
//!                                                   │
//!                                                   ▼
//!                                            CompositeResult
//!                                                   │
//!                                      ┌────────────┴───────────┐
//!                                      ▼                        ▼
//!                               DirectorySink              MemorySink
//!                                 (download)           (publish handoff)
//! ```
//!
//! Both decodes start together, but the overlay is never drawn before the
//! base has been committed to the buffer.

pub mod canvas;
pub mod compositor;
pub mod decode;
pub mod export;
pub mod surface;

#[cfg(test)]
mod testing;

pub use compositor::{CompositeRenderer, CompositeResult, PendingComposite};
pub use export::*;
pub use surface::{PresentedComposite, RenderSurface, SurfaceOutcome};
