//! Shadowcaster Catalog Model
//!
//! Defines the data contracts shared by the compositing engine:
//! - **Raster sources:** Immutable references to encoded pixel data
//! - **Catalog:** Read-only base portraits and decorative overlays
//! - **Requests:** The per-render pairing of a base with an optional overlay
//!
//! Catalog records are produced by an external admin workflow; this crate
//! only reads them.

pub mod catalog;
pub mod raster;
pub mod request;

pub use catalog::*;
pub use raster::*;
pub use request::*;
