//! Shadowcaster Processing Core
//!
//! Everything that happens to a candidate image before it reaches the
//! compositor:
//! - **Loading:** Resolve a raster source to encoded bytes
//! - **Validation:** Gate uploads on content type and near-square dimensions
//! - **Shuffling:** Randomize the presentation order of base portraits
//! - **Session:** Track what the user has picked for the current edit

pub mod loader;
pub mod session;
pub mod shuffle;
pub mod validation;

pub use loader::{LocalLoader, MemoryLoader, RasterLoader};
pub use session::{BaseSelection, EditorSession};
pub use shuffle::{shuffle, PresentationShuffler, RandomSource, SplitMix64};
pub use validation::{Dimensions, ImageValidator};
