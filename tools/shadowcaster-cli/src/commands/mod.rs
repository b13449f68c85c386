pub mod compose;
pub mod config;
pub mod shuffle;
pub mod validate;
