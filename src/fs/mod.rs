//! Local storage layout and cleanup.

pub mod paths;

pub use paths::{remove_if_exists, Storage};
