// src/config/mod.rs

//! Configuration loading (`serde` + `toml`) and validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{AssetDirectories, RawWatchConfig, SourceDirectories, WatchConfig, WatchSection};
