// src/watch/mod.rs

//! File watching and change classification.
//!
//! This module is responsible for:
//! - Planning which directories/globs to watch (`patterns`).
//! - Keeping one live watch per target (`registry`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) with an ignore
//!   policy and write-stability debouncing (`watcher`, `event_handler`,
//!   `debounce`).
//! - Turning settled changes into bus events (`emitter`).
//!
//! It does **not** know what the rebuild pipeline does with those events.

pub mod debounce;
pub mod emitter;
pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod registry;
pub mod source;
pub mod watcher;

pub use emitter::{classify, spawn_emitter};
pub use patterns::{BASE_EXTENSIONS, TargetMatcher, WatchPlan, WatchTarget, plan_watch_targets};
pub use registry::WatchRegistry;
pub use source::{ActiveWatch, WatchHandle, WatchOptions, WatchSource};
pub use watcher::NotifyWatchSource;
