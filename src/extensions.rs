// src/extensions.rs

//! Source of the pattern file extensions the template engines understand.
//!
//! The real registry lives outside this crate; hosts plug it in through
//! [`ExtensionResolver`]. [`StaticExtensions`] covers hosts that just know the
//! list up front (and tests).

use std::fmt::Debug;

/// Supplies the template-engine file extensions, each with a leading dot
/// (e.g. `".hbs"`), in the order they should be watched.
pub trait ExtensionResolver: Send + Sync + Debug {
    fn supported_file_extensions(&self) -> Vec<String>;
}

/// Fixed list of extensions.
#[derive(Debug, Clone, Default)]
pub struct StaticExtensions {
    extensions: Vec<String>,
}

impl StaticExtensions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExtensionResolver for StaticExtensions {
    fn supported_file_extensions(&self) -> Vec<String> {
        self.extensions.clone()
    }
}
