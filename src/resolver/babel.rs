//! Picks the babel packages a project still needs.
//!
//! `babel-loader` 8 requires `@babel/core`; projects still on the legacy
//! `babel-core` 6 line must stay on `babel-loader` 7.

use super::{satisfies, VersionResolver};
use crate::error::Result;
use crate::manifest::Manifest;
use anyhow::Context;

pub const LEGACY_CORE: &str = "babel-core";
pub const MODERN_CORE: &str = "@babel/core";
pub const LOADER: &str = "babel-loader";

pub const DEFAULT_LOADER_RANGE: &str = "^8.0.0-0";
pub const LEGACY_LOADER_RANGE: &str = "^7.0.0";
const LEGACY_CORE_MAJOR: &str = "^6.0.0";

pub struct BabelDependencyPlanner<'r, 'a> {
    resolver: &'r VersionResolver<'a>,
}

impl<'r, 'a> BabelDependencyPlanner<'r, 'a> {
    pub fn new(resolver: &'r VersionResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Returns `name@version` specifiers for the babel packages missing from `manifest`.
    pub fn plan(&self, manifest: &Manifest) -> Result<Vec<String>> {
        let mut additions = Vec::new();
        let mut loader_range = DEFAULT_LOADER_RANGE;

        match manifest.declared_range(LEGACY_CORE) {
            None => {
                if !manifest.has_dependency(MODERN_CORE) {
                    let version = self.resolver.resolve_version(MODERN_CORE, None)?;
                    additions.push(format!("{MODERN_CORE}@{version}"));
                }
            }
            Some(pinned) => {
                let compatible = self
                    .resolver
                    .registry()
                    .latest_version(LEGACY_CORE, Some(pinned))
                    .with_context(|| format!("look up {LEGACY_CORE}@{pinned}"))?;
                if satisfies(&compatible, LEGACY_CORE_MAJOR) {
                    loader_range = LEGACY_LOADER_RANGE;
                }
            }
        }

        if !manifest.has_dependency(LOADER) {
            let version = self.resolver.resolve_version(LOADER, Some(loader_range))?;
            additions.push(format!("{LOADER}@{version}"));
        }

        Ok(additions)
    }
}
