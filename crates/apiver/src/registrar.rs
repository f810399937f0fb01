//! Merging groups into per-path matchers
//!
//! Every path used by any group gets one [`VersionMatcher`] holding the
//! handlers of all groups for that path, keyed by group label, plus the
//! fallback. The matchers are optionally bound into a router.

use crate::config::VersioningConfig;
use crate::error::Result;
use crate::extract::NOT_FOUND;
use crate::group::VersionGroup;
use crate::matcher::{VersionMap, VersionMatcher};
use apiver_core::{into_boxed_handler, BoxedHandler, Handler, RouteRegistry};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Register `groups` into `router` (if any) and return the matcher per path
///
/// When `not_found` is `None` the configured default fallback is used.
///
/// # Errors
///
/// Fails if a group label is not a valid constraint. Nothing is registered
/// in that case.
pub fn register_groups<R: RouteRegistry>(
    router: Option<&mut R>,
    not_found: Option<BoxedHandler>,
    groups: &[VersionGroup],
) -> Result<IndexMap<String, VersionMatcher>> {
    let mut registrar = GroupRegistrar::new();
    if let Some(handler) = not_found {
        registrar = registrar.not_found_boxed(handler);
    }
    let matchers = registrar.groups(groups).build()?;

    if let Some(router) = router {
        bind(router, &matchers);
    }
    Ok(matchers)
}

/// Builder over [`register_groups`]
///
/// ```rust,ignore
/// let matchers = GroupRegistrar::new()
///     .not_found(unsupported)
///     .group(&v1)
///     .group(&v2)
///     .register(&mut router)?;
/// ```
pub struct GroupRegistrar<'g> {
    groups: Vec<&'g VersionGroup>,
    not_found: Option<BoxedHandler>,
    config: Arc<VersioningConfig>,
}

impl<'g> GroupRegistrar<'g> {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            not_found: None,
            config: VersioningConfig::shared(),
        }
    }

    /// Configuration for the matchers that get built
    pub fn config(mut self, config: Arc<VersioningConfig>) -> Self {
        self.config = config;
        self
    }

    /// Fallback handler for every path
    pub fn not_found<H, T>(self, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.not_found_boxed(into_boxed_handler(handler))
    }

    pub fn not_found_boxed(mut self, handler: BoxedHandler) -> Self {
        self.not_found = Some(handler);
        self
    }

    /// Add a group; later groups win label collisions
    pub fn group(mut self, group: &'g VersionGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn groups(mut self, groups: &'g [VersionGroup]) -> Self {
        self.groups.extend(groups);
        self
    }

    /// Merge the groups into one matcher per path
    pub fn build(self) -> Result<IndexMap<String, VersionMatcher>> {
        let mut merged: IndexMap<String, VersionMap> = IndexMap::new();

        for group in &self.groups {
            for (path, handler) in group.routes() {
                let versions = merged.entry(path.to_string()).or_default();
                if versions
                    .insert(group.version().to_string(), handler.clone())
                    .is_some()
                {
                    warn!(
                        path = %path,
                        version = %group.version(),
                        "Version registered by more than one group, last group wins"
                    );
                }
            }
        }

        merged
            .into_iter()
            .map(|(path, mut versions)| -> Result<(String, VersionMatcher)> {
                if let Some(not_found) = &self.not_found {
                    versions.insert(NOT_FOUND.to_string(), not_found.clone());
                }
                let matcher = VersionMatcher::with_config(versions, self.config.clone())?;
                Ok((path, matcher))
            })
            .collect()
    }

    /// Build the matchers and bind each one into `router` under its path
    pub fn register<R: RouteRegistry>(self, router: &mut R) -> Result<IndexMap<String, VersionMatcher>> {
        let matchers = self.build()?;
        bind(router, &matchers);
        Ok(matchers)
    }
}

impl Default for GroupRegistrar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn bind<R: RouteRegistry>(router: &mut R, matchers: &IndexMap<String, VersionMatcher>) {
    for (path, matcher) in matchers {
        info!(
            path = %path,
            versions = matcher.constraints().count(),
            "Registering versioned route"
        );
        router.handle(path, matcher.clone().into_handler());
    }
}
