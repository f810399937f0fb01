//! Version groups
//!
//! A [`VersionGroup`] collects the routes of one API version. Groups are
//! merged per path by [`GroupRegistrar`](crate::GroupRegistrar).
//!
//! ```rust,ignore
//! let mut v1 = VersionGroup::new("1");
//! v1.handle("/api/users", list_users_v1)
//!     .handle("/api/users/new", create_user_v1)
//!     .deprecated(DeprecationOptions::default_warning());
//!
//! let mut v2 = VersionGroup::new(">= 2, < 3");
//! v2.handle("/api/users", list_users_v2);
//! ```

use crate::config::VersioningConfig;
use crate::deprecation::{deprecated_with, DeprecationOptions};
use apiver_core::{into_boxed_handler, BoxedHandler, Handler};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Routes registered under a single version label
///
/// Build-time only: fill it, then hand it to the registrar.
pub struct VersionGroup {
    version: String,
    routes: IndexMap<String, BoxedHandler>,
    deprecation: Option<DeprecationOptions>,
    config: Arc<VersioningConfig>,
}

impl VersionGroup {
    /// Create an empty group for `version`, a version or constraint label
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_config(version, VersioningConfig::shared())
    }

    /// Create a group whose deprecation headers follow `config`
    pub fn with_config(version: impl Into<String>, config: Arc<VersioningConfig>) -> Self {
        Self {
            version: version.into(),
            routes: IndexMap::new(),
            deprecation: None,
            config,
        }
    }

    /// The label this group registers its routes under
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Mark every route of this group deprecated
    ///
    /// Routes already registered are wrapped now, routes registered later
    /// are wrapped as they arrive. Options that set nothing are ignored.
    pub fn deprecated(&mut self, options: DeprecationOptions) -> &mut Self {
        if !options.is_active() {
            return self;
        }

        for handler in self.routes.values_mut() {
            *handler = deprecated_with(handler.clone(), options.clone(), &self.config);
        }
        self.deprecation = Some(options);
        self
    }

    /// Register `handler` for `path`
    ///
    /// If `path` already has a handler in this group the call does nothing;
    /// the first registration stays.
    pub fn handle<H, T>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.handle_boxed(path, into_boxed_handler(handler))
    }

    /// [`handle`](Self::handle) for an already boxed handler
    pub fn handle_boxed(&mut self, path: &str, handler: BoxedHandler) -> &mut Self {
        if self.routes.contains_key(path) {
            debug!(path = %path, version = %self.version, "Path already registered in group, ignored");
            return self;
        }

        let handler = match &self.deprecation {
            Some(options) => deprecated_with(handler, options.clone(), &self.config),
            None => handler,
        };
        self.routes.insert(path.to_string(), handler);
        self
    }

    /// Whether `path` has a handler in this group
    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Registered paths in registration order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn routes(&self) -> impl Iterator<Item = (&str, &BoxedHandler)> {
        self.routes.iter().map(|(path, handler)| (path.as_str(), handler))
    }
}

impl fmt::Debug for VersionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionGroup")
            .field("version", &self.version)
            .field("paths", &self.routes.keys().collect::<Vec<_>>())
            .field("deprecation", &self.deprecation)
            .finish()
    }
}
