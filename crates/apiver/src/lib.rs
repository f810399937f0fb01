//! # apiver
//!
//! Version-aware routing for HTTP APIs.
//!
//! Each request's API version is read from the `Accept-Version` header, a
//! `version=` token in the `Accept` header, or a per-request override. The
//! request is then dispatched to the handler whose constraint that version
//! satisfies. Deprecated versions are announced through response headers.
//!
//! ## Per-route matching
//!
//! ```rust,ignore
//! use apiver::VersionMatcher;
//! use apiver_core::Router;
//!
//! let cats = VersionMatcher::builder()
//!     .version("1", send_v1)
//!     .version(">= 2, < 3", send_v2)
//!     .build()?;
//!
//! let router = Router::new().route("/api/cats", cats.into_handler());
//! ```
//!
//! ## Groups
//!
//! ```rust,ignore
//! use apiver::{register_groups, DeprecationOptions, VersionGroup};
//!
//! let mut v1 = VersionGroup::new("1");
//! v1.deprecated(DeprecationOptions::default_warning())
//!     .handle("/api/users", users_v1);
//!
//! let mut v2 = VersionGroup::new(">= 2, < 3");
//! v2.handle("/api/users", users_v2);
//!
//! let mut router = Router::new();
//! register_groups(Some(&mut router), None, &[v1, v2])?;
//! ```
//!
//! ## Headers
//!
//! | Header | Direction | Meaning |
//! |--------|-----------|---------|
//! | `Accept-Version` | request | requested version |
//! | `Accept` | request | `...; version=2.1` |
//! | `X-API-Version` | response | version that matched |
//! | `X-API-Warn` | response | deprecation warning |
//! | `X-API-Deprecation-Date` | response | deprecation date |
//! | `X-API-Deprecation-Info` | response | deprecation details |
//!
//! All names are configurable through [`VersioningConfig`].

mod config;
mod deprecation;
mod error;
mod extract;
mod group;
mod layer;
mod matcher;
mod registrar;
mod version;

pub use config::{load_dotenv, VersioningConfig, DEFAULT_DATE_FORMAT, DEFAULT_WARN_MESSAGE, ENV_PREFIX};
pub use deprecation::{deprecated, deprecated_with, DeprecationOptions};
pub use error::{Result, VersionError};
pub use extract::{get_version, with_version, RequestedVersion, VersionExtractor, NOT_FOUND};
pub use group::VersionGroup;
pub use layer::VersionQueryLayer;
pub use matcher::{not_found_handler, FallbackReason, MatcherBuilder, Resolution, VersionMap, VersionMatcher};
pub use registrar::{register_groups, GroupRegistrar};
pub use version::{satisfies, Constraint, Operator, Version};

use apiver_core::Request;

/// Report whether the version requested by `req` satisfies `constraint`
///
/// Like [`satisfies`], any parse failure yields `false`; a request without a
/// version never matches.
pub fn matches(req: &Request, constraint: &str) -> bool {
    satisfies(get_version(req), constraint)
}
