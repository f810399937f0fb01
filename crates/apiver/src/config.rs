//! Versioning configuration
//!
//! Header names, the deprecation date format and the default not-found
//! response are plain values carried by a [`VersioningConfig`]. Every
//! constructor in this crate has a form that uses the shared default and a
//! `with_config` form that takes an explicit `Arc<VersioningConfig>`.
//!
//! # Example
//!
//! ```rust,ignore
//! use apiver::VersioningConfig;
//!
//! // Reads APIVER_* variables after loading a .env file
//! let config = VersioningConfig::from_env()?;
//! let matcher = VersionMatcher::with_config(versions, Arc::new(config))?;
//! ```

use crate::error::Result;
use chrono::format::{Item, StrftimeItems};
use http::{header, HeaderName, StatusCode};
use serde::{de, Deserialize, Deserializer};
use std::sync::{Arc, OnceLock};

/// Prefix of the environment variables read by [`VersioningConfig::from_env`]
pub const ENV_PREFIX: &str = "APIVER_";

/// Warning sent by deprecated handlers when no message is configured
pub const DEFAULT_WARN_MESSAGE: &str = "WARNING! You are using a deprecated version of this API.";

/// `Mon, 02 Jan 2006 15:04:05 GMT`
pub const DEFAULT_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Versioning settings
///
/// Field names map to `APIVER_`-prefixed upper-case environment variables,
/// e.g. `APIVER_RESPONSE_VERSION_HEADER`. Missing variables keep their
/// default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Dedicated request header carrying the version (`Accept-Version`)
    #[serde(deserialize_with = "header_name")]
    pub accept_version_header: HeaderName,

    /// Content-negotiation header scanned for a version token (`Accept`)
    #[serde(deserialize_with = "header_name")]
    pub accept_header: HeaderName,

    /// Token searched for inside the content-negotiation header (`version`)
    pub accept_version_token: String,

    /// Response header advertising the resolved version (`X-API-Version`)
    #[serde(deserialize_with = "header_name")]
    pub response_version_header: HeaderName,

    /// Deprecation warning header (`X-API-Warn`)
    #[serde(deserialize_with = "header_name")]
    pub warn_header: HeaderName,

    /// Deprecation date header (`X-API-Deprecation-Date`)
    #[serde(deserialize_with = "header_name")]
    pub deprecation_date_header: HeaderName,

    /// Deprecation info header (`X-API-Deprecation-Info`)
    #[serde(deserialize_with = "header_name")]
    pub deprecation_info_header: HeaderName,

    /// `chrono` strftime pattern for the deprecation date header
    #[serde(deserialize_with = "date_format")]
    pub date_format: String,

    /// Warning used when deprecation options carry no message
    pub default_warn_message: String,

    /// Status of the default not-found response
    #[serde(deserialize_with = "status_code")]
    pub not_found_status: StatusCode,

    /// Body of the default not-found response
    pub not_found_body: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            accept_version_header: HeaderName::from_static("accept-version"),
            accept_header: header::ACCEPT,
            accept_version_token: "version".to_string(),
            response_version_header: HeaderName::from_static("x-api-version"),
            warn_header: HeaderName::from_static("x-api-warn"),
            deprecation_date_header: HeaderName::from_static("x-api-deprecation-date"),
            deprecation_info_header: HeaderName::from_static("x-api-deprecation-info"),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            default_warn_message: DEFAULT_WARN_MESSAGE.to_string(),
            not_found_status: StatusCode::NOT_IMPLEMENTED,
            not_found_body: "version not found".to_string(),
        }
    }
}

impl VersioningConfig {
    /// Load configuration from `APIVER_*` environment variables
    ///
    /// A `.env` file in the working directory is loaded first, if present.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Ok(envy::prefixed(ENV_PREFIX).from_env::<Self>()?)
    }

    /// The process-wide default configuration
    ///
    /// Built once and shared; it is never mutated.
    pub fn shared() -> Arc<Self> {
        static DEFAULT: OnceLock<Arc<VersioningConfig>> = OnceLock::new();
        DEFAULT.get_or_init(|| Arc::new(Self::default())).clone()
    }
}

/// Load environment variables from a `.env` file, ignoring a missing file
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

fn header_name<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<HeaderName, D::Error> {
    let raw = String::deserialize(deserializer)?;
    HeaderName::try_from(raw.as_str())
        .map_err(|_| de::Error::custom(format!("invalid header name `{}`", raw)))
}

fn date_format<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if StrftimeItems::new(&raw).any(|item| matches!(item, Item::Error)) {
        return Err(de::Error::custom(format!("invalid date format `{}`", raw)));
    }
    Ok(raw)
}

fn status_code<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<StatusCode, D::Error> {
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(|_| de::Error::custom(format!("invalid status code {}", code)))
}
