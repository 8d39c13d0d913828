//! Revalidation strategies
//!
//! Each [`CacheStrategy`] pairs freshness headers (`Expires`, `Cache-Control`)
//! with zero, one or two validators (`Last-Modified`, `ETag`). The strategy
//! is chosen once from configuration and applied to every static resource;
//! clients never negotiate it.

use chrono::{DateTime, Utc};
use hyper::header::{HeaderName, CACHE_CONTROL, ETAG, EXPIRES, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::CacheConfig;
use crate::http::cache::{etag_matches, not_modified_since, ValidationMode};
use crate::http::date::{format_http_date, seconds_after, LastModified};

/// Caching strategy applied to static resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStrategy {
    /// `Expires` only
    Expires,
    /// `Cache-Control: no-store`
    NoStore,
    /// `Cache-Control: no-cache` without a validator
    NoCache,
    /// `Cache-Control: max-age=N`
    MaxAge,
    /// HTTP/1.0 `Expires` next to a longer HTTP/1.1 `max-age`
    ExpiresMaxAge,
    /// `Cache-Control: max-age=N, must-revalidate`
    #[default]
    MaxAgeMustRevalidate,
    MaxAgeLastModified,
    NoCacheLastModified,
    MaxAgeEtag,
    NoCacheEtag,
    MaxAgeLastModifiedEtag,
    NoCacheLastModifiedEtag,
}

/// Validators a strategy sends and honours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Validators {
    pub last_modified: bool,
    pub etag: bool,
}

/// `Cache-Control` directives the strategies emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheControl {
    NoStore,
    NoCache,
    MaxAge(u64),
    MaxAgeMustRevalidate(u64),
}

impl CacheControl {
    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::NoStore => "no-store".to_string(),
            Self::NoCache => "no-cache".to_string(),
            Self::MaxAge(max_age) => format!("max-age={max_age}"),
            Self::MaxAgeMustRevalidate(max_age) => format!("max-age={max_age}, must-revalidate"),
        }
    }
}

/// Freshness information sent with every 200
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    pub cache_control: Option<CacheControl>,
    /// Seconds from the response time until `Expires`
    pub expires_in: Option<u64>,
}

/// Conditional request headers as sent by the client
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalHeaders<'a> {
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
}

/// Validators computed from the resource as it is now
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentValidators<'a> {
    pub last_modified: Option<&'a LastModified>,
    pub etag: Option<&'a str>,
}

/// Outcome of comparing request validators with the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revalidation {
    /// Send 200 with the full body
    Changed,
    /// Send 304 with an empty body
    NotModified,
}

/// Unknown strategy name
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown cache strategy '{0}' (run with --list-strategies to see the choices)")]
pub struct UnknownStrategy(pub String);

impl CacheStrategy {
    pub const ALL: [Self; 12] = [
        Self::Expires,
        Self::NoStore,
        Self::NoCache,
        Self::MaxAge,
        Self::ExpiresMaxAge,
        Self::MaxAgeMustRevalidate,
        Self::MaxAgeLastModified,
        Self::NoCacheLastModified,
        Self::MaxAgeEtag,
        Self::NoCacheEtag,
        Self::MaxAgeLastModifiedEtag,
        Self::NoCacheLastModifiedEtag,
    ];

    /// Configuration name, identical to the serde representation
    pub const fn name(self) -> &'static str {
        match self {
            Self::Expires => "expires",
            Self::NoStore => "no-store",
            Self::NoCache => "no-cache",
            Self::MaxAge => "max-age",
            Self::ExpiresMaxAge => "expires-max-age",
            Self::MaxAgeMustRevalidate => "max-age-must-revalidate",
            Self::MaxAgeLastModified => "max-age-last-modified",
            Self::NoCacheLastModified => "no-cache-last-modified",
            Self::MaxAgeEtag => "max-age-etag",
            Self::NoCacheEtag => "no-cache-etag",
            Self::MaxAgeLastModifiedEtag => "max-age-last-modified-etag",
            Self::NoCacheLastModifiedEtag => "no-cache-last-modified-etag",
        }
    }

    /// What a client does with responses under this strategy
    pub const fn description(self) -> &'static str {
        match self {
            Self::Expires => {
                "Cached until Expires passes, then requested again; prefer max-age on HTTP/1.1"
            }
            Self::NoStore => "Never cached, every request reaches the server",
            Self::NoCache => {
                "Cached but revalidated on every use; without a validator the server always resends"
            }
            Self::MaxAge => "Cached for max-age seconds, then requested again",
            Self::ExpiresMaxAge => "HTTP/1.1 clients follow max-age and ignore the shorter Expires",
            Self::MaxAgeMustRevalidate => {
                "Cached for max-age seconds, stale copies must be revalidated before use"
            }
            Self::MaxAgeLastModified => {
                "After max-age expires the client revalidates with If-Modified-Since"
            }
            Self::NoCacheLastModified => "Every use is revalidated with If-Modified-Since",
            Self::MaxAgeEtag => "After max-age expires the client revalidates with If-None-Match",
            Self::NoCacheEtag => "Every use is revalidated with If-None-Match",
            Self::MaxAgeLastModifiedEtag => {
                "After max-age expires the client revalidates; If-None-Match wins over If-Modified-Since"
            }
            Self::NoCacheLastModifiedEtag => {
                "Every use is revalidated; If-None-Match wins over If-Modified-Since"
            }
        }
    }

    pub const fn validators(self) -> Validators {
        let (last_modified, etag) = match self {
            Self::Expires
            | Self::NoStore
            | Self::NoCache
            | Self::MaxAge
            | Self::ExpiresMaxAge
            | Self::MaxAgeMustRevalidate => (false, false),
            Self::MaxAgeLastModified | Self::NoCacheLastModified => (true, false),
            Self::MaxAgeEtag | Self::NoCacheEtag => (false, true),
            Self::MaxAgeLastModifiedEtag | Self::NoCacheLastModifiedEtag => (true, true),
        };
        Validators {
            last_modified,
            etag,
        }
    }

    pub const fn freshness(self, cache: &CacheConfig) -> Freshness {
        let (cache_control, expires_in) = match self {
            Self::Expires => (None, Some(cache.expires_in)),
            Self::NoStore => (Some(CacheControl::NoStore), None),
            Self::NoCache
            | Self::NoCacheLastModified
            | Self::NoCacheEtag
            | Self::NoCacheLastModifiedEtag => (Some(CacheControl::NoCache), None),
            Self::MaxAge
            | Self::MaxAgeLastModified
            | Self::MaxAgeEtag
            | Self::MaxAgeLastModifiedEtag => (Some(CacheControl::MaxAge(cache.max_age)), None),
            Self::ExpiresMaxAge => (
                Some(CacheControl::MaxAge(cache.combined_max_age)),
                Some(cache.combined_expires_in),
            ),
            Self::MaxAgeMustRevalidate => {
                (Some(CacheControl::MaxAgeMustRevalidate(cache.max_age)), None)
            }
        };
        Freshness {
            cache_control,
            expires_in,
        }
    }

    /// Decide between 200 and 304
    ///
    /// `If-None-Match` takes precedence: when the strategy uses an `ETag` and
    /// the header is present, `If-Modified-Since` is not consulted. A
    /// validator the strategy does not use is ignored even if the client
    /// sends it.
    pub fn revalidate(
        self,
        request: &ConditionalHeaders<'_>,
        current: &CurrentValidators<'_>,
        mode: ValidationMode,
    ) -> Revalidation {
        let validators = self.validators();

        if validators.etag {
            if let (Some(if_none_match), Some(etag)) = (request.if_none_match, current.etag) {
                return Revalidation::from_match(etag_matches(if_none_match, etag, mode));
            }
        }

        if validators.last_modified {
            if let (Some(if_modified_since), Some(last_modified)) =
                (request.if_modified_since, current.last_modified)
            {
                return Revalidation::from_match(not_modified_since(
                    if_modified_since,
                    last_modified,
                    mode,
                ));
            }
        }

        Revalidation::Changed
    }

    /// Headers for a 200 response, in the order they are sent
    pub fn response_headers(
        self,
        cache: &CacheConfig,
        now: DateTime<Utc>,
        current: &CurrentValidators<'_>,
    ) -> Vec<(HeaderName, String)> {
        let freshness = self.freshness(cache);
        let mut headers = Vec::with_capacity(4);

        if let Some(expires_in) = freshness.expires_in {
            headers.push((EXPIRES, format_http_date(seconds_after(now, expires_in))));
        }
        if let Some(cache_control) = freshness.cache_control {
            headers.push((CACHE_CONTROL, cache_control.to_header_value()));
        }
        if let Some(last_modified) = current.last_modified {
            headers.push((LAST_MODIFIED, last_modified.header().to_string()));
        }
        if let Some(etag) = current.etag {
            headers.push((ETAG, etag.to_string()));
        }

        headers
    }
}

impl Revalidation {
    const fn from_match(matched: bool) -> Self {
        if matched {
            Self::NotModified
        } else {
            Self::Changed
        }
    }
}

impl fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CacheStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}
