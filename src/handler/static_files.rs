//! Static file serving module
//!
//! Resolves the request to a file, computes the validators the active
//! strategy needs, and answers with 200 or 304.

use chrono::Utc;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

use crate::config::AppState;
use crate::error::ResourceError;
use crate::handler::resolve::resolve_resource_path;
use crate::handler::router::RequestContext;
use crate::handler::slot::{Outcome, ResponseSlot};
use crate::http::{self, mime, LastModified};
use crate::logger;
use crate::strategy::{ConditionalHeaders, CurrentValidators, Revalidation};

/// Serve the requested resource into `slot`
///
/// Any failure leaves the slot empty so the not-found handler answers.
pub async fn handle(ctx: &RequestContext<'_>, state: &AppState, slot: &mut ResponseSlot) {
    match serve(ctx, state).await {
        Ok((response, outcome)) => {
            if slot.send(response, outcome).is_err() {
                logger::log_debug(&format!("Static response for {} discarded", ctx.path));
            }
        }
        Err(e) if e.is_routine() => logger::log_debug(&e.to_string()),
        Err(e) => logger::log_warning(&e.to_string()),
    }
}

/// Build the response for a static resource
///
/// Metadata and content are read fresh on every call; nothing is cached
/// between requests. For `ETag` strategies the content is read once and used
/// for both the fingerprint and the body.
pub async fn serve(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Result<(Response<Full<Bytes>>, Outcome), ResourceError> {
    let static_files = &state.config.static_files;
    let cache = &state.config.cache;
    let strategy = state.strategy();

    let path = resolve_resource_path(&state.static_root, ctx.path, &static_files.index_file)
        .ok_or_else(|| ResourceError::Unresolvable(ctx.path.to_string()))?;

    let metadata = fs::metadata(&path)
        .await
        .map_err(|e| ResourceError::from_io(&path, e))?;
    if !metadata.is_file() {
        return Err(ResourceError::NotAFile { path });
    }

    let validators = strategy.validators();

    let last_modified = if validators.last_modified {
        let modified = metadata
            .modified()
            .map_err(|e| ResourceError::from_io(&path, e))?;
        Some(LastModified::new(modified))
    } else {
        None
    };

    let content = if validators.etag {
        Some(read_resource(&path).await?)
    } else {
        None
    };
    let etag = content
        .as_deref()
        .map(|bytes| http::fingerprint(bytes, cache.fingerprint));

    let current = CurrentValidators {
        last_modified: last_modified.as_ref(),
        etag: etag.as_deref(),
    };
    let conditional = ConditionalHeaders {
        if_none_match: ctx.if_none_match,
        if_modified_since: ctx.if_modified_since,
    };

    if strategy.revalidate(&conditional, &current, cache.validation) == Revalidation::NotModified {
        return Ok((http::build_304_response(), Outcome::Revalidated));
    }

    let body = match content {
        Some(bytes) => bytes,
        None => read_resource(&path).await?,
    };
    let headers = strategy.response_headers(cache, Utc::now(), &current);
    let content_type = mime::content_type_for(&path);

    Ok((
        http::build_fresh_response(body, &content_type, &headers),
        Outcome::Fresh,
    ))
}

async fn read_resource(path: &Path) -> Result<Bytes, ResourceError> {
    fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|e| ResourceError::from_io(path, e))
}
