//! Read-only JSON introspection of the caching setup
//!
//! - `GET {prefix}/strategy`: the active strategy and how it is applied
//! - `GET {prefix}/strategies`: every strategy, flagging the active one
//!
//! Other paths under the prefix send nothing and fall through to 404.

use hyper::{Method, StatusCode};
use serde::Serialize;

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::handler::slot::{Outcome, ResponseSlot};
use crate::http::{self, FingerprintAlgorithm, ValidationMode};
use crate::logger;
use crate::strategy::{CacheStrategy, Validators};

#[derive(Debug, Serialize)]
struct ActiveStrategy {
    name: &'static str,
    description: &'static str,
    validators: Validators,
    cache_control: Option<String>,
    expires_in: Option<u64>,
    validation: ValidationMode,
    fingerprint: FingerprintAlgorithm,
}

#[derive(Debug, Serialize)]
struct StrategyEntry {
    name: &'static str,
    description: &'static str,
    active: bool,
}

#[derive(Debug, Serialize)]
struct StrategyList {
    active: &'static str,
    strategies: Vec<StrategyEntry>,
}

/// Whether `path` belongs to the API, i.e. equals `prefix` or continues it
/// with a `/`
pub fn is_api_path(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

pub fn handle(ctx: &RequestContext<'_>, state: &AppState, slot: &mut ResponseSlot) {
    if *ctx.method != Method::GET && *ctx.method != Method::HEAD {
        return;
    }

    let prefix = state.config.static_files.api_prefix.trim_end_matches('/');
    let Some(endpoint) = ctx.path.strip_prefix(prefix) else {
        return;
    };

    let response = match endpoint {
        "/strategy" => http::build_json_response(StatusCode::OK, &active_strategy(state)),
        "/strategies" => http::build_json_response(StatusCode::OK, &strategy_list(state.strategy())),
        _ => return,
    };

    if slot.send(response, Outcome::Api).is_err() {
        logger::log_debug(&format!("API response for {} discarded", ctx.path));
    }
}

fn active_strategy(state: &AppState) -> ActiveStrategy {
    let cache = &state.config.cache;
    let strategy = state.strategy();
    let freshness = strategy.freshness(cache);

    ActiveStrategy {
        name: strategy.name(),
        description: strategy.description(),
        validators: strategy.validators(),
        cache_control: freshness.cache_control.map(|cc| cc.to_header_value()),
        expires_in: freshness.expires_in,
        validation: cache.validation,
        fingerprint: cache.fingerprint,
    }
}

fn strategy_list(active: CacheStrategy) -> StrategyList {
    StrategyList {
        active: active.name(),
        strategies: CacheStrategy::ALL
            .into_iter()
            .map(|strategy| StrategyEntry {
                name: strategy.name(),
                description: strategy.description(),
                active: strategy == active,
            })
            .collect(),
    }
}
