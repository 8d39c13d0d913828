//! Single-use response slot
//!
//! Handlers run in sequence against one slot; the first to fill it wins and
//! later handlers see `is_sent()` and stand down.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// How a response was produced, reported in the access log as `$cache_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 200 with the full resource body
    Fresh,
    /// 304, the client's stored copy is still valid
    Revalidated,
    Api,
    NotFound,
}

impl Outcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Revalidated => "revalidated",
            Self::Api => "api",
            Self::NotFound => "not_found",
        }
    }
}

/// Returned when a handler tries to fill a slot that already holds a response
#[derive(Debug, thiserror::Error)]
#[error("response already sent")]
pub struct AlreadySent;

#[derive(Default)]
pub struct ResponseSlot {
    filled: Option<(Response<Full<Bytes>>, Outcome)>,
}

impl ResponseSlot {
    pub const fn new() -> Self {
        Self { filled: None }
    }

    pub const fn is_sent(&self) -> bool {
        self.filled.is_some()
    }

    /// Fill the slot. The first response is kept; a second call is rejected
    /// and leaves it untouched.
    pub fn send(
        &mut self,
        response: Response<Full<Bytes>>,
        outcome: Outcome,
    ) -> Result<(), AlreadySent> {
        if self.filled.is_some() {
            return Err(AlreadySent);
        }
        self.filled = Some((response, outcome));
        Ok(())
    }

    pub fn into_parts(self) -> Option<(Response<Full<Bytes>>, Outcome)> {
        self.filled
    }
}
