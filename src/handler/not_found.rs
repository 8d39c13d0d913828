//! Not-found fallback

use hyper::body::Bytes;
use tokio::fs;

use crate::config::AppState;
use crate::handler::slot::{Outcome, ResponseSlot};
use crate::http::{self, mime};
use crate::logger;

/// Answer 404 with the fallback document unless a response was already sent
///
/// If the document itself cannot be read a plain-text body is used.
pub async fn handle(state: &AppState, slot: &mut ResponseSlot) {
    if slot.is_sent() {
        return;
    }

    let path = state
        .static_root
        .join(&state.config.static_files.not_found_file);

    let response = match fs::read(&path).await {
        Ok(body) => http::build_not_found_document(Bytes::from(body), &mime::content_type_for(&path)),
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to read not-found document '{}': {e}",
                path.display()
            ));
            http::build_404_response()
        }
    };

    if slot.send(response, Outcome::NotFound).is_err() {
        logger::log_debug("Not-found response discarded");
    }
}
