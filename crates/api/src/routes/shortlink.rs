//! Short-link redirects printed on table tents and key cards.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::state::AppState;

/// GET /q/:code - 307 to the target, or a page that bounces to the
/// not-found route after a short delay.
pub async fn follow_handler(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    match state.shortlinks.follow(&code) {
        Some(target) => Redirect::temporary(target.as_str()).into_response(),
        None => {
            debug!(code = %code, "Unknown short link");
            (StatusCode::NOT_FOUND, Html(not_found_page(&state))).into_response()
        }
    }
}

fn not_found_page(state: &AppState) -> String {
    let delay = state.settings.not_found_delay_secs;
    let path = html_escape(&state.settings.not_found_path);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"{delay};url={path}\">\n\
         <title>Link not found</title>\n</head>\n<body>\n\
         <p>This link is not valid. Redirecting in {delay} seconds.</p>\n\
         </body>\n</html>\n"
    )
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
