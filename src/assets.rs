//! Embedded static assets for the landing page
//!
//! Stylesheet and widget script are compiled into the binary from `assets/`.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "assets"]
struct Assets;

/// Serve one embedded file by its path under `/assets/`
pub async fn serve(Path(path): Path<String>) -> Response {
    match Assets::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => {
            tracing::debug!("Asset not found: {}", path);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}
