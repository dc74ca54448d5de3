//! The chat widget page and its two static assets, compiled into the binary.
//!
//! The page is revalidated on every load so a new build shows up at once;
//! the stylesheet and script are cached for an hour.

use axum::{
    Router,
    extract::Path,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};

const PAGE_CACHE: &str = "no-cache";
const ASSET_CACHE: &str = "public, max-age=3600";

/// An embedded file with the content type it is served as.
struct Asset {
    name: &'static str,
    content_type: &'static str,
    body: &'static str,
}

const PAGE: Asset = Asset {
    name: "index.html",
    content_type: "text/html; charset=utf-8",
    body: include_str!("../../../frontend/index.html"),
};

const ASSETS: [Asset; 2] = [
    Asset {
        name: "style.css",
        content_type: "text/css; charset=utf-8",
        body: include_str!("../../../frontend/style.css"),
    },
    Asset {
        name: "app.js",
        content_type: "application/javascript; charset=utf-8",
        body: include_str!("../../../frontend/app.js"),
    },
];

/// `/` serves the widget page, `/static/{file}` its assets.
pub fn widget_router() -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route("/static/{file}", get(asset_handler))
}

async fn page_handler() -> Response {
    respond(&PAGE, PAGE_CACHE)
}

async fn asset_handler(Path(file): Path<String>) -> Response {
    match ASSETS.iter().find(|asset| asset.name == file) {
        Some(asset) => respond(asset, ASSET_CACHE),
        None => {
            tracing::debug!(file = %file, "Unknown widget asset");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

fn respond(asset: &Asset, cache: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(asset.content_type)),
            (header::CACHE_CONTROL, HeaderValue::from_static(cache)),
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        ],
        asset.body,
    )
        .into_response()
}
