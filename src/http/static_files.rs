//! Local static file collaborator.
//!
//! Serves GET requests outside the forwarded prefix from a root directory.
//! Directory requests resolve to `index.html`; missing files are 404.

use std::convert::Infallible;
use std::path::Path;

use axum::body::Body;
use axum::http::{Request, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

#[derive(Debug, Clone)]
pub struct StaticFiles {
    dir: ServeDir,
}

impl StaticFiles {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: ServeDir::new(root).append_index_html_on_directories(true),
        }
    }

    pub async fn serve(&self, request: Request<Body>) -> Response<Body> {
        let result: Result<_, Infallible> = self.dir.clone().oneshot(request).await;
        match result {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        }
    }
}
