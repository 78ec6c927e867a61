//! Mock upstream image server on an ephemeral port.

use super::fixtures::create_test_png;
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;

pub struct Upstream {
    pub base_url: String,
}

impl Upstream {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serves `/image.png` (64×64), `/broken` (HTTP 500) and `/not-an-image`.
pub async fn spawn_upstream() -> Upstream {
    let png = create_test_png(64, 64);
    let app = Router::new()
        .route(
            "/image.png",
            get(move || {
                let png = png.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], png) }
            }),
        )
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/not-an-image", get(|| async { "<html>hello</html>" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock upstream");
    let addr = listener.local_addr().expect("Mock upstream has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock upstream failed");
    });

    Upstream {
        base_url: format!("http://{}", addr),
    }
}
