//! wiremock helpers

use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serve `body` with status 200 at `route`
pub async fn serve_bytes(server: &MockServer, route: &str, body: Vec<u8>) {
    serve_with(server, route, ResponseTemplate::new(200).set_body_bytes(body)).await;
}

/// Serve `body` at `route` after `delay`
pub async fn serve_delayed(server: &MockServer, route: &str, body: Vec<u8>, delay: Duration) {
    serve_with(
        server,
        route,
        ResponseTemplate::new(200).set_body_bytes(body).set_delay(delay),
    )
    .await;
}

/// Answer `route` with a bare status code
pub async fn serve_status(server: &MockServer, route: &str, status: u16) {
    serve_with(server, route, ResponseTemplate::new(status)).await;
}

/// Mount an arbitrary response template at `route`
pub async fn serve_with(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Absolute URL for `route` on `server`
pub fn url(server: &MockServer, route: &str) -> String {
    format!("{}{}", server.uri(), route)
}
