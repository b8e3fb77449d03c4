#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tokio::net::TcpListener;

/// Client driving an ephemeral server over a real socket.
pub struct TestClient {
    client: reqwest::Client,
    addr: SocketAddr,
}

impl TestClient {
    /// Bind the app on an ephemeral port and return a client for it.
    pub async fn bind(app: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind ephemeral socket");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server error");
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        TestClient { client, addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        RequestBuilder {
            builder: self.client.get(format!("http://{}{}", self.addr, url)),
        }
    }
}

pub struct RequestBuilder {
    builder: reqwest::RequestBuilder,
}

impl RequestBuilder {
    pub fn header(mut self, name: reqwest::header::HeaderName, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    pub async fn send(self) -> TestResponse {
        TestResponse {
            response: self.builder.send().await.expect("request failed"),
        }
    }
}

pub struct TestResponse {
    response: reqwest::Response,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn assert_status_ok(&self) {
        assert_eq!(self.response.status(), StatusCode::OK);
    }

    pub fn assert_status_not_found(&self) {
        assert_eq!(self.response.status(), StatusCode::NOT_FOUND);
    }

    pub fn assert_status_unauthorized(&self) {
        assert_eq!(self.response.status(), StatusCode::UNAUTHORIZED);
    }

    pub fn assert_status_bad_gateway(&self) {
        assert_eq!(self.response.status(), StatusCode::BAD_GATEWAY);
    }

    pub fn assert_header_content_type_json(&self) {
        assert_eq!(
            self.response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/json; charset=utf-8")
        );
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    }

    pub async fn text(self) -> String {
        self.response.text().await.expect("could not read body")
    }

    pub async fn json(self) -> serde_json::Value {
        self.response.json().await.expect("could not parse body")
    }
}
