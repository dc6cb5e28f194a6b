use ambulance_logic::{Coordinate, DispatchClient, DispatchResult, prelude::*};
use log::{debug, error};
use reqwest::header::CONTENT_TYPE;

use crate::{
    api::{self, SearchRequest},
    server,
};

/// [DispatchClient] that talks to the dispatch service over HTTP
pub struct HttpDispatchClient {
    client: reqwest::Client,
    url: String,
}

impl HttpDispatchClient {
    /// Client for the compile time configured dispatch service
    pub fn new() -> Result<Self> {
        Self::with_url(server::search_url())
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn search(&self, origin: Coordinate, timestamp: &str) -> Result<DispatchResult> {
        let body = serde_json::to_vec(&SearchRequest::new(origin, timestamp))
            .context("Failed to encode request")?;

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .context("Could not send request")?;

        let status = resp.status();
        if !status.is_success() {
            return Ok(DispatchResult::TransportError {
                message: format!("Error HTTP: {}", status.as_u16()),
            });
        }

        let bytes = resp.bytes().await.context("Could not read response")?;
        debug!("Dispatch response: {}", String::from_utf8_lossy(&bytes));

        api::decode_response(&bytes)
    }
}

impl DispatchClient for HttpDispatchClient {
    async fn find_ambulance(&self, origin: Coordinate, timestamp: &str) -> DispatchResult {
        match self.search(origin, timestamp).await {
            Ok(result) => result,
            Err(why) => {
                error!("Dispatch request to {} failed: {why:?}", self.url);
                DispatchResult::TransportError {
                    message: format!("Error de conexión: {why:#}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use tokio::{net::TcpListener, test};

    use super::*;

    const TIMESTAMP: &str = "2026-10-15T12:00:00.000Z";

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });
        format!("http://{addr}/buscar-ambulancia")
    }

    fn mk_client(url: String) -> HttpDispatchClient {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("Failed to build client");
        HttpDispatchClient::with_client(client, url)
    }

    fn respond_with(status: StatusCode, body: Value) -> Router {
        Router::new().route(
            "/buscar-ambulancia",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        )
    }

    fn origin() -> Coordinate {
        Coordinate::new(19.4, -99.1).unwrap()
    }

    #[test]
    async fn test_found() {
        let seen = Arc::new(Mutex::new(None::<Value>));
        let router = Router::new().route(
            "/buscar-ambulancia",
            post({
                let seen = seen.clone();
                move |Json(req): Json<Value>| {
                    *seen.lock().unwrap() = Some(req);
                    async move {
                        Json(json!({
                            "ok": true,
                            "ambulancia": {"id": "A1", "lat": 19.41, "lon": -99.11, "tiempo_estimado": 7},
                            "distancia": 1.2,
                        }))
                    }
                }
            }),
        );
        let client = mk_client(serve(router).await);

        let res = client.find_ambulance(origin(), TIMESTAMP).await;

        match res {
            DispatchResult::Found {
                ambulance,
                distance_km,
            } => {
                assert_eq!(ambulance.id, "A1");
                assert_eq!(distance_km, Some(1.2));
            }
            other => panic!("Expected Found, got {other:?}"),
        }

        let req = seen.lock().unwrap().take().expect("Server saw no request");
        assert_eq!(
            req,
            json!({"lat": 19.4, "lon": -99.1, "timestamp": TIMESTAMP}),
            "Request body doesn't match"
        );
    }

    #[test]
    async fn test_not_found() {
        let router = respond_with(
            StatusCode::OK,
            json!({"ok": false, "mensaje": "sin unidades"}),
        );
        let client = mk_client(serve(router).await);

        let res = client.find_ambulance(origin(), TIMESTAMP).await;

        assert_eq!(
            res,
            DispatchResult::NotFound {
                message: "sin unidades".to_string()
            }
        );
    }

    #[test]
    async fn test_http_error() {
        let router = respond_with(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"ok": false}),
        );
        let client = mk_client(serve(router).await);

        let res = client.find_ambulance(origin(), TIMESTAMP).await;

        assert_eq!(
            res,
            DispatchResult::TransportError {
                message: "Error HTTP: 500".to_string()
            }
        );
    }

    #[test]
    async fn test_malformed_body() {
        let router = Router::new().route("/buscar-ambulancia", post(|| async { "not json" }));
        let client = mk_client(serve(router).await);

        let res = client.find_ambulance(origin(), TIMESTAMP).await;

        match res {
            DispatchResult::TransportError { message } => {
                assert!(
                    message.contains("Failed to parse response"),
                    "Diagnostic missing: {message}"
                );
            }
            other => panic!("Expected TransportError, got {other:?}"),
        }
    }

    #[test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");
        drop(listener);
        let client = mk_client(format!("http://{addr}/buscar-ambulancia"));

        let res = client.find_ambulance(origin(), TIMESTAMP).await;

        match res {
            DispatchResult::TransportError { message } => {
                assert!(
                    message.starts_with("Error de conexión: Could not send request"),
                    "Unexpected message: {message}"
                );
            }
            other => panic!("Expected TransportError, got {other:?}"),
        }
    }
}
