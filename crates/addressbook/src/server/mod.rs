//! HTTP surface for addressbook.
//!
//! An axum router over a single shared [`Storage`]. Storage calls run on the
//! blocking pool; the connection lock is never held across an `.await`.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;

use crate::address::Address;
use crate::error::{Error, Result};
use crate::proximity::AddressSource;
use crate::storage::Storage;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    storage: Arc<Mutex<Storage>>,
}

impl AppState {
    /// Wrap a storage handle for sharing across requests.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Run a storage closure on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Mutex<Storage>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || f(&storage))
            .await
            .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
    }
}

/// Lock the shared storage.
fn lock(storage: &Mutex<Storage>) -> Result<MutexGuard<'_, Storage>> {
    storage
        .lock()
        .map_err(|_| Error::internal("storage lock poisoned"))
}

impl AddressSource for Mutex<Storage> {
    fn fetch_all_addresses(&self) -> Result<Vec<Address>> {
        lock(self)?.list()
    }
}

/// Build the router with all routes and the request trace layer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/addresses",
            get(handlers::list_addresses).post(handlers::create_address),
        )
        .route("/addresses/nearby", get(handlers::nearby_addresses))
        .route(
            "/addresses/:id",
            get(handlers::get_address)
                .put(handlers::update_address)
                .delete(handlers::delete_address),
        )
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, storage: Storage) -> Result<()> {
    let app = build_router(AppState::new(storage));

    let listener = TcpListener::bind(addr).await?;
    info!("Address book API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::address::NewAddress;
    use crate::geo::Coordinate;

    fn test_app() -> (Router, AppState) {
        let state = AppState::new(Storage::open_in_memory().unwrap());
        (build_router(state.clone()), state)
    }

    fn seed(state: &AppState, name: &str, location: Option<(f64, f64)>) -> Address {
        let location = location.map(|(lat, lon)| Coordinate::new(lat, lon).unwrap());
        lock(&state.storage)
            .unwrap()
            .create(&NewAddress::new(name, location).unwrap())
            .unwrap()
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();
        let (status, body) = send(app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_address() {
        let (app, state) = test_app();
        let (status, body) = send(
            app,
            Method::POST,
            "/addresses",
            Some(json!({"name": "Home", "latitude": 51.5, "longitude": -0.12})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Home");
        assert_eq!(body["latitude"], 51.5);
        assert!(body["id"].is_i64());
        assert_eq!(lock(&state.storage).unwrap().count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        for payload in [
            json!({"name": "", "latitude": 0.0, "longitude": 0.0}),
            json!({"name": "X", "latitude": 91.0, "longitude": 0.0}),
            json!({"name": "X", "latitude": 0.0, "longitude": -181.0}),
            json!({"name": "X", "latitude": 0.0}),
        ] {
            let (app, state) = test_app();
            let (status, body) = send(app, Method::POST, "/addresses", Some(payload)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert!(body["detail"].is_string());
            assert_eq!(lock(&state.storage).unwrap().count().unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_get_address() {
        let (app, state) = test_app();
        let created = seed(&state, "Office", Some((40.0, -74.0)));

        let uri = format!("/addresses/{}", created.id);
        let (status, body) = send(app.clone(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Office");

        let (status, body) = send(app, Method::GET, "/addresses/9999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Address not found");
    }

    #[tokio::test]
    async fn test_list_addresses() {
        let (app, state) = test_app();
        seed(&state, "A", Some((1.0, 1.0)));
        seed(&state, "B", None);

        let (status, body) = send(app, Method::GET, "/addresses", None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_update_address() {
        let (app, state) = test_app();
        let created = seed(&state, "Old", Some((10.0, 20.0)));
        let uri = format!("/addresses/{}", created.id);

        let (status, body) = send(
            app.clone(),
            Method::PUT,
            &uri,
            Some(json!({"name": "New"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "New");
        assert_eq!(body["latitude"], 10.0);
        assert_eq!(body["longitude"], 20.0);

        let (status, _) = send(
            app.clone(),
            Method::PUT,
            &uri,
            Some(json!({"latitude": 120.0})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(
            app,
            Method::PUT,
            "/addresses/9999",
            Some(json!({"name": "Ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Address not found");
    }

    #[tokio::test]
    async fn test_update_location_halves() {
        let (app, state) = test_app();
        let unplaced = seed(&state, "Unplaced", None);
        let uri = format!("/addresses/{}", unplaced.id);

        let (status, body) = send(
            app.clone(),
            Method::PUT,
            &uri,
            Some(json!({"latitude": 5.0})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("latitude and longitude"));

        let (status, _) = send(
            app.clone(),
            Method::PUT,
            &uri,
            Some(json!({"longitude": 7.0})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, stored) = send(app.clone(), Method::GET, &uri, None).await;
        assert!(stored["latitude"].is_null());
        assert!(stored["longitude"].is_null());

        let (status, body) = send(
            app,
            Method::PUT,
            &uri,
            Some(json!({"latitude": 5.0, "longitude": 7.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["latitude"], 5.0);
        assert_eq!(body["longitude"], 7.0);
    }

    #[tokio::test]
    async fn test_delete_address() {
        let (app, state) = test_app();
        let created = seed(&state, "Doomed", None);
        let uri = format!("/addresses/{}", created.id);

        let (status, body) = send(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Address deleted successfully");

        let (status, _) = send(app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_nearby_filters_and_keeps_order() {
        let (app, state) = test_app();
        let paris = seed(&state, "Paris", Some((48.8566, 2.3522)));
        seed(&state, "Sydney", Some((-33.8688, 151.2093)));
        seed(&state, "Nowhere", None);
        let london = seed(&state, "London", Some((51.5074, -0.1278)));

        let (status, body) = send(
            app,
            Method::GET,
            "/addresses/nearby?latitude=51.5074&longitude=-0.1278&distance_km=400",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![paris.id, london.id]);
    }

    #[tokio::test]
    async fn test_nearby_empty() {
        let (app, _) = test_app();
        let (status, body) = send(
            app,
            Method::GET,
            "/addresses/nearby?latitude=0&longitude=0&distance_km=100",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_nearby_rejects_bad_query() {
        for uri in [
            "/addresses/nearby?latitude=0&longitude=0&distance_km=-1",
            "/addresses/nearby?latitude=95&longitude=0&distance_km=1",
            "/addresses/nearby?latitude=0&longitude=200&distance_km=1",
            "/addresses/nearby?latitude=0&longitude=0",
            "/addresses/nearby?latitude=abc&longitude=0&distance_km=1",
        ] {
            let (app, _) = test_app();
            let (status, body) = send(app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            assert!(body["detail"].is_string());
        }
    }
}
