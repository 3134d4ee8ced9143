//! Route definitions for the Block Inventory Platform

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/dashboard", get(handlers::get_dashboard_metrics))
        .nest("/inventory", inventory_routes())
        // Older clients still call the block routes under /blocks
        .nest("/blocks", inventory_routes())
        .nest("/blockTypes", block_type_routes())
        .nest("/suppliers", supplier_routes())
        .route("/users", get(handlers::list_users))
}

/// Block inventory routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_blocks).post(handlers::create_blocks))
        .route("/process", post(handlers::process_blocks))
        .route("/remove", delete(handlers::remove_blocks))
        .route("/suppliers", get(handlers::list_supplier_options))
}

/// Block type reference data routes
fn block_type_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_block_types).post(handlers::create_block_type),
        )
        .route(
            "/:id",
            put(handlers::update_block_type).delete(handlers::delete_block_type),
        )
}

/// Supplier reference data routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:id",
            put(handlers::update_supplier).delete(handlers::delete_supplier),
        )
        .route("/:id/blocks", get(handlers::list_supplier_blocks))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::{
        Config, DatabaseConfig, LoggingConfig, ServerConfig, StorageBackend, StorageConfig,
    };
    use crate::services::test_support::seeded_store;
    use crate::store::MemoryStore;
    use crate::{create_app, AppState};

    fn test_config() -> Config {
        Config {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                min_connections: 1,
                acquire_timeout_secs: 1,
                run_migrations: false,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
            logging: LoggingConfig { json: false },
        }
    }

    fn app(store: Arc<MemoryStore>) -> axum::Router {
        create_app(AppState {
            store,
            config: Arc::new(test_config()),
        })
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_block_type_twice() {
        let app = app(Arc::new(MemoryStore::new()));
        let body = json!({ "blockName": "Granite", "density": 2700 });

        let response = app
            .clone()
            .oneshot(request(Method::POST, "/blockTypes", Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["blockName"], "Granite");
        assert_eq!(created["blockTypeId"], 1);

        let response = app
            .oneshot(request(Method::POST, "/blockTypes", Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_validation_error_names_wire_field() {
        let app = app(Arc::new(MemoryStore::new()));
        let response = app
            .oneshot(request(
                Method::POST,
                "/blockTypes",
                Some(json!({ "blockName": "   ", "density": 2700 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field"], "blockName");
    }

    #[tokio::test]
    async fn test_update_unknown_block_type_not_found() {
        let seeded = seeded_store().await;
        let response = app(seeded.store)
            .oneshot(request(
                Method::PUT,
                "/blockTypes/999",
                Some(json!({ "blockName": "Granite", "density": 2700 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_block_types_shape() {
        let seeded = seeded_store().await;
        let response = app(seeded.store)
            .oneshot(request(Method::GET, "/blockTypes?search=gran", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["totalBlocks"], 3);
        assert_eq!(body[0]["blocksBySupplier"]["Nordic Stone"], 2);
        assert_eq!(body[0]["canDelete"], false);
    }

    #[tokio::test]
    async fn test_non_integer_path_id_is_json_400() {
        let app = app(Arc::new(MemoryStore::new()));
        let response = app
            .oneshot(request(Method::DELETE, "/suppliers/abc", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_blocks_accepts_single_object() {
        let seeded = seeded_store().await;
        let body = json!({
            "blockTypeId": seeded.marble_id,
            "supplierId": seeded.nordic_id,
            "height": 100, "width": 200, "length": 300,
            "quantity": 2
        });

        let response = app(seeded.store)
            .oneshot(request(Method::POST, "/inventory", Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["count"], 2);
    }

    #[tokio::test]
    async fn test_create_blocks_rejects_whole_batch() {
        let seeded = seeded_store().await;
        let app = app(seeded.store);
        let body = json!([
            { "blockTypeId": seeded.marble_id, "supplierId": seeded.nordic_id,
              "height": 100, "width": 200, "length": 300 },
            { "blockTypeId": seeded.marble_id, "supplierId": seeded.nordic_id,
              "height": -1, "width": 200, "length": 300 }
        ]);

        let response = app
            .clone()
            .oneshot(request(Method::POST, "/inventory", Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(request(Method::GET, "/inventory?search=marble", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_blocks_serializes_ids_as_strings() {
        let seeded = seeded_store().await;
        let response = app(seeded.store)
            .oneshot(request(Method::GET, "/blocks", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body[0]["blockId"], "1");
        assert_eq!(body[0]["suppliers"]["supplierName"], "Nordic Stone");
        assert_eq!(body[0]["blockType"]["blockName"], "Granite");
    }

    #[tokio::test]
    async fn test_process_and_remove_blocks() {
        let seeded = seeded_store().await;
        let app = app(seeded.store.clone());

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/inventory/process",
                Some(json!({ "blockIds": ["1", "2"] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(seeded.store.block(2).await.unwrap().processed);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/inventory/process",
                Some(json!({ "blockIds": ["900"] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(request(
                Method::DELETE,
                "/inventory/remove",
                Some(json!({ "blockIds": ["1", "900"] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["count"], 1);
    }

    #[tokio::test]
    async fn test_unparseable_block_id_rejected() {
        let app = app(Arc::new(MemoryStore::new()));
        let response = app
            .oneshot(request(
                Method::POST,
                "/inventory/process",
                Some(json!({ "blockIds": ["not-a-number"] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_supplier_blocks_and_delete_guard() {
        let seeded = seeded_store().await;
        let app = app(seeded.store);

        let response = app
            .clone()
            .oneshot(request(
                Method::GET,
                &format!("/suppliers/{}/blocks", seeded.alpine_id),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);

        let response = app
            .oneshot(request(
                Method::DELETE,
                &format!("/suppliers/{}", seeded.alpine_id),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_survives_failed_section() {
        let seeded = seeded_store().await;
        seeded.store.fail_query("sales_summaries").await;

        let response = app(seeded.store)
            .oneshot(request(Method::GET, "/dashboard", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["salesSummary"], json!([]));
        assert_eq!(body["blocksAddedEver"].as_array().unwrap().len(), 3);
        assert_eq!(body["storageOverview"]["volumeByDay"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_health_reports_store() {
        let response = app(Arc::new(MemoryStore::new()))
            .oneshot(request(Method::GET, "/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["database"], "connected");
    }
}
