//! Integration tests for the API server.

use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use api::config::Config;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::{InMemoryStore, Order, OrderQuery, Product, ProductQuery, Repository, User};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration-secret".to_string()),
        // A generous window keeps sibling loads in one batch on slow runners.
        "LOADER_WAIT_MS" => Some("20".to_string()),
        _ => None,
    })
}

fn setup_with_store<R: Repository + Clone + 'static>(store: R) -> axum::Router {
    let state = api::create_state(store, &test_config());
    api::create_app(state, get_metrics_handle())
}

fn setup() -> axum::Router {
    setup_with_store(InMemoryStore::seeded())
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn login(app: &axum::Router, email: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {json}");
    json["accessToken"].as_str().unwrap().to_string()
}

async fn create_product(app: &axum::Router, token: &str, name: &str, price: f64) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/products",
        Some(token),
        Some(json!({
            "name": name,
            "description": "desc",
            "price": price,
            "inStock": 10,
            "category": "test"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    json["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, json) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_order_round_trip() {
    let app = setup();

    let admin = login(&app, "admin@example.com").await;
    let product_id = create_product(&app, &admin, "OrderProduct", 25.0).await;

    let customer = login(&app, "customer@example.com").await;
    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(&customer),
        Some(json!({ "productIds": [product_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "place failed: {order}");
    assert_eq!(order["total"], 25.0);
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["products"][0]["name"], "OrderProduct");
    assert_eq!(order["user"]["email"], "customer@example.com");
    assert!(order["user"].get("password").is_none());

    let order_id = order["id"].as_str().unwrap();
    let uri = format!("/orders/{order_id}");

    let (status, fetched) = send(&app, "GET", &uri, Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], order["id"]);

    // Someone else's order looks exactly like a missing one.
    let (status, _) = send(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_products_are_charged_twice() {
    let app = setup();
    let admin = login(&app, "admin@example.com").await;
    let product_id = create_product(&app, &admin, "Pen", 10.0).await;

    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(&admin),
        Some(json!({ "productIds": [product_id, product_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total"], 20.0);
    assert_eq!(order["products"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_place_order_rejects_bad_input() {
    let app = setup();
    let customer = login(&app, "customer@example.com").await;

    let (status, json) = send(
        &app,
        "POST",
        "/orders",
        Some(&customer),
        Some(json!({ "productIds": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some());

    let (status, _) = send(
        &app,
        "POST",
        "/orders",
        Some(&customer),
        Some(json!({ "productIds": ["ghost"] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_guards() {
    let app = setup();
    let body = json!({ "name": "X", "price": 1.0, "inStock": 1, "category": "c" });

    let (status, _) = send(&app, "POST", "/products", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let customer = login(&app, "customer@example.com").await;
    let (status, _) = send(&app, "POST", "/products", Some(&customer), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_input_gets_json_error() {
    let app = setup();
    let admin = login(&app, "admin@example.com").await;

    let (status, json) = send(
        &app,
        "POST",
        "/products",
        Some(&admin),
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("price"));

    let (status, json) = send(&app, "GET", "/products?limit=ten", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some());

    // Not JSON at all.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from("{ nope"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_invalid_token_is_anonymous() {
    let app = setup();

    let (status, _) = send(&app, "GET", "/me", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Public reads still work with a bad token.
    let (status, _) = send(&app, "GET", "/products", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_me_and_bad_login() {
    let app = setup();
    let token = login(&app, "customer@example.com").await;

    let (status, me) = send(&app, "GET", "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "Customer");

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "customer@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_listing_and_update() {
    let app = setup();
    let admin = login(&app, "admin@example.com").await;
    let id = create_product(&app, &admin, "Lamp", 30.0).await;

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/products/{id}"),
        Some(&admin),
        Some(json!({ "price": 35.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 35.5);
    assert_eq!(updated["name"], "Lamp");

    let (status, list) = send(&app, "GET", "/products?category=tes&limit=5", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, list) = send(&app, "GET", "/products?offset=10", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = send(&app, "GET", "/products/ghost", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Store wrapper counting the batch reads the loaders issue.
#[derive(Clone)]
struct CountingStore {
    inner: InMemoryStore,
    user_batches: Arc<AtomicUsize>,
    product_batches: Arc<AtomicUsize>,
}

impl CountingStore {
    fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            user_batches: Arc::new(AtomicUsize::new(0)),
            product_batches: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn reset(&self) {
        self.user_batches.store(0, Ordering::SeqCst);
        self.product_batches.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl Repository for CountingStore {
    async fn get_user(&self, id: &str) -> store::Result<User> {
        self.inner.get_user(id).await
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> store::Result<Vec<User>> {
        self.user_batches.fetch_add(1, Ordering::SeqCst);
        self.inner.get_users_by_ids(ids).await
    }

    async fn get_user_by_email(&self, email: &str) -> store::Result<User> {
        self.inner.get_user_by_email(email).await
    }

    async fn get_product(&self, id: &str) -> store::Result<Product> {
        self.inner.get_product(id).await
    }

    async fn get_products_by_ids(&self, ids: &[String]) -> store::Result<Vec<Product>> {
        self.product_batches.fetch_add(1, Ordering::SeqCst);
        self.inner.get_products_by_ids(ids).await
    }

    async fn list_products(&self, query: ProductQuery) -> store::Result<Vec<Product>> {
        self.inner.list_products(query).await
    }

    async fn create_product(&self, product: Product) -> store::Result<()> {
        self.inner.create_product(product).await
    }

    async fn update_product(&self, product: Product) -> store::Result<()> {
        self.inner.update_product(product).await
    }

    async fn create_order(&self, order: Order) -> store::Result<()> {
        self.inner.create_order(order).await
    }

    async fn get_order(&self, id: &str) -> store::Result<Order> {
        self.inner.get_order(id).await
    }

    async fn list_orders(&self, query: OrderQuery) -> store::Result<Vec<Order>> {
        self.inner.list_orders(query).await
    }
}

#[tokio::test]
async fn test_order_listing_batches_nested_lookups() {
    let store = CountingStore::new(InMemoryStore::seeded());
    let app = setup_with_store(store.clone());

    let admin = login(&app, "admin@example.com").await;
    let mut product_ids = Vec::new();
    for i in 0..4 {
        product_ids.push(create_product(&app, &admin, &format!("Item {i}"), 1.0).await);
    }

    let customer = login(&app, "customer@example.com").await;
    for pair in product_ids.windows(2) {
        let (status, _) = send(
            &app,
            "POST",
            "/orders",
            Some(&customer),
            Some(json!({ "productIds": pair })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    store.reset();
    let (status, orders) = send(&app, "GET", "/orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 3);
    assert!(orders.iter().all(|o| o["products"].as_array().unwrap().len() == 2));
    assert!(orders
        .iter()
        .all(|o| o["user"]["email"] == "customer@example.com"));

    assert_eq!(store.product_batches.load(Ordering::SeqCst), 1);
    assert_eq!(store.user_batches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_loaders_are_not_shared_between_requests() {
    let store = CountingStore::new(InMemoryStore::seeded());
    let app = setup_with_store(store.clone());

    let admin = login(&app, "admin@example.com").await;
    let product_id = create_product(&app, &admin, "Solo", 2.0).await;
    let (_, order) = send(
        &app,
        "POST",
        "/orders",
        Some(&admin),
        Some(json!({ "productIds": [product_id] })),
    )
    .await;
    let uri = format!("/orders/{}", order["id"].as_str().unwrap());

    store.reset();
    send(&app, "GET", &uri, Some(&admin), None).await;
    send(&app, "GET", &uri, Some(&admin), None).await;

    // A fresh cache per request means each request fetches again.
    assert_eq!(store.product_batches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_catalog_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = store::StoreConfig {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };

    let first = InMemoryStore::open(&config).await;
    let app = setup_with_store(first.clone());
    let admin = login(&app, "admin@example.com").await;
    let id = create_product(&app, &admin, "Durable", 9.0).await;
    assert!(first.persist_now(&config.data_dir).await.is_complete());

    let reopened = InMemoryStore::open(&config).await;
    let app = setup_with_store(reopened);
    let (status, product) = send(&app, "GET", &format!("/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Durable");

    // Seed users were persisted too, so the same credentials still work.
    login(&app, "admin@example.com").await;
}
