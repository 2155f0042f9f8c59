use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;
use trivia_api::db::{self, queries::questions};
use trivia_api::server::app::{router, AppState};

/// The full router over its own freshly migrated in-memory database.
pub struct TestApp {
    pub pool: SqlitePool,
    router: Router,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn spawn() -> Self {
        let pool = db::connect_in_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        TestApp {
            router: router(AppState::new(pool.clone())),
            pool,
        }
    }

    pub async fn raw(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = self.raw(request).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn seed_question(&self, text: &str, category: i64) -> i64 {
        questions::create_question(&self.pool, text, "answer", category, 2)
            .await
            .unwrap()
    }

    pub async fn seed_many(&self, count: usize, category: i64) -> Vec<i64> {
        let mut ids = Vec::with_capacity(count);
        for n in 0..count {
            ids.push(
                self.seed_question(&format!("Question {n} in {category}?"), category)
                    .await,
            );
        }
        ids
    }
}
