use std::net::SocketAddr;

use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use webtask::config::Config;

pub const PASSWORD: &str = "password123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

/// A signed-up user and the session cookie value that authenticates them.
#[allow(dead_code)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub session: String,
}

#[allow(dead_code)]
impl TestUser {
    pub fn uuid(&self) -> Uuid {
        Uuid::parse_str(&self.id).unwrap()
    }
}

/// The `webtask_session` value set by a response, if any.
pub fn session_from(resp: &Response) -> Option<String> {
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix("webtask_session="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .find(|v| !v.is_empty())
}

pub fn cookie(session: &str) -> String {
    format!("webtask_session={session}")
}

#[allow(dead_code)]
impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Sign up and return (body, status, session cookie value).
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> (Value, StatusCode, Option<String>) {
        let resp = self
            .client
            .post(self.url("/signup"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await
            .expect("signup request failed");
        let status = resp.status();
        let session = session_from(&resp);
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status, session)
    }

    /// Login and return (body, status, session cookie value).
    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode, Option<String>) {
        let resp = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let session = session_from(&resp);
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status, session)
    }

    /// Sign up `name` with `<name>@test.com`.
    pub async fn user(&self, name: &str) -> TestUser {
        let email = format!("{name}@test.com");
        let (body, status, session) = self.signup(name, &email, PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "signup failed: {body}");
        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            username: name.to_string(),
            email,
            session: session.expect("signup set no session cookie"),
        }
    }

    pub async fn create_project(&self, user: &TestUser, name: &str) -> Value {
        let (body, status) = self
            .post(
                "/projects/new",
                &user.session,
                &json!({ "name": name, "description": "" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create project failed: {body}");
        body
    }

    pub async fn create_task(
        &self,
        user: &TestUser,
        project_id: &str,
        title: &str,
        assigned_to: Option<&str>,
    ) -> Value {
        let (body, status) = self
            .post(
                &format!("/projects/{project_id}/tasks/new"),
                &user.session,
                &json!({ "title": title, "assigned_to": assigned_to }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create task failed: {body}");
        body
    }

    /// Authenticated GET.
    pub async fn get(&self, path: &str, session: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .header("cookie", cookie(session))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Authenticated GET that is expected to redirect; returns (status, location).
    pub async fn get_redirect(&self, path: &str, session: &str) -> (StatusCode, Option<String>) {
        let resp = self
            .client
            .get(self.url(path))
            .header("cookie", cookie(session))
            .send()
            .await
            .expect("get request failed");
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        (resp.status(), location)
    }

    /// Authenticated POST with a JSON body.
    pub async fn post(&self, path: &str, session: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .header("cookie", cookie(session))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config(database_url: String) -> Config {
    Config {
        database_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        log_level: "warn".to_string(),
        session_ttl_hours: 1,
        secure_cookies: false,
        max_body_size: 65_536,
        login_max_failures: 5,
        login_window_secs: 900,
        seed_user: None,
    }
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let db_name = format!("webtask_test_{}", Uuid::new_v4().simple());

    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let app = webtask::build_app(pool.clone(), test_config(test_url));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
