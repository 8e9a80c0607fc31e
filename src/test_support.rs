use axum::body::Body;
use axum::http::HeaderMap;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use tower::ServiceExt;

use crate::appstate::AppState;
use crate::appstate::Settings;
use crate::auth::session::SESSION_COOKIE;
use crate::auth::user::MemoryUserStore;
use crate::auth::user::UserId;
use crate::joke::JokeId;
use crate::joke::MemoryJokeStore;
use crate::joke::RandomStrategy;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The `name=value` pair of the session cookie, ready for a `Cookie` header.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| {
                pair.strip_prefix(SESSION_COOKIE)
                    .is_some_and(|rest| rest.len() > 1 && rest.starts_with('='))
            })
            .map(str::to_string)
    }
}

/// The full router over in-memory stores.
pub struct TestApp {
    state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_strategy(RandomStrategy::Offset)
    }

    pub fn with_strategy(random_strategy: RandomStrategy) -> Self {
        let settings = Settings {
            secure_cookies: false,
            random_strategy,
            bcrypt_cost: 4,
        };
        Self {
            state: AppState::in_memory(Key::generate(), settings),
        }
    }

    /// Same signing key, empty stores.
    pub fn with_fresh_stores(&self) -> Self {
        Self {
            state: AppState {
                users: Arc::new(MemoryUserStore::new()),
                jokes: Arc::new(MemoryJokeStore::new()),
                ..self.state.clone()
            },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = crate::app(self.state.clone())
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::get(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).expect("valid request"))
            .await
    }

    pub async fn post(&self, uri: &str, form: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(form.to_string())).expect("valid request"))
            .await
    }

    /// Registers through the login form and returns the session cookie.
    pub async fn register(&self, username: &str, password: &str) -> String {
        let response = self
            .post(
                "/login",
                &format!(
                    "loginType=register&username={}&password={}",
                    username, password
                ),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        response
            .session_cookie()
            .expect("registration should set a session cookie")
    }

    pub async fn create_joke(&self, cookie: &str, name: &str, content: &str) -> JokeId {
        let response = self
            .post(
                "/jokes/new",
                &format!(
                    "name={}&content={}",
                    urlencoding::encode(name),
                    urlencoding::encode(content)
                ),
                Some(cookie),
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        response
            .location()
            .and_then(|l| l.strip_prefix("/jokes/"))
            .and_then(|id| id.parse().ok())
            .expect("create should redirect to the new joke")
    }

    pub async fn user_id(&self, username: &str) -> UserId {
        self.state
            .users
            .find_by_username(username)
            .await
            .expect("lookup should succeed")
            .expect("user should exist")
            .id
    }

    pub async fn user_count(&self) -> u64 {
        self.state.users.count().await.expect("count should succeed")
    }

    pub async fn joke_count(&self) -> u64 {
        self.state.jokes.count().await.expect("count should succeed")
    }
}
