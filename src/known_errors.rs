use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use maud::html;
use thiserror::Error;

use crate::theme::theme_with_head;

/// Failures raised by the user and joke stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already taken")]
    UsernameTaken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("joke {id} not found")]
    JokeNotFound { id: String },

    #[error("no jokes found")]
    NoJokes,

    #[error("joke is owned by another user")]
    NotOwner,

    #[error("login required for {redirect_to}")]
    NotLoggedIn { redirect_to: String },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type JokesResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JokeNotFound { .. } | AppError::NoJokes => StatusCode::NOT_FOUND,
            AppError::NotOwner => StatusCode::UNAUTHORIZED,
            AppError::NotLoggedIn { .. } => StatusCode::SEE_OTHER,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Hash(_) | AppError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::JokeNotFound { id } => format!("Huh? What the heck is \"{}\"?", id),
            AppError::NoJokes => "There are no jokes to display.".to_string(),
            AppError::NotOwner => "Naughty you!".to_string(),
            AppError::BadRequest(message) => message.clone(),
            _ => "Something unexpected went wrong. Sorry about that.".to_string(),
        }
    }
}

pub fn login_url(redirect_to: &str) -> String {
    format!("/login?redirectTo={}", urlencoding::encode(redirect_to))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::NotLoggedIn { redirect_to } = &self {
            return Redirect::to(&login_url(redirect_to)).into_response();
        }

        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "unhandled error");
        } else {
            tracing::debug!(error = %self, %status, "request failed");
        }

        let markup = theme_with_head(
            Some("Oh no..."),
            html! {},
            html! {
                div class="container" {
                    div class="error-container" {
                        (self.message())
                    }
                    a href="/jokes" { "Back to the jokes" }
                }
            },
        );

        (status, markup).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::JokeNotFound { id: "x".into() }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::NotOwner.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::BadRequest("nope".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Store(StoreError::UsernameTaken).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_logged_in_redirects_to_login() {
        let response = AppError::NotLoggedIn {
            redirect_to: "/jokes/new".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/login?redirectTo=%2Fjokes%2Fnew")
        );
    }
}
