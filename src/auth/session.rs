use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use std::convert::Infallible;
use std::str::FromStr;

use super::user::User;
use super::user::UserId;
use crate::appstate::AppState;
use crate::known_errors::AppError;

pub const SESSION_COOKIE: &str = "jokes_session";

const SESSION_DAYS: i64 = 30;

/// The signed session cookie of the current request, resolved to a user.
///
/// A cookie that fails verification, does not hold a user id, or names a user
/// that no longer exists is treated as anonymous.
pub struct UserSession {
    jar: SignedCookieJar,
    user: Option<User>,
    secure: bool,
}

impl FromRequestParts<AppState> for UserSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_request_parts(parts, state).await?;

        let user_id = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| UserId::from_str(cookie.value()).ok());

        let user = match user_id {
            Some(id) => state.users.find_by_id(&id).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, user_id = %id, "failed to resolve session user");
                None
            }),
            None => None,
        };

        Ok(Self {
            jar,
            user,
            secure: state.settings.secure_cookies,
        })
    }
}

impl UserSession {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Fails with [`AppError::NotLoggedIn`], which redirects to the login page
    /// and back to `redirect_to` afterwards.
    pub fn require_user_id(&self, redirect_to: &str) -> Result<UserId, AppError> {
        self.user_id().ok_or_else(|| AppError::NotLoggedIn {
            redirect_to: redirect_to.to_string(),
        })
    }

    pub fn create(self, user_id: UserId, redirect_to: &str) -> Response {
        let cookie = Cookie::build((SESSION_COOKIE, user_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::days(SESSION_DAYS));

        tracing::debug!(%user_id, "session created");
        (self.jar.add(cookie), Redirect::to(redirect_to)).into_response()
    }

    pub fn logout(self) -> Response {
        if let Some(user_id) = self.user_id() {
            tracing::debug!(%user_id, "session destroyed");
        }
        let jar = self.jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
        (jar, Redirect::to("/")).into_response()
    }
}
