pub mod login;
pub mod session;
pub mod signout;
pub mod user;

use axum::Router;
use axum::routing::get;

use crate::appstate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page).post(login::login_action))
        .route(
            "/logout",
            get(signout::signout_get).post(signout::signout_post),
        )
}
