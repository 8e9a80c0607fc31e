use axum::response::Redirect;
use axum::response::Response;

use super::session::UserSession;

pub async fn signout_get() -> Redirect {
    Redirect::to("/")
}

pub async fn signout_post(session: UserSession) -> Response {
    session.logout()
}
