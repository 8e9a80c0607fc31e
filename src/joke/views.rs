use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use maud::Markup;
use maud::html;

use super::find_joke;
use super::layout::layout;
use super::random_joke;
use crate::action_data::ActionData;
use crate::action_data::validation_error;
use crate::appstate::AppState;
use crate::auth::session::UserSession;
use crate::known_errors::JokesResult;
use crate::known_errors::login_url;

pub const NEW_JOKE_PATH: &str = "/jokes/new";

/// Values of the new joke form, kept for redisplay.
#[derive(Debug, Clone)]
pub struct JokeFields {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct JokeFieldErrors {
    pub name: Option<String>,
    pub content: Option<String>,
}

impl JokeFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none()
    }
}

pub type NewJokeActionData = ActionData<JokeFields, JokeFieldErrors>;

pub async fn random_joke_page(
    State(state): State<AppState>,
    session: UserSession,
) -> JokesResult<Markup> {
    let joke = random_joke(state.jokes.as_ref(), state.settings.random_strategy).await?;

    let content = html! {
        p { "Here's a random joke:" }
        p { (joke.content) }
        a href=(format!("/jokes/{}", joke.id)) {
            "\"" (joke.name) "\" Permalink"
        }
    };

    layout(&state, &session, None, html! {}, content).await
}

pub async fn joke_detail(
    State(state): State<AppState>,
    session: UserSession,
    Path(id): Path<String>,
) -> JokesResult<Markup> {
    let joke = find_joke(state.jokes.as_ref(), &id).await?;
    let is_owner = session.user_id() == Some(joke.user_id);

    let title = format!("\"{}\" joke", joke.name);
    let head = html! {
        meta name="description" content=(format!("Enjoy the \"{}\" joke and much more", joke.name));
    };

    let content = html! {
        p { "Here's your hilarious joke:" }
        p { (joke.content) }
        a href=(format!("/jokes/{}", joke.id)) { (joke.name) " Permalink" }
        @if is_owner {
            form method="post" action=(format!("/jokes/{}", joke.id)) {
                input type="hidden" name="_method" value="delete";
                button type="submit" class="button" { "Delete" }
            }
        }
    };

    layout(&state, &session, Some(title.as_str()), head, content).await
}

pub async fn new_joke_page(
    State(state): State<AppState>,
    session: UserSession,
) -> JokesResult<Response> {
    if session.user_id().is_none() {
        let content = html! {
            div class="error-container" {
                p { "You must be logged in to create a joke." }
                a href=(login_url(NEW_JOKE_PATH)) { "Login" }
            }
        };
        let page = layout(&state, &session, Some("New joke"), html! {}, content).await?;
        return Ok((StatusCode::UNAUTHORIZED, page).into_response());
    }

    let page = new_joke_view(&state, &session, &ActionData::empty()).await?;
    Ok(page.into_response())
}

pub async fn new_joke_view(
    state: &AppState,
    session: &UserSession,
    data: &NewJokeActionData,
) -> JokesResult<Markup> {
    let name = data.fields.as_ref().map(|f| f.name.as_str());
    let content = data.fields.as_ref().map(|f| f.content.as_str());
    let name_error = data.field_errors.as_ref().and_then(|e| e.name.as_deref());
    let content_error = data
        .field_errors
        .as_ref()
        .and_then(|e| e.content.as_deref());

    let form = html! {
        p { "Add your own hilarious joke" }
        form
            method="post"
            action=(NEW_JOKE_PATH)
            aria-invalid=[data.form_error.as_ref().map(|_| "true")]
            aria-describedby=[data.form_error.as_ref().map(|_| "form-error")] {
            div {
                label {
                    "Name: "
                    input
                        type="text"
                        name="name"
                        value=[name]
                        aria-invalid=[name_error.map(|_| "true")]
                        aria-describedby=[name_error.map(|_| "name-error")];
                }
                (validation_error("name-error", name_error))
            }
            div {
                label {
                    "Content: "
                    textarea
                        name="content"
                        aria-invalid=[content_error.map(|_| "true")]
                        aria-describedby=[content_error.map(|_| "content-error")] {
                        @if let Some(content) = content { (content) }
                    }
                }
                (validation_error("content-error", content_error))
            }
            (validation_error("form-error", data.form_error.as_deref()))
            div {
                button type="submit" class="button" { "Add" }
            }
        }
    };

    layout(state, session, Some("New joke"), html! {}, form).await
}
