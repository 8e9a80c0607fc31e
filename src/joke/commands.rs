use axum::Form;
use axum::extract::Path;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use serde::Deserialize;

use super::JokeStore;
use super::NewJoke;
use super::find_joke;
use super::views::JokeFieldErrors;
use super::views::JokeFields;
use super::views::NEW_JOKE_PATH;
use super::views::NewJokeActionData;
use super::views::new_joke_view;
use crate::action_data::FORM_NOT_SUBMITTED;
use crate::action_data::bad_request;
use crate::appstate::AppState;
use crate::auth::session::UserSession;
use crate::auth::user::UserId;
use crate::known_errors::AppError;
use crate::known_errors::JokesResult;
use crate::validate::validate_length;

#[derive(Deserialize)]
pub struct NewJokeForm {
    name: String,
    content: String,
}

pub async fn create_joke(
    State(state): State<AppState>,
    session: UserSession,
    form: Result<Form<NewJokeForm>, FormRejection>,
) -> JokesResult<Response> {
    let user_id = session.require_user_id(NEW_JOKE_PATH)?;

    let Ok(Form(form)) = form else {
        let data = NewJokeActionData::form_error(FORM_NOT_SUBMITTED);
        return Ok(bad_request(new_joke_view(&state, &session, &data).await?));
    };

    let field_errors = JokeFieldErrors {
        name: validate_length(&form.name, "The joke's name is too short"),
        content: validate_length(&form.content, "The joke is too short"),
    };

    if !field_errors.is_empty() {
        let data = NewJokeActionData::invalid(
            field_errors,
            JokeFields {
                name: form.name,
                content: form.content,
            },
        );
        return Ok(bad_request(new_joke_view(&state, &session, &data).await?));
    }

    let joke = state
        .jokes
        .create(NewJoke {
            user_id,
            name: form.name,
            content: form.content,
        })
        .await?;

    tracing::info!(joke_id = %joke.id, %user_id, "created joke");

    Ok(Redirect::to(&format!("/jokes/{}", joke.id)).into_response())
}

#[derive(Deserialize)]
pub struct JokeActionForm {
    #[serde(rename = "_method")]
    method: String,
}

/// Form posts to a joke's own url; `_method=delete` is the only action it knows.
pub async fn joke_action(
    State(state): State<AppState>,
    session: UserSession,
    Path(id): Path<String>,
    form: Result<Form<JokeActionForm>, FormRejection>,
) -> JokesResult<Redirect> {
    match form {
        Ok(Form(form)) if form.method == "delete" => {
            let user_id = session.require_user_id(&format!("/jokes/{}", id))?;
            delete_joke(state.jokes.as_ref(), &id, user_id).await?;
            Ok(Redirect::to("/jokes"))
        }
        _ => Err(AppError::BadRequest(FORM_NOT_SUBMITTED.to_string())),
    }
}

async fn delete_joke(store: &dyn JokeStore, id: &str, user_id: UserId) -> JokesResult<()> {
    let joke = find_joke(store, id).await?;

    if joke.user_id != user_id {
        tracing::warn!(joke_id = %joke.id, %user_id, "refusing to delete another user's joke");
        return Err(AppError::NotOwner);
    }

    // a concurrent delete may have won the race
    if !store.delete(&joke.id).await? {
        return Err(AppError::JokeNotFound { id: id.to_string() });
    }

    tracing::info!(joke_id = %joke.id, %user_id, "deleted joke");
    Ok(())
}
