use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use maud::Markup;
use maud::html;

pub const FORM_NOT_SUBMITTED: &str = "Form not submitted correctly";

/// What a failed action hands back to its form: an error for the whole form,
/// errors per field, and the values that were submitted so nothing is lost on
/// redisplay.
#[derive(Debug)]
pub struct ActionData<Fields, FieldErrors> {
    pub form_error: Option<String>,
    pub field_errors: Option<FieldErrors>,
    pub fields: Option<Fields>,
}

impl<Fields, FieldErrors> ActionData<Fields, FieldErrors> {
    pub fn empty() -> Self {
        Self {
            form_error: None,
            field_errors: None,
            fields: None,
        }
    }

    pub fn form_error(message: &str) -> Self {
        Self {
            form_error: Some(message.to_string()),
            ..Self::empty()
        }
    }

    pub fn invalid(field_errors: FieldErrors, fields: Fields) -> Self {
        Self {
            form_error: None,
            field_errors: Some(field_errors),
            fields: Some(fields),
        }
    }

    pub fn with_fields(self, fields: Fields) -> Self {
        Self {
            fields: Some(fields),
            ..self
        }
    }
}

pub fn bad_request(markup: Markup) -> Response {
    (StatusCode::BAD_REQUEST, markup).into_response()
}

pub fn validation_error(id: &str, message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p class="form-validation-error" role="alert" id=(id) {
                (message)
            }
        }
    }
}
