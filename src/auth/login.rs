use axum::Form;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::response::Response;
use maud::Markup;
use maud::html;
use serde::Deserialize;

use super::session::UserSession;
use super::user;
use super::user::Credentials;
use crate::action_data::ActionData;
use crate::action_data::FORM_NOT_SUBMITTED;
use crate::action_data::bad_request;
use crate::action_data::validation_error;
use crate::appstate::AppState;
use crate::known_errors::JokesResult;
use crate::theme::theme_with_head;
use crate::validate::safe_redirect;
use crate::validate::validate_length;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    #[default]
    Login,
    Register,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "redirectTo")]
    redirect_to: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(rename = "loginType")]
    login_type: LoginType,
    username: String,
    password: String,
    #[serde(rename = "redirectTo")]
    redirect_to: Option<String>,
}

/// The password is never sent back to the browser.
#[derive(Debug, Clone)]
pub struct LoginFields {
    pub login_type: LoginType,
    pub username: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoginFieldErrors {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

pub type LoginActionData = ActionData<LoginFields, LoginFieldErrors>;

pub async fn login_page(Query(query): Query<LoginQuery>) -> Markup {
    login_view(query.redirect_to.as_deref(), &ActionData::empty())
}

pub async fn login_action(
    State(state): State<AppState>,
    session: UserSession,
    Query(query): Query<LoginQuery>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> JokesResult<Response> {
    let Ok(Form(form)) = form else {
        return Ok(bad_request(login_view(
            query.redirect_to.as_deref(),
            &LoginActionData::form_error(FORM_NOT_SUBMITTED),
        )));
    };

    let redirect_to = form
        .redirect_to
        .as_deref()
        .filter(|to| !to.is_empty())
        .or(query.redirect_to.as_deref());
    let fields = LoginFields {
        login_type: form.login_type,
        username: form.username.clone(),
    };

    let field_errors = LoginFieldErrors {
        username: validate_length(&form.username, "Username must be longer than 3 characters"),
        password: validate_length(&form.password, "Password must be longer than 3 characters"),
    };
    if !field_errors.is_empty() {
        return Ok(bad_request(login_view(
            redirect_to,
            &LoginActionData::invalid(field_errors, fields),
        )));
    }

    let creds = Credentials {
        username: form.username,
        password: form.password,
    };

    let user = match form.login_type {
        LoginType::Register => {
            user::register(state.users.as_ref(), creds, state.settings.bcrypt_cost).await?
        }
        LoginType::Login => user::login(state.users.as_ref(), creds).await?,
    };

    let Some(user) = user else {
        let message = match form.login_type {
            LoginType::Register => "Username already taken. Please choose another.",
            LoginType::Login => "Login failed. Please try again.",
        };
        tracing::debug!(username = %fields.username, login_type = ?fields.login_type, "login rejected");
        return Ok(bad_request(login_view(
            redirect_to,
            &LoginActionData::form_error(message).with_fields(fields),
        )));
    };

    Ok(session.create(user.id, &safe_redirect(redirect_to)))
}

fn login_view(redirect_to: Option<&str>, data: &LoginActionData) -> Markup {
    let login_type = data
        .fields
        .as_ref()
        .map(|f| f.login_type)
        .unwrap_or_default();
    let username = data.fields.as_ref().map(|f| f.username.as_str());
    let username_error = data
        .field_errors
        .as_ref()
        .and_then(|e| e.username.as_deref());
    let password_error = data
        .field_errors
        .as_ref()
        .and_then(|e| e.password.as_deref());

    // the query copy survives a body that fails to parse
    let action = match redirect_to {
        Some(to) => format!("/login?redirectTo={}", urlencoding::encode(to)),
        None => "/login".to_string(),
    };

    theme_with_head(
        Some("Login"),
        html! {},
        html! {
            div class="container" {
                div class="content" {
                    h1 { "Login" }
                    form
                        method="post"
                        action=(action)
                        aria-invalid=[data.form_error.as_ref().map(|_| "true")]
                        aria-describedby=[data.form_error.as_ref().map(|_| "form-error")] {
                        input type="hidden" name="redirectTo" value=[redirect_to];
                        fieldset {
                            legend class="sr-only" { "Login or Register?" }
                            label {
                                input
                                    type="radio"
                                    name="loginType"
                                    value="login"
                                    checked[login_type == LoginType::Login];
                                " Login"
                            }
                            label {
                                input
                                    type="radio"
                                    name="loginType"
                                    value="register"
                                    checked[login_type == LoginType::Register];
                                " Register"
                            }
                        }
                        div {
                            label for="username-input" { "Username" }
                            input
                                type="text"
                                id="username-input"
                                name="username"
                                value=[username]
                                aria-invalid=[username_error.map(|_| "true")]
                                aria-describedby=[username_error.map(|_| "username-error")];
                            (validation_error("username-error", username_error))
                        }
                        div {
                            label for="password-input" { "Password" }
                            input
                                type="password"
                                id="password-input"
                                name="password"
                                aria-invalid=[password_error.map(|_| "true")]
                                aria-describedby=[password_error.map(|_| "password-error")];
                            (validation_error("password-error", password_error))
                        }
                        (validation_error("form-error", data.form_error.as_deref()))
                        button type="submit" class="button" { "Submit" }
                    }
                }
                div class="links" {
                    ul {
                        li { a href="/" { "Home" } }
                        li { a href="/jokes" { "Jokes" } }
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use axum::http::header;

    #[tokio::test]
    async fn test_login_page_keeps_redirect_target() {
        let app = TestApp::new();

        let response = app.get("/login?redirectTo=%2Fjokes%2Fnew", None).await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.contains(r#"name="redirectTo" value="/jokes/new""#));
    }

    #[tokio::test]
    async fn test_register_sets_session_and_redirects() {
        let app = TestApp::new();

        let response = app
            .post(
                "/login",
                "loginType=register&username=kody&password=twixrox&redirectTo=%2Fjokes%2Fnew",
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/jokes/new"));

        let set_cookie = response
            .headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("session cookie should be set");
        assert!(set_cookie.starts_with("jokes_session="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
    }

    #[tokio::test]
    async fn test_register_then_login_yields_same_user() {
        let app = TestApp::new();
        app.register("kody", "twixrox").await;
        let registered = app.user_id("kody").await;

        let response = app
            .post(
                "/login",
                "loginType=login&username=kody&password=twixrox",
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/jokes"));

        let cookie = response
            .session_cookie()
            .expect("login should set a session cookie");
        let page = app.get("/jokes/new", Some(&cookie)).await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("Hi kody"));
        assert_eq!(app.user_id("kody").await, registered);
    }

    #[tokio::test]
    async fn test_register_taken_username_fails() {
        let app = TestApp::new();
        app.register("kody", "twixrox").await;

        let response = app
            .post(
                "/login",
                "loginType=register&username=kody&password=another",
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Username already taken"));
        assert!(response.session_cookie().is_none());
        assert_eq!(app.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_fails() {
        let app = TestApp::new();
        app.register("kody", "twixrox").await;

        let response = app
            .post("/login", "loginType=login&username=kody&password=wrong", None)
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Login failed. Please try again."));
        // username survives the round trip, the password does not
        assert!(response.body.contains(r#"value="kody""#));
        assert!(!response.body.contains("wrong"));
    }

    #[tokio::test]
    async fn test_short_credentials_return_field_errors() {
        let app = TestApp::new();

        let response = app
            .post("/login", "loginType=register&username=ko&password=tw", None)
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Username must be longer than 3 characters"));
        assert!(response.body.contains("Password must be longer than 3 characters"));
        assert_eq!(app.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_login_type_is_bad_request() {
        let app = TestApp::new();

        let response = app
            .post("/login", "loginType=sudo&username=kody&password=twixrox", None)
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Form not submitted correctly"));
        assert_eq!(app.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_offsite_redirect_is_ignored() {
        let app = TestApp::new();

        let response = app
            .post(
                "/login",
                "loginType=register&username=kody&password=twixrox&redirectTo=%2F%2Fevil.example",
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/jokes"));

        let app = TestApp::new();
        let response = app
            .post(
                "/login",
                "loginType=register&username=kody&password=twixrox&redirectTo=%2F%5Cevil.example",
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/jokes"));
    }

    #[tokio::test]
    async fn test_non_ascii_redirect_falls_back_to_default() {
        let app = TestApp::new();

        let response = app
            .post(
                "/login",
                "loginType=register&username=kody&password=twixrox&redirectTo=%2F%C3%A9",
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/jokes"));
        assert!(response.session_cookie().is_some());
    }

    #[tokio::test]
    async fn test_malformed_form_keeps_redirect_target() {
        let app = TestApp::new();

        let page = app.get("/login?redirectTo=%2Fjokes%2Fnew", None).await;
        assert!(page.body.contains(r#"action="/login?redirectTo=%2Fjokes%2Fnew""#));

        let response = app
            .post(
                "/login?redirectTo=%2Fjokes%2Fnew",
                "loginType=sudo&username=kody&password=twixrox",
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Form not submitted correctly"));
        assert!(response.body.contains(r#"name="redirectTo" value="/jokes/new""#));
    }
}
