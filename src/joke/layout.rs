use maud::Markup;
use maud::html;

use crate::appstate::AppState;
use crate::auth::session::UserSession;
use crate::known_errors::JokesResult;
use crate::theme::theme_with_head;

const RECENT_JOKES: usize = 5;

pub async fn layout(
    state: &AppState,
    session: &UserSession,
    title: Option<&str>,
    extra_head: Markup,
    content: Markup,
) -> JokesResult<Markup> {
    let recent = state.jokes.list_recent(RECENT_JOKES).await?;

    Ok(theme_with_head(
        title,
        extra_head,
        html! {
            div class="jokes-layout" {
                header class="jokes-header" {
                    div class="container" {
                        h1 class="home-link" {
                            a href="/" title="Jokes" aria-label="Jokes" {
                                "J🤪KES"
                            }
                        }
                        @if let Some(user) = session.user() {
                            div class="user-info" {
                                span { "Hi " (user.username) }
                                form action="/logout" method="post" {
                                    button type="submit" class="button" {
                                        "Logout"
                                    }
                                }
                            }
                        } @else {
                            a href="/login" { "Login" }
                        }
                    }
                }
                main class="jokes-main" {
                    div class="container" {
                        div class="jokes-list" {
                            a href="/jokes" { "Get a random joke" }
                            p { "Here are a few more jokes to check out:" }
                            ul {
                                @for joke in &recent {
                                    li {
                                        a href=(format!("/jokes/{}", joke.id)) { (joke.name) }
                                    }
                                }
                            }
                            a href="/jokes/new" class="button" { "Add your own" }
                        }
                        div class="jokes-outlet" {
                            (content)
                        }
                    }
                }
            }
        },
    ))
}
