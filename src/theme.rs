use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use maud::DOCTYPE;
use maud::Markup;
use maud::html;

pub fn theme(content: Markup) -> Markup {
    theme_with_head(None, html! {}, content)
}

pub fn theme_with_head(title: Option<&str>, extra_head: Markup, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                link rel="stylesheet" href="/jokes.css";
                @if let Some(title) = title {
                    title { (title) " | Jokes" }
                } @else {
                    title { "Jokes" }
                }
                (extra_head)
            }
            body {
                (content)
            }
        }
    }
}

pub async fn serve_stylesheet() -> impl IntoResponse {
    const STYLESHEET: &str = include_str!("jokes.css");
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css")],
        STYLESHEET,
    )
}
