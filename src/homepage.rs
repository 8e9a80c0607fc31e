use maud::Markup;
use maud::html;

use crate::theme::theme;

pub async fn homepage() -> Markup {
    theme(html! {
        div class="container" {
            div class="content" {
                h1 { "J🤪KES" }
                p { "Hello" }
                nav {
                    ul {
                        li { a href="/jokes" { "Read Jokes" } }
                        li { a href="/login" { "Login" } }
                    }
                }
            }
        }
    })
}
