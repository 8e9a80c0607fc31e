pub mod commands;
pub mod layout;
pub mod views;

use async_trait::async_trait;
use axum::Router;
use axum::routing::get;
use chrono::DateTime;
use chrono::Utc;
use rand::Rng;
use sqlx::prelude::FromRow;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::appstate::AppState;
use crate::auth::user::UserId;
use crate::known_errors::AppError;
use crate::known_errors::JokesResult;
use crate::known_errors::StoreError;

crate::id!(JokeId);

#[derive(Debug, Clone, FromRow)]
pub struct Joke {
    pub id: JokeId,
    pub user_id: UserId,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJoke {
    pub user_id: UserId,
    pub name: String,
    pub content: String,
}

/// The slice of a joke shown in the sidebar.
#[derive(Debug, Clone, FromRow)]
pub struct JokeListItem {
    pub id: JokeId,
    pub name: String,
}

/// How `GET /jokes` picks its joke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RandomStrategy {
    /// count the rows, then fetch the row at a random offset (two reads)
    #[default]
    Offset,
    /// let the store pick a random row in a single read
    Single,
}

#[async_trait]
pub trait JokeStore: Send + Sync + 'static {
    async fn count(&self) -> Result<u64, StoreError>;

    async fn find(&self, id: &JokeId) -> Result<Option<Joke>, StoreError>;

    /// the joke at `offset` when ordered by creation time, oldest first
    async fn find_nth(&self, offset: u64) -> Result<Option<Joke>, StoreError>;

    async fn find_random(&self) -> Result<Option<Joke>, StoreError>;

    async fn create(&self, joke: NewJoke) -> Result<Joke, StoreError>;

    /// returns false if there was nothing to delete
    async fn delete(&self, id: &JokeId) -> Result<bool, StoreError>;

    /// the newest jokes first
    async fn list_recent(&self, limit: usize) -> Result<Vec<JokeListItem>, StoreError>;
}

/// In-memory joke storage, kept in creation order.
#[derive(Clone, Default)]
pub struct MemoryJokeStore {
    jokes: Arc<RwLock<Vec<Joke>>>,
}

impl MemoryJokeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JokeStore for MemoryJokeStore {
    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.jokes.read().await.len() as u64)
    }

    async fn find(&self, id: &JokeId) -> Result<Option<Joke>, StoreError> {
        Ok(self.jokes.read().await.iter().find(|j| j.id == *id).cloned())
    }

    async fn find_nth(&self, offset: u64) -> Result<Option<Joke>, StoreError> {
        let jokes = self.jokes.read().await;
        Ok(usize::try_from(offset)
            .ok()
            .and_then(|i| jokes.get(i))
            .cloned())
    }

    async fn find_random(&self) -> Result<Option<Joke>, StoreError> {
        let jokes = self.jokes.read().await;
        if jokes.is_empty() {
            return Ok(None);
        }
        let index = rand::rng().random_range(0..jokes.len());
        Ok(jokes.get(index).cloned())
    }

    async fn create(&self, joke: NewJoke) -> Result<Joke, StoreError> {
        let joke = Joke {
            id: JokeId::new(),
            user_id: joke.user_id,
            name: joke.name,
            content: joke.content,
            created_at: Utc::now(),
        };
        self.jokes.write().await.push(joke.clone());
        Ok(joke)
    }

    async fn delete(&self, id: &JokeId) -> Result<bool, StoreError> {
        let mut jokes = self.jokes.write().await;
        let before = jokes.len();
        jokes.retain(|j| j.id != *id);
        Ok(jokes.len() != before)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<JokeListItem>, StoreError> {
        Ok(self
            .jokes
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .map(|j| JokeListItem {
                id: j.id,
                name: j.name.clone(),
            })
            .collect())
    }
}

/// Picks a joke for the random joke page. An empty table is [`AppError::NoJokes`].
pub async fn random_joke(store: &dyn JokeStore, strategy: RandomStrategy) -> JokesResult<Joke> {
    match strategy {
        RandomStrategy::Offset => {
            let count = store.count().await?;
            if count == 0 {
                return Err(AppError::NoJokes);
            }
            let offset = rand::rng().random_range(0..count);
            // a concurrent delete can shrink the table between the two reads
            store.find_nth(offset).await?.ok_or(AppError::NoJokes)
        }
        RandomStrategy::Single => store.find_random().await?.ok_or(AppError::NoJokes),
    }
}

/// Looks a joke up by the raw path segment; a malformed id is just another missing joke.
pub async fn find_joke(store: &dyn JokeStore, id: &str) -> JokesResult<Joke> {
    let not_found = || AppError::JokeNotFound { id: id.to_string() };

    let joke_id = JokeId::from_str(id).map_err(|_| not_found())?;
    store.find(&joke_id).await?.ok_or_else(not_found)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jokes", get(views::random_joke_page))
        .route(
            "/jokes/new",
            get(views::new_joke_page).post(commands::create_joke),
        )
        .route(
            "/jokes/{id}",
            get(views::joke_detail).post(commands::joke_action),
        )
}
