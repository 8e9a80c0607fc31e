use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::user::User;
use crate::auth::user::UserId;
use crate::auth::user::UserStore;
use crate::joke::Joke;
use crate::joke::JokeId;
use crate::joke::JokeListItem;
use crate::joke::JokeStore;
use crate::joke::NewJoke;
use crate::known_errors::StoreError;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS jokes (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE INDEX IF NOT EXISTS idx_jokes_created_at ON jokes(created_at);
"#;

/// Users and jokes in PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: User) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl JokeStore for PgStore {
    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jokes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn find(&self, id: &JokeId) -> Result<Option<Joke>, StoreError> {
        let joke = sqlx::query_as::<_, Joke>(
            "SELECT id, user_id, name, content, created_at FROM jokes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(joke)
    }

    async fn find_nth(&self, offset: u64) -> Result<Option<Joke>, StoreError> {
        let joke = sqlx::query_as::<_, Joke>(
            r#"
            SELECT id, user_id, name, content, created_at FROM jokes
            ORDER BY created_at, id
            OFFSET $1
            LIMIT 1
            "#,
        )
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_optional(&self.pool)
        .await?;
        Ok(joke)
    }

    async fn find_random(&self) -> Result<Option<Joke>, StoreError> {
        let joke = sqlx::query_as::<_, Joke>(
            r#"
            SELECT id, user_id, name, content, created_at FROM jokes
            ORDER BY random()
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(joke)
    }

    async fn create(&self, joke: NewJoke) -> Result<Joke, StoreError> {
        let joke = sqlx::query_as::<_, Joke>(
            r#"
            INSERT INTO jokes (id, user_id, name, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, content, created_at
            "#,
        )
        .bind(JokeId::new())
        .bind(joke.user_id)
        .bind(joke.name)
        .bind(joke.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(joke)
    }

    async fn delete(&self, id: &JokeId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM jokes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<JokeListItem>, StoreError> {
        let jokes = sqlx::query_as::<_, JokeListItem>(
            "SELECT id, name FROM jokes ORDER BY created_at DESC LIMIT $1",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        Ok(jokes)
    }
}
