use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sqlx::prelude::FromRow;
use std::fmt;
use std::sync::Arc;
use tokio::task;

use crate::known_errors::JokesResult;
use crate::known_errors::StoreError;

crate::id!(UserId);

#[derive(Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// inserts the user, failing with [`StoreError::UsernameTaken`] if the name is in use
    async fn create(&self, user: User) -> Result<User, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

/// In-memory storage implementation for users
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<UserId, User>>,
    username_to_id: Arc<DashMap<String, UserId>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .username_to_id
            .get(username)
            .and_then(|id| self.users.get(&*id).map(|u| u.clone())))
    }

    async fn create(&self, user: User) -> Result<User, StoreError> {
        match self.username_to_id.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::UsernameTaken),
            Entry::Vacant(slot) => {
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(user)
            }
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.users.len() as u64)
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Hashes the password and stores a new user. Returns `None` when the username is taken.
pub async fn register(
    users: &dyn UserStore,
    creds: Credentials,
    cost: u32,
) -> JokesResult<Option<User>> {
    if users.find_by_username(&creds.username).await?.is_some() {
        return Ok(None);
    }

    let password = creds.password;
    let password_hash = task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

    let user = User {
        id: UserId::new(),
        username: creds.username,
        password_hash,
        created_at: Utc::now(),
    };

    match users.create(user).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "registered user");
            Ok(Some(user))
        }
        // lost a race against another registration for the same name
        Err(StoreError::UsernameTaken) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Returns the user when the username exists and the password matches its hash.
pub async fn login(users: &dyn UserStore, creds: Credentials) -> JokesResult<Option<User>> {
    let Some(user) = users.find_by_username(&creds.username).await? else {
        return Ok(None);
    };

    let hash = user.password_hash.clone();
    let password = creds.password;
    let matches = task::spawn_blocking(move || bcrypt::verify(password, &hash).is_ok_and(|f| f))
        .await?;

    Ok(matches.then_some(user))
}
