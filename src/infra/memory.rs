//! In-memory storage backend for tests, demos, and offline use.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::repos::{
    CategoriesStore, PostsStore, RepoError, SessionsStore, UsersStore,
};
use crate::application::seed;
use crate::domain::entities::{CategoryRecord, PostRecord, SessionRecord, UserRecord};

#[derive(Default)]
pub struct MemoryStore {
    categories: RwLock<HashMap<Uuid, CategoryRecord>>,
    posts: RwLock<HashMap<Uuid, PostRecord>>,
    users: RwLock<HashMap<Uuid, UserRecord>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with the default catalog and accounts.
    pub fn with_defaults(now: OffsetDateTime) -> Self {
        let categories = seed::default_categories(now)
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        let users = seed::default_users(now)
            .into_iter()
            .map(|record| (record.id, record))
            .collect();
        Self {
            categories: RwLock::new(categories),
            posts: RwLock::new(HashMap::new()),
            users: RwLock::new(users),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CategoriesStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        Ok(self.categories.read().await.values().cloned().collect())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn insert_category(&self, record: CategoryRecord) -> Result<CategoryRecord, RepoError> {
        self.categories
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_category(&self, record: CategoryRecord) -> Result<CategoryRecord, RepoError> {
        let mut categories = self.categories.write().await;
        if !categories.contains_key(&record.id) {
            return Err(RepoError::NotFound);
        }
        categories.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), RepoError> {
        self.categories
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostsStore for MemoryStore {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self.posts.read().await.values().cloned().collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert_post(&self, record: PostRecord) -> Result<PostRecord, RepoError> {
        self.posts.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_post(&self, record: PostRecord) -> Result<PostRecord, RepoError> {
        let mut posts = self.posts.write().await;
        if !posts.contains_key(&record.id) {
            return Err(RepoError::NotFound);
        }
        posts.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UsersStore for MemoryStore {
    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert_user(&self, record: UserRecord) -> Result<UserRecord, RepoError> {
        self.users.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_user(&self, record: UserRecord) -> Result<UserRecord, RepoError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&record.id) {
            return Err(RepoError::NotFound);
        }
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), RepoError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl SessionsStore for MemoryStore {
    async fn insert_session(&self, record: SessionRecord) -> Result<SessionRecord, RepoError> {
        self.sessions
            .write()
            .await
            .insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn find_session(&self, token: &str) -> Result<Option<SessionRecord>, RepoError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<(), RepoError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}
