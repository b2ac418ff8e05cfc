pub mod folders;
pub mod manager;
pub mod memory;
pub mod models;
pub mod notes;
pub mod tags;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use models::{Folder, NewNote, NewUser, Note, NoteFilter, NotePatch, Tag, User};

pub use folders::PgFolderRepository;
pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use notes::PgNoteRepository;
pub use tags::PgTagRepository;
pub use users::PgUserRepository;

/// Errors from the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("{resource} {field} already exists")]
    Duplicate {
        resource: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a unique-constraint violation to `Duplicate`, pass anything else through.
    pub(crate) fn unique(err: sqlx::Error, resource: &'static str, field: &'static str) -> Self {
        let is_unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if is_unique {
            StoreError::Duplicate { resource, field }
        } else {
            StoreError::Sqlx(err)
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn create(&self, user: NewUser) -> StoreResult<User>;
}

#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// Folders owned by `user_id`, newest `updated_at` first.
    async fn list(&self, user_id: Uuid, search_term: Option<&str>) -> StoreResult<Vec<Folder>>;

    /// Unscoped lookup; callers check ownership.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Folder>>;

    async fn create(&self, user_id: Uuid, name: &str) -> StoreResult<Folder>;

    async fn update(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<Option<Folder>>;

    /// Deletes the folder and clears `folder_id` on its notes. Returns whether a row went away.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn list(&self, user_id: Uuid, search_term: Option<&str>) -> StoreResult<Vec<Tag>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Tag>>;

    /// The subset of `ids` that are tags owned by `user_id`.
    async fn owned_ids(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<Vec<Uuid>>;

    async fn create(&self, user_id: Uuid, name: &str) -> StoreResult<Tag>;

    async fn update(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<Option<Tag>>;

    /// Deletes the tag and pulls it from every note of the owner.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn list(&self, user_id: Uuid, filter: &NoteFilter) -> StoreResult<Vec<Note>>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Note>>;

    async fn create(&self, user_id: Uuid, note: NewNote) -> StoreResult<Note>;

    async fn update(&self, user_id: Uuid, id: Uuid, patch: NotePatch) -> StoreResult<Option<Note>>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

/// Store client handed to the handlers.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub folders: Arc<dyn FolderRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub notes: Arc<dyn NoteRepository>,
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Postgres(PgPool),
    Memory,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            folders: Arc::new(PgFolderRepository::new(pool.clone())),
            tags: Arc::new(PgTagRepository::new(pool.clone())),
            notes: Arc::new(PgNoteRepository::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    pub fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            folders: Arc::new(store.clone()),
            tags: Arc::new(store.clone()),
            notes: Arc::new(store),
            backend: Backend::Memory,
        }
    }

    pub async fn health_check(&self) -> StoreResult<()> {
        match &self.backend {
            Backend::Postgres(pool) => DatabaseManager::health_check(pool).await,
            Backend::Memory => Ok(()),
        }
    }
}
