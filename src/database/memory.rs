//! In-process store with the same semantics as the PostgreSQL repositories.
//! Used by the test suite and by `STORE_BACKEND=memory`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::note::contains_ignore_case;
use super::models::{Folder, NewNote, NewUser, Note, NoteFilter, NotePatch, Tag, User};
use super::{
    FolderRepository, NoteRepository, StoreError, StoreResult, TagRepository, UserRepository,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    folders: HashMap<Uuid, Folder>,
    tags: HashMap<Uuid, Tag>,
    notes: HashMap<Uuid, Note>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `updated_at` must move forward even when the clock has not.
fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

fn newest_first<T>(items: &mut [T], updated_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| updated_at(b).cmp(&updated_at(a)));
}

fn name_taken<'a>(
    mut names: impl Iterator<Item = (Uuid, Uuid, &'a str)>,
    user_id: Uuid,
    name: &str,
    except: Option<Uuid>,
) -> bool {
    names.any(|(id, owner, existing)| owner == user_id && existing == name && Some(id) != except)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate {
                resource: "User",
                field: "username",
            });
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            fullname: user.fullname,
            password: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl FolderRepository for MemoryStore {
    async fn list(&self, user_id: Uuid, search_term: Option<&str>) -> StoreResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut folders: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.user_id == user_id)
            .filter(|f| search_term.map_or(true, |term| contains_ignore_case(&f.name, term)))
            .cloned()
            .collect();
        newest_first(&mut folders, |f| f.updated_at);
        Ok(folders)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Folder>> {
        Ok(self.state.read().await.folders.get(&id).cloned())
    }

    async fn create(&self, user_id: Uuid, name: &str) -> StoreResult<Folder> {
        let mut state = self.state.write().await;
        let existing = state.folders.values().map(|f| (f.id, f.user_id, f.name.as_str()));
        if name_taken(existing, user_id, name, None) {
            return Err(StoreError::Duplicate {
                resource: "Folder",
                field: "name",
            });
        }
        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            name: name.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<Option<Folder>> {
        let mut state = self.state.write().await;
        let existing = state.folders.values().map(|f| (f.id, f.user_id, f.name.as_str()));
        if name_taken(existing, user_id, name, Some(id)) {
            return Err(StoreError::Duplicate {
                resource: "Folder",
                field: "name",
            });
        }
        Ok(state
            .folders
            .get_mut(&id)
            .filter(|f| f.user_id == user_id)
            .map(|folder| {
                folder.name = name.to_string();
                folder.updated_at = touch(folder.updated_at);
                folder.clone()
            }))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let owned = state.folders.get(&id).is_some_and(|f| f.user_id == user_id);
        if !owned {
            return Ok(false);
        }
        state.folders.remove(&id);
        for note in state.notes.values_mut() {
            if note.user_id == user_id && note.folder_id == Some(id) {
                note.folder_id = None;
                note.updated_at = touch(note.updated_at);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn list(&self, user_id: Uuid, search_term: Option<&str>) -> StoreResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state
            .tags
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| search_term.map_or(true, |term| contains_ignore_case(&t.name, term)))
            .cloned()
            .collect();
        newest_first(&mut tags, |t| t.updated_at);
        Ok(tags)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Tag>> {
        Ok(self.state.read().await.tags.get(&id).cloned())
    }

    async fn owned_ids(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<Vec<Uuid>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| state.tags.get(id).is_some_and(|t| t.user_id == user_id))
            .collect())
    }

    async fn create(&self, user_id: Uuid, name: &str) -> StoreResult<Tag> {
        let mut state = self.state.write().await;
        let existing = state.tags.values().map(|t| (t.id, t.user_id, t.name.as_str()));
        if name_taken(existing, user_id, name, None) {
            return Err(StoreError::Duplicate {
                resource: "Tag",
                field: "name",
            });
        }
        let now = Utc::now();
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, name: &str) -> StoreResult<Option<Tag>> {
        let mut state = self.state.write().await;
        let existing = state.tags.values().map(|t| (t.id, t.user_id, t.name.as_str()));
        if name_taken(existing, user_id, name, Some(id)) {
            return Err(StoreError::Duplicate {
                resource: "Tag",
                field: "name",
            });
        }
        Ok(state
            .tags
            .get_mut(&id)
            .filter(|t| t.user_id == user_id)
            .map(|tag| {
                tag.name = name.to_string();
                tag.updated_at = touch(tag.updated_at);
                tag.clone()
            }))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let owned = state.tags.get(&id).is_some_and(|t| t.user_id == user_id);
        if !owned {
            return Ok(false);
        }
        state.tags.remove(&id);
        for note in state.notes.values_mut() {
            if note.user_id == user_id && note.tags.contains(&id) {
                note.tags.retain(|tag| *tag != id);
                note.updated_at = touch(note.updated_at);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn list(&self, user_id: Uuid, filter: &NoteFilter) -> StoreResult<Vec<Note>> {
        let state = self.state.read().await;
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|n| n.user_id == user_id && filter.matches(n))
            .cloned()
            .collect();
        newest_first(&mut notes, |n| n.updated_at);
        Ok(notes)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Note>> {
        Ok(self.state.read().await.notes.get(&id).cloned())
    }

    async fn create(&self, user_id: Uuid, note: NewNote) -> StoreResult<Note> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title: note.title,
            content: note.content,
            folder_id: note.folder_id,
            tags: note.tags,
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, patch: NotePatch) -> StoreResult<Option<Note>> {
        let mut state = self.state.write().await;
        Ok(state
            .notes
            .get_mut(&id)
            .filter(|n| n.user_id == user_id)
            .map(|note| {
                if let Some(title) = patch.title {
                    note.title = title;
                }
                if let Some(content) = patch.content {
                    note.content = content;
                }
                if let Some(folder_id) = patch.folder_id {
                    note.folder_id = folder_id;
                }
                if let Some(tags) = patch.tags {
                    note.tags = tags;
                }
                note.updated_at = touch(note.updated_at);
                note.clone()
            }))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let owned = state.notes.get(&id).is_some_and(|n| n.user_id == user_id);
        if owned {
            state.notes.remove(&id);
        }
        Ok(owned)
    }
}
