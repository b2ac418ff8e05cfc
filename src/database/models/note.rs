use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Note {
    const NAME: &'static str = "Note";

    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Fields for a note about to be inserted. References are already checked.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub folder_id: Option<Uuid>,
    pub tags: Vec<Uuid>,
}

/// Partial update. `folder_id: Some(None)` clears the folder.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    /// Case-insensitive substring of the title
    pub search_term: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
}

impl NoteFilter {
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(term) = &self.search_term {
            if !contains_ignore_case(&note.title, term) {
                return false;
            }
        }
        if let Some(folder_id) = self.folder_id {
            if note.folder_id != Some(folder_id) {
                return false;
            }
        }
        if let Some(tag_id) = self.tag_id {
            if !note.tags.contains(&tag_id) {
                return false;
            }
        }
        true
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: &str, folder_id: Option<Uuid>, tags: Vec<Uuid>) -> Note {
        let now = Utc::now();
        Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: String::new(),
            folder_id,
            tags,
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn filter_matches_title_case_insensitively() {
        let filter = NoteFilter { search_term: Some("CATS".into()), ..Default::default() };
        assert!(filter.matches(&note("Why cats are great", None, vec![])));
        assert!(!filter.matches(&note("Dogs", None, vec![])));
    }

    #[test]
    fn filter_combines_folder_and_tag() {
        let folder = Uuid::new_v4();
        let tag = Uuid::new_v4();
        let filter = NoteFilter { folder_id: Some(folder), tag_id: Some(tag), ..Default::default() };
        assert!(filter.matches(&note("a", Some(folder), vec![tag])));
        assert!(!filter.matches(&note("a", Some(folder), vec![])));
        assert!(!filter.matches(&note("a", None, vec![tag])));
    }

    #[test]
    fn serializes_camel_case_and_omits_missing_folder() {
        let value = serde_json::to_value(note("a", None, vec![])).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("folderId").is_none());
        assert_eq!(value["tags"], serde_json::json!([]));
    }
}
