pub mod folder;
pub mod note;
pub mod tag;
pub mod user;

pub use folder::Folder;
pub use note::{NewNote, Note, NoteFilter, NotePatch};
pub use tag::Tag;
pub use user::{NewUser, User};

use uuid::Uuid;

/// A user-owned document exposed over REST.
pub trait Resource {
    /// Singular name used in client-facing messages ("Folder Id: ... is not valid").
    const NAME: &'static str;

    fn user_id(&self) -> Uuid;
}
