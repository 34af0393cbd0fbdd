mod snippet;
pub use snippet::{Snippet, SnippetDraft, SnippetTag, SnippetWithTags, Tag, TagWithCount};

mod user;
pub use user::{AuthUser, Claims, SessionRecord, StoredUser};
