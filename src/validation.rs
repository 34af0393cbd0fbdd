use std::fmt;

use serde::Serialize;

use crate::auth::{LoginCredentials, SignupCredentials};
use crate::models::SnippetDraft;

pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;
pub const CODE_MAX: usize = 50_000;
pub const LANGUAGE_MAX: usize = 50;
pub const TAG_MAX: usize = 30;
pub const TAGS_PER_SNIPPET_MAX: usize = 10;
pub const SEARCH_QUERY_MAX: usize = 200;
pub const EMAIL_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 100;

/// One message per offending field, in the order the fields were checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// First message for a field, for inline display next to it.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks a candidate snippet payload and returns its normalized form:
/// trimmed strings, empty description collapsed to `None`, tags case-folded
/// and de-duplicated. Validating an accepted output again returns it
/// unchanged.
pub fn validate_snippet(draft: &SnippetDraft) -> Result<SnippetDraft, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = draft.title.trim();
    if title.is_empty() {
        errors.push("title", "Title is required");
    } else if title.chars().count() > TITLE_MAX {
        errors.push("title", "Title must be less than 100 characters");
    }

    let description = draft
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    if let Some(d) = description {
        if d.chars().count() > DESCRIPTION_MAX {
            errors.push("description", "Description must be less than 500 characters");
        }
    }

    // code keeps its whitespace; only the emptiness check trims
    if draft.code.trim().is_empty() {
        errors.push("code", "Code is required");
    } else if draft.code.chars().count() > CODE_MAX {
        errors.push("code", "Code must be less than 50,000 characters");
    }

    let language = draft.language.trim();
    if language.is_empty() {
        errors.push("language", "Language is required");
    } else if language.chars().count() > LANGUAGE_MAX {
        errors.push("language", "Language must be less than 50 characters");
    }

    let mut tags: Vec<String> = Vec::new();
    for raw in &draft.tags {
        match validate_tag(raw) {
            Ok(name) => {
                if !tags.contains(&name) {
                    tags.push(name);
                }
            }
            Err(message) => errors.push("tags", message),
        }
    }
    if tags.len() > TAGS_PER_SNIPPET_MAX {
        errors.push("tags", "Maximum 10 tags allowed");
    }

    errors.into_result(SnippetDraft {
        title: title.to_string(),
        description: description.map(str::to_string),
        code: draft.code.clone(),
        language: language.to_string(),
        tags,
        favorite: draft.favorite,
    })
}

/// Accepts a tag name, returning it trimmed and case-folded, or the message
/// to show next to the tag input.
pub fn validate_tag(raw: &str) -> Result<String, String> {
    let name = raw.trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err("Tag cannot be empty".to_string());
    }
    if name.chars().count() > TAG_MAX {
        return Err("Tag must be less than 30 characters".to_string());
    }
    if name
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && c != '-' && c != '_')
    {
        return Err("Tag can only contain letters, numbers, hyphens, and underscores".to_string());
    }
    Ok(name)
}

pub fn validate_search_query(raw: &str) -> Result<String, String> {
    let query = raw.trim();
    if query.chars().count() > SEARCH_QUERY_MAX {
        return Err("Search query is too long".to_string());
    }
    Ok(query.to_string())
}

pub fn validate_login(credentials: &LoginCredentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(message) = email_error(credentials.email.trim()) {
        errors.push("email", message);
    }
    if credentials.password.is_empty() {
        errors.push("password", "Password is required");
    }
    errors.into_result(())
}

pub fn validate_signup(credentials: &SignupCredentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(message) = email_error(credentials.email.trim()) {
        errors.push("email", message);
    }
    if let Some(message) = password_strength_error(&credentials.password) {
        errors.push("password", message);
    }
    if credentials.confirm_password.is_empty() {
        errors.push("confirm_password", "Please confirm your password");
    } else if credentials.password != credentials.confirm_password {
        errors.push("confirm_password", "Passwords do not match");
    }
    errors.into_result(())
}

pub fn password_strength_error(password: &str) -> Option<&'static str> {
    if password.chars().count() < PASSWORD_MIN {
        Some("Password must be at least 8 characters long")
    } else if password.chars().count() > PASSWORD_MAX {
        Some("Password is too long")
    } else if !password.chars().any(|c| c.is_uppercase()) {
        Some("Password must include at least one uppercase letter")
    } else if !password.chars().any(|c| c.is_lowercase()) {
        Some("Password must include at least one lowercase letter")
    } else if !password.chars().any(|c| c.is_numeric()) {
        Some("Password must include at least one number")
    } else {
        None
    }
}

fn email_error(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        return Some("Email is required");
    }
    if email.chars().count() > EMAIL_MAX {
        return Some("Email is too long");
    }
    if email.chars().any(char::is_whitespace) {
        return Some("Invalid email address");
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None)
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.') =>
        {
            None
        }
        _ => Some("Invalid email address"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> SnippetDraft {
        SnippetDraft {
            title: "  Debounce Hook  ".to_string(),
            description: Some("   ".to_string()),
            code: "fn main() {}".to_string(),
            language: " rust ".to_string(),
            tags: vec!["React".to_string(), "react".to_string(), " REACT ".to_string()],
            favorite: false,
        }
    }

    #[test]
    fn normalizes_and_is_idempotent() {
        let normalized = validate_snippet(&draft()).unwrap();
        assert_eq!(normalized.title, "Debounce Hook");
        assert_eq!(normalized.description, None);
        assert_eq!(normalized.language, "rust");
        assert_eq!(normalized.tags, vec!["react".to_string()]);

        let again = validate_snippet(&normalized).unwrap();
        assert_eq!(again, normalized);
    }

    #[test]
    fn reports_one_message_per_offending_field() {
        let bad = SnippetDraft {
            title: String::new(),
            description: Some("d".repeat(501)),
            code: String::new(),
            language: "x".repeat(51),
            tags: vec![],
            favorite: false,
        };
        let errors = validate_snippet(&bad).unwrap_err();
        assert_eq!(errors.message_for("title"), Some("Title is required"));
        assert_eq!(
            errors.message_for("description"),
            Some("Description must be less than 500 characters")
        );
        assert_eq!(errors.message_for("code"), Some("Code is required"));
        assert_eq!(
            errors.message_for("language"),
            Some("Language must be less than 50 characters")
        );
        assert_eq!(errors.errors().len(), 4);
    }

    #[test]
    fn rejects_more_than_ten_distinct_tags() {
        let mut d = draft();
        d.tags = (0..11).map(|i| format!("tag{i}")).collect();
        let errors = validate_snippet(&d).unwrap_err();
        assert_eq!(errors.message_for("tags"), Some("Maximum 10 tags allowed"));
    }

    #[test]
    fn duplicate_tags_collapse_below_the_limit() {
        let mut d = draft();
        d.tags = (0..11).map(|_| "Same".to_string()).collect();
        let normalized = validate_snippet(&d).unwrap();
        assert_eq!(normalized.tags, vec!["same".to_string()]);
    }

    #[test]
    fn tag_charset() {
        assert!(validate_tag("c++").is_err());
        assert_eq!(validate_tag("c-plus-plus").unwrap(), "c-plus-plus");
        assert_eq!(validate_tag(" Rust_2024 ").unwrap(), "rust_2024");
        assert!(validate_tag("").is_err());
        assert!(validate_tag(&"a".repeat(31)).is_err());
    }

    #[test]
    fn search_query_limit() {
        assert_eq!(validate_search_query("  hook  ").unwrap(), "hook");
        assert!(validate_search_query(&"q".repeat(201)).is_err());
    }

    #[test]
    fn login_requires_well_formed_email_and_password() {
        let errors = validate_login(&LoginCredentials {
            email: "not-an-email".to_string(),
            password: String::new(),
        })
        .unwrap_err();
        assert_eq!(errors.message_for("email"), Some("Invalid email address"));
        assert_eq!(errors.message_for("password"), Some("Password is required"));

        assert!(validate_login(&LoginCredentials {
            email: "dev@example.com".to_string(),
            password: "anything".to_string(),
        })
        .is_ok());
    }

    #[test]
    fn signup_enforces_password_strength_and_confirmation() {
        let weak = SignupCredentials {
            email: "dev@example.com".to_string(),
            password: "alllowercase1".to_string(),
            confirm_password: "alllowercase1".to_string(),
        };
        let errors = validate_signup(&weak).unwrap_err();
        assert_eq!(
            errors.message_for("password"),
            Some("Password must include at least one uppercase letter")
        );

        let mismatched = SignupCredentials {
            email: "dev@example.com".to_string(),
            password: "Sup3rSecret".to_string(),
            confirm_password: "Sup3rSecret!".to_string(),
        };
        let errors = validate_signup(&mismatched).unwrap_err();
        assert_eq!(
            errors.message_for("confirm_password"),
            Some("Passwords do not match")
        );

        let good = SignupCredentials {
            email: "dev@example.com".to_string(),
            password: "Sup3rSecret".to_string(),
            confirm_password: "Sup3rSecret".to_string(),
        };
        assert!(validate_signup(&good).is_ok());
    }

    #[test]
    fn password_strength_messages() {
        assert_eq!(
            password_strength_error("Ab1"),
            Some("Password must be at least 8 characters long")
        );
        assert_eq!(
            password_strength_error("NODIGITSHERE"),
            Some("Password must include at least one lowercase letter")
        );
        assert_eq!(
            password_strength_error("nodigitshere"),
            Some("Password must include at least one uppercase letter")
        );
        assert_eq!(
            password_strength_error("NoNumbersHere"),
            Some("Password must include at least one number")
        );
        assert_eq!(password_strength_error("Sup3rSecret"), None);
    }
}
