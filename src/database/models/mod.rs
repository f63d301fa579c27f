pub mod contact;
pub mod profile;
pub mod project;
pub mod user;

pub use contact::{Contact, ContactInput};
pub use profile::{Profile, ProfileInput};
pub use project::{Project, ProjectInput};
pub use user::User;

use std::collections::HashMap;

/// Field name -> client-facing problem description.
pub type FieldErrors = HashMap<String, String>;

/// Shape checks for request payloads, run before anything reaches the database.
pub trait Validate: Sized {
    /// Trims text and drops blank optional values.
    fn normalized(self) -> Self;

    fn field_errors(&self) -> FieldErrors;
}

pub(crate) fn require_text(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), "This field is required".to_string());
    }
}

/// Admin forms submit empty strings for untouched optional inputs.
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Drops blank entries from string lists such as skills and technologies.
pub(crate) fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
