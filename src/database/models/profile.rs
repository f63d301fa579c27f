use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{blank_to_none, clean_list, require_text, FieldErrors, Validate};

/// The single site profile row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub image_url: Option<String>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Validate for ProfileInput {
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            title: self.title.trim().to_string(),
            bio: self.bio,
            image_url: blank_to_none(self.image_url),
            skills: clean_list(self.skills),
        }
    }

    fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "name", &self.name);
        require_text(&mut errors, "title", &self.title);
        errors
    }
}
