use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{blank_to_none, clean_list, require_text, FieldErrors, Validate};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub technologies: Vec<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/projects` and `PUT /api/projects/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
}

impl Validate for ProjectInput {
    fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description,
            image_url: blank_to_none(self.image_url),
            technologies: clean_list(self.technologies),
            github_url: blank_to_none(self.github_url),
            live_url: blank_to_none(self.live_url),
        }
    }

    fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title);
        require_text(&mut errors, "description", &self.description);
        errors
    }
}
