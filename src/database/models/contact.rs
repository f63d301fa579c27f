use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{blank_to_none, require_text, FieldErrors, Validate};

/// One contact channel (email, github, telegram, ...).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub value: String,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Validate for ContactInput {
    fn normalized(self) -> Self {
        Self {
            kind: self.kind.trim().to_string(),
            value: self.value.trim().to_string(),
            url: blank_to_none(self.url),
            icon: blank_to_none(self.icon),
        }
    }

    fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "type", &self.kind);
        require_text(&mut errors, "value", &self.value);
        errors
    }
}
