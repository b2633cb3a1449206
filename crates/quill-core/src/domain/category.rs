use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::slugify;

/// Category entity - groups posts; managed by admins only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category, deriving the slug from its name.
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rename the category, re-deriving its slug.
    pub fn rename(&mut self, name: String, description: Option<String>) {
        self.slug = slugify(&name);
        self.name = name;
        self.description = description;
        self.updated_at = Utc::now();
    }
}
