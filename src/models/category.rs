use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::locale::{Lang, LocalizedText};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Category {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: LocalizedText,
    pub short_description: LocalizedText,
    pub description: LocalizedText,
    pub slug: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Ids of the Tours owned by this category. Kept in sync with each
    /// Tour's `category_id` by the catalog service.
    #[serde(default)]
    pub tours: Vec<ObjectId>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Presentation shape with the localized fields already resolved.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub slug: String,
    pub images: Vec<String>,
    pub tours: Vec<ObjectId>,
}

impl Category {
    pub fn localize(&self, lang: Lang) -> CategoryView {
        CategoryView {
            id: self.id.unwrap_or_default(),
            title: self.title.resolve(lang).to_string(),
            short_description: self.short_description.resolve(lang).to_string(),
            description: self.description.resolve(lang).to_string(),
            slug: self.slug.clone(),
            images: self.images.clone(),
            tours: self.tours.clone(),
        }
    }
}
