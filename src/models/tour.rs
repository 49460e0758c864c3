use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::locale::{Lang, LocalizedText};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Tour {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: LocalizedText,
    pub short_description: LocalizedText,
    pub description: LocalizedText,
    pub slug: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub category_id: ObjectId,
    /// Ids of the Packages owned by this tour, mirror of each Package's
    /// `tour_id`.
    #[serde(default)]
    pub packages: Vec<ObjectId>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TourView {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub slug: String,
    pub images: Vec<String>,
    pub category_id: ObjectId,
    pub packages: Vec<ObjectId>,
}

impl Tour {
    pub fn localize(&self, lang: Lang) -> TourView {
        TourView {
            id: self.id.unwrap_or_default(),
            title: self.title.resolve(lang).to_string(),
            short_description: self.short_description.resolve(lang).to_string(),
            description: self.description.resolve(lang).to_string(),
            slug: self.slug.clone(),
            images: self.images.clone(),
            category_id: self.category_id,
            packages: self.packages.clone(),
        }
    }
}
