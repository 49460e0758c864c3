use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::locale::{Lang, LocalizedText};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItineraryDay {
    pub title: LocalizedText,
    pub description: LocalizedText,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TourPackage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: LocalizedText,
    pub short_description: LocalizedText,
    pub description: LocalizedText,
    pub slug: String,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    #[serde(default)]
    pub tours_included: Vec<LocalizedText>,
    #[serde(default)]
    pub tours_excluded: Vec<LocalizedText>,
    pub share_trip: u32,
    pub private_trip: u32,
    pub departure_time: Option<String>,
    pub tour_id: ObjectId,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ItineraryDayView {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct PackageView {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub slug: String,
    pub itinerary: Vec<ItineraryDayView>,
    pub tours_included: Vec<String>,
    pub tours_excluded: Vec<String>,
    pub share_trip: u32,
    pub private_trip: u32,
    pub departure_time: Option<String>,
    pub tour_id: ObjectId,
    pub images: Vec<String>,
}

impl TourPackage {
    pub fn localize(&self, lang: Lang) -> PackageView {
        PackageView {
            id: self.id.unwrap_or_default(),
            title: self.title.resolve(lang).to_string(),
            short_description: self.short_description.resolve(lang).to_string(),
            description: self.description.resolve(lang).to_string(),
            slug: self.slug.clone(),
            itinerary: self
                .itinerary
                .iter()
                .map(|day| ItineraryDayView {
                    title: day.title.resolve(lang).to_string(),
                    description: day.description.resolve(lang).to_string(),
                })
                .collect(),
            tours_included: self
                .tours_included
                .iter()
                .map(|t| t.resolve(lang).to_string())
                .collect(),
            tours_excluded: self
                .tours_excluded
                .iter()
                .map(|t| t.resolve(lang).to_string())
                .collect(),
            share_trip: self.share_trip,
            private_trip: self.private_trip,
            departure_time: self.departure_time.clone(),
            tour_id: self.tour_id,
            images: self.images.clone(),
        }
    }
}
