use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub enum BookingStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "paid")]
    Paid,
    #[serde(rename = "confirmed")]
    Confirmed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub package_id: ObjectId,
    // Snapshot of the package at booking time, so the booking stays
    // readable after the package is renamed or removed.
    pub package_name: Option<String>,
    pub package_slug: Option<String>,
    pub package_type: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub message: Option<String>,
    pub start_date: NaiveDate,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    pub total_price: Option<f64>,
    pub status: Option<BookingStatus>,
    pub lang: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Required-field check run before anything touches the database.
    pub fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("full_name is required".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("email is required".to_string());
        }
        if self.adults == 0 {
            return Err("at least one adult guest is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
}
