use reqwest;
use serde::{Deserialize, Serialize};
use std::env;

use crate::models::booking::Booking;

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridEmail {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridPersonalization {
    pub to: Vec<SendGridEmail>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridRequest {
    pub personalizations: Vec<SendGridPersonalization>,
    pub from: SendGridEmail,
    pub subject: String,
    pub content: Vec<SendGridContent>,
}

#[derive(Debug)]
pub enum EmailError {
    EnvironmentError(String),
    RequestError(String),
    ApiError(String),
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailError::EnvironmentError(err) => write!(f, "Environment error: {}", err),
            EmailError::RequestError(err) => write!(f, "Request error: {}", err),
            EmailError::ApiError(err) => write!(f, "API error: {}", err),
        }
    }
}

impl std::error::Error for EmailError {}

async fn send_email(to: &str, subject: &str, body: String) -> Result<(), EmailError> {
    let api_key = env::var("SENDGRID_API_KEY")
        .map_err(|_| EmailError::EnvironmentError("SENDGRID_API_KEY not set".to_string()))?;
    let from_email = env::var("BOOKINGS_FROM_EMAIL")
        .map_err(|_| EmailError::EnvironmentError("BOOKINGS_FROM_EMAIL not set".to_string()))?;

    let request = SendGridRequest {
        personalizations: vec![SendGridPersonalization {
            to: vec![SendGridEmail {
                email: to.to_string(),
            }],
        }],
        from: SendGridEmail { email: from_email },
        subject: subject.to_string(),
        content: vec![SendGridContent {
            content_type: "text/plain".to_string(),
            value: body,
        }],
    };

    let client = reqwest::Client::new();
    let response = client
        .post("https://api.sendgrid.com/v3/mail/send")
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .map_err(|e| EmailError::RequestError(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(EmailError::ApiError(format!("{}: {}", status, text)));
    }

    Ok(())
}

/// Notifies the back office and confirms to the customer. Callers treat a
/// failure as best-effort: the booking is already stored.
pub async fn send_booking_notification(booking: &Booking) -> Result<(), EmailError> {
    let notify_email = env::var("BOOKINGS_NOTIFY_EMAIL")
        .map_err(|_| EmailError::EnvironmentError("BOOKINGS_NOTIFY_EMAIL not set".to_string()))?;

    let package = booking
        .package_name
        .as_deref()
        .unwrap_or("(unknown package)");
    let body = format!(
        "New booking for {}\n\nName: {}\nEmail: {}\nPhone: {}\nStart date: {}\nAdults: {}\nChildren: {}\nMessage: {}\n",
        package,
        booking.full_name,
        booking.email,
        booking.phone.as_deref().unwrap_or("-"),
        booking.start_date,
        booking.adults,
        booking.children,
        booking.message.as_deref().unwrap_or("-"),
    );

    send_email(&notify_email, &format!("New booking: {}", package), body).await?;

    let confirmation = format!(
        "Hello {},\n\nWe received your booking request for {} starting {}. Our team will be in touch shortly to confirm availability.\n\nAtlas Tours",
        booking.full_name, package, booking.start_date,
    );
    send_email(
        &booking.email,
        "We received your booking request",
        confirmation,
    )
    .await
}

pub async fn send_password_reset(to: &str, token: &str) -> Result<(), EmailError> {
    let body = format!(
        "A password reset was requested for your Atlas Tours admin account.\n\nReset token: {}\n\nThe token expires in one hour. If you did not request this, ignore this email.\n",
        token
    );
    send_email(to, "Atlas Tours password reset", body).await
}
