use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::db::mongo::database_name;
use crate::models::booking::{Booking, BookingStatus, BookingStatusUpdate};
use crate::models::locale::Lang;
use crate::models::package::TourPackage;
use crate::routes::auth::is_valid_email;
use crate::routes::catalog_error_response;
use crate::services::catalog_service::{parse_object_id, PACKAGES};
use crate::services::email_service;

const BOOKINGS: &str = "bookings";

/// Trip type stored on the booking snapshot. The customer's choice is kept
/// only when the package actually offers that capacity; otherwise the
/// package decides.
pub fn snapshot_package_type(
    requested: Option<&str>,
    share_trip: u32,
    private_trip: u32,
) -> &'static str {
    match requested {
        Some("private") if private_trip > 0 => "private",
        Some("share") if share_trip > 0 => "share",
        _ => {
            if share_trip > 0 {
                "share"
            } else {
                "private"
            }
        }
    }
}

/*
    POST /api/bookings (public)
*/
pub async fn create_booking(
    data: web::Data<Arc<Client>>,
    input: web::Json<Booking>,
) -> impl Responder {
    let mut booking = input.into_inner();

    if let Err(msg) = booking.validate() {
        return HttpResponse::BadRequest().body(msg);
    }
    if !is_valid_email(&booking.email) {
        return HttpResponse::BadRequest().body("Invalid email address");
    }

    let client = data.into_inner();
    let db = client.database(&database_name());
    let packages: mongodb::Collection<TourPackage> = db.collection(PACKAGES);

    let package = match packages.find_one(doc! { "_id": booking.package_id }).await {
        Ok(Some(package)) => package,
        Ok(None) => return HttpResponse::NotFound().body("Package not found"),
        Err(err) => {
            eprintln!("Failed to retrieve package: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to process booking");
        }
    };

    // Snapshot the package so the booking survives later catalog edits.
    let lang = Lang::from_code(booking.lang.as_deref().unwrap_or("en"));
    booking.lang = Some(lang.as_code().to_string());
    booking.package_name = Some(package.title.resolve(lang).to_string());
    booking.package_slug = Some(package.slug.clone());
    booking.package_type = Some(
        snapshot_package_type(
            booking.package_type.as_deref(),
            package.share_trip,
            package.private_trip,
        )
        .to_string(),
    );

    let curr_time = Utc::now();
    booking.id = None;
    booking.status = Some(BookingStatus::Pending);
    booking.created_at = Some(curr_time);
    booking.updated_at = Some(curr_time);

    let collection: mongodb::Collection<Booking> = db.collection(BOOKINGS);
    match collection.insert_one(&booking).await {
        Ok(result) => {
            booking.id = result.inserted_id.as_object_id();

            // Notification is best-effort; the booking is already stored.
            if let Err(err) = email_service::send_booking_notification(&booking).await {
                log::warn!("Booking stored but notification email failed: {}", err);
            }

            HttpResponse::Ok().json(booking)
        }
        Err(err) => {
            eprintln!("Failed to insert document: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to submit booking.")
        }
    }
}

/*
    GET /api/admin/bookings
*/
pub async fn get_bookings(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Booking> =
        client.database(&database_name()).collection(BOOKINGS);

    match collection
        .find(doc! {})
        .sort(doc! { "created_at": -1 })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Booking>>().await {
            Ok(bookings) => HttpResponse::Ok().json(bookings),
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect bookings.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find bookings.")
        }
    }
}

/*
    PUT /api/admin/bookings/{id}/status
*/
pub async fn update_booking_status(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    input: web::Json<BookingStatusUpdate>,
) -> impl Responder {
    let id = match parse_object_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return catalog_error_response(err),
    };

    let client = data.into_inner();
    let collection: mongodb::Collection<Booking> =
        client.database(&database_name()).collection(BOOKINGS);

    let status = match mongodb::bson::to_bson(&input.status) {
        Ok(status) => status,
        Err(err) => {
            eprintln!("Failed to serialize status: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to update booking");
        }
    };

    let update = doc! { "$set": {
        "status": status,
        "updated_at": mongodb::bson::to_bson(&Utc::now()).unwrap_or(mongodb::bson::Bson::Null),
    }};

    match collection.update_one(doc! { "_id": id }, update).await {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().body("Booking not found")
        }
        Ok(_) => HttpResponse::Ok().body("Booking updated"),
        Err(err) => {
            eprintln!("Failed to update document: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update booking")
        }
    }
}

/*
    DELETE /api/admin/bookings/{id}
*/
pub async fn delete_booking(path: web::Path<String>, data: web::Data<Arc<Client>>) -> impl Responder {
    let id = match parse_object_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return catalog_error_response(err),
    };

    let client = data.into_inner();
    let collection: mongodb::Collection<Booking> =
        client.database(&database_name()).collection(BOOKINGS);

    match collection.delete_one(doc! { "_id": id }).await {
        Ok(result) if result.deleted_count == 0 => HttpResponse::NotFound().body("Booking not found"),
        Ok(_) => HttpResponse::Ok().body("Booking deleted"),
        Err(err) => {
            eprintln!("Failed to delete document: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to delete booking")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_type_honors_valid_choice() {
        assert_eq!(snapshot_package_type(Some("private"), 10, 4), "private");
        assert_eq!(snapshot_package_type(Some("share"), 10, 4), "share");
    }

    #[test]
    fn package_type_falls_back_to_capacity() {
        // Choice the package cannot serve is overridden.
        assert_eq!(snapshot_package_type(Some("private"), 10, 0), "share");
        assert_eq!(snapshot_package_type(Some("share"), 0, 4), "private");
        // No choice at all.
        assert_eq!(snapshot_package_type(None, 10, 4), "share");
        assert_eq!(snapshot_package_type(Some("luxury"), 0, 4), "private");
    }
}
