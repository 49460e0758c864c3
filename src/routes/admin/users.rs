use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::WriteError;
use mongodb::Client;
use std::sync::Arc;

use crate::db::mongo::database_name;
use crate::models::account::{User, UserSession};
use crate::routes::auth::{is_valid_email, USERS};
use crate::routes::catalog_error_response;
use crate::services::catalog_service::parse_object_id;

/*
    GET /api/admin/users
*/
pub async fn list_users(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> =
        client.database(&database_name()).collection(USERS);

    match collection.find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<User>>().await {
            Ok(users) => {
                // Never return password hashes, even to admins.
                let sessions: Vec<UserSession> = users
                    .into_iter()
                    .map(|user| UserSession {
                        id: user.id.unwrap_or_default(),
                        name: user.name,
                        email: user.email,
                        role: user.role,
                    })
                    .collect();
                HttpResponse::Ok().json(sessions)
            }
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect users.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find users.")
        }
    }
}

/*
    POST /api/admin/users
*/
pub async fn create_user(data: web::Data<Arc<Client>>, input: web::Json<User>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> =
        client.database(&database_name()).collection(USERS);

    let mut user = input.into_inner();
    if !is_valid_email(&user.email) {
        return HttpResponse::BadRequest().body("Invalid email address");
    }
    if user.password.len() < 8 {
        return HttpResponse::BadRequest().body("Password must be at least 8 characters");
    }

    let curr_time = Utc::now();
    user.id = None;
    user.password = match bcrypt::hash(&user.password, bcrypt::DEFAULT_COST) {
        Ok(hashed) => hashed,
        Err(err) => {
            eprintln!("Failed to hash password: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create user");
        }
    };
    user.reset_token = None;
    user.reset_token_expires = None;
    user.created_at = Some(curr_time);
    user.updated_at = Some(curr_time);

    match collection.insert_one(&user).await {
        Ok(result) => {
            let session = UserSession {
                id: result.inserted_id.as_object_id().unwrap_or_default(),
                name: user.name,
                email: user.email,
                role: user.role,
            };
            HttpResponse::Ok().json(session)
        }
        Err(err) => match *err.kind {
            mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
                WriteError { code: 11000, .. },
            )) => HttpResponse::Conflict().body("User already exists"),
            _ => {
                eprintln!("Failed to insert document: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to create user")
            }
        },
    }
}

/*
    DELETE /api/admin/users/{id}
*/
pub async fn delete_user(path: web::Path<String>, data: web::Data<Arc<Client>>) -> impl Responder {
    let id = match parse_object_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return catalog_error_response(err),
    };

    let client = data.into_inner();
    let collection: mongodb::Collection<User> =
        client.database(&database_name()).collection(USERS);

    match collection.delete_one(doc! { "_id": id }).await {
        Ok(result) if result.deleted_count == 0 => HttpResponse::NotFound().body("User not found"),
        Ok(_) => HttpResponse::Ok().body("User deleted"),
        Err(err) => {
            eprintln!("Failed to delete document: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to delete user")
        }
    }
}
