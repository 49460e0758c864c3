use actix_web::{cookie::Cookie, web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::mongo::database_name;
use crate::middleware::auth::{Claims, AUTH_COOKIE};
use crate::models::account::{User, UserSession};

pub const USERS: &str = "users";

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    auth_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

pub async fn signin(
    data: web::Data<Arc<Client>>,
    input: web::Json<SigninRequest>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> =
        client.database(&database_name()).collection(USERS);

    let credentials = input.into_inner();
    let filter = doc! { "email": &credentials.email };

    match collection.find_one(filter).await {
        Ok(Some(user)) => {
            if bcrypt::verify(&credentials.password, &user.password).unwrap_or(false) {
                let user_id = match user.id {
                    Some(id) => id,
                    None => {
                        eprintln!("User document without _id: {}", credentials.email);
                        return HttpResponse::InternalServerError().body("Failed to sign in.");
                    }
                };

                let role = match mongodb::bson::to_bson(&user.role) {
                    Ok(mongodb::bson::Bson::String(role)) => role,
                    _ => "editor".to_string(),
                };

                match generate_token(&user.email, user_id, &role) {
                    Ok(token) => {
                        let cookie = Cookie::build(AUTH_COOKIE, token.clone())
                            .path("/")
                            .http_only(true)
                            .finish();
                        HttpResponse::Ok()
                            .cookie(cookie)
                            .json(TokenResponse { auth_token: token })
                    }
                    Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
                }
            } else {
                HttpResponse::Unauthorized().body("Invalid credentials")
            }
        }
        Ok(None) => HttpResponse::Unauthorized().body("Invalid credentials"),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process signin")
        }
    }
}

pub async fn signout() -> impl Responder {
    // Expire the auth cookie immediately.
    let cookie = Cookie::build(AUTH_COOKIE, "")
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::ZERO)
        .finish();
    HttpResponse::Ok().cookie(cookie).body("Signed out")
}

pub async fn user_session(
    claims: web::ReqData<Claims>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> =
        client.database(&database_name()).collection(USERS);

    let user_id = match ObjectId::parse_str(&claims.user_id) {
        Ok(user_id) => user_id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match collection.find_one(doc! { "_id": user_id }).await {
        Ok(Some(user)) => {
            let session = UserSession {
                id: user.id.unwrap_or_default(),
                name: user.name,
                email: user.email,
                role: user.role,
            };
            HttpResponse::Ok().json(session)
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Failed to fetch user: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch user")
        }
    }
}

pub async fn forgot_password(
    data: web::Data<Arc<Client>>,
    input: web::Json<ForgotPasswordRequest>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> =
        client.database(&database_name()).collection(USERS);

    let email = input.into_inner().email;
    match collection.find_one(doc! { "email": &email }).await {
        Ok(Some(_)) => {
            let token: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect();
            let expires = Utc::now() + Duration::hours(1);

            let update = doc! { "$set": {
                "reset_token": &token,
                "reset_token_expires": mongodb::bson::to_bson(&expires)
                    .unwrap_or(mongodb::bson::Bson::Null),
            }};

            if let Err(err) = collection.update_one(doc! { "email": &email }, update).await {
                eprintln!("Failed to store reset token: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to process request");
            }

            if let Err(err) = crate::services::email_service::send_password_reset(&email, &token).await
            {
                eprintln!("Failed to send reset email: {}", err);
                return HttpResponse::InternalServerError().body("Failed to send reset email");
            }

            HttpResponse::Ok().body("Reset email sent")
        }
        // Same response for unknown addresses so the endpoint cannot be
        // used to probe which emails have accounts.
        Ok(None) => HttpResponse::Ok().body("Reset email sent"),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process request")
        }
    }
}

pub async fn reset_password(
    data: web::Data<Arc<Client>>,
    input: web::Json<ResetPasswordRequest>,
) -> impl Responder {
    let request = input.into_inner();
    if request.password.len() < 8 {
        return HttpResponse::BadRequest().body("Password must be at least 8 characters");
    }

    let client = data.into_inner();
    let collection: mongodb::Collection<User> =
        client.database(&database_name()).collection(USERS);

    match collection
        .find_one(doc! { "reset_token": &request.token })
        .await
    {
        Ok(Some(user)) => {
            let expired = user
                .reset_token_expires
                .map(|expiry| expiry < Utc::now())
                .unwrap_or(true);
            if expired {
                return HttpResponse::BadRequest().body("Reset token expired");
            }

            let hashed = match bcrypt::hash(&request.password, bcrypt::DEFAULT_COST) {
                Ok(hashed) => hashed,
                Err(err) => {
                    eprintln!("Failed to hash password: {:?}", err);
                    return HttpResponse::InternalServerError().body("Failed to reset password");
                }
            };

            let update = doc! {
                "$set": {
                    "password": hashed,
                    "updated_at": mongodb::bson::to_bson(&Utc::now())
                        .unwrap_or(mongodb::bson::Bson::Null),
                },
                "$unset": { "reset_token": "", "reset_token_expires": "" },
            };

            match collection
                .update_one(doc! { "reset_token": &request.token }, update)
                .await
            {
                Ok(_) => HttpResponse::Ok().body("Password updated"),
                Err(err) => {
                    eprintln!("Failed to update password: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to reset password")
                }
            }
        }
        Ok(None) => HttpResponse::BadRequest().body("Invalid reset token"),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process request")
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    );
    re.map(|re| re.is_match(email)).unwrap_or(false)
}

pub fn generate_token(
    email: &str,
    user_id: ObjectId,
    role: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let now = Utc::now();

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(24)).timestamp() as usize,
        user_id: user_id.to_string(),
        role: role.to_string(),
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_ref()))
}
