use actix_web::HttpResponse;
use serde::Deserialize;
use serde_json::json;

use crate::models::locale::Lang;
use crate::services::catalog_service::CatalogError;

pub mod admin;
pub mod auth;
pub mod booking;
pub mod category;
pub mod package;
pub mod tour;

#[derive(Debug, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

impl LangQuery {
    pub fn lang(&self) -> Lang {
        self.lang
            .as_deref()
            .map(Lang::from_code)
            .unwrap_or_default()
    }
}

pub fn catalog_error_response(err: CatalogError) -> HttpResponse {
    let message = err.to_string();
    match err {
        CatalogError::NotFound(_) => HttpResponse::NotFound().json(json!({ "error": message })),
        CatalogError::Conflict(_) => HttpResponse::Conflict().json(json!({ "error": message })),
        CatalogError::InvalidInput(_) | CatalogError::InvalidId(_) => {
            HttpResponse::BadRequest().json(json!({ "error": message }))
        }
        CatalogError::Database(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Internal server error" }))
        }
    }
}
