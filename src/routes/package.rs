use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::db::mongo::database_name;
use crate::models::package::TourPackage;
use crate::routes::{catalog_error_response, LangQuery};
use crate::services::catalog_service::{parse_object_id, CatalogService, PACKAGES};

/*
    GET /api/packages/{slug}?lang=
*/
pub async fn get_package_by_slug(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    query: web::Query<LangQuery>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<TourPackage> =
        client.database(&database_name()).collection(PACKAGES);

    match collection.find_one(doc! { "slug": path.into_inner() }).await {
        Ok(Some(pkg)) => HttpResponse::Ok().json(pkg.localize(query.lang())),
        Ok(None) => HttpResponse::NotFound().body("Package not found"),
        Err(err) => {
            eprintln!("Failed to retrieve package: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve package")
        }
    }
}

/*
    POST /api/admin/packages
*/
pub async fn create_package(
    catalog: web::Data<CatalogService>,
    input: web::Json<TourPackage>,
) -> impl Responder {
    match catalog.create_package(input.into_inner()).await {
        Ok(pkg) => HttpResponse::Ok().json(pkg),
        Err(err) => catalog_error_response(err),
    }
}

/*
    PUT /api/admin/packages/{id}
*/
pub async fn update_package(
    path: web::Path<String>,
    catalog: web::Data<CatalogService>,
    input: web::Json<TourPackage>,
) -> impl Responder {
    let id = match parse_object_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return catalog_error_response(err),
    };

    match catalog.update_package(id, input.into_inner()).await {
        Ok(pkg) => HttpResponse::Ok().json(pkg),
        Err(err) => catalog_error_response(err),
    }
}

/*
    DELETE /api/admin/packages/{id}
*/
pub async fn delete_package(
    path: web::Path<String>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    let id = match parse_object_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return catalog_error_response(err),
    };

    match catalog.delete_package(id).await {
        Ok(pkg) => HttpResponse::Ok().json(pkg),
        Err(err) => catalog_error_response(err),
    }
}
