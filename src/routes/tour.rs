use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::db::mongo::database_name;
use crate::models::package::{PackageView, TourPackage};
use crate::models::tour::{Tour, TourView};
use crate::routes::{catalog_error_response, LangQuery};
use crate::services::catalog_service::{parse_object_id, CatalogService, PACKAGES, TOURS};

/*
    GET /api/tours?lang=
*/
pub async fn get_tours(
    data: web::Data<Arc<Client>>,
    query: web::Query<LangQuery>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Tour> =
        client.database(&database_name()).collection(TOURS);

    match collection.find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Tour>>().await {
            Ok(tours) => {
                let lang = query.lang();
                let views: Vec<TourView> = tours.iter().map(|t| t.localize(lang)).collect();
                HttpResponse::Ok().json(views)
            }
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect tours.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find tours.")
        }
    }
}

/*
    GET /api/tours/{slug}?lang=
*/
pub async fn get_tour_by_slug(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    query: web::Query<LangQuery>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Tour> =
        client.database(&database_name()).collection(TOURS);

    match collection.find_one(doc! { "slug": path.into_inner() }).await {
        Ok(Some(tour)) => HttpResponse::Ok().json(tour.localize(query.lang())),
        Ok(None) => HttpResponse::NotFound().body("Tour not found"),
        Err(err) => {
            eprintln!("Failed to retrieve tour: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve tour")
        }
    }
}

/*
    GET /api/tours/{slug}/packages?lang=
*/
pub async fn get_tour_packages(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    query: web::Query<LangQuery>,
) -> impl Responder {
    let client = data.into_inner();
    let db = client.database(&database_name());
    let tours: mongodb::Collection<Tour> = db.collection(TOURS);

    let tour = match tours.find_one(doc! { "slug": path.into_inner() }).await {
        Ok(Some(tour)) => tour,
        Ok(None) => return HttpResponse::NotFound().body("Tour not found"),
        Err(err) => {
            eprintln!("Failed to retrieve tour: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to retrieve tour");
        }
    };

    let packages: mongodb::Collection<TourPackage> = db.collection(PACKAGES);
    match packages
        .find(doc! { "tour_id": tour.id.unwrap_or_default() })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<TourPackage>>().await {
            Ok(packages) => {
                let lang = query.lang();
                let views: Vec<PackageView> = packages.iter().map(|p| p.localize(lang)).collect();
                HttpResponse::Ok().json(views)
            }
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect packages.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find packages.")
        }
    }
}

/*
    POST /api/admin/tours
*/
pub async fn create_tour(
    catalog: web::Data<CatalogService>,
    input: web::Json<Tour>,
) -> impl Responder {
    match catalog.create_tour(input.into_inner()).await {
        Ok(tour) => HttpResponse::Ok().json(tour),
        Err(err) => catalog_error_response(err),
    }
}

/*
    PUT /api/admin/tours/{id}
*/
pub async fn update_tour(
    path: web::Path<String>,
    catalog: web::Data<CatalogService>,
    input: web::Json<Tour>,
) -> impl Responder {
    let id = match parse_object_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return catalog_error_response(err),
    };

    match catalog.update_tour(id, input.into_inner()).await {
        Ok(tour) => HttpResponse::Ok().json(tour),
        Err(err) => catalog_error_response(err),
    }
}

/*
    DELETE /api/admin/tours/{id}
*/
pub async fn delete_tour(
    path: web::Path<String>,
    catalog: web::Data<CatalogService>,
) -> impl Responder {
    let id = match parse_object_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return catalog_error_response(err),
    };

    match catalog.delete_tour(id).await {
        Ok(tour) => HttpResponse::Ok().json(tour),
        Err(err) => catalog_error_response(err),
    }
}
