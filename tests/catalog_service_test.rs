use std::sync::{Arc, Mutex};
use std::time::Duration;

use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ClientOptions;
use mongodb::Client;
use serial_test::serial;

use atlas_tours_api::models::category::Category;
use atlas_tours_api::models::locale::LocalizedText;
use atlas_tours_api::models::package::TourPackage;
use atlas_tours_api::models::tour::Tour;
use atlas_tours_api::services::catalog_service::{
    CatalogError, CatalogService, ReconcileReport, CATEGORIES, PACKAGES, TOURS,
};
use atlas_tours_api::services::image_service::{ImageService, MediaError, MediaOperations};

// These tests run against a local MongoDB (MONGODB_URI or localhost) and
// skip themselves when none is reachable.
async fn test_client() -> Option<Arc<Client>> {
    let uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let mut options = ClientOptions::parse(&uri).await.ok()?;
    options.connect_timeout = Some(Duration::from_secs(2));
    options.server_selection_timeout = Some(Duration::from_secs(2));

    let client = Client::with_options(options).ok()?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .ok()?;
    Some(Arc::new(client))
}

struct RecordingStore {
    deleted: Arc<Mutex<Vec<String>>>,
}

impl MediaOperations for RecordingStore {
    async fn delete_object(&self, object: &str) -> Result<(), MediaError> {
        self.deleted.lock().unwrap().push(object.to_string());
        Ok(())
    }
}

async fn service_for(
    client: &Arc<Client>,
    db_name: &str,
    cascade_delete: bool,
) -> (CatalogService<RecordingStore>, Arc<Mutex<Vec<String>>>) {
    client.database(db_name).drop().await.ok();

    let deleted = Arc::new(Mutex::new(Vec::new()));
    let store = RecordingStore {
        deleted: deleted.clone(),
    };
    let images = ImageService::with_store(store, "trips");
    let service = CatalogService::with_options(client.clone(), db_name, cascade_delete, Some(images));
    (service, deleted)
}

fn text(en: &str) -> LocalizedText {
    LocalizedText {
        en: en.to_string(),
        fr: None,
        es: None,
    }
}

fn category(slug: &str) -> Category {
    Category {
        id: None,
        title: text("Desert Tours"),
        short_description: text("Dunes and camps"),
        description: text("Long form"),
        slug: slug.to_string(),
        images: Vec::new(),
        tours: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

fn tour(slug: &str, category_id: ObjectId) -> Tour {
    Tour {
        id: None,
        title: text("3-Day Sahara"),
        short_description: text("Three days in the dunes"),
        description: text("Long form"),
        slug: slug.to_string(),
        images: Vec::new(),
        category_id,
        packages: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

fn package(slug: &str, tour_id: ObjectId) -> TourPackage {
    TourPackage {
        id: None,
        title: text("Shared Camp"),
        short_description: text("Shared desert camp"),
        description: text("Long form"),
        slug: slug.to_string(),
        itinerary: Vec::new(),
        tours_included: Vec::new(),
        tours_excluded: Vec::new(),
        share_trip: 10,
        private_trip: 4,
        departure_time: None,
        tour_id,
        images: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

async fn stored_category(client: &Arc<Client>, db_name: &str, id: ObjectId) -> Category {
    client
        .database(db_name)
        .collection::<Category>(CATEGORIES)
        .find_one(doc! { "_id": id })
        .await
        .expect("find category")
        .expect("category present")
}

#[actix_rt::test]
#[serial]
async fn test_create_tour_appends_id_to_owning_category_once() {
    let Some(client) = test_client().await else {
        eprintln!("MongoDB not available, skipping");
        return;
    };
    let db_name = "atlas-tours-test-create";
    let (service, _) = service_for(&client, db_name, false).await;

    let cat = service.create_category(category("desert-tours")).await.unwrap();
    let cat_id = cat.id.unwrap();

    let first = service.create_tour(tour("3-day-sahara", cat_id)).await.unwrap();
    let first_id = first.id.unwrap();

    let stored = stored_category(&client, db_name, cat_id).await;
    assert_eq!(
        stored.tours.iter().filter(|id| **id == first_id).count(),
        1
    );

    let second = service.create_tour(tour("coast-loop", cat_id)).await.unwrap();
    let stored = stored_category(&client, db_name, cat_id).await;
    assert_eq!(stored.tours.len(), 2);
    assert!(stored.tours.contains(&second.id.unwrap()));
}

#[actix_rt::test]
#[serial]
async fn test_create_tour_requires_existing_category() {
    let Some(client) = test_client().await else {
        eprintln!("MongoDB not available, skipping");
        return;
    };
    let (service, _) = service_for(&client, "atlas-tours-test-missing-parent", false).await;

    let result = service.create_tour(tour("3-day-sahara", ObjectId::new())).await;
    assert!(matches!(result, Err(CatalogError::NotFound(_))));
}

#[actix_rt::test]
#[serial]
async fn test_slug_conflicts_allow_keeping_own_slug() {
    let Some(client) = test_client().await else {
        eprintln!("MongoDB not available, skipping");
        return;
    };
    let (service, _) = service_for(&client, "atlas-tours-test-slugs", false).await;

    let first = service.create_category(category("desert-tours")).await.unwrap();

    let duplicate = service.create_category(category("desert-tours")).await;
    assert!(matches!(duplicate, Err(CatalogError::Conflict(_))));

    // Unchanged slug on update is not a collision.
    let kept = service
        .update_category(first.id.unwrap(), category("desert-tours"))
        .await;
    assert!(kept.is_ok());

    let other = service.create_category(category("coast-tours")).await.unwrap();
    let stolen = service
        .update_category(other.id.unwrap(), category("desert-tours"))
        .await;
    assert!(matches!(stolen, Err(CatalogError::Conflict(_))));
}

#[actix_rt::test]
#[serial]
async fn test_delete_tour_detaches_category_and_leaves_orphan_package() {
    let Some(client) = test_client().await else {
        eprintln!("MongoDB not available, skipping");
        return;
    };
    let db_name = "atlas-tours-test-delete";
    let (service, _) = service_for(&client, db_name, false).await;

    let cat = service.create_category(category("desert-tours")).await.unwrap();
    let cat_id = cat.id.unwrap();
    let sahara = service.create_tour(tour("3-day-sahara", cat_id)).await.unwrap();
    let tour_id = sahara.id.unwrap();
    let camp = service.create_package(package("shared-camp", tour_id)).await.unwrap();

    service.delete_tour(tour_id).await.unwrap();

    let stored = stored_category(&client, db_name, cat_id).await;
    assert!(!stored.tours.contains(&tour_id));

    // Shallow delete: the package survives as a documented orphan, its
    // parent reference now dangling.
    let orphan = client
        .database(db_name)
        .collection::<TourPackage>(PACKAGES)
        .find_one(doc! { "_id": camp.id.unwrap() })
        .await
        .expect("find package")
        .expect("package still present");
    assert_eq!(orphan.tour_id, tour_id);

    // Deleting again is NotFound and does not re-mutate the category.
    let again = service.delete_tour(tour_id).await;
    assert!(matches!(again, Err(CatalogError::NotFound(_))));
    let stored = stored_category(&client, db_name, cat_id).await;
    assert!(stored.tours.is_empty());
}

#[actix_rt::test]
#[serial]
async fn test_reconcile_rebuilds_references_and_is_idempotent() {
    let Some(client) = test_client().await else {
        eprintln!("MongoDB not available, skipping");
        return;
    };
    let db_name = "atlas-tours-test-reconcile";
    let (service, _) = service_for(&client, db_name, false).await;

    let cat = service.create_category(category("desert-tours")).await.unwrap();
    let cat_id = cat.id.unwrap();
    let first = service.create_tour(tour("3-day-sahara", cat_id)).await.unwrap();
    let second = service.create_tour(tour("coast-loop", cat_id)).await.unwrap();

    // Simulate a torn two-step write: one id missing, one dangling.
    client
        .database(db_name)
        .collection::<Category>(CATEGORIES)
        .update_one(
            doc! { "_id": cat_id },
            doc! { "$set": { "tours": vec![first.id.unwrap(), ObjectId::new()] } },
        )
        .await
        .unwrap();

    let report = service.reconcile_references().await.unwrap();
    assert_eq!(report.categories_repaired, 1);

    let stored = stored_category(&client, db_name, cat_id).await;
    assert_eq!(stored.tours.len(), 2);
    assert!(stored.tours.contains(&first.id.unwrap()));
    assert!(stored.tours.contains(&second.id.unwrap()));

    let second_run = service.reconcile_references().await.unwrap();
    assert_eq!(second_run, ReconcileReport::default());
}

#[actix_rt::test]
#[serial]
async fn test_delete_category_releases_images_through_injected_store() {
    let Some(client) = test_client().await else {
        eprintln!("MongoDB not available, skipping");
        return;
    };
    let db_name = "atlas-tours-test-images";
    let (service, deleted) = service_for(&client, db_name, false).await;

    let mut input = category("desert-tours");
    input.images = vec![
        "https://host/folder/abc123.jpg".to_string(),
        "https://host/folder/bad".to_string(),
    ];
    let cat = service.create_category(input).await.unwrap();

    service.delete_category(cat.id.unwrap()).await.unwrap();

    assert_eq!(
        *deleted.lock().unwrap(),
        vec!["trips/abc123".to_string(), "trips/bad".to_string()]
    );

    let gone = client
        .database(db_name)
        .collection::<Category>(CATEGORIES)
        .find_one(doc! { "slug": "desert-tours" })
        .await
        .unwrap();
    assert!(gone.is_none());
}

#[actix_rt::test]
#[serial]
async fn test_cascade_flag_removes_child_tours() {
    let Some(client) = test_client().await else {
        eprintln!("MongoDB not available, skipping");
        return;
    };
    let db_name = "atlas-tours-test-cascade";
    let (service, _) = service_for(&client, db_name, true).await;

    let cat = service.create_category(category("desert-tours")).await.unwrap();
    let cat_id = cat.id.unwrap();
    service.create_tour(tour("3-day-sahara", cat_id)).await.unwrap();

    service.delete_category(cat_id).await.unwrap();

    let remaining = client
        .database(db_name)
        .collection::<Tour>(TOURS)
        .find_one(doc! { "slug": "3-day-sahara" })
        .await
        .unwrap();
    assert!(remaining.is_none());
}
