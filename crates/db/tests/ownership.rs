//! Every owner-scoped query treats another user's row as missing.

use modiste_core::roles::ROLE_USER;
use modiste_db::models::product::{CreateProduct, UpdateProduct};
use modiste_db::models::project::{AutoSaveProject, CreateProject, UpdateProject};
use modiste_db::models::user::CreateUser;
use modiste_db::repositories::{ProductRepo, ProjectRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "x".to_string(),
            name: "Owner".to_string(),
            role: ROLE_USER.to_string(),
            credits: 0,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_is_invisible_to_other_users(pool: PgPool) {
    let alice = seed_user(&pool, "alice@test.com").await;
    let mallory = seed_user(&pool, "mallory@test.com").await;

    let project = ProjectRepo::create(
        &pool,
        &CreateProject {
            owner_id: alice,
            name: "Spring lookbook".into(),
            description: Some("private".into()),
            status: "draft".into(),
            nodes: json!([{ "id": "n1", "type": "prompt" }]),
            edges: json!([]),
            viewport: json!({ "x": 0, "y": 0, "zoom": 1 }),
        },
    )
    .await
    .unwrap();

    assert!(ProjectRepo::find_by_id(&pool, project.id, mallory).await.unwrap().is_none());
    assert!(!ProjectRepo::exists_for_owner(&pool, project.id, mallory).await.unwrap());

    let update = UpdateProject {
        name: Some("hijacked".into()),
        ..Default::default()
    };
    assert!(ProjectRepo::update(&pool, project.id, mallory, &update).await.unwrap().is_none());

    let save = AutoSaveProject {
        nodes: json!([]),
        edges: json!([]),
        viewport: None,
    };
    assert!(ProjectRepo::auto_save(&pool, project.id, mallory, &save).await.unwrap().is_none());
    assert!(ProjectRepo::duplicate(&pool, project.id, mallory, "copy").await.unwrap().is_none());
    assert!(!ProjectRepo::soft_delete(&pool, project.id, mallory).await.unwrap());
    assert_eq!(ProjectRepo::count_for_owner(&pool, mallory, None).await.unwrap(), 0);

    // Nothing above touched Alice's project.
    let intact = ProjectRepo::find_by_id(&pool, project.id, alice).await.unwrap().unwrap();
    assert_eq!(intact.name, "Spring lookbook");
    assert_eq!(intact.nodes, json!([{ "id": "n1", "type": "prompt" }]));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_copies_graph_as_draft(pool: PgPool) {
    let owner = seed_user(&pool, "dup@test.com").await;
    let source = ProjectRepo::create(
        &pool,
        &CreateProject {
            owner_id: owner,
            name: "Original".into(),
            description: None,
            status: "published".into(),
            nodes: json!([{ "id": "a" }, { "id": "b" }]),
            edges: json!([{ "source": "a", "target": "b" }]),
            viewport: json!({ "x": 10, "y": 20, "zoom": 2 }),
        },
    )
    .await
    .unwrap();

    let copy = ProjectRepo::duplicate(&pool, source.id, owner, "Original (Copy)")
        .await
        .unwrap()
        .unwrap();

    assert_ne!(copy.id, source.id);
    assert_eq!(copy.name, "Original (Copy)");
    assert_eq!(copy.status, "draft");
    assert_eq!(copy.nodes, source.nodes);
    assert_eq!(copy.edges, source.edges);
    assert_eq!(copy.viewport, source.viewport);

    let listed = ProjectRepo::list_for_owner(&pool, owner, None, 20, 0).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|p| p.node_count == 2));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_auto_save_overwrites_and_advances_timestamp(pool: PgPool) {
    let owner = seed_user(&pool, "autosave@test.com").await;
    let project = ProjectRepo::create(
        &pool,
        &CreateProject {
            owner_id: owner,
            name: "Canvas".into(),
            description: None,
            status: "draft".into(),
            nodes: json!([]),
            edges: json!([]),
            viewport: json!({ "x": 0, "y": 0, "zoom": 1 }),
        },
    )
    .await
    .unwrap();

    let save = AutoSaveProject {
        nodes: json!([{ "id": "n1" }]),
        edges: json!([]),
        viewport: None,
    };
    let first = ProjectRepo::auto_save(&pool, project.id, owner, &save).await.unwrap().unwrap();
    let second = ProjectRepo::auto_save(&pool, project.id, owner, &save).await.unwrap().unwrap();

    assert!(first.last_modified >= project.last_modified);
    assert!(second.last_modified > first.last_modified);

    let stored = ProjectRepo::find_by_id(&pool, project.id, owner).await.unwrap().unwrap();
    assert_eq!(stored.nodes, json!([{ "id": "n1" }]));
    assert_eq!(stored.viewport, json!({ "x": 0, "y": 0, "zoom": 1 }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_product_is_invisible_to_other_users(pool: PgPool) {
    let alice = seed_user(&pool, "alice-p@test.com").await;
    let mallory = seed_user(&pool, "mallory-p@test.com").await;

    let product = ProductRepo::create(
        &pool,
        &CreateProduct {
            owner_id: alice,
            name: "Trench".into(),
            product_type: "outerwear".into(),
            category: None,
            description: None,
            image_url: "/uploads/products/trench.png".into(),
            width: None,
            height: None,
            tags: vec![],
        },
    )
    .await
    .unwrap();

    assert!(ProductRepo::find_by_id(&pool, product.id, mallory).await.unwrap().is_none());
    let update = UpdateProduct {
        name: Some("mine now".into()),
        ..Default::default()
    };
    assert!(ProductRepo::update(&pool, product.id, mallory, &update).await.unwrap().is_none());
    assert!(!ProductRepo::deactivate(&pool, product.id, mallory).await.unwrap());
    assert!(ProductRepo::find_by_id(&pool, product.id, alice).await.unwrap().unwrap().is_active);
}
