use api_types::expense::{ExpenseNew, ExpenseQuery, ExpenseUpdate};
use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{DEFAULT_CATEGORIES, Engine, EngineError, Page, Patch, Rule};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn count(db: &DatabaseConnection, sql: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(backend, sql.to_string()))
        .await
        .unwrap()
        .unwrap();
    row.try_get_by_index::<i64>(0).unwrap()
}

fn lunch(category_id: i32) -> ExpenseNew {
    ExpenseNew {
        title: "Lunch".to_string(),
        amount: 12.50,
        notes: None,
        category_id,
        date: None,
    }
}

#[tokio::test]
async fn create_update_and_delete_expense() {
    let (engine, db) = engine_with_db().await;
    let food = engine.create_category("Food & Dining").await.unwrap();

    let before = Utc::now();
    let created = engine.create_expense(lunch(food.id)).await.unwrap();
    assert_eq!(created.title, "Lunch");
    assert_eq!(created.amount, 12.50);
    assert_eq!(created.category, food);
    assert!(created.date >= before);

    let updated = engine
        .update_expense(
            created.id,
            ExpenseUpdate {
                amount: Patch::Present(15.00),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount, 15.00);
    assert_eq!(updated.title, "Lunch");
    assert_eq!(updated.date, created.date);
    assert_eq!(updated.category_id, food.id);

    engine.delete_expense(created.id).await.unwrap();
    assert_eq!(count(&db, "SELECT COUNT(*) FROM expenses").await, 0);
    assert!(matches!(
        engine.expense(created.id).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn expense_requires_existing_category() {
    let (engine, db) = engine_with_db().await;

    let err = engine.create_expense(lunch(42)).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("category 42".to_string()));
    assert_eq!(count(&db, "SELECT COUNT(*) FROM expenses").await, 0);
}

#[tokio::test]
async fn update_can_move_expense_and_clear_notes() {
    let (engine, _db) = engine_with_db().await;
    let food = engine.create_category("Food & Dining").await.unwrap();
    let travel = engine.create_category("Travel").await.unwrap();

    let mut input = lunch(food.id);
    input.notes = Some("with the team".to_string());
    let created = engine.create_expense(input).await.unwrap();

    let updated = engine
        .update_expense(
            created.id,
            ExpenseUpdate {
                category_id: Patch::Present(travel.id),
                notes: Patch::Present(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.category, travel);
    assert_eq!(updated.notes, None);

    let err = engine
        .update_expense(
            created.id,
            ExpenseUpdate {
                category_id: Patch::Present(999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert_eq!(engine.expense(created.id).await.unwrap().category, travel);
}

#[tokio::test]
async fn empty_update_leaves_expense_unchanged() {
    let (engine, _db) = engine_with_db().await;
    let food = engine.create_category("Food & Dining").await.unwrap();
    let created = engine.create_expense(lunch(food.id)).await.unwrap();

    let updated = engine
        .update_expense(created.id, ExpenseUpdate::default())
        .await
        .unwrap();
    assert_eq!(updated, created);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let food = engine.create_category("Food & Dining").await.unwrap();

    let mut input = lunch(food.id);
    input.title = "   ".to_string();
    match engine.create_expense(input).await {
        Err(EngineError::Validation(errors)) => {
            assert!(errors.contains("title", Rule::NotBlank));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_expenses_filters_by_category_and_pages() {
    let (engine, _db) = engine_with_db().await;
    let food = engine.create_category("Food & Dining").await.unwrap();
    let travel = engine.create_category("Travel").await.unwrap();

    for _ in 0..3 {
        engine.create_expense(lunch(food.id)).await.unwrap();
    }
    let mut train = lunch(travel.id);
    train.title = "Train".to_string();
    train.date = Some(Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap());
    engine.create_expense(train).await.unwrap();

    let all = engine
        .list_expenses(ExpenseQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 4);

    let only_travel = engine
        .list_expenses(ExpenseQuery {
            category_id: Some(travel.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(only_travel.len(), 1);
    assert_eq!(only_travel[0].title, "Train");
    assert_eq!(only_travel[0].category, travel);

    let page = engine
        .list_expenses(ExpenseQuery {
            skip: Some(1),
            limit: Some(2),
            category_id: None,
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, all[1].id);
}

#[tokio::test]
async fn category_names_are_unique() {
    let (engine, db) = engine_with_db().await;
    engine.create_category("Travel").await.unwrap();

    let err = engine.create_category("  Travel ").await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict { field: "name", .. }));
    assert_eq!(count(&db, "SELECT COUNT(*) FROM categories").await, 1);

    let found = engine.category_by_name("Travel").await.unwrap();
    assert!(found.is_some());
    assert!(engine.category_by_name("Nope").await.unwrap().is_none());
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() {
    let (engine, db) = engine_with_db().await;
    let food = engine.create_category("Food & Dining").await.unwrap();
    let created = engine.create_expense(lunch(food.id)).await.unwrap();

    let err = engine.delete_category(food.id).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Conflict {
            field: "category_id",
            ..
        }
    ));
    assert_eq!(count(&db, "SELECT COUNT(*) FROM categories").await, 1);

    engine.delete_expense(created.id).await.unwrap();
    engine.delete_category(food.id).await.unwrap();
    assert_eq!(count(&db, "SELECT COUNT(*) FROM categories").await, 0);
    assert!(matches!(
        engine.delete_category(food.id).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn seeding_default_categories_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    engine.create_category("Travel").await.unwrap();

    let inserted = engine.seed_default_categories().await.unwrap();
    assert_eq!(inserted, DEFAULT_CATEGORIES.len() - 1);
    assert_eq!(engine.seed_default_categories().await.unwrap(), 0);

    let all = engine.list_categories(Page::default()).await.unwrap();
    assert_eq!(all.len(), DEFAULT_CATEGORIES.len());
    let second_page = engine.list_categories(Page::new(10, 5)).await.unwrap();
    assert_eq!(second_page.len(), 2);
}
