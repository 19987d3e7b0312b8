use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), sea_orm::DbErr> {
    db.execute(Statement::from_string(db.get_database_backend(), sql))
        .await
        .map(|_| ())
}

#[tokio::test]
async fn up_down_up() {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    Migrator::up(&db, None).await.unwrap();
    Migrator::down(&db, None).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn friend_names_are_unique_per_owner() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    execute(&db, "INSERT INTO users (username, password) VALUES ('alice', 'pw'), ('bob', 'pw')")
        .await
        .unwrap();
    execute(
        &db,
        "INSERT INTO friends (id, owner_user_id, name, created_at) \
         VALUES (x'01', 'alice', 'Carol', '2026-01-01 00:00:00')",
    )
    .await
    .unwrap();
    execute(
        &db,
        "INSERT INTO friends (id, owner_user_id, name, created_at) \
         VALUES (x'02', 'bob', 'Carol', '2026-01-01 00:00:00')",
    )
    .await
    .unwrap();

    let duplicate = execute(
        &db,
        "INSERT INTO friends (id, owner_user_id, name, created_at) \
         VALUES (x'03', 'alice', 'Carol', '2026-01-01 00:00:00')",
    )
    .await;
    assert!(duplicate.is_err());
}
