use crate::errors::ModelError;
use crate::user::{self, NewUser};
use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait};

/// Setup an isolated in-memory database with migrations applied
async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    // a second pooled connection would open a different in-memory database
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn student<'a>(name: &'a str, email: &'a str) -> NewUser<'a> {
    NewUser {
        name,
        email,
        password_hash: Some("$2b$10$hash"),
        role: "student",
        enrollment: "E1",
        admin_code: "",
    }
}

#[tokio::test]
async fn test_user_create_and_find() -> Result<()> {
    let db = setup_test_db().await?;

    let created = user::create(&db, student("Ann", "ann@example.com")).await?;
    assert_eq!(created.role, "student");
    assert_eq!(created.enrollment, "E1");

    let found = user::find_by_email(&db, "ann@example.com").await?.expect("user present");
    assert_eq!(found.id, created.id);
    assert_eq!(found.password_hash.as_deref(), Some("$2b$10$hash"));

    assert!(user::find_by_email(&db, "nobody@example.com").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_federated_user_has_no_hash() -> Result<()> {
    let db = setup_test_db().await?;
    let new = NewUser { password_hash: None, enrollment: "", ..student("Gee", "gee@example.com") };
    let created = user::create(&db, new).await?;
    assert!(created.password_hash.is_none());
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_is_reported_as_duplicate() -> Result<()> {
    let db = setup_test_db().await?;
    user::create(&db, student("Ann", "ann@example.com")).await?;

    let err = user::create(&db, student("Other", "ann@example.com")).await.unwrap_err();
    assert!(matches!(err, ModelError::Duplicate(_)), "got {err:?}");
    assert_eq!(user::Entity::find().all(&db).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_create_rejects_invalid_fields() -> Result<()> {
    let db = setup_test_db().await?;
    let err = user::create(&db, student("Ann", "not-an-email")).await.unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
    let err = user::create(&db, student("  ", "ann@example.com")).await.unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn test_list_by_role_projects_and_filters() -> Result<()> {
    let db = setup_test_db().await?;
    user::create(&db, student("Ann", "ann@example.com")).await?;
    let admin = NewUser { role: "admin", enrollment: "", admin_code: "X", ..student("Root", "root@example.com") };
    user::create(&db, admin).await?;
    user::create(&db, student("Bob", "bob@example.com")).await?;

    let students = user::list_name_email_by_role(&db, "student").await?;
    assert_eq!(
        students,
        vec![
            ("Ann".to_string(), "ann@example.com".to_string()),
            ("Bob".to_string(), "bob@example.com".to_string()),
        ]
    );
    let admins = user::list_name_email_by_role(&db, "admin").await?;
    assert_eq!(admins.len(), 1);
    Ok(())
}
