//! Create `user` table.
//!
//! Password hash is nullable: accounts created through Google login never get one.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(create_user_table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

/// Free-form columns are unbounded `text`; only `role` has a fixed vocabulary.
fn create_user_table() -> TableCreateStatement {
    Table::create()
        .table(User::Table)
        .if_not_exists()
        .col(uuid(User::Id).primary_key())
        .col(text(User::Name).not_null())
        .col(text(User::Email).not_null())
        .col(ColumnDef::new(User::PasswordHash).text().null())
        .col(string_len(User::Role, 16).not_null())
        .col(text(User::Enrollment).not_null().default(""))
        .col(text(User::AdminCode).not_null().default(""))
        .col(timestamp_with_time_zone(User::CreatedAt).not_null())
        .to_owned()
}

#[derive(DeriveIden)]
enum User { Table, Id, Name, Email, PasswordHash, Role, Enrollment, AdminCode, CreatedAt }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_supplied_columns_have_no_length_limit() {
        let sql = create_user_table().to_string(PostgresQueryBuilder);
        for col in ["name", "email", "password_hash", "enrollment", "admin_code"] {
            assert!(sql.contains(&format!("\"{col}\" text")), "{col} not text in: {sql}");
        }
        assert!(!sql.contains("varchar(64)"), "{sql}");
        assert!(!sql.contains("varchar(128)"), "{sql}");
    }
}
