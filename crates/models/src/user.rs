use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, QuerySelect, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    #[sea_orm(column_type = "Text", unique)]
    pub email: String,
    #[sea_orm(column_type = "Text", nullable)]
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: String,
    #[sea_orm(column_type = "Text")]
    pub enrollment: String,
    #[sea_orm(column_type = "Text")]
    pub admin_code: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new row. `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub role: &'a str,
    pub enrollment: &'a str,
    pub admin_code: &'a str,
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}

/// Insert a user. A taken email surfaces as [`ModelError::Duplicate`].
pub async fn create<C: ConnectionTrait>(db: &C, new: NewUser<'_>) -> Result<Model, ModelError> {
    validate_email(new.email)?;
    validate_name(new.name)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new.name.to_string()),
        email: Set(new.email.to_string()),
        password_hash: Set(new.password_hash.map(str::to_string)),
        role: Set(new.role.to_string()),
        enrollment: Set(new.enrollment.to_string()),
        admin_code: Set(new.admin_code.to_string()),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

/// `(name, email)` of every user with `role`, oldest first.
pub async fn list_name_email_by_role<C: ConnectionTrait>(db: &C, role: &str) -> Result<Vec<(String, String)>, ModelError> {
    let rows = Entity::find()
        .select_only()
        .column(Column::Name)
        .column(Column::Email)
        .filter(Column::Role.eq(role))
        .order_by_asc(Column::CreatedAt)
        .into_tuple::<(String, String)>()
        .all(db)
        .await?;
    Ok(rows)
}
