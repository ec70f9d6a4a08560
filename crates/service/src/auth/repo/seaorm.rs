use sea_orm::DatabaseConnection;

use crate::auth::domain::{NewUserRecord, Role, UserRecord, UserSummary};
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;

#[derive(Clone)]
pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_record(m: models::user::Model) -> Result<UserRecord, AuthError> {
    Ok(UserRecord {
        id: m.id,
        role: m.role.parse()?,
        name: m.name,
        email: m.email,
        password_hash: m.password_hash,
        enrollment: m.enrollment,
        admin_code: m.admin_code,
    })
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        models::user::find_by_email(&self.db, email)
            .await?
            .map(to_record)
            .transpose()
    }

    async fn create_user(&self, user: NewUserRecord) -> Result<UserRecord, AuthError> {
        let created = models::user::create(
            &self.db,
            models::user::NewUser {
                name: &user.name,
                email: &user.email,
                password_hash: user.password_hash.as_deref(),
                role: user.role.as_str(),
                enrollment: &user.enrollment,
                admin_code: &user.admin_code,
            },
        )
        .await?;
        to_record(created)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<UserSummary>, AuthError> {
        let rows = models::user::list_name_email_by_role(&self.db, role.as_str()).await?;
        Ok(rows.into_iter().map(|(name, email)| UserSummary { name, email }).collect())
    }
}
