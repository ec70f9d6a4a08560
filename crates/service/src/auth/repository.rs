use async_trait::async_trait;

use super::domain::{NewUserRecord, Role, UserRecord, UserSummary};
use super::errors::AuthError;

/// Repository abstraction for user persistence.
///
/// Emails passed in are already normalized. `create_user` must report a taken
/// email as [`AuthError::Conflict`], including when it loses a race.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;
    async fn create_user(&self, user: NewUserRecord) -> Result<UserRecord, AuthError>;
    async fn list_by_role(&self, role: Role) -> Result<Vec<UserSummary>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Mutex, MutexGuard};
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<Vec<UserRecord>>, // insertion order
        unavailable: AtomicBool,
    }

    impl MockUserRepository {
        /// Make every subsequent call fail like a lost store connection.
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        pub fn len(&self) -> usize {
            self.users.lock().map(|u| u.len()).unwrap_or_default()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn users(&self) -> Result<MutexGuard<'_, Vec<UserRecord>>, AuthError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(AuthError::Repository("connection refused".into()));
            }
            self.users.lock().map_err(|_| AuthError::Repository("mock store poisoned".into()))
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
            let users = self.users()?;
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn create_user(&self, user: NewUserRecord) -> Result<UserRecord, AuthError> {
            let mut users = self.users()?;
            if users.iter().any(|u| u.email == user.email) {
                return Err(AuthError::Conflict);
            }
            let record = UserRecord {
                id: Uuid::new_v4(),
                name: user.name,
                email: user.email,
                password_hash: user.password_hash,
                role: user.role,
                enrollment: user.enrollment,
                admin_code: user.admin_code,
            };
            users.push(record.clone());
            Ok(record)
        }

        async fn list_by_role(&self, role: Role) -> Result<Vec<UserSummary>, AuthError> {
            let users = self.users()?;
            Ok(users
                .iter()
                .filter(|u| u.role == role)
                .map(|u| UserSummary { name: u.name.clone(), email: u.email.clone() })
                .collect())
        }
    }
}
