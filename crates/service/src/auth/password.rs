//! bcrypt password hashing. Work runs on the blocking pool so request tasks
//! are not stalled by the adaptive cost.

use super::errors::AuthError;

pub const DEFAULT_COST: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl Default for BcryptHasher {
    fn default() -> Self { Self::new(DEFAULT_COST) }
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self { Self { cost } }

    pub fn cost(&self) -> u32 { self.cost }

    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .map_err(|e| AuthError::HashError(e.to_string()))
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .map_err(|e| AuthError::HashError(e.to_string()))
    }
}
