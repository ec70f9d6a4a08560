use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::domain::{
    normalize_email, AuthProfile, LoginInput, NewUserRecord, Role, SignupInput, UserSummary,
};
use super::errors::AuthError;
use super::identity::IdTokenVerifier;
use super::password::{BcryptHasher, DEFAULT_COST};
use super::repository::UserRepository;
use models::user::validate_email;

/// Auth service configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
    /// When set, role=admin signups must present this code.
    pub admin_signup_code: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { bcrypt_cost: DEFAULT_COST, admin_signup_code: None }
    }
}

/// Auth business service independent of web framework
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    verifier: Arc<dyn IdTokenVerifier>,
    hasher: BcryptHasher,
    cfg: AuthConfig,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, verifier: Arc<dyn IdTokenVerifier>, cfg: AuthConfig) -> Self {
        let hasher = BcryptHasher::new(cfg.bcrypt_cost);
        Self { repo, verifier, hasher, cfg }
    }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockUserRepository};
    /// use service::auth::identity::mock::StaticIdTokenVerifier;
    /// use service::auth::domain::{Role, SignupInput};
    /// use std::sync::Arc;
    /// let svc = AuthService::new(
    ///     Arc::new(MockUserRepository::default()),
    ///     Arc::new(StaticIdTokenVerifier::default()),
    ///     AuthConfig { bcrypt_cost: 4, admin_signup_code: None },
    /// );
    /// let input = SignupInput {
    ///     name: "Ann".into(), email: " Ann@Example.com ".into(), password: "pw".into(),
    ///     role: Role::Student, enrollment: Some("E1".into()), admin_code: None,
    /// };
    /// let profile = tokio_test::block_on(svc.signup(input)).unwrap();
    /// assert_eq!(profile.email, "ann@example.com");
    /// assert_eq!(profile.role, Role::Student);
    /// ```
    #[instrument(skip(self, input), fields(email = tracing::field::Empty, role = %input.role))]
    pub async fn signup(&self, input: SignupInput) -> Result<AuthProfile, AuthError> {
        let email = normalize_email(&input.email);
        tracing::Span::current().record("email", email.as_str());

        if email.is_empty() {
            return Err(AuthError::Validation("email required".into()));
        }
        // a taken email is a conflict whatever else the request carries
        if let Some(existing) = self.repo.find_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        if input.name.trim().is_empty() {
            return Err(AuthError::Validation("name required".into()));
        }
        validate_email(&email)?;
        if input.password.is_empty() {
            return Err(AuthError::Validation("password required".into()));
        }
        if input.role == Role::Admin {
            self.check_admin_code(input.admin_code.as_deref())?;
        }

        let hash = self.hasher.hash(&input.password).await?;
        let (enrollment, admin_code) = match input.role {
            Role::Student => (input.enrollment.unwrap_or_default(), String::new()),
            Role::Admin => (String::new(), input.admin_code.unwrap_or_default()),
        };
        let user = self
            .repo
            .create_user(NewUserRecord {
                name: input.name,
                email,
                password_hash: Some(hash),
                role: input.role,
                enrollment,
                admin_code,
            })
            .await?;

        if user.role == Role::Admin {
            warn!(user_id = %user.id, "admin account created through public signup");
        }
        info!(user_id = %user.id, role = %user.role, "user_registered");
        Ok(user.profile())
    }

    /// Authenticate with email and password. The role in the result comes
    /// from the stored record only.
    #[instrument(skip(self, input), fields(email = tracing::field::Empty))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthProfile, AuthError> {
        let email = normalize_email(&input.email);
        tracing::Span::current().record("email", email.as_str());

        let user = self.repo.find_by_email(&email).await?.ok_or(AuthError::NotFound)?;
        let hash = user.password_hash().ok_or(AuthError::FederatedAccount)?;
        if !self.hasher.verify(&input.password, hash).await? {
            return Err(AuthError::Unauthorized);
        }

        info!(user_id = %user.id, role = %user.role, "user_logged_in");
        Ok(user.profile())
    }

    /// Authenticate with a Google ID token, creating a student account on
    /// first sight of the email.
    #[instrument(skip(self, id_token), fields(email = tracing::field::Empty))]
    pub async fn google_login(&self, id_token: &str) -> Result<AuthProfile, AuthError> {
        let identity = self.verifier.verify(id_token).await?;
        let email = normalize_email(&identity.email);
        tracing::Span::current().record("email", email.as_str());

        if let Some(user) = self.repo.find_by_email(&email).await? {
            info!(user_id = %user.id, role = %user.role, "google_login_existing_user");
            return Ok(user.profile());
        }

        let name = identity
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());
        let created = self
            .repo
            .create_user(NewUserRecord {
                name,
                email: email.clone(),
                password_hash: None,
                role: Role::Student,
                enrollment: String::new(),
                admin_code: String::new(),
            })
            .await;

        let user = match created {
            Ok(user) => {
                info!(user_id = %user.id, "google_user_registered");
                user
            }
            // a concurrent first login for the same email won the insert
            Err(AuthError::Conflict) => self
                .repo
                .find_by_email(&email)
                .await?
                .ok_or_else(|| AuthError::Repository("user vanished after conflict".into()))?,
            Err(e) => return Err(e),
        };
        Ok(user.profile())
    }

    /// All students, name and email only.
    #[instrument(skip(self))]
    pub async fn list_students(&self) -> Result<Vec<UserSummary>, AuthError> {
        let students = self.repo.list_by_role(Role::Student).await?;
        debug!(count = students.len(), "students listed");
        Ok(students)
    }

    fn check_admin_code(&self, supplied: Option<&str>) -> Result<(), AuthError> {
        match &self.cfg.admin_signup_code {
            Some(expected) if supplied != Some(expected.as_str()) => {
                Err(AuthError::Validation("invalid admin code".into()))
            }
            _ => Ok(()),
        }
    }
}
