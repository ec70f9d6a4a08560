use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// "student" or "admin"
    pub role: String,
    pub enrollment: Option<String>,
    pub admin_code: Option<String>,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct GoogleLoginRequest {
    /// Google ID token
    pub token: String,
}

#[derive(ToSchema)]
pub struct SessionResponseDoc { pub message: String, pub name: String, pub email: String, pub role: String }

#[derive(ToSchema)]
pub struct StudentDoc { pub name: String, pub email: String }

#[derive(ToSchema)]
pub struct ErrorResponseDoc { pub message: String, pub code: u16 }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::root,
        crate::routes::health,
        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::auth::google_login,
        crate::routes::auth::list_students,
    ),
    components(
        schemas(
            HealthResponse,
            SignupRequest,
            LoginRequest,
            GoogleLoginRequest,
            SessionResponseDoc,
            StudentDoc,
            ErrorResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth")
    )
)]
pub struct ApiDoc;
