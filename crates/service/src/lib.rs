//! Service layer holding the authentication business logic.
//! - Independent of the web framework; the server crate maps results to HTTP.
//! - Persistence and identity federation sit behind traits so tests can swap fakes in.
//! - Errors are a closed taxonomy with stable codes (`auth::errors::AuthError`).

pub mod auth;
