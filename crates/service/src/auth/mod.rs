//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Signup, password login, Google login and student listing live in
//! [`AuthService`]; credential hashing and ID-token verification are its
//! collaborators.

pub mod domain;
pub mod errors;
pub mod identity;
pub mod password;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
