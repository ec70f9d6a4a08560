//! Cross-cutting helpers shared by the server crates: logging setup and
//! small wire types that do not belong to any business module.

pub mod types;
pub mod utils;
