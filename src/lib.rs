use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod applications;
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod schema;
pub mod state;
pub mod util_resp;

#[cfg(test)]
pub mod test;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
