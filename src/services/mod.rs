pub mod admin;

pub use admin::{seed_admin, SeedError, SeedOutcome};
