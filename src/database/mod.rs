pub mod manager;
pub mod models;
pub mod postgres;
pub mod reorder;
pub mod repository;

pub use manager::{Database, DatabaseError, HealthCheck};
pub use repository::{OrderedRecord, OrderedRepository, ProfileRepository, UserRepository};
