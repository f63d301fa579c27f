// handlers/auth/mod.rs - login, logout and current-user endpoints
pub mod login; // POST /api/auth/login
pub mod logout; // POST /api/auth/logout
pub mod me; // GET /api/auth/me

pub use login::{login, LoginRequest, LoginResponse};
pub use logout::logout;
pub use me::me;
