pub mod auth;
pub mod database;
pub mod email;
pub mod error;
pub mod jwt;
pub mod storage;
pub mod store;

pub use auth::AuthService;
pub use database::MongoDb;
pub use email::{EmailProvider, EmailService, MockEmailService};
pub use error::ServiceError;
pub use jwt::{JwtService, SessionClaims};
pub use storage::{FormatValidatingProcessor, ImageProcessor, LocalStorage, Storage};
pub use store::{ContactStore, MemoryStore, Store, UserStore};
