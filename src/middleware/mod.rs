pub mod auth;
pub mod cors;

pub use auth::{reader_identity_middleware, ReaderIdentity};
pub use cors::apply_cors;
