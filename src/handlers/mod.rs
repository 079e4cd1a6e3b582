pub mod article;

pub use article::{get_article, request_hash};
