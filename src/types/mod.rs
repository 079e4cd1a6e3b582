pub mod article;
pub mod error;
pub mod explorer;

pub use article::{Article, ArticleResponse, HashRequest, HashResponse, ReaderQuery};
pub use error::{BlogError, ClientError, ExplorerError, WalletError};
pub use explorer::{ExplorerResponse, ExplorerResult, ExplorerTransaction};
