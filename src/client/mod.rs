//! Reader side of the paywall: talks to the article service and drives a
//! wallet through connect, sign, and pay.

pub mod api;
pub mod session;
pub mod wallet;

pub use api::{ArticleApi, ReaderCredentials};
pub use session::{PaymentOutcome, ReaderConfig, ReaderSession, ReaderState};
pub use wallet::{LocalKeyWallet, PaymentRequest, Wallet};
