pub mod crypto;

pub use crypto::{
    hex_eq, normalize_address, payment_hash, verify_agreement, AGREEMENT_TEXT,
};
