use crate::types::BlogError;
use ethers::types::{Address, RecoveryMessage, Signature};
use ethers::utils::keccak256;

/// Text every reader signs before payment evidence is looked up for them.
pub const AGREEMENT_TEXT: &str = "I agree to pay for access to this article and confirm that I control this address.";

pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// `keccak256("{post_id}-{address}")` as 0x-prefixed lowercase hex.
///
/// The address is lowercased first so that checksummed and plain forms of
/// the same account are bound to the same payment.
pub fn payment_hash(post_id: u64, address: &str) -> String {
    let key = format!("{}-{}", post_id, normalize_address(address));
    format!("0x{}", hex::encode(keccak256(key.as_bytes())))
}

/// Compares two hex strings ignoring case and an optional `0x` prefix.
pub fn hex_eq(a: &str, b: &str) -> bool {
    let strip = |s: &str| {
        let s = s.trim();
        s.strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s)
            .to_ascii_lowercase()
    };
    strip(a) == strip(b)
}

pub fn parse_address(address: &str) -> Result<Address, BlogError> {
    address
        .trim()
        .parse::<Address>()
        .map_err(|_| BlogError::InvalidAddress(address.to_string()))
}

pub fn parse_signature(signature: &str) -> Result<Signature, BlogError> {
    hex::decode(signature.trim().trim_start_matches("0x"))
        .map_err(|_| BlogError::MalformedSignature)
        .and_then(|bytes| {
            Signature::try_from(bytes.as_slice()).map_err(|_| BlogError::MalformedSignature)
        })
}

pub fn recover_agreement_signer(signature: &Signature) -> Result<Address, BlogError> {
    let recoverable = RecoveryMessage::Data(AGREEMENT_TEXT.as_bytes().to_vec());

    signature.recover(recoverable).map_err(|e| {
        tracing::debug!("Signature recovery failed: {:?}", e);
        BlogError::InvalidSignature
    })
}

/// Checks that `signature` is the agreement text signed by `address`.
pub fn verify_agreement(address: &str, signature: &str) -> Result<Address, BlogError> {
    let expected = parse_address(address)?;
    let signature = parse_signature(signature)?;
    let recovered = recover_agreement_signer(&signature)?;

    if recovered != expected {
        tracing::debug!(
            "Agreement signer mismatch: recovered {:?}, expected {:?}",
            recovered,
            expected
        );
        return Err(BlogError::InvalidSignature);
    }

    Ok(recovered)
}
