use crate::{
    types::{BlogError, ReaderQuery},
    utils::verify_agreement,
};
use axum::{
    body::Body,
    extract::Query,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Who is asking for the article, as established from the query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReaderIdentity {
    /// No address supplied.
    Anonymous,
    /// The signature over the agreement text recovers to this address
    /// (lowercase, 0x-prefixed).
    Verified(String),
    /// An address was supplied but could not be proven.
    Rejected(BlogError),
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn resolve_identity(query: &ReaderQuery) -> ReaderIdentity {
    let Some(address) = non_empty(&query.address) else {
        return ReaderIdentity::Anonymous;
    };

    let Some(signature) = non_empty(&query.signature) else {
        return ReaderIdentity::Rejected(BlogError::MissingSignature);
    };

    match verify_agreement(address, signature) {
        Ok(signer) => ReaderIdentity::Verified(format!("{:?}", signer)),
        Err(e) => ReaderIdentity::Rejected(e),
    }
}

/// Resolves the reader's identity and hands it to handlers as a request
/// extension. Rejections are not fatal here; handlers decide what to serve.
/// A query string that does not parse (e.g. a repeated key) is a rejection,
/// never an HTTP error.
pub async fn reader_identity_middleware(mut request: Request<Body>, next: Next) -> Response {
    let identity = match Query::<ReaderQuery>::try_from_uri(request.uri()) {
        Ok(Query(query)) => resolve_identity(&query),
        Err(e) => {
            debug!("Unreadable query {:?}: {}", request.uri().query(), e);
            ReaderIdentity::Rejected(BlogError::MalformedQuery)
        }
    };

    if let ReaderIdentity::Rejected(e) = &identity {
        debug!("Reader not verified: {}", e);
    }

    request.extensions_mut().insert(identity);
    next.run(request).await
}
