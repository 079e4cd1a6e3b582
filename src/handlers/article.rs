use crate::{
    middleware::ReaderIdentity,
    state::AppState,
    types::{ArticleResponse, BlogError, HashRequest, HashResponse},
    utils::verify_agreement,
};
use axum::{extract::State, Extension, Json};
use tracing::{debug, info};

/// `GET /`: the preview for everyone, the full post for verified payers.
pub async fn get_article(
    State(state): State<AppState>,
    Extension(identity): Extension<ReaderIdentity>,
) -> Json<ArticleResponse> {
    let article = state.article();

    let response = match identity {
        ReaderIdentity::Anonymous => ArticleResponse::preview(article),
        ReaderIdentity::Rejected(e) => ArticleResponse::preview(article).with_error(e),
        ReaderIdentity::Verified(address) => {
            if state.has_paid(&address).await {
                ArticleResponse::full(article)
            } else {
                ArticleResponse::preview(article)
            }
        }
    };

    Json(response)
}

/// `POST /`: issues the payment hash a reader must put in their transaction.
///
/// A missing or unreadable body is treated the same as a missing address.
pub async fn request_hash(
    State(state): State<AppState>,
    body: Option<Json<HashRequest>>,
) -> Json<HashResponse> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    debug!("Hash requested: {:?}", request);

    let address = match request.address.as_deref().map(str::trim) {
        Some(address) if !address.is_empty() => address,
        _ => return Json(HashResponse::refused(BlogError::MissingAddress)),
    };

    if let Some(signature) = request.signature.as_deref().filter(|s| !s.trim().is_empty()) {
        if let Err(e) = verify_agreement(address, signature) {
            return Json(HashResponse::refused(e));
        }
    }

    let hash = state.payment_hash_for(address);
    info!("Issued payment hash {} for {}", hash, address);
    Json(HashResponse::issued(hash))
}
