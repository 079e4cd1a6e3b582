use crate::types::{ArticleResponse, ClientError, HashRequest, HashResponse};

/// Address plus agreement signature, as sent to the article service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderCredentials {
    pub address: String,
    pub signature: String,
}

/// HTTP client for the article service.
#[derive(Clone)]
pub struct ArticleApi {
    http: reqwest::Client,
    url: String,
}

impl ArticleApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!("{}/", base_url.trim_end_matches('/')),
        }
    }

    pub async fn fetch_article(
        &self,
        credentials: Option<&ReaderCredentials>,
    ) -> Result<ArticleResponse, ClientError> {
        let mut request = self.http.get(&self.url);
        if let Some(credentials) = credentials {
            request = request.query(&[
                ("address", credentials.address.as_str()),
                ("signature", credentials.signature.as_str()),
            ]);
        }

        let article = request
            .send()
            .await?
            .error_for_status()?
            .json::<ArticleResponse>()
            .await?;

        if let Some(error) = &article.error {
            tracing::warn!("Article service rejected credentials: {}", error);
        }

        Ok(article)
    }

    pub async fn request_hash(&self, credentials: &ReaderCredentials) -> Result<String, ClientError> {
        let body = HashRequest {
            address: Some(credentials.address.clone()),
            signature: Some(credentials.signature.clone()),
        };

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<HashResponse>()
            .await?;

        response.hash.ok_or_else(|| {
            ClientError::HashRefused(response.error.unwrap_or_else(|| "no reason given".to_string()))
        })
    }
}
