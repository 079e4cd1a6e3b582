use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub preview_html: String,
    pub full_html: String,
}

/// Body of `GET /`. `full_post` is present only once payment is proven.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub title: String,
    pub preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_post: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArticleResponse {
    pub fn preview(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            preview: article.preview_html.clone(),
            full_post: None,
            error: None,
        }
    }

    pub fn full(article: &Article) -> Self {
        Self {
            full_post: Some(article.full_html.clone()),
            ..Self::preview(article)
        }
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn is_unlocked(&self) -> bool {
        self.full_post.is_some()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReaderQuery {
    pub address: Option<String>,
    pub signature: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HashRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

/// `hash` serializes as `null` on failure, never omitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashResponse {
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HashResponse {
    pub fn issued(hash: String) -> Self {
        Self {
            hash: Some(hash),
            error: None,
        }
    }

    pub fn refused(error: impl ToString) -> Self {
        Self {
            hash: None,
            error: Some(error.to_string()),
        }
    }
}
