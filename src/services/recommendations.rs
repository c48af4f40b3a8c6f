use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{RecommendationRequest, RecommendationResponse, ServiceErrorBody},
};
use reqwest::Client as HttpClient;

/// Number of titles requested per recommendation lookup
pub const DEFAULT_RECOMMENDATION_COUNT: u32 = 4;

/// Source of "more like this" recommendations
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, request: RecommendationRequest) -> AppResult<RecommendationResponse>;
}

/// Client for the external recommendation backend
///
/// The backend owns the similarity model; this side only posts a title and reads back
/// movie-shaped results. Error responses carry `{ "error": "..." }`, which is surfaced
/// verbatim so the user sees e.g. that a title is not in the dataset.
#[derive(Clone)]
pub struct RecommendationClient {
    http_client: HttpClient,
    api_url: String,
}

impl RecommendationClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http_client,
            api_url: config
                .recommendations_api_url
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Recommender for RecommendationClient {
    async fn recommend(&self, request: RecommendationRequest) -> AppResult<RecommendationResponse> {
        let url = format!("{}/api/recommendations", self.api_url);

        let response = self.http_client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ServiceErrorBody>(&body)
                .map(|err| err.error)
                .unwrap_or_else(|_| "Failed to get recommendations".to_string());
            return Err(AppError::upstream(status, message));
        }

        let recommendations: RecommendationResponse = response.json().await?;

        tracing::info!(
            movie_title = %request.movie_title,
            input_movie = %recommendations.input_movie,
            results = recommendations.recommendations.len(),
            "Recommendations fetched"
        );

        Ok(recommendations)
    }
}
