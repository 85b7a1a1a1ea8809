//! Spoonacular REST client.
//!
//! Only two endpoints are used: recipe information (for favorite lookup and
//! the detail view) and complex search.

use async_trait::async_trait;
use larder_core::{
    config::RecipesConfig,
    error::LarderError,
    recipe::{Recipe, RecipeId, SearchResults},
    traits::RecipeLookup,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Default page size for search.
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Query for the complex-search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub offset: u32,
    pub number: u32,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            offset: 0,
            number: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Spoonacular API client.
pub struct SpoonacularClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SpoonacularClient {
    /// Create from config values. Every request is bounded by the lookup timeout.
    pub fn from_config(config: &RecipesConfig) -> Result<Self, LarderError> {
        let client = reqwest::Client::builder()
            .timeout(config.lookup_timeout())
            .build()
            .map_err(|e| LarderError::Config(format!("failed to build http client: {e}")))?;
        if config.api_key.is_empty() {
            warn!("spoonacular api_key is empty; requests will be rejected");
        }
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn information_url(&self, id: RecipeId) -> Result<Url, LarderError> {
        Url::parse_with_params(
            &format!("{}/recipes/{id}/information", self.base_url),
            &[("apiKey", self.api_key.as_str())],
        )
        .map_err(|e| LarderError::Config(format!("invalid recipe url: {e}")))
    }

    fn search_url(&self, params: &SearchParams) -> Result<Url, LarderError> {
        Url::parse_with_params(
            &format!("{}/recipes/complexSearch", self.base_url),
            &[
                ("apiKey", self.api_key.clone()),
                ("query", params.query.clone()),
                ("offset", params.offset.to_string()),
                ("number", params.number.to_string()),
            ],
        )
        .map_err(|e| LarderError::Config(format!("invalid search url: {e}")))
    }

    /// Search recipes by free-text query.
    pub async fn search_recipes(&self, params: &SearchParams) -> Result<SearchResults, LarderError> {
        let url = self.search_url(params)?;
        debug!(query = %params.query, offset = params.offset, "searching recipes");
        self.get_json(url, "search").await
    }

    /// GET a URL and decode the JSON body; non-2xx is a failure.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, LarderError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LarderError::Lookup(format!("{what} request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(LarderError::Lookup(format!(
                "{what} got {status}: {error_text}"
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| LarderError::Lookup(format!("{what} returned malformed payload: {e}")))
    }
}

#[async_trait]
impl RecipeLookup for SpoonacularClient {
    async fn fetch_recipe_by_id(&self, id: RecipeId) -> Result<Recipe, LarderError> {
        let url = self.information_url(id)?;
        debug!(recipe_id = id, "fetching recipe information");
        self.get_json(url, &format!("recipe {id}")).await
    }
}
