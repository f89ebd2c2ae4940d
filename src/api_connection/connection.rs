use async_trait::async_trait;
use dotenv::dotenv;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use std::env;
use thiserror::Error;

use super::envelope::recipe_array;

const BASE_URL_ENV_VAR: &str = "RECIPE_API_BASE_URL";
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error {status}: {detail}")]
    Api {
        status: reqwest::StatusCode,
        detail: String,
    },
}

/// The retrieval boundary between the pipeline and the external corpus.
///
/// Every read degrades to an empty or absent result on failure so a single
/// bad call never aborts the surrounding cascade. Implementations other than
/// [`CorpusClient`] exist only in tests.
#[async_trait]
pub trait RecipeCorpus: Send + Sync {
    async fn recipes_by_title(&self, title: &str) -> Vec<Value>;
    async fn recipes_by_ingredients_flavor(
        &self,
        ingredients: Option<&str>,
        flavor: Option<&str>,
    ) -> Vec<Value>;
    async fn recipes_by_region_diet(&self, region_diet: &str) -> Vec<Value>;
    async fn recipes_by_recipe_diet(&self, recipe_diet: &str) -> Vec<Value>;
    async fn recipes_by_calories(&self, min: Option<f64>, max: Option<f64>) -> Vec<Value>;
    async fn recipes_by_protein_range(&self, min: Option<f64>, max: Option<f64>) -> Vec<Value>;
    async fn recipes_by_max_carbs(&self, max_carbs: f64) -> Vec<Value>;
    async fn recipe_of_day(&self) -> Option<Value>;
    async fn recipe_detail(&self, recipe_id: u64) -> Option<Value>;
    async fn nutrition_info(&self, recipe_id: u64) -> Option<Value>;
    async fn recipe_instructions(&self, recipe_id: u64) -> Option<Value>;
    async fn micronutrition_info(&self, recipe_id: u64) -> Option<Value>;
    async fn meal_plan(&self, payload: &Value) -> Option<Value>;
    async fn flavor_pairings_by_alias(&self, food_pair: &str) -> Option<Value>;
    async fn flavor_entities_by_name(&self, name: &str, page: u32, size: u32) -> Option<Value>;
}

/// HTTP client for the recipe/flavor corpus proxy.
pub struct CorpusClient {
    http: Client,
    base_url: String,
}

impl CorpusClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Reads the base URL from `RECIPE_API_BASE_URL` (via `.env` if present).
    pub fn from_env() -> Self {
        dotenv().ok();
        let base_url =
            env::var(BASE_URL_ENV_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ApiConnectionError> {
        let url = format!("{}{}", self.base_url, path);
        let params: Vec<(&str, &str)> = query
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(key, value)| (*key, value.as_str()))
            .collect();

        let response = self.http.get(&url).query(&params).send().await?;
        if response.status().is_success() {
            Ok(response.json::<Value>().await?)
        } else {
            let status = response.status();
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            Err(ApiConnectionError::Api {
                status,
                detail: sanitize_detail(&body),
            })
        }
    }

    async fn post_json(&self, path: &str, payload: &Value) -> Result<Value, ApiConnectionError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(payload).send().await?;
        if response.status().is_success() {
            Ok(response.json::<Value>().await?)
        } else {
            let status = response.status();
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            Err(ApiConnectionError::Api {
                status,
                detail: sanitize_detail(&body),
            })
        }
    }

    /// Read that degrades to an empty record list on any failure.
    async fn try_list(&self, path: &str, query: &[(&str, String)]) -> Vec<Value> {
        match self.get_json(path, query).await {
            Ok(body) => {
                let records = recipe_array(&body);
                debug!("{} returned {} records", path, records.len());
                records
            }
            Err(error) => {
                warn!("{} degraded to empty: {}", path, error);
                Vec::new()
            }
        }
    }

    /// Read that degrades to `None` on any failure.
    async fn try_body(&self, path: &str, query: &[(&str, String)]) -> Option<Value> {
        match self.get_json(path, query).await {
            Ok(body) => Some(body),
            Err(error) => {
                warn!("{} degraded to none: {}", path, error);
                None
            }
        }
    }
}

/// Extracts a user-presentable message from an error body. A `detail` string
/// that loosely indicates an unavailable endpoint is replaced with a
/// friendlier message instead of being shown raw.
fn sanitize_detail(body: &Value) -> String {
    const FALLBACK: &str = "Failed to fetch recipe data";
    let Some(detail) = body.get("detail") else {
        return FALLBACK.to_string();
    };
    match detail {
        Value::String(text) => {
            if text.to_lowercase().contains("cannot get") {
                "Recipe endpoint is unavailable right now. Retrying with alternatives."
                    .to_string()
            } else {
                text.clone()
            }
        }
        Value::Object(record) => {
            let message = record.get("message").or_else(|| record.get("error"));
            match message {
                Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
                _ => FALLBACK.to_string(),
            }
        }
        _ => FALLBACK.to_string(),
    }
}

fn bound_param(value: Option<f64>) -> String {
    value.map(|bound| bound.to_string()).unwrap_or_default()
}

#[async_trait]
impl RecipeCorpus for CorpusClient {
    async fn recipes_by_title(&self, title: &str) -> Vec<Value> {
        self.try_list(
            "/recipe2-api/recipe/recipebytitle",
            &[("title", title.to_string())],
        )
        .await
    }

    async fn recipes_by_ingredients_flavor(
        &self,
        ingredients: Option<&str>,
        flavor: Option<&str>,
    ) -> Vec<Value> {
        self.try_list(
            "/recipe2-api/recipe/recipebyingredientsflavor",
            &[
                ("ingredients", ingredients.unwrap_or_default().to_string()),
                ("flavor", flavor.unwrap_or_default().to_string()),
            ],
        )
        .await
    }

    async fn recipes_by_region_diet(&self, region_diet: &str) -> Vec<Value> {
        self.try_list(
            "/recipe2-api/recipe/recipebyregiondiet",
            &[("region_diet", region_diet.to_string())],
        )
        .await
    }

    async fn recipes_by_recipe_diet(&self, recipe_diet: &str) -> Vec<Value> {
        self.try_list(
            "/recipe2-api/recipe/recipebyrecipediet",
            &[("recipe_diet", recipe_diet.to_string())],
        )
        .await
    }

    async fn recipes_by_calories(&self, min: Option<f64>, max: Option<f64>) -> Vec<Value> {
        self.try_list(
            "/recipe2-api/recipe/recipebycalories",
            &[
                ("min_calories", bound_param(min)),
                ("max_calories", bound_param(max)),
            ],
        )
        .await
    }

    async fn recipes_by_protein_range(&self, min: Option<f64>, max: Option<f64>) -> Vec<Value> {
        self.try_list(
            "/recipe2-api/recipe/recipebyproteinrange",
            &[
                ("min_protein", bound_param(min)),
                ("max_protein", bound_param(max)),
            ],
        )
        .await
    }

    async fn recipes_by_max_carbs(&self, max_carbs: f64) -> Vec<Value> {
        self.try_list(
            "/recipe2-api/recipe/recipebycarbs",
            &[("max_carbs", max_carbs.to_string())],
        )
        .await
    }

    async fn recipe_of_day(&self) -> Option<Value> {
        self.try_body("/recipe2-api/recipe/recipeofday", &[]).await
    }

    async fn recipe_detail(&self, recipe_id: u64) -> Option<Value> {
        self.try_body(
            "/recipe2-api/recipe/recipebyid",
            &[("recipe_id", recipe_id.to_string())],
        )
        .await
    }

    async fn nutrition_info(&self, recipe_id: u64) -> Option<Value> {
        self.try_body(
            "/recipe2-api/recipe/recipenutritioninfo",
            &[("recipe_id", recipe_id.to_string())],
        )
        .await
    }

    async fn recipe_instructions(&self, recipe_id: u64) -> Option<Value> {
        self.try_body(
            "/recipe2-api/recipe/recipeinstructions",
            &[("recipe_id", recipe_id.to_string())],
        )
        .await
    }

    async fn micronutrition_info(&self, recipe_id: u64) -> Option<Value> {
        self.try_body(
            "/recipe2-api/recipe/recipemicronutritioninfo",
            &[("recipe_id", recipe_id.to_string())],
        )
        .await
    }

    async fn meal_plan(&self, payload: &Value) -> Option<Value> {
        match self
            .post_json("/recipe2-api/recipe/recipemealplan", payload)
            .await
        {
            Ok(body) => Some(body),
            Err(error) => {
                warn!("meal plan request degraded to none: {}", error);
                None
            }
        }
    }

    async fn flavor_pairings_by_alias(&self, food_pair: &str) -> Option<Value> {
        self.try_body(
            "/flavordb/food/by-alias",
            &[("food_pair", food_pair.to_string())],
        )
        .await
    }

    async fn flavor_entities_by_name(&self, name: &str, page: u32, size: u32) -> Option<Value> {
        self.try_body(
            "/flavordb/entities/by-readable-name",
            &[
                ("entity_alias_readable", name.to_string()),
                ("page", page.to_string()),
                ("size", size.to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unavailable_endpoint_detail_is_replaced() {
        let body = json!({"detail": "Cannot GET /recipe2-api/recipe/recipebytitle"});
        assert_eq!(
            sanitize_detail(&body),
            "Recipe endpoint is unavailable right now. Retrying with alternatives."
        );
    }

    #[test]
    fn object_detail_prefers_message_then_error() {
        assert_eq!(
            sanitize_detail(&json!({"detail": {"message": "rate limited"}})),
            "rate limited"
        );
        assert_eq!(
            sanitize_detail(&json!({"detail": {"error": "upstream down"}})),
            "upstream down"
        );
        assert_eq!(
            sanitize_detail(&json!({"detail": {"message": "  "}})),
            "Failed to fetch recipe data"
        );
    }

    #[test]
    fn missing_detail_uses_fallback() {
        assert_eq!(sanitize_detail(&json!({})), "Failed to fetch recipe data");
        assert_eq!(sanitize_detail(&Value::Null), "Failed to fetch recipe data");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = CorpusClient::new("http://localhost:8000/");
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
