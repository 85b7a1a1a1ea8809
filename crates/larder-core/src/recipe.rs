use serde::{Deserialize, Serialize};

/// Spoonacular recipe identifier.
pub type RecipeId = i64;

/// Full recipe as returned by the recipe-information endpoint.
///
/// Only `id` and `title` are required; every other field defaults when the
/// payload omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ready_in_minutes: u32,
    #[serde(default)]
    pub servings: u32,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub extended_ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub dish_types: Vec<String>,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
}

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default)]
    pub nutrients: Vec<Nutrient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// Condensed recipe entry returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub image: String,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<RecipeSummary>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_parses_camel_case_payload() {
        let json = r#"{
            "id": 716429,
            "title": "Pasta with Garlic",
            "image": "https://img.spoonacular.com/recipes/716429-556x370.jpg",
            "readyInMinutes": 45,
            "servings": 2,
            "dishTypes": ["lunch", "main course"],
            "extendedIngredients": [
                {"id": 1001, "original": "1 tbsp butter", "amount": 1.0, "unit": "tbsp", "name": "butter"}
            ],
            "unknownField": true
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.id, 716429);
        assert_eq!(recipe.title, "Pasta with Garlic");
        assert_eq!(recipe.ready_in_minutes, 45);
        assert_eq!(recipe.servings, 2);
        assert_eq!(recipe.dish_types, vec!["lunch", "main course"]);
        assert_eq!(recipe.extended_ingredients[0].name, "butter");
        assert!(recipe.summary.is_none());
    }

    #[test]
    fn test_recipe_minimal_payload() {
        let recipe: Recipe = serde_json::from_str(r#"{"id": 1, "title": "Toast"}"#).unwrap();
        assert_eq!(recipe.title, "Toast");
        assert!(recipe.image.is_empty());
        assert!(recipe.cuisines.is_empty());
    }

    #[test]
    fn test_recipe_missing_title_is_rejected() {
        assert!(serde_json::from_str::<Recipe>(r#"{"id": 1}"#).is_err());
    }

    #[test]
    fn test_search_results_parse() {
        let json = r#"{
            "results": [{"id": 1, "title": "Soup", "image": "soup.jpg", "imageType": "jpg"}],
            "offset": 0,
            "number": 10,
            "totalResults": 86
        }"#;
        let page: SearchResults = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.total_results, 86);
    }
}
