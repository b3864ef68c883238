use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Valid values for a catalog meal's `type`.
pub const MEAL_CATEGORIES: &[&str] = &["breakfast", "lunch", "dinner"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub meal_type: String,
    pub image_url: Option<String>,
    pub date: Option<NaiveDate>,
    pub calories: Option<i32>,
    pub ingredients: Vec<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

/// Body for POST /api/meals.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub meal_type: String,
    pub image_url: Option<String>,
    pub date: Option<NaiveDate>,
    pub calories: Option<i32>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub available: Option<bool>,
}

/// Body for PUT /api/meals/{id}. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub meal_type: Option<String>,
    pub image_url: Option<String>,
    pub date: Option<NaiveDate>,
    pub calories: Option<i32>,
    pub ingredients: Option<Vec<String>>,
    pub available: Option<bool>,
}
