use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A meal slot a user can sign up for on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MealType {
    Breakfast,
    Lunch,
    EveningSnacks,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::EveningSnacks,
        MealType::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::EveningSnacks => "evening-snacks",
            MealType::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "evening-snacks" => Ok(MealType::EveningSnacks),
            "dinner" => Ok(MealType::Dinner),
            _ => Err(anyhow::anyhow!("Unknown meal type: {s}")),
        }
    }
}

/// One user's declared meal types for one day. Unique per (user_id, date).
/// `meal_types` is a TEXT[] column restricted by a CHECK constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealSelection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub meal_types: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for POST /api/meal-selections/select-type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectTypesRequest {
    pub meal_types: Vec<String>,
}

/// Response for GET /api/meal-selections/selected-types.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedTypesResponse {
    pub meal_types: Vec<MealType>,
    pub date: NaiveDate,
}
