use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::selection::MealType;

/// Number of selections per meal type for a single day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub breakfast: u32,
    pub lunch: u32,
    #[serde(rename = "evening-snacks")]
    pub evening_snacks: u32,
    pub dinner: u32,
}

impl TypeCounts {
    pub fn increment(&mut self, meal_type: MealType) {
        match meal_type {
            MealType::Breakfast => self.breakfast += 1,
            MealType::Lunch => self.lunch += 1,
            MealType::EveningSnacks => self.evening_snacks += 1,
            MealType::Dinner => self.dinner += 1,
        }
    }

    pub fn get(&self, meal_type: MealType) -> u32 {
        match meal_type {
            MealType::Breakfast => self.breakfast,
            MealType::Lunch => self.lunch,
            MealType::EveningSnacks => self.evening_snacks,
            MealType::Dinner => self.dinner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: TypeCounts,
}

/// Payload of the admin dashboard and of every realtime push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub today: TypeCounts,
    /// Seven entries, oldest first; the last one is the reference day.
    pub weekly: Vec<DayStats>,
}
