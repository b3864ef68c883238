use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::meal::{CreateMealRequest, Meal, UpdateMealRequest, MEAL_CATEGORIES},
};

const MEAL_COLUMNS: &str =
    "id, name, description, meal_type, image_url, date, calories, ingredients, available, created_at";

pub struct MealService;

impl MealService {
    /// Public catalog, dated meals first in date order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Meal>, AppError> {
        let meals = sqlx::query_as::<_, Meal>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals ORDER BY date ASC NULLS LAST, name"
        ))
        .fetch_all(pool)
        .await?;
        Ok(meals)
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM meals WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    pub async fn create(pool: &PgPool, req: &CreateMealRequest) -> Result<Meal, AppError> {
        validate_create(req)?;
        let meal = sqlx::query_as::<_, Meal>(&format!(
            "INSERT INTO meals (name, description, meal_type, image_url, date, calories, ingredients, available)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {MEAL_COLUMNS}"
        ))
        .bind(req.name.trim())
        .bind(req.description.trim())
        .bind(&req.meal_type)
        .bind(&req.image_url)
        .bind(req.date)
        .bind(req.calories)
        .bind(&req.ingredients)
        .bind(req.available.unwrap_or(true))
        .fetch_one(pool)
        .await?;
        tracing::info!("Created meal {} ({})", meal.id, meal.name);
        Ok(meal)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateMealRequest,
    ) -> Result<Meal, AppError> {
        validate_update(req)?;
        sqlx::query_as::<_, Meal>(&format!(
            "UPDATE meals
             SET name = COALESCE($1, name),
                 description = COALESCE($2, description),
                 meal_type = COALESCE($3, meal_type),
                 image_url = COALESCE($4, image_url),
                 date = COALESCE($5, date),
                 calories = COALESCE($6, calories),
                 ingredients = COALESCE($7, ingredients),
                 available = COALESCE($8, available)
             WHERE id = $9
             RETURNING {MEAL_COLUMNS}"
        ))
        .bind(req.name.as_deref().map(str::trim))
        .bind(req.description.as_deref().map(str::trim))
        .bind(&req.meal_type)
        .bind(&req.image_url)
        .bind(req.date)
        .bind(req.calories)
        .bind(&req.ingredients)
        .bind(req.available)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Meal"))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Meal"));
        }
        Ok(())
    }
}

fn validate_category(meal_type: &str) -> Result<(), AppError> {
    if !MEAL_CATEGORIES.contains(&meal_type) {
        return Err(AppError::validation(format!(
            "Type must be one of: {}",
            MEAL_CATEGORIES.join(", ")
        )));
    }
    Ok(())
}

fn validate_calories(calories: Option<i32>) -> Result<(), AppError> {
    match calories {
        Some(c) if c < 0 => Err(AppError::validation("Calories must be a positive number")),
        _ => Ok(()),
    }
}

fn validate_create(req: &CreateMealRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::validation("Description is required"));
    }
    validate_category(&req.meal_type)?;
    validate_calories(req.calories)
}

fn validate_update(req: &UpdateMealRequest) -> Result<(), AppError> {
    if matches!(req.name.as_deref(), Some(n) if n.trim().is_empty()) {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if matches!(req.description.as_deref(), Some(d) if d.trim().is_empty()) {
        return Err(AppError::validation("Description cannot be empty"));
    }
    if let Some(ref t) = req.meal_type {
        validate_category(t)?;
    }
    validate_calories(req.calories)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(meal_type: &str) -> CreateMealRequest {
        CreateMealRequest {
            name: "Chicken Rice".into(),
            description: "Chicken served with fragrant rice".into(),
            meal_type: meal_type.into(),
            image_url: None,
            date: None,
            calories: Some(650),
            ingredients: vec!["chicken".into(), "rice".into()],
            available: None,
        }
    }

    #[test]
    fn test_create_accepts_catalog_types_only() {
        assert!(validate_create(&request("lunch")).is_ok());
        // evening snacks can be selected but are not a catalog category
        assert!(validate_create(&request("evening-snacks")).is_err());
        assert!(validate_create(&request("brunch")).is_err());
    }

    #[test]
    fn test_create_requires_name_and_description() {
        let mut req = request("dinner");
        req.name = "   ".into();
        assert!(validate_create(&req).is_err());

        let mut req = request("dinner");
        req.description = String::new();
        assert!(validate_create(&req).is_err());
    }

    #[test]
    fn test_negative_calories_rejected() {
        let mut req = request("breakfast");
        req.calories = Some(-1);
        assert!(validate_create(&req).is_err());

        let update = UpdateMealRequest { calories: Some(-5), ..Default::default() };
        assert!(validate_update(&update).is_err());
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(validate_update(&UpdateMealRequest::default()).is_ok());
    }
}
