use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db,
    error::AppError,
    models::selection::{MealSelection, MealType},
    services::{realtime::AdminBroadcast, stats::StatsService},
};

const SELECTION_COLUMNS: &str = "id, user_id, date, meal_types, created_at, updated_at";

pub struct SelectionService;

impl SelectionService {
    /// Record `raw_types` as the user's selection for `date`.
    ///
    /// `now` is the server's local wall clock. The cutoff is applied to it
    /// whatever `date` is, and before anything is validated or written.
    /// On success the weekly statistics for `now`'s date are recomputed and
    /// pushed to the admin broadcast group.
    pub async fn submit(
        pool: &PgPool,
        broadcast: &AdminBroadcast,
        user_id: Uuid,
        date: NaiveDate,
        raw_types: &[String],
        now: NaiveDateTime,
        cutoff_hour: u32,
    ) -> Result<MealSelection, AppError> {
        check_cutoff(now, cutoff_hour)?;
        let meal_types = parse_meal_types(raw_types)?;
        let labels: Vec<String> = meal_types.iter().map(|t| t.as_str().to_string()).collect();

        let selection = Self::upsert(pool, user_id, date, &labels).await?;
        tracing::info!(
            "Meal selection for {} on {}: {}",
            user_id,
            date,
            labels.join(",")
        );

        Self::publish_stats(pool, broadcast, now.date()).await;
        Ok(selection)
    }

    /// Delete one of `user_id`'s selections by id. The cutoff applies as for
    /// [`Self::submit`]; a selection owned by someone else is reported as not found.
    pub async fn withdraw(
        pool: &PgPool,
        broadcast: &AdminBroadcast,
        user_id: Uuid,
        selection_id: Uuid,
        now: NaiveDateTime,
        cutoff_hour: u32,
    ) -> Result<(), AppError> {
        check_cutoff(now, cutoff_hour)?;

        let deleted: Option<(NaiveDate,)> = sqlx::query_as(
            "DELETE FROM meal_selections WHERE id = $1 AND user_id = $2 RETURNING date",
        )
        .bind(selection_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        let Some((date,)) = deleted else {
            return Err(AppError::NotFound("Meal selection"));
        };
        tracing::info!("Meal selection for {} on {} withdrawn", user_id, date);

        Self::publish_stats(pool, broadcast, now.date()).await;
        Ok(())
    }

    /// Recompute the weekly statistics and push them to admin sessions.
    /// The selection change is already committed, so a failure is only logged.
    async fn publish_stats(pool: &PgPool, broadcast: &AdminBroadcast, reference: NaiveDate) {
        match StatsService::weekly(pool, reference).await {
            Ok(stats) => {
                let sessions = broadcast.publish(stats);
                tracing::debug!("pushed selection stats to {sessions} admin session(s)");
            }
            Err(e) => tracing::warn!("selection changed but stats refresh failed: {e}"),
        }
    }

    /// Stored meal types for (user, date); empty when nothing was selected.
    pub async fn get(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<MealType>, AppError> {
        let selection = Self::find(pool, user_id, date).await?;
        Ok(selection
            .map(|s| s.meal_types.iter().filter_map(|t| t.parse().ok()).collect())
            .unwrap_or_default())
    }

    /// The user's selection history, most recent date first.
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<MealSelection>, AppError> {
        let selections = sqlx::query_as::<_, MealSelection>(&format!(
            "SELECT {SELECTION_COLUMNS} FROM meal_selections WHERE user_id = $1 ORDER BY date DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(selections)
    }

    /// Find-or-create, then update. An insert that loses a race against a
    /// concurrent submission hits the (user_id, date) unique constraint and is
    /// turned into an update of the row that won.
    async fn upsert(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
        labels: &[String],
    ) -> Result<MealSelection, AppError> {
        if Self::find(pool, user_id, date).await?.is_some() {
            return Self::update(pool, user_id, date, labels)
                .await?
                .ok_or_else(|| AppError::Conflict("Meal selection changed concurrently, please retry".into()));
        }

        let inserted = sqlx::query_as::<_, MealSelection>(&format!(
            "INSERT INTO meal_selections (user_id, date, meal_types)
             VALUES ($1, $2, $3)
             RETURNING {SELECTION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(date)
        .bind(labels)
        .fetch_one(pool)
        .await;

        match inserted {
            Ok(selection) => Ok(selection),
            Err(e) if db::is_unique_violation(&e) => {
                tracing::debug!("selection insert raced for {user_id} on {date}, updating instead");
                Self::update(pool, user_id, date, labels)
                    .await?
                    .ok_or_else(|| AppError::Conflict("Meal selection for this date already exists".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<MealSelection>, AppError> {
        let selection = sqlx::query_as::<_, MealSelection>(&format!(
            "SELECT {SELECTION_COLUMNS} FROM meal_selections WHERE user_id = $1 AND date = $2"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
        Ok(selection)
    }

    async fn update(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
        labels: &[String],
    ) -> Result<Option<MealSelection>, AppError> {
        let selection = sqlx::query_as::<_, MealSelection>(&format!(
            "UPDATE meal_selections
             SET meal_types = $3, updated_at = NOW()
             WHERE user_id = $1 AND date = $2
             RETURNING {SELECTION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(date)
        .bind(labels)
        .fetch_optional(pool)
        .await?;
        Ok(selection)
    }
}

/// Selections always target the day after the local date of `now`.
pub fn target_date(now: NaiveDateTime) -> NaiveDate {
    now.date() + Duration::days(1)
}

// FIXME: the hour is taken from the server clock without regard to the target
// date's timezone; a deployment serving users in another zone sees a shifted cutoff.
/// Submissions are accepted while the local hour is strictly below `cutoff_hour`.
pub fn check_cutoff(now: NaiveDateTime, cutoff_hour: u32) -> Result<(), AppError> {
    if now.hour() >= cutoff_hour {
        return Err(AppError::PastCutoff(cutoff_hour));
    }
    Ok(())
}

/// Parse a non-empty list of meal-type labels into a set, keeping first-seen order.
pub fn parse_meal_types(raw: &[String]) -> Result<Vec<MealType>, AppError> {
    if raw.is_empty() {
        return Err(AppError::validation("Please select at least one meal type"));
    }

    let mut invalid: Vec<&str> = Vec::new();
    let mut types: Vec<MealType> = Vec::with_capacity(raw.len());
    for label in raw {
        match label.parse::<MealType>() {
            Ok(t) if !types.contains(&t) => types.push(t),
            Ok(_) => {}
            Err(_) => invalid.push(label),
        }
    }

    if !invalid.is_empty() {
        return Err(AppError::validation(format!(
            "Invalid meal type(s) selected: {}",
            invalid.join(", ")
        )));
    }
    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_accepts_every_valid_subset() {
        // all 15 non-empty subsets of the four types
        for mask in 1u8..16 {
            let subset: Vec<MealType> = MealType::ALL
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, t)| *t)
                .collect();
            let raw: Vec<String> = subset.iter().map(|t| t.to_string()).collect();
            assert_eq!(parse_meal_types(&raw).unwrap(), subset);
        }
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(parse_meal_types(&[]), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_reports_invalid_entries() {
        let err = parse_meal_types(&labels(&["lunch", "brunch", "supper"])).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("brunch"));
                assert!(msg.contains("supper"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_collapses_duplicates() {
        let types = parse_meal_types(&labels(&["dinner", "lunch", "dinner"])).unwrap();
        assert_eq!(types, vec![MealType::Dinner, MealType::Lunch]);
    }

    #[test]
    fn test_cutoff_boundary() {
        assert!(check_cutoff(at("2025-03-10 00:00"), 22).is_ok());
        assert!(check_cutoff(at("2025-03-10 21:59"), 22).is_ok());
        assert!(matches!(
            check_cutoff(at("2025-03-10 22:00"), 22),
            Err(AppError::PastCutoff(22))
        ));
        assert!(check_cutoff(at("2025-03-10 23:30"), 22).is_err());
    }

    #[test]
    fn test_target_date_is_tomorrow() {
        assert_eq!(
            target_date(at("2025-12-31 09:00")),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }
}
