use chrono::{Duration, NaiveDate};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        selection::MealType,
        stats::{DayStats, TypeCounts, WeeklyStats},
    },
};

/// Days covered by the weekly view, reference day included.
pub const WINDOW_DAYS: i64 = 7;

/// The `(date, meal_types)` projection of a stored selection.
pub type SelectionRow = (NaiveDate, Vec<String>);

pub struct StatsService;

impl StatsService {
    /// Per-day, per-type counts for `[reference - 6, reference]`, oldest first.
    pub async fn weekly(pool: &PgPool, reference: NaiveDate) -> Result<WeeklyStats, AppError> {
        let start = window_start(reference);
        let rows = Self::fetch_rows(pool, start, reference).await?;
        Ok(aggregate_weekly(reference, &rows))
    }

    /// Per-type counts for one day.
    pub async fn daily(pool: &PgPool, date: NaiveDate) -> Result<TypeCounts, AppError> {
        let rows = Self::fetch_rows(pool, date, date).await?;
        Ok(count_types(rows.iter().map(|(_, types)| types.as_slice())))
    }

    async fn fetch_rows(
        pool: &PgPool,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SelectionRow>, AppError> {
        let rows = sqlx::query_as::<_, SelectionRow>(
            "SELECT date, meal_types FROM meal_selections WHERE date BETWEEN $1 AND $2",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

pub fn window_start(reference: NaiveDate) -> NaiveDate {
    reference - Duration::days(WINDOW_DAYS - 1)
}

/// Count, per type, how many selections contain it. A selection listing a type
/// twice still counts once; unknown labels are skipped.
pub fn count_types<'a>(selections: impl IntoIterator<Item = &'a [String]>) -> TypeCounts {
    let mut counts = TypeCounts::default();
    for types in selections {
        let mut seen: Vec<MealType> = Vec::with_capacity(types.len());
        for raw in types {
            match raw.parse::<MealType>() {
                Ok(t) if !seen.contains(&t) => {
                    seen.push(t);
                    counts.increment(t);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping stored selection value: {e}"),
            }
        }
    }
    counts
}

/// Build the weekly view from already-fetched rows. Rows outside the window are ignored.
pub fn aggregate_weekly(reference: NaiveDate, rows: &[SelectionRow]) -> WeeklyStats {
    let start = window_start(reference);
    let weekly: Vec<DayStats> = (0..WINDOW_DAYS)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let counts = count_types(
                rows.iter()
                    .filter(|(d, _)| *d == date)
                    .map(|(_, types)| types.as_slice()),
            );
            DayStats { date, counts }
        })
        .collect();

    let today = weekly.last().map(|d| d.counts).unwrap_or_default();
    WeeklyStats { today, weekly }
}
