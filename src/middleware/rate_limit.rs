use crate::error::AppError;

/// Checks an email-keyed rate limit stored in Redis.
///
/// Uses the INCR + EXPIRE strategy:
/// - Increments a counter for `key`
/// - On first increment, sets TTL to `window_secs`
/// - Returns 429 if counter exceeds `max_attempts`
///
/// Redis being unreachable lets the request through.
pub async fn check_rate_limit(
    client: &redis::Client,
    key: &str,
    max_attempts: u64,
    window_secs: u64,
) -> Result<(), AppError> {
    let mut redis = match client.get_multiplexed_async_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::warn!("rate limit skipped, redis unavailable: {e}");
            return Ok(());
        }
    };

    let count: u64 = redis::cmd("INCR")
        .arg(key)
        .query_async(&mut redis)
        .await
        .unwrap_or(0);

    if count == 1 {
        // Set TTL only on first increment to avoid resetting the window on each attempt
        let _: Result<(), _> = redis::cmd("EXPIRE")
            .arg(key)
            .arg(window_secs)
            .query_async(&mut redis)
            .await;
    }

    if count > max_attempts {
        return Err(AppError::RateLimited);
    }

    Ok(())
}
