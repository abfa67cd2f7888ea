use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// true  => login id is TAKEN
/// false => login id is AVAILABLE (usually we store only taken)
pub static LOGIN_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000) // tune based on memory
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Mark a single login id as taken
pub async fn mark_taken(login_id: &str) {
    LOGIN_CACHE
        .insert(login_id.to_lowercase(), true)
        .await;
}

/// Check if a login id is taken
pub async fn is_taken(login_id: &str) -> bool {
    LOGIN_CACHE
        .get(&login_id.to_lowercase())
        .await
        .unwrap_or(false)
}

/// Drop a login id from the cache when its account is deleted
pub async fn release(login_id: &str) {
    LOGIN_CACHE.invalidate(&login_id.to_lowercase()).await;
}

/// Batch mark login ids as taken
async fn batch_mark(login_ids: &[String]) {
    let futures: Vec<_> = login_ids
        .iter()
        .map(|l| LOGIN_CACHE.insert(l.to_lowercase(), true))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load only RECENTLY ACTIVE login ids into the in-memory cache (batched)
pub async fn warmup_login_cache(
    pool: &MySqlPool,
    days: u32,
    batch_size: usize,
) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT login_id
        FROM users
        WHERE last_login_at >= NOW() - INTERVAL ? DAY
        ORDER BY last_login_at DESC
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (login_id,) = row?;
        batch.push(login_id);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining login ids
    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    log::info!(
        "Login cache warmup complete: {} recently active accounts (last {} days)",
        total_count,
        days
    );

    Ok(())
}
