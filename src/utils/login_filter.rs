use anyhow::{anyhow, Result};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Expected capacity and false-positive rate.
/// Sized for internal headcount, not public signup volume.
const FILTER_CAPACITY: usize = 50_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static LOGIN_FILTER: Lazy<RwLock<CuckooFilter<String>>> = Lazy::new(|| {
    RwLock::new(CuckooFilter::new(
        FILTER_CAPACITY,
        FALSE_POSITIVE_RATE,
    ))
});

/// Set once warmup has loaded every persisted login id. Until then the
/// filter only gains entries, so a miss keeps proving the id is free.
static WARMED: AtomicBool = AtomicBool::new(false);

#[inline]
fn normalize(login_id: &str) -> String {
    login_id.to_lowercase()
}

/// Check if a login id might be taken (false positives possible,
/// never false negatives)
pub fn might_be_taken(login_id: &str) -> bool {
    let login_id = normalize(login_id);
    LOGIN_FILTER
        .read()
        .expect("login filter poisoned")
        .contains(&login_id)
}

/// Insert a single login id into the filter
pub fn insert(login_id: &str) {
    let login_id = normalize(login_id);
    LOGIN_FILTER
        .write()
        .expect("login filter poisoned")
        .add(&login_id);
}

/// Remove a login id from the filter when its account is deleted.
///
/// No-op until warmup completes: removing an id the filter never held
/// can evict another id's colliding fingerprint, turning a guaranteed
/// miss into a false negative. A stale entry is harmless, it just
/// sends one extra availability check to the database.
pub fn remove(login_id: &str) {
    if !WARMED.load(Ordering::Acquire) {
        return;
    }

    let login_id = normalize(login_id);
    LOGIN_FILTER
        .write()
        .expect("login filter poisoned")
        .remove(&login_id);
}

/// Warm up the login filter using streaming + batching
pub async fn warmup_login_filter(
    pool: &MySqlPool,
    batch_size: usize,
) -> Result<()> {
    let mut stream =
        sqlx::query_as::<_, (String,)>("SELECT login_id FROM users").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (login_id,) =
            row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&login_id));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    WARMED.store(true, Ordering::Release);
    log::info!("Login filter warmup complete: {} accounts", total);
    Ok(())
}

/// Insert a batch of normalized login ids
fn insert_batch(login_ids: &[String]) {
    let mut filter = LOGIN_FILTER
        .write()
        .expect("login filter poisoned");

    for login_id in login_ids {
        filter.add(login_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_case_insensitive() {
        insert("Casey.Stone");
        assert!(might_be_taken("casey.stone"));
        assert!(might_be_taken("CASEY.STONE"));
    }

    #[test]
    fn removal_is_deferred_until_warmup_completes() {
        insert("devon.blake");
        remove("devon.blake");

        // warmup never ran in this process, so the entry must survive
        assert!(might_be_taken("devon.blake"));
    }
}
