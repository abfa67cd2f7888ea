use sqlx::MySqlPool;
use uuid::Uuid;

use crate::utils::{login_cache, login_filter};

/// Lowercase a name part and strip everything except ascii letters
/// and digits, so "O'Brien" becomes "obrien".
pub fn slugify(part: &str) -> String {
    part.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Preferred login id shape is "first.last". Degrades to whichever
/// part survives slugging; "user" if neither does.
pub fn base_login_id(first_name: &str, last_name: &str) -> String {
    let first = slugify(first_name);
    let last = slugify(last_name);

    match (first.is_empty(), last.is_empty()) {
        (false, false) => format!("{}.{}", first, last),
        (false, true) => first,
        (true, false) => last,
        (true, true) => "user".to_string(),
    }
}

/// Candidates tried for a base id, in order: "jane.doe", "jane.doe2",
/// ... "jane.doe99".
fn numbered_candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((2..=99u32).map(move |n| format!("{}{}", base, n)))
}

/// Last resort once every numbered candidate is taken: an 8-hex-char
/// random tail always lands.
fn random_suffix(base: &str) -> String {
    let tail = Uuid::new_v4().to_simple().to_string();
    format!("{}.{}", base, &tail[..8])
}

/// Walk the candidate sequence and return the first id the predicate
/// reports free.
async fn first_available<E>(
    base: &str,
    mut is_free: impl AsyncFnMut(&str) -> Result<bool, E>,
) -> Result<String, E> {
    for candidate in numbered_candidates(base) {
        if is_free(&candidate).await? {
            return Ok(candidate);
        }
    }

    Ok(random_suffix(base))
}

/// Availability check, cheapest tier first:
/// 1. cuckoo filter miss proves the id is free (no false negatives)
/// 2. cache hit proves it is taken
/// 3. otherwise ask the database and repair the cache on a hit
pub async fn is_available(pool: &MySqlPool, candidate: &str) -> Result<bool, sqlx::Error> {
    if !login_filter::might_be_taken(candidate) {
        return Ok(true);
    }

    if login_cache::is_taken(candidate).await {
        return Ok(false);
    }

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE login_id = ?")
        .bind(candidate)
        .fetch_one(pool)
        .await?;

    if count > 0 {
        login_cache::mark_taken(candidate).await;
        return Ok(false);
    }

    Ok(true)
}

/// Generate a free login id from the employee's name, appending a
/// numeric suffix on collision ("jane.doe", "jane.doe2", ...).
pub async fn generate_login_id(
    pool: &MySqlPool,
    first_name: &str,
    last_name: &str,
) -> Result<String, sqlx::Error> {
    let base = base_login_id(first_name, last_name);
    first_available(&base, async |candidate| is_available(pool, candidate).await).await
}

/// Record a freshly inserted login id in both fast tiers.
pub async fn mark_taken(login_id: &str) {
    login_filter::insert(login_id);
    login_cache::mark_taken(login_id).await;
}

/// Free a login id after its account row is deleted. Filter removal
/// is deferred until warmup has completed; a stale filter entry only
/// costs one database lookup, and the unique key on `users.login_id`
/// backstops generation either way.
pub async fn release(login_id: &str) {
    login_filter::remove(login_id);
    login_cache::release(login_id).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn slugify_strips_punctuation_and_case() {
        assert_eq!(slugify("O'Brien"), "obrien");
        assert_eq!(slugify("Mary-Jane"), "maryjane");
        assert_eq!(slugify("  Asha  "), "asha");
        assert_eq!(slugify("D3v"), "d3v");
    }

    #[test]
    fn base_joins_first_and_last() {
        assert_eq!(base_login_id("Jane", "Doe"), "jane.doe");
        assert_eq!(base_login_id("Anil", "Kumar Rao"), "anil.kumarrao");
    }

    #[test]
    fn base_degrades_when_a_part_is_empty() {
        assert_eq!(base_login_id("Jane", ""), "jane");
        assert_eq!(base_login_id("", "Doe"), "doe");
        assert_eq!(base_login_id("", ""), "user");
        assert_eq!(base_login_id("---", "!!"), "user");
    }

    #[test]
    fn numbered_candidates_run_base_then_suffixes() {
        let all: Vec<String> = numbered_candidates("jane.doe").collect();
        assert_eq!(all.len(), 99);
        assert_eq!(all[0], "jane.doe");
        assert_eq!(all[1], "jane.doe2");
        assert_eq!(all[98], "jane.doe99");
    }

    #[test]
    fn random_suffix_has_fixed_shape() {
        let id = random_suffix("jane.doe");
        assert!(id.starts_with("jane.doe."));
        assert_eq!(id.len(), "jane.doe.".len() + 8);
        assert!(id["jane.doe.".len()..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(random_suffix("jane.doe"), random_suffix("jane.doe"));
    }

    #[actix_web::test]
    async fn picks_first_free_candidate_in_order() {
        let taken = ["jane.doe", "jane.doe2"];

        let login = first_available("jane.doe", async |candidate| {
            Ok::<_, Infallible>(!taken.contains(&candidate))
        })
        .await
        .unwrap();

        assert_eq!(login, "jane.doe3");
    }

    #[actix_web::test]
    async fn exhausted_names_fall_back_to_a_random_tail() {
        let login = first_available("amit.shah", async |_| Ok::<_, Infallible>(false))
            .await
            .unwrap();

        assert!(login.starts_with("amit.shah."));
        assert_eq!(login.len(), "amit.shah.".len() + 8);
    }

    #[actix_web::test]
    async fn conflict_repair_moves_generation_to_the_next_suffix() {
        mark_taken("rhea.kapoor").await;

        // Same shape as is_available minus the database tier: a filter
        // hit confirmed by the cache counts as taken.
        let login = first_available("rhea.kapoor", async |candidate| {
            let held = login_filter::might_be_taken(candidate)
                && login_cache::is_taken(candidate).await;
            Ok::<_, Infallible>(!held)
        })
        .await
        .unwrap();

        assert_eq!(login, "rhea.kapoor2");
    }
}
