pub mod db_utils;
pub mod login_cache;
pub mod login_filter;
pub mod login_id;
