pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_name() -> String {
    "Larder".to_string()
}

pub(super) fn default_data_dir() -> String {
    "~/.larder".to_string()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_db_path() -> String {
    "~/.larder/data/larder.db".to_string()
}

pub(super) fn default_base_url() -> String {
    "https://api.spoonacular.com".to_string()
}

pub(super) fn default_lookup_timeout() -> u64 {
    10
}

pub(super) fn default_daily_hour() -> u32 {
    12
}

pub(super) fn default_poll_interval() -> u64 {
    60
}

pub(super) fn default_reconcile_interval() -> u64 {
    300
}

pub(super) fn default_push_endpoint() -> String {
    "https://exp.host/--/api/v2/push/send".to_string()
}
