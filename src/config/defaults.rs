pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";

pub fn default_request_timeout() -> u64 {
    30
}

pub fn default_idle_timeout_development() -> u64 {
    120
}

pub fn default_idle_timeout_production() -> u64 {
    300
}

pub fn default_log_level() -> String {
    "info".to_string()
}
