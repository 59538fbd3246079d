use std::env;
use std::path::PathBuf;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@school.com";
pub const DEFAULT_ADMIN_PASS: &str = "admin123";
pub const DEFAULT_SCHOOL_NAME: &str = "Fatima Jinnah School & College Kohat";

#[derive(Debug, Clone)]
pub struct Settings {
    pub admin_email: String,
    pub admin_password: String,
    pub school_name: String,
    pub font_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: DEFAULT_ADMIN_PASS.to_string(),
            school_name: DEFAULT_SCHOOL_NAME.to_string(),
            font_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        // A missing .env is the normal case in packaged builds.
        let _ = dotenvy::dotenv();
        let defaults = Settings::default();
        Self {
            admin_email: env_var("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password: env_var("ADMIN_PASS").unwrap_or(defaults.admin_password),
            school_name: env_var("SCHOOL_NAME").unwrap_or(defaults.school_name),
            font_path: env_var("EXAMDESK_FONT").map(PathBuf::from),
            log_filter: env_var("EXAMDESK_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
