use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::auth::Session;
use crate::config::Settings;
use crate::render::fonts::FontSet;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub settings: Settings,
    pub fonts: FontSet,
    pub session: Option<Session>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let fonts = FontSet::from_config(settings.font_path.as_deref());
        Self {
            workspace: None,
            db: None,
            settings,
            fonts,
            session: None,
        }
    }
}
