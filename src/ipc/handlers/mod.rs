pub mod auth;
pub mod catalog;
pub mod core;
pub mod date_sheet;
pub mod documents;
pub mod papers;
pub mod settings;
pub mod syllabus;
pub mod translit;
pub mod users;
