pub mod analytics;
pub mod content;
pub mod health;
