pub mod app;
pub mod config;
pub mod day;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod history;
pub mod lab;
pub mod milestones;
pub mod models;
pub mod progress;
pub mod state;
pub mod storage;

pub use app::router;
pub use config::{RequirementTable, Settings};
pub use state::AppState;
pub use storage::{load_data, load_requirements};
