mod file;
mod health_check;
mod state;

pub use file::FileRecord;
pub use health_check::HealthCheck;
pub use state::AppState;
