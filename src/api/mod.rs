//! HTTP API handlers

pub mod assessment;
pub mod error;
pub mod health;
pub mod results;
pub mod ui;

pub use assessment::process_assessment;
pub use error::ApiError;
pub use health::{health_routes, FeatureFlags};
pub use results::list_results;
pub use ui::serve_index;
