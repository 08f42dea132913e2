pub mod api;
pub mod state;
pub mod telemetry;
