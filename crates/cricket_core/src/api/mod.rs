pub mod auto_batter;
pub mod json_api;

pub use auto_batter::AutoBatter;
pub use json_api::{simulate_match, simulate_match_json, snapshot_json, SimulationRequest, SimulationResponse};
