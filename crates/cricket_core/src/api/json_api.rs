use serde::{Deserialize, Serialize};

use super::auto_batter::AutoBatter;
use crate::engine::config::EngineConfig;
use crate::engine::live_match::LiveMatchSession;
use crate::engine::match_context::{MatchMode, MatchOptions};
use crate::engine::match_state::{MatchPhase, MatchResult};
use crate::engine::scorecard::ScorecardTracker;
use crate::engine::snapshot::MatchSnapshot;
use crate::engine::timestep::HEADLESS_FRAME_DT;
use crate::error::{CoreError, Result};
use crate::SCHEMA_VERSION;

/// Salt so the batter's stream differs from the match stream on one seed
const BATTER_SEED_SALT: u64 = 0x0BA7_5EED;

fn default_aggression() -> f32 {
    0.6
}

fn default_timing_sigma() -> f32 {
    0.6
}

fn default_max_seconds() -> f32 {
    36_000.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRequest {
    pub schema_version: u8,
    #[serde(default)]
    pub mode: MatchMode,
    #[serde(default)]
    pub options: MatchOptions,
    /// Preset name ("realistic", "arcade", "simulation", "deterministic")
    #[serde(default)]
    pub profile: Option<String>,
    /// Full config; wins over `profile`
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default = "default_aggression")]
    pub aggression: f32,
    /// Spread of the scripted batter's timing (m)
    #[serde(default = "default_timing_sigma")]
    pub timing_sigma_m: f32,
    /// Match-clock budget before giving up on an unfinished match
    #[serde(default = "default_max_seconds")]
    pub max_seconds: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResponse {
    pub schema_version: u8,
    pub seed: u64,
    pub mode: MatchMode,
    /// `None` when the clock budget ran out first
    pub result: Option<MatchResult>,
    pub summary: String,
    pub deliveries: u64,
    pub clock_ms: u64,
    pub scorecard: ScorecardTracker,
    pub snapshot: MatchSnapshot,
}

impl SimulationRequest {
    fn engine_config(&self) -> EngineConfig {
        if let Some(cfg) = &self.config {
            return cfg.clone();
        }
        match self.profile.as_deref() {
            Some(name) => EngineConfig::from_profile(name).unwrap_or_else(|| {
                log::warn!("unknown config profile {name:?}, using realistic");
                EngineConfig::realistic()
            }),
            None => EngineConfig::realistic(),
        }
    }
}

/// Play a whole match headless: automatic bowling, scripted batting.
pub fn simulate_match(request: &SimulationRequest) -> Result<SimulationResponse> {
    let mut session = LiveMatchSession::new(request.engine_config());
    let options = MatchOptions { auto_bowler: true, ..request.options.clone() };
    let seed = options.seed;
    session.start_match(request.mode, options)?;

    let mut batter = AutoBatter::new(seed ^ BATTER_SEED_SALT, request.aggression, request.timing_sigma_m);
    let frames = (request.max_seconds.max(0.0) / HEADLESS_FRAME_DT) as u64;
    for _ in 0..frames {
        if session.phase() == MatchPhase::MatchComplete {
            break;
        }
        batter.act(&mut session);
        session.tick(HEADLESS_FRAME_DT);
    }
    if session.phase() != MatchPhase::MatchComplete {
        log::warn!("match not finished after {}s of match time", request.max_seconds);
    }

    let result = session.result().cloned();
    Ok(SimulationResponse {
        schema_version: SCHEMA_VERSION,
        seed,
        mode: request.mode,
        summary: result.as_ref().map(MatchResult::summary).unwrap_or_else(|| "Match unfinished".to_string()),
        result,
        deliveries: session.delivery_count(),
        clock_ms: session.clock_ms(),
        scorecard: session.scorecard().clone(),
        snapshot: session.snapshot(),
    })
}

/// JSON entry point for a headless match
pub fn simulate_match_json(request_json: &str) -> std::result::Result<String, String> {
    let request: SimulationRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    if request.schema_version != SCHEMA_VERSION {
        return Err(format!("Unsupported schema version: {}", request.schema_version));
    }

    let response = simulate_match(&request).map_err(|e| e.to_string())?;
    serde_json::to_string(&response).map_err(|e| format!("Serialization failed: {}", e))
}

/// Current state of a live session for the UI layer
pub fn snapshot_json(session: &LiveMatchSession) -> std::result::Result<String, String> {
    serde_json::to_string(&session.snapshot()).map_err(|e| CoreError::from(e).to_string())
}
