use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// None of these are fatal: a rejected command leaves every piece of match
/// state untouched, missing assets fall back to placeholders and
/// out-of-range configuration is clamped.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid state transition: {command} rejected during {phase}")]
    InvalidStateTransition { command: &'static str, phase: String },

    #[error("Asset unavailable: {kind}")]
    AssetUnavailable { kind: String },

    #[error("Configuration out of range: {field}={value} (valid {min}..={max})")]
    ConfigurationOutOfRange { field: &'static str, value: f64, min: f64, max: f64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Listener failed: {0}")]
    Listener(String),
}

impl CoreError {
    pub fn invalid(command: &'static str, phase: impl std::fmt::Debug) -> Self {
        CoreError::InvalidStateTransition { command, phase: format!("{phase:?}") }
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            CoreError::InvalidStateTransition { .. } => true,
            CoreError::AssetUnavailable { .. } => true,
            CoreError::ConfigurationOutOfRange { .. } => true,
            CoreError::Serialization(_) => true,
            CoreError::Listener(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Clamp `value` into `min..=max`, logging a `ConfigurationOutOfRange` when it moves.
pub fn clamp_config<T>(field: &'static str, value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + Into<f64>,
{
    if value < min || value > max {
        let clamped = if value < min { min } else { max };
        let err = CoreError::ConfigurationOutOfRange {
            field,
            value: value.into(),
            min: min.into(),
            max: max.into(),
        };
        log::warn!("{err}; clamped to {}", clamped.into());
        clamped
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_config_inside_range_is_identity() {
        assert_eq!(clamp_config("overs", 5u32, 1, 50), 5);
    }

    #[test]
    fn test_clamp_config_snaps_to_nearest_bound() {
        assert_eq!(clamp_config("overs", 0u32, 1, 50), 1);
        assert_eq!(clamp_config("overs", 90u32, 1, 50), 50);
        assert!((clamp_config("drag", -1.0f32, 0.0, 0.05) - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_every_error_is_recoverable() {
        let err = CoreError::invalid("submit_shot", "AwaitingDelivery");
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("submit_shot"));
        assert!(CoreError::AssetUnavailable { kind: "Ball".into() }.is_recoverable());
    }
}
