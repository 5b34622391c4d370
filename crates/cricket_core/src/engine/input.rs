//! Input mapping
//!
//! The front end turns key presses into identifiers ("shot:cover_drive",
//! "run:advance", "bowl:yorker", ...). `InputMap` turns identifiers or
//! bound keys into actions the session understands.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::delivery::DeliveryType;
use super::shot::ShotType;

/// Running between the wickets while the ball is being fielded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunCommand {
    /// Go for one more
    Advance,
    /// Stay in the crease; take one fewer
    Retreat,
}

impl FromStr for RunCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advance" => Ok(RunCommand::Advance),
            "retreat" => Ok(RunCommand::Retreat),
            _ => Err(format!("unknown run command: {s}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum InputAction {
    Shot(ShotType),
    Run(RunCommand),
    /// Manual bowling: pick the next delivery
    SelectDelivery(DeliveryType),
    /// Manual bowling: bowl what is selected
    Bowl,
    TogglePause,
}

impl FromStr for InputAction {
    type Err = String;

    /// "shot:pull", "run:advance", "bowl:yorker", "bowl", "pause"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("shot", name)) => name.parse().map(InputAction::Shot),
            Some(("run", name)) => name.parse().map(InputAction::Run),
            Some(("bowl", name)) => name.parse().map(InputAction::SelectDelivery),
            None if s == "bowl" => Ok(InputAction::Bowl),
            None if s == "pause" => Ok(InputAction::TogglePause),
            _ => Err(format!("unknown input: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMap {
    bindings: HashMap<String, InputAction>,
}

impl Default for InputMap {
    fn default() -> Self {
        const SHOT_KEYS: [(&str, ShotType); 20] = [
            ("Q", ShotType::ForwardDefence),
            ("A", ShotType::BackfootDefence),
            ("Z", ShotType::LegGlance),
            ("X", ShotType::Flick),
            ("W", ShotType::StraightDrive),
            ("E", ShotType::CoverDrive),
            ("R", ShotType::OnDrive),
            ("D", ShotType::SquareCut),
            ("C", ShotType::LateCut),
            ("F", ShotType::UpperCut),
            ("S", ShotType::Pull),
            ("G", ShotType::Hook),
            ("T", ShotType::LoftedDrive),
            ("Y", ShotType::InsideOut),
            ("V", ShotType::Sweep),
            ("B", ShotType::ReverseSweep),
            ("H", ShotType::Scoop),
            ("U", ShotType::Slog),
            ("J", ShotType::Helicopter),
            ("N", ShotType::Charge),
        ];
        let mut bindings: HashMap<String, InputAction> =
            SHOT_KEYS.iter().map(|(k, s)| (k.to_string(), InputAction::Shot(*s))).collect();
        bindings.insert("ArrowUp".into(), InputAction::Run(RunCommand::Advance));
        bindings.insert("ArrowDown".into(), InputAction::Run(RunCommand::Retreat));
        for (i, t) in DeliveryType::ALL.iter().enumerate() {
            bindings.insert(format!("Digit{}", i + 1), InputAction::SelectDelivery(*t));
        }
        bindings.insert("Space".into(), InputAction::Bowl);
        bindings.insert("Escape".into(), InputAction::TogglePause);
        Self { bindings }
    }
}

impl InputMap {
    pub fn bind(&mut self, key: impl Into<String>, action: InputAction) -> Option<InputAction> {
        self.bindings.insert(key.into(), action)
    }

    pub fn unbind(&mut self, key: &str) -> Option<InputAction> {
        self.bindings.remove(key)
    }

    /// Bound key first, then a literal identifier
    pub fn resolve(&self, key_or_id: &str) -> Option<InputAction> {
        if let Some(action) = self.bindings.get(key_or_id) {
            return Some(*action);
        }
        match key_or_id.parse() {
            Ok(action) => Some(action),
            Err(e) => {
                log::debug!("{e}");
                None
            }
        }
    }

    pub fn key_for(&self, action: InputAction) -> Option<&str> {
        let mut keys: Vec<&str> =
            self.bindings.iter().filter(|(_, a)| **a == action).map(|(k, _)| k.as_str()).collect();
        keys.sort_unstable();
        keys.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shot_has_a_default_key() {
        let map = InputMap::default();
        for shot in ShotType::ALL {
            assert!(map.key_for(InputAction::Shot(shot)).is_some(), "{shot}");
        }
        for t in DeliveryType::ALL {
            assert!(map.key_for(InputAction::SelectDelivery(t)).is_some());
        }
    }

    #[test]
    fn test_identifiers_parse() {
        let map = InputMap::default();
        assert_eq!(map.resolve("shot:cover_drive"), Some(InputAction::Shot(ShotType::CoverDrive)));
        assert_eq!(map.resolve("run:retreat"), Some(InputAction::Run(RunCommand::Retreat)));
        assert_eq!(map.resolve("bowl:yorker"), Some(InputAction::SelectDelivery(DeliveryType::Yorker)));
        assert_eq!(map.resolve("ArrowUp"), Some(InputAction::Run(RunCommand::Advance)));
        assert_eq!(map.resolve("shot:googly"), None);
        assert_eq!(map.resolve("nonsense"), None);
    }

    #[test]
    fn test_rebinding() {
        let mut map = InputMap::default();
        assert_eq!(map.bind("E", InputAction::Shot(ShotType::Slog)), Some(InputAction::Shot(ShotType::CoverDrive)));
        assert_eq!(map.resolve("E"), Some(InputAction::Shot(ShotType::Slog)));
        map.unbind("E");
        assert_eq!(map.resolve("E"), None);
    }
}
