//! Bowling control
//!
//! `Bowler` holds the automatic bowler, which picks and aims its own
//! deliveries, and the manual bowler, which only ever bowls what the player
//! selected. A `BowlerMode` tag says which one the session asks for the next
//! ball.

use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use super::config::BowlingConfig;
use super::delivery::{Delivery, DeliveryType};

/// Longest run of one delivery type the automatic bowler allows
pub const MAX_REPEATS: usize = 2;

/// Selection weights, same order as `DeliveryType::ALL`
const TYPE_WEIGHTS: [f32; 5] = [0.35, 0.15, 0.20, 0.15, 0.15];

#[derive(Debug, Clone)]
pub struct AutomaticBowler {
    config: BowlingConfig,
    recent: Vec<DeliveryType>,
}

impl AutomaticBowler {
    pub fn new(config: BowlingConfig) -> Self {
        Self { config, recent: Vec::with_capacity(MAX_REPEATS) }
    }

    /// Type that has just been bowled `MAX_REPEATS` times in a row
    fn blocked_type(&self) -> Option<DeliveryType> {
        let first = *self.recent.first()?;
        (self.recent.len() == MAX_REPEATS && self.recent.iter().all(|t| *t == first)).then_some(first)
    }

    fn remember(&mut self, t: DeliveryType) {
        if self.recent.len() == MAX_REPEATS {
            self.recent.remove(0);
        }
        self.recent.push(t);
    }

    fn pick_type<R: Rng + ?Sized>(&self, rng: &mut R) -> DeliveryType {
        let blocked = self.blocked_type();
        let candidates: Vec<(DeliveryType, f32)> = DeliveryType::ALL
            .iter()
            .copied()
            .zip(TYPE_WEIGHTS)
            .filter(|(t, _)| Some(*t) != blocked)
            .collect();

        match WeightedIndex::new(candidates.iter().map(|(_, w)| *w)) {
            Ok(dist) => candidates[dist.sample(rng)].0,
            Err(_) => DeliveryType::Straight,
        }
    }

    /// Choose and aim the next ball. `legal_balls` is the innings count so far;
    /// scatter and overstep chance fall as it grows.
    pub fn next_delivery<R: Rng + ?Sized>(&mut self, legal_balls: u32, rng: &mut R) -> Delivery {
        let delivery_type = self.pick_type(rng);
        let shape = delivery_type.shape();
        let variance = self.config.variance_factor(legal_balls);

        let n_line: f32 = StandardNormal.sample(rng);
        let n_length: f32 = StandardNormal.sample(rng);

        let line = rng.gen_range(shape.line.0..=shape.line.1) + n_line * self.config.line_sigma_m * variance;
        let length = rng.gen_range(shape.length.0..=shape.length.1)
            + n_length * self.config.length_sigma_m * variance;
        let speed = rng.gen_range(shape.speed.0..=shape.speed.1) * self.config.speed_scale;
        let overstep = rng.gen::<f32>() < self.config.overstep_chance * variance;

        self.remember(delivery_type);
        Delivery {
            delivery_type,
            target_line: line,
            target_length: length.max(0.0),
            speed,
            overstep,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManualBowler {
    selected: Option<Delivery>,
}

impl ManualBowler {
    pub fn select(&mut self, delivery_type: DeliveryType) {
        self.selected = Some(Delivery::nominal(delivery_type));
    }

    pub fn select_delivery(&mut self, delivery: Delivery) {
        self.selected = Some(delivery);
    }

    pub fn selected(&self) -> Option<&Delivery> {
        self.selected.as_ref()
    }

    pub fn take(&mut self) -> Option<Delivery> {
        self.selected.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BowlerMode {
    Automatic,
    Manual,
}

/// Both bowlers live for the whole match and `mode` picks the active one, so
/// the automatic bowler keeps its recent-type history across toggles.
#[derive(Debug, Clone)]
pub struct Bowler {
    mode: BowlerMode,
    automatic: AutomaticBowler,
    manual: ManualBowler,
}

impl Bowler {
    pub fn new(config: BowlingConfig, mode: BowlerMode) -> Self {
        Self { mode, automatic: AutomaticBowler::new(config), manual: ManualBowler::default() }
    }

    pub fn automatic(config: BowlingConfig) -> Self {
        Self::new(config, BowlerMode::Automatic)
    }

    pub fn manual(config: BowlingConfig) -> Self {
        Self::new(config, BowlerMode::Manual)
    }

    pub fn mode(&self) -> BowlerMode {
        self.mode
    }

    pub fn is_automatic(&self) -> bool {
        self.mode == BowlerMode::Automatic
    }

    /// Switch the active bowler. Returns false when `mode` was already active.
    pub fn set_mode(&mut self, mode: BowlerMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    /// The manual bowler, only while it is the active one
    pub fn manual_mut(&mut self) -> Option<&mut ManualBowler> {
        match self.mode {
            BowlerMode::Manual => Some(&mut self.manual),
            BowlerMode::Automatic => None,
        }
    }

    /// Next ball from the active bowler. The manual bowler only has one
    /// when the player has picked it.
    pub fn next_delivery<R: Rng + ?Sized>(&mut self, legal_balls: u32, rng: &mut R) -> Option<Delivery> {
        match self.mode {
            BowlerMode::Automatic => Some(self.automatic.next_delivery(legal_balls, rng)),
            BowlerMode::Manual => self.manual.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_never_three_in_a_row() {
        let mut bowler = AutomaticBowler::new(BowlingConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let seq: Vec<_> = (0..2000).map(|i| bowler.next_delivery(i, &mut rng).delivery_type).collect();
        for w in seq.windows(3) {
            assert!(!(w[0] == w[1] && w[1] == w[2]), "{w:?}");
        }
        for t in DeliveryType::ALL {
            assert!(seq.contains(&t), "{t} never bowled");
        }
    }

    #[test]
    fn test_scatter_shrinks_as_bowler_settles() {
        let spread = |legal_balls: u32| {
            let mut bowler = AutomaticBowler::new(BowlingConfig::default());
            let mut rng = ChaCha8Rng::seed_from_u64(5);
            let mut total = 0.0;
            for _ in 0..400 {
                let d = bowler.next_delivery(legal_balls, &mut rng);
                let (mid_line, mid_len, _) = d.delivery_type.shape().midpoint();
                total += (d.target_line - mid_line).abs() + (d.target_length - mid_len).abs();
            }
            total
        };
        assert!(spread(60) < spread(0));
    }

    #[test]
    fn test_deterministic_bowler_stays_inside_shape() {
        let mut cfg = BowlingConfig::default();
        cfg.line_sigma_m = 0.0;
        cfg.length_sigma_m = 0.0;
        cfg.overstep_chance = 0.0;
        let mut bowler = AutomaticBowler::new(cfg);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for i in 0..200 {
            let d = bowler.next_delivery(i, &mut rng);
            let s = d.delivery_type.shape();
            assert!(d.target_line >= s.line.0 && d.target_line <= s.line.1);
            assert!(d.target_length >= s.length.0 && d.target_length <= s.length.1);
            assert!(!d.overstep);
        }
    }

    #[test]
    fn test_manual_bowler_bowls_only_selection() {
        let mut bowler = Bowler::manual(BowlingConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(bowler.next_delivery(0, &mut rng).is_none());
        bowler.manual_mut().unwrap().select(DeliveryType::Yorker);
        let d = bowler.next_delivery(0, &mut rng).unwrap();
        assert_eq!(d.delivery_type, DeliveryType::Yorker);
        assert!(bowler.next_delivery(0, &mut rng).is_none());
        assert_eq!(bowler.mode(), BowlerMode::Manual);
    }

    #[test]
    fn test_toggling_keeps_repeat_history() {
        let mut bowler = Bowler::automatic(BowlingConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut seq = Vec::new();
        for _ in 0..300 {
            for _ in 0..2 {
                seq.push(bowler.next_delivery(0, &mut rng).unwrap().delivery_type);
            }
            assert!(bowler.set_mode(BowlerMode::Manual));
            assert!(bowler.manual_mut().is_some());
            assert!(bowler.set_mode(BowlerMode::Automatic));
            assert!(bowler.manual_mut().is_none());
        }
        for w in seq.windows(3) {
            assert!(!(w[0] == w[1] && w[1] == w[2]), "{w:?}");
        }
    }
}
