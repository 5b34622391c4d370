pub mod assets;
pub mod ball;
pub mod ball_prediction;
pub mod bowler;
pub mod config;
pub mod delivery;
pub mod events;
pub mod fielding;
pub mod input;
pub mod live_match;
pub mod match_context;
pub mod match_state;
pub mod physics_constants;
pub mod scheduler;
pub mod scorecard;
pub mod shot;
pub mod shot_resolver;
pub mod snapshot;
pub mod timestep;

pub use assets::{AssetCatalog, AssetKind, AssetRef, PlaceholderShape};
pub use ball::{BallEvent, BallPhysicsEngine, BallState, ExitTrajectory};
pub use bowler::{Bowler, BowlerMode};
pub use config::{EngineConfig, PROFILE_ENV};
pub use delivery::{Delivery, DeliveryType};
pub use events::{EventBus, ListenerId, MatchEvent, MatchListener};
pub use fielding::{FielderPosition, FielderRole, FieldingAI, FieldingEvent, RunRace, Runner};
pub use input::{InputAction, InputMap, RunCommand};
pub use live_match::LiveMatchSession;
pub use match_context::{MatchContext, MatchMode, MatchOptions};
pub use match_state::{
    DeliveryResult, ExtraKind, InningsEnd, MatchPhase, MatchResult, MatchStateMachine, Wicket,
};
pub use scheduler::{ScheduledAction, SessionId, TaskQueue};
pub use scorecard::{InningsCard, ScorecardTracker};
pub use shot::{BoundaryKind, ContactKind, ContactOutcome, PitchLength, ShotType, TimingBucket};
pub use shot_resolver::ShotResolver;
pub use snapshot::MatchSnapshot;
