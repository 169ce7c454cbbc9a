#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scenario engine for Bang! Howdy.
//!
//! A [`Scenario`] owns the rules of one game type and reacts to the shared
//! game object through lifecycle hooks that answer with commands. Reusable
//! behaviour such as nugget handling, homestead staking and respawning is
//! composed in as [`ScenarioDelegate`] values. The [`Session`] is the
//! authoritative host that applies those commands and drives the phases.

mod ai;
mod context;
mod delegate;
mod error;
mod homestead;
mod markers;
mod nugget;
mod scenario;
pub mod scenarios;
mod session;

pub use ai::{AiLogic, AiProfile, ObjectiveAi};
pub use context::{PieceIds, ScenarioContext};
pub use delegate::ScenarioDelegate;
pub use error::{ScenarioError, SessionError};
pub use homestead::HomesteadDelegate;
pub use markers::{is_marker, BoardMarkers, Purchase};
pub use nugget::NuggetDelegate;
pub use scenario::{RoundState, Scenario, POINTS_PER_BONUS, POINTS_PER_KILL, START_SEARCH_RADIUS};
pub use scenarios::{ScenarioType, TickOutcome};
pub use session::{Session, TickReport};
