//! Pluggable behaviors composed into a scenario.

use std::fmt;

use bang_howdy_core::{Cell, Effect, Piece, PieceId, PlayerIndex};
use bang_howdy_system_respawn::RespawnDelegate;

use crate::context::ScenarioContext;

/// Behavior shared by several scenarios, driven by the scenario's hooks.
///
/// Delegates run in the order they were registered, after the scenario's own
/// logic for the same hook.
pub trait ScenarioDelegate: fmt::Debug {
    /// Prepares for a new round.
    fn round_will_start(&mut self, ctx: &mut ScenarioContext<'_>);

    /// Runs once per tick.
    fn tick(&mut self, ctx: &mut ScenarioContext<'_>);

    /// Reacts to a living unit having moved from `from` to its current cell.
    fn piece_moved(&mut self, ctx: &mut ScenarioContext<'_>, piece: &Piece, from: Cell);

    /// Reacts to a piece having been killed.
    fn piece_was_killed(
        &mut self,
        ctx: &mut ScenarioContext<'_>,
        piece: &Piece,
        shooter_owner: Option<PlayerIndex>,
    );

    /// Reacts to an effect applied to a piece.
    fn piece_affected(&mut self, ctx: &mut ScenarioContext<'_>, piece: PieceId, effect: Effect);

    /// Scores the round once it is over.
    fn round_did_end(&mut self, _ctx: &mut ScenarioContext<'_>) {}
}

impl ScenarioDelegate for RespawnDelegate {
    fn round_will_start(&mut self, _ctx: &mut ScenarioContext<'_>) {
        RespawnDelegate::round_will_start(self);
    }

    fn tick(&mut self, ctx: &mut ScenarioContext<'_>) {
        RespawnDelegate::tick(self, ctx.world, ctx.tick, ctx.out);
    }

    fn piece_moved(&mut self, _ctx: &mut ScenarioContext<'_>, _piece: &Piece, _from: Cell) {}

    fn piece_was_killed(
        &mut self,
        ctx: &mut ScenarioContext<'_>,
        piece: &Piece,
        _shooter_owner: Option<PlayerIndex>,
    ) {
        RespawnDelegate::piece_was_killed(self, piece, ctx.tick);
    }

    fn piece_affected(&mut self, _ctx: &mut ScenarioContext<'_>, piece: PieceId, effect: Effect) {
        RespawnDelegate::piece_affected(self, piece, effect);
    }
}
