//! Carrying nuggets between claims, lodes and the ground.

use log::{debug, info};

use bang_howdy_core::{
    BonusKind, Cell, Command, Effect, Holding, Piece, PieceId, PieceKind, PlayerIndex, StatType,
};
use bang_howdy_world::query;

use crate::{context::ScenarioContext, delegate::ScenarioDelegate};

/// Lets units pick up, steal, mine and deposit nuggets.
///
/// A unit carries at most one nugget. Nuggets lying on the ground are picked
/// up by walking onto them, claims and lodes are worked from an adjacent cell,
/// and a carrier that dies drops its nugget where it fell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NuggetDelegate {
    steal: bool,
    mine: bool,
}

impl NuggetDelegate {
    /// Nuggets are stolen from rival claims.
    #[must_use]
    pub const fn claim_jumping() -> Self {
        Self {
            steal: true,
            mine: false,
        }
    }

    /// Nuggets are mined from lodes and claims cannot be robbed.
    #[must_use]
    pub const fn gold_rush() -> Self {
        Self {
            steal: false,
            mine: true,
        }
    }

    fn take(&self, ctx: &mut ScenarioContext<'_>, unit: &Piece, owner: PlayerIndex) {
        if let Some((bonus, BonusKind::Nugget)) = query::bonus_at(ctx.world, unit.cell) {
            ctx.push(Command::RemovePiece { piece: bonus });
            ctx.push(Command::SetHolding {
                piece: unit.id,
                holding: Some(Holding::Nugget),
            });
            ctx.stat(owner, StatType::BonusesCollected, 1);
            return;
        }

        let source = query::pieces(ctx.world)
            .iter()
            .filter(|piece| piece.cell.is_adjacent(unit.cell))
            .find(|piece| match piece.kind {
                PieceKind::Claim { nuggets } => {
                    self.steal && nuggets > 0 && piece.owner.is_some_and(|claim| claim != owner)
                }
                PieceKind::Counter { count } => self.mine && count > 0,
                _ => false,
            })
            .copied();
        let Some(source) = source else {
            return;
        };

        ctx.push(Command::AdjustCount {
            piece: source.id,
            delta: -1,
        });
        ctx.push(Command::SetHolding {
            piece: unit.id,
            holding: Some(Holding::Nugget),
        });
        if let PieceKind::Claim { .. } = source.kind {
            ctx.stat(owner, StatType::NuggetsStolen, 1);
            info!(
                "player {} jumped the claim of player {}",
                owner.get(),
                source.owner.map_or(0, |victim| victim.get())
            );
        } else {
            debug!("unit {} mined lode {}", unit.id.get(), source.id.get());
        }
    }

    fn deposit(&self, ctx: &mut ScenarioContext<'_>, unit: &Piece, owner: PlayerIndex) {
        let claim = query::pieces(ctx.world).iter().find(|piece| {
            matches!(piece.kind, PieceKind::Claim { .. })
                && piece.owner == Some(owner)
                && piece.cell.is_adjacent(unit.cell)
        });
        let Some(claim) = claim else {
            return;
        };
        ctx.push(Command::AdjustCount {
            piece: claim.id,
            delta: 1,
        });
        ctx.push(Command::SetHolding {
            piece: unit.id,
            holding: None,
        });
        ctx.stat(owner, StatType::NuggetsClaimed, 1);
        debug!("unit {} banked a nugget", unit.id.get());
    }
}

impl ScenarioDelegate for NuggetDelegate {
    fn round_will_start(&mut self, _ctx: &mut ScenarioContext<'_>) {}

    fn tick(&mut self, _ctx: &mut ScenarioContext<'_>) {}

    fn piece_moved(&mut self, ctx: &mut ScenarioContext<'_>, piece: &Piece, _from: Cell) {
        let Some(owner) = piece.owner else {
            return;
        };
        match piece.holding() {
            None => self.take(ctx, piece, owner),
            Some(Holding::Nugget) => self.deposit(ctx, piece, owner),
            Some(Holding::Talisman) => {}
        }
    }

    fn piece_was_killed(
        &mut self,
        ctx: &mut ScenarioContext<'_>,
        piece: &Piece,
        _shooter_owner: Option<PlayerIndex>,
    ) {
        if piece.holding() != Some(Holding::Nugget) {
            return;
        }
        ctx.push(Command::SetHolding {
            piece: piece.id,
            holding: None,
        });
        let _ = ctx.add_piece(PieceKind::Bonus(BonusKind::Nugget), None, piece.cell);
        debug!(
            "unit {} dropped its nugget at ({}, {})",
            piece.id.get(),
            piece.cell.x(),
            piece.cell.y()
        );
    }

    fn piece_affected(&mut self, _ctx: &mut ScenarioContext<'_>, _piece: PieceId, _effect: Effect) {}
}
