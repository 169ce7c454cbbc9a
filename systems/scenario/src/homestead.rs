//! Staking homesteads.

use log::info;

use bang_howdy_core::{Cell, Command, Effect, Piece, PieceId, PieceKind, PlayerIndex, StatType};
use bang_howdy_world::query;

use crate::{context::ScenarioContext, delegate::ScenarioDelegate};

/// Hands homesteads to whichever player last stood next to them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HomesteadDelegate;

impl HomesteadDelegate {
    /// Creates the delegate.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ScenarioDelegate for HomesteadDelegate {
    fn round_will_start(&mut self, ctx: &mut ScenarioContext<'_>) {
        let owned: Vec<PieceId> = query::pieces(ctx.world)
            .iter()
            .filter(|piece| piece.kind == PieceKind::Homestead && piece.owner.is_some())
            .map(|piece| piece.id)
            .collect();
        for piece in owned {
            ctx.push(Command::SetOwner { piece, owner: None });
        }
    }

    fn tick(&mut self, _ctx: &mut ScenarioContext<'_>) {}

    fn piece_moved(&mut self, ctx: &mut ScenarioContext<'_>, piece: &Piece, _from: Cell) {
        let Some(owner) = piece.owner else {
            return;
        };
        let staked: Vec<PieceId> = query::pieces(ctx.world)
            .iter()
            .filter(|stead| {
                stead.kind == PieceKind::Homestead
                    && stead.owner != Some(owner)
                    && stead.cell.is_adjacent(piece.cell)
            })
            .map(|stead| stead.id)
            .collect();
        for stead in staked {
            ctx.push(Command::SetOwner {
                piece: stead,
                owner: Some(owner),
            });
            ctx.stat(owner, StatType::StakesClaimed, 1);
            info!("player {} staked homestead {}", owner.get(), stead.get());
        }
    }

    fn piece_was_killed(
        &mut self,
        _ctx: &mut ScenarioContext<'_>,
        _piece: &Piece,
        _shooter_owner: Option<PlayerIndex>,
    ) {
    }

    fn piece_affected(&mut self, _ctx: &mut ScenarioContext<'_>, _piece: PieceId, _effect: Effect) {}
}
