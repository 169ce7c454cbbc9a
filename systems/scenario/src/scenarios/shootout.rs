//! Shootout: no respawns, the last team standing ranks highest.

use log::info;

use bang_howdy_core::{Command, Piece, PieceId, PlayerIndex, StatType};
use bang_howdy_world::query;

use super::TickOutcome;
use crate::context::ScenarioContext;

/// Points paid per rank climbed above the first team knocked out.
pub const POINTS_PER_RANK: i32 = 50;

#[derive(Debug, Default)]
pub(crate) struct Shootout {
    knockouts: Vec<PlayerIndex>,
}

impl Shootout {
    pub(crate) fn round_will_start(&mut self) {
        self.knockouts.clear();
    }

    pub(crate) fn knockouts(&self) -> &[PlayerIndex] {
        &self.knockouts
    }

    fn knock_out(&mut self, player: PlayerIndex) -> bool {
        if self.knockouts.contains(&player) {
            return false;
        }
        self.knockouts.push(player);
        info!("player {} has been knocked out", player.get());
        true
    }

    pub(crate) fn piece_was_killed(
        &mut self,
        ctx: &mut ScenarioContext<'_>,
        piece: &Piece,
        shooter_owner: Option<PlayerIndex>,
    ) {
        let Some(victim) = piece.owner else {
            return;
        };
        if piece.unit().is_none() || query::living_unit_count(ctx.world, victim) > 0 {
            return;
        }
        if self.knock_out(victim) {
            if let Some(shooter) = shooter_owner.filter(|shooter| *shooter != victim) {
                ctx.stat(shooter, StatType::Knockouts, 1);
            }
        }
    }

    /// A resurrected unit puts its team back in the fight.
    pub(crate) fn piece_resurrected(&mut self, ctx: &mut ScenarioContext<'_>, piece: PieceId) {
        let Some(owner) = query::piece(ctx.world, piece).and_then(|unit| unit.owner) else {
            return;
        };
        if query::living_unit_count(ctx.world, owner) == 0 {
            return;
        }
        let before = self.knockouts.len();
        self.knockouts.retain(|knocked| *knocked != owner);
        if self.knockouts.len() < before {
            info!("player {} is back in the shootout", owner.get());
        }
    }

    pub(crate) fn tick(&mut self, ctx: &mut ScenarioContext<'_>) -> TickOutcome {
        for player in query::players(ctx.world) {
            if query::living_unit_count(ctx.world, player) == 0 {
                let _ = self.knock_out(player);
            }
        }
        let standing = query::players_with_living_units(ctx.world).len();
        if standing >= 2 {
            return TickOutcome::Continue;
        }
        if query::last_tick(ctx.world) > ctx.tick {
            ctx.push(Command::SetLastTick { tick: ctx.tick });
        }
        TickOutcome::EndRound
    }

    /// Ranks teams by the order in which they were knocked out.
    pub(crate) fn round_did_end(&mut self, ctx: &mut ScenarioContext<'_>) {
        let survivors_rank = i32::try_from(self.knockouts.len()).unwrap_or(i32::MAX);
        for player in query::players(ctx.world) {
            let rank = self
                .knockouts
                .iter()
                .position(|knocked| *knocked == player)
                .map_or(survivors_rank, |rank| i32::try_from(rank).unwrap_or(i32::MAX));
            ctx.grant(player, rank.saturating_mul(POINTS_PER_RANK));
        }
    }
}
