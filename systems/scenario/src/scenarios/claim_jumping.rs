//! Claim jumping: guard your claim, rob everyone else's.

use bang_howdy_core::{ConfigError, Piece, PieceId, Tick};
use bang_howdy_world::query;

use super::{assign_claims, bank_claims, EarlyEnd};
use crate::{context::ScenarioContext, markers::BoardMarkers};

/// Nuggets in each claim when the round starts.
pub const NUGGET_COUNT: u32 = 2;

/// Points paid per nugget left in a claim at the end of the round.
pub const POINTS_PER_NUGGET: i32 = 50;

/// Ticks left in the round once any claim has been emptied.
pub const EMPTY_CLAIM_TICKS: Tick = 28;

#[derive(Debug, Default)]
pub(crate) struct ClaimJumping {
    claims: Vec<PieceId>,
    early_end: EarlyEnd,
}

impl ClaimJumping {
    pub(crate) fn round_will_start(
        &mut self,
        ctx: &mut ScenarioContext<'_>,
        markers: &BoardMarkers,
    ) -> Result<(), ConfigError> {
        self.early_end.reset();
        self.claims = assign_claims(ctx, markers.starts(), NUGGET_COUNT)?;
        Ok(())
    }

    /// Shortens the round while a claim lies empty and restores it once refilled.
    pub(crate) fn piece_updated(&mut self, ctx: &mut ScenarioContext<'_>, after: &Piece) {
        if !self.claims.contains(&after.id) {
            return;
        }
        let empty = self.claims.iter().any(|id| {
            query::piece(ctx.world, *id)
                .and_then(Piece::count)
                .is_some_and(|nuggets| nuggets == 0)
        });
        if empty {
            self.early_end.shorten(ctx, EMPTY_CLAIM_TICKS);
        } else {
            self.early_end.restore(ctx);
        }
    }

    pub(crate) fn round_did_end(&mut self, ctx: &mut ScenarioContext<'_>) {
        bank_claims(ctx, &self.claims);
    }
}
