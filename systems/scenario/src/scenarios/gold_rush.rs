//! Gold rush: mine the lodes and bank what you carry home.

use bang_howdy_core::{BonusKind, ConfigError, Holding, PieceId, PieceKind, Tick};
use bang_howdy_world::query;

use super::{assign_claims, bank_claims, EarlyEnd, TickOutcome};
use crate::{context::ScenarioContext, markers::BoardMarkers};

/// Nuggets buried in each lode.
pub const NUGGETS_PER_LODE: u32 = 3;

/// Ticks left in the round once every nugget has been banked.
pub const ALL_BANKED_TICKS: Tick = 8;

#[derive(Debug, Default)]
pub(crate) struct GoldRush {
    claims: Vec<PieceId>,
    lodes: Vec<PieceId>,
    early_end: EarlyEnd,
}

impl GoldRush {
    pub(crate) fn round_will_start(
        &mut self,
        ctx: &mut ScenarioContext<'_>,
        markers: &BoardMarkers,
    ) -> Result<(), ConfigError> {
        self.early_end.reset();
        self.claims = assign_claims(ctx, markers.starts(), 0)?;
        self.lodes = markers
            .lodes()
            .iter()
            .map(|cell| {
                ctx.add_piece(
                    PieceKind::Counter {
                        count: NUGGETS_PER_LODE,
                    },
                    None,
                    *cell,
                )
            })
            .collect();
        Ok(())
    }

    pub(crate) fn tick(&mut self, ctx: &mut ScenarioContext<'_>) -> TickOutcome {
        if !self.early_end.is_shortened() && self.all_banked(ctx) {
            self.early_end.shorten(ctx, ALL_BANKED_TICKS);
        }
        TickOutcome::Continue
    }

    fn all_banked(&self, ctx: &ScenarioContext<'_>) -> bool {
        let lodes_empty = self.lodes.iter().all(|id| {
            query::piece(ctx.world, *id)
                .and_then(|lode| lode.count())
                .map_or(true, |count| count == 0)
        });
        let loose = query::pieces(ctx.world).iter().any(|piece| {
            piece.kind == PieceKind::Bonus(BonusKind::Nugget)
                || piece.holding() == Some(Holding::Nugget)
        });
        lodes_empty && !loose
    }

    pub(crate) fn round_did_end(&mut self, ctx: &mut ScenarioContext<'_>) {
        bank_claims(ctx, &self.claims);
    }
}
