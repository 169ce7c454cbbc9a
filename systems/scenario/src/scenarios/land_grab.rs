//! Land grab: stake homesteads and hold them until the round ends.

use bang_howdy_core::PieceKind;
use bang_howdy_world::query;

use crate::context::ScenarioContext;

/// Points paid per homestead held at the end of the round.
pub const POINTS_PER_STEAD: i32 = 75;

pub(crate) fn round_did_end(ctx: &mut ScenarioContext<'_>) {
    let owners: Vec<_> = query::pieces(ctx.world)
        .iter()
        .filter(|piece| piece.kind == PieceKind::Homestead)
        .filter_map(|piece| piece.owner)
        .collect();
    for owner in owners {
        ctx.grant(owner, POINTS_PER_STEAD);
    }
}
