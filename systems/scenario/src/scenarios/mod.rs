//! The closed set of scenarios and the logic specific to each.

mod claim_jumping;
mod gold_rush;
mod land_grab;
mod shootout;
mod wendigo;

use std::{fmt, str::FromStr};

use log::info;

use bang_howdy_core::{
    Cell, Command, ConfigError, Effect, GameConfig, Piece, PieceId, PieceKind, PlayerIndex, Tick,
};
use bang_howdy_world::query;

use crate::{context::ScenarioContext, error::ScenarioError, markers::BoardMarkers};

pub use claim_jumping::{EMPTY_CLAIM_TICKS, NUGGET_COUNT, POINTS_PER_NUGGET};
pub use gold_rush::{ALL_BANKED_TICKS, NUGGETS_PER_LODE};
pub use land_grab::POINTS_PER_STEAD;
pub use shootout::POINTS_PER_RANK;
pub use wendigo::{
    Axis, Wave, POINTS_PER_SAFE_ZONE_STEP, POINTS_PER_SURVIVAL, POST_WAVE_TICKS, SAFE_ZONE_REACH,
    TALISMAN_SURVIVAL_BONUS,
};

pub(crate) use claim_jumping::ClaimJumping;
pub(crate) use gold_rush::GoldRush;
pub(crate) use shootout::Shootout;
pub(crate) use wendigo::WendigoAttack;

/// Identifies one of the playable scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScenarioType {
    /// Defend your claim while robbing the others.
    ClaimJumping,
    /// Mine lodes and bank the nuggets in your claim.
    GoldRush,
    /// Stake as many homesteads as possible.
    LandGrab,
    /// Survive the wendigo waves.
    WendigoAttack,
    /// Last team standing wins; the dead stay dead.
    Shootout,
    /// Unscored practice with respawning units.
    Practice,
}

impl ScenarioType {
    /// Every scenario in presentation order.
    pub const ALL: [ScenarioType; 6] = [
        ScenarioType::ClaimJumping,
        ScenarioType::GoldRush,
        ScenarioType::LandGrab,
        ScenarioType::WendigoAttack,
        ScenarioType::Shootout,
        ScenarioType::Practice,
    ];

    /// Short identifier of the scenario.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ScenarioType::ClaimJumping => "cj",
            ScenarioType::GoldRush => "gr",
            ScenarioType::LandGrab => "lg",
            ScenarioType::WendigoAttack => "wa",
            ScenarioType::Shootout => "sa",
            ScenarioType::Practice => "pr",
        }
    }

    /// Reports whether dead units return to play.
    #[must_use]
    pub const fn respawns(self) -> bool {
        !matches!(self, ScenarioType::Shootout)
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioType {
    type Err = ScenarioError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim().to_ascii_lowercase();
        let long = |ty: ScenarioType| match ty {
            ScenarioType::ClaimJumping => "claim_jumping",
            ScenarioType::GoldRush => "gold_rush",
            ScenarioType::LandGrab => "land_grab",
            ScenarioType::WendigoAttack => "wendigo_attack",
            ScenarioType::Shootout => "shootout",
            ScenarioType::Practice => "practice",
        };
        ScenarioType::ALL
            .into_iter()
            .find(|ty| ty.name() == name || long(*ty) == name.replace('-', "_"))
            .ok_or(ScenarioError::UnknownScenario(name))
    }
}

/// Whether the round goes on after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Play continues until the last tick.
    Continue,
    /// The round ends now.
    EndRound,
}

/// Moves the last tick of a round forward and back again.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EarlyEnd {
    shortened: bool,
}

impl EarlyEnd {
    pub(crate) fn reset(&mut self) {
        self.shortened = false;
    }

    pub(crate) fn is_shortened(&self) -> bool {
        self.shortened
    }

    /// Ends the round `grace` ticks from now unless it already ends sooner.
    pub(crate) fn shorten(&mut self, ctx: &mut ScenarioContext<'_>, grace: Tick) {
        if self.shortened {
            return;
        }
        let target = ctx.tick.saturating_add(grace);
        if target < query::last_tick(ctx.world) {
            ctx.push(Command::SetLastTick { tick: target });
            self.shortened = true;
            info!("round now ends on tick {target}");
        }
    }

    /// Reinstates the last tick derived from the round duration.
    pub(crate) fn restore(&mut self, ctx: &mut ScenarioContext<'_>) {
        if !self.shortened {
            return;
        }
        self.shortened = false;
        let natural = query::duration(ctx.world).saturating_sub(1);
        ctx.push(Command::SetLastTick { tick: natural });
        info!("round end restored to tick {natural}");
    }
}

/// Scenario-specific state, dispatched on through a single table of hooks.
#[derive(Debug)]
pub(crate) enum ScenarioKind {
    ClaimJumping(ClaimJumping),
    GoldRush(GoldRush),
    LandGrab,
    WendigoAttack(WendigoAttack),
    Shootout(Shootout),
    Practice,
}

impl ScenarioKind {
    pub(crate) fn new(ty: ScenarioType, config: &GameConfig) -> Self {
        match ty {
            ScenarioType::ClaimJumping => ScenarioKind::ClaimJumping(ClaimJumping::default()),
            ScenarioType::GoldRush => ScenarioKind::GoldRush(GoldRush::default()),
            ScenarioType::LandGrab => ScenarioKind::LandGrab,
            ScenarioType::WendigoAttack => {
                ScenarioKind::WendigoAttack(WendigoAttack::new(config.wendigo))
            }
            ScenarioType::Shootout => ScenarioKind::Shootout(Shootout::default()),
            ScenarioType::Practice => ScenarioKind::Practice,
        }
    }

    pub(crate) fn scenario_type(&self) -> ScenarioType {
        match self {
            ScenarioKind::ClaimJumping(_) => ScenarioType::ClaimJumping,
            ScenarioKind::GoldRush(_) => ScenarioType::GoldRush,
            ScenarioKind::LandGrab => ScenarioType::LandGrab,
            ScenarioKind::WendigoAttack(_) => ScenarioType::WendigoAttack,
            ScenarioKind::Shootout(_) => ScenarioType::Shootout,
            ScenarioKind::Practice => ScenarioType::Practice,
        }
    }

    /// Checks that the board carries the markers the scenario needs.
    pub(crate) fn validate(&self, markers: &BoardMarkers, pieces: &[Piece]) -> Result<(), ConfigError> {
        match self {
            ScenarioKind::ClaimJumping(_) | ScenarioKind::GoldRush(_) => {
                let claims = pieces
                    .iter()
                    .any(|piece| matches!(piece.kind, PieceKind::Claim { .. }));
                if !claims {
                    return Err(ConfigError::MissingMarkers("claim"));
                }
                if matches!(self, ScenarioKind::GoldRush(_)) && markers.lodes().is_empty() {
                    return Err(ConfigError::MissingMarkers("lode"));
                }
            }
            ScenarioKind::LandGrab => {
                if !pieces.iter().any(|piece| piece.kind == PieceKind::Homestead) {
                    return Err(ConfigError::MissingMarkers("homestead"));
                }
            }
            ScenarioKind::WendigoAttack(_) => {
                if markers.safe_zones().is_empty() {
                    return Err(ConfigError::MissingMarkers("safe zone"));
                }
            }
            ScenarioKind::Shootout(_) | ScenarioKind::Practice => {}
        }
        Ok(())
    }

    pub(crate) fn round_will_start(
        &mut self,
        ctx: &mut ScenarioContext<'_>,
        markers: &BoardMarkers,
    ) -> Result<(), ConfigError> {
        match self {
            ScenarioKind::ClaimJumping(scenario) => scenario.round_will_start(ctx, markers),
            ScenarioKind::GoldRush(scenario) => scenario.round_will_start(ctx, markers),
            ScenarioKind::WendigoAttack(scenario) => {
                scenario.round_will_start(ctx, markers);
                Ok(())
            }
            ScenarioKind::Shootout(scenario) => {
                scenario.round_will_start();
                Ok(())
            }
            ScenarioKind::LandGrab | ScenarioKind::Practice => Ok(()),
        }
    }

    pub(crate) fn tick(&mut self, ctx: &mut ScenarioContext<'_>) -> TickOutcome {
        match self {
            ScenarioKind::GoldRush(scenario) => scenario.tick(ctx),
            ScenarioKind::WendigoAttack(scenario) => scenario.tick(ctx),
            ScenarioKind::Shootout(scenario) => scenario.tick(ctx),
            ScenarioKind::ClaimJumping(_) | ScenarioKind::LandGrab | ScenarioKind::Practice => {
                TickOutcome::Continue
            }
        }
    }

    pub(crate) fn piece_moved(&mut self, ctx: &mut ScenarioContext<'_>, piece: &Piece) {
        if let ScenarioKind::WendigoAttack(scenario) = self {
            scenario.piece_moved(ctx, piece);
        }
    }

    pub(crate) fn piece_updated(&mut self, ctx: &mut ScenarioContext<'_>, after: &Piece) {
        if let ScenarioKind::ClaimJumping(scenario) = self {
            scenario.piece_updated(ctx, after);
        }
    }

    pub(crate) fn piece_was_killed(
        &mut self,
        ctx: &mut ScenarioContext<'_>,
        piece: &Piece,
        shooter_owner: Option<PlayerIndex>,
    ) {
        match self {
            ScenarioKind::WendigoAttack(scenario) => scenario.piece_was_killed(ctx, piece),
            ScenarioKind::Shootout(scenario) => scenario.piece_was_killed(ctx, piece, shooter_owner),
            _ => {}
        }
    }

    pub(crate) fn piece_affected(
        &mut self,
        ctx: &mut ScenarioContext<'_>,
        piece: PieceId,
        effect: Effect,
    ) {
        if let (ScenarioKind::Shootout(scenario), Effect::Resurrected) = (self, effect) {
            scenario.piece_resurrected(ctx, piece);
        }
    }

    pub(crate) fn round_did_end(&mut self, ctx: &mut ScenarioContext<'_>) {
        match self {
            ScenarioKind::ClaimJumping(scenario) => scenario.round_did_end(ctx),
            ScenarioKind::GoldRush(scenario) => scenario.round_did_end(ctx),
            ScenarioKind::LandGrab => land_grab::round_did_end(ctx),
            ScenarioKind::Shootout(scenario) => scenario.round_did_end(ctx),
            ScenarioKind::WendigoAttack(_) | ScenarioKind::Practice => {}
        }
    }

    pub(crate) fn knockouts(&self) -> &[PlayerIndex] {
        match self {
            ScenarioKind::Shootout(scenario) => scenario.knockouts(),
            _ => &[],
        }
    }

    pub(crate) fn wave(&self) -> Option<&Wave> {
        match self {
            ScenarioKind::WendigoAttack(scenario) => scenario.wave(),
            _ => None,
        }
    }

    pub(crate) fn next_wave(&self) -> Option<Tick> {
        match self {
            ScenarioKind::WendigoAttack(scenario) => scenario.next_wave(),
            _ => None,
        }
    }
}

/// Hands every seated player the claim closest to their start marker.
///
/// Claims are matched in board order to the nearest start marker not yet
/// taken. Claims matched to a start marker of an empty seat are removed.
pub(crate) fn assign_claims(
    ctx: &mut ScenarioContext<'_>,
    starts: &[Cell],
    nuggets: u32,
) -> Result<Vec<PieceId>, ConfigError> {
    let players = query::player_count(ctx.world);
    let claims: Vec<Piece> = query::pieces(ctx.world)
        .iter()
        .filter(|piece| matches!(piece.kind, PieceKind::Claim { .. }))
        .copied()
        .collect();

    let mut taken = vec![false; starts.len()];
    let mut owned: Vec<Option<Piece>> = vec![None; players];
    let mut unused = Vec::new();
    for claim in claims {
        let nearest = starts
            .iter()
            .enumerate()
            .filter(|(index, _)| !taken[*index])
            .min_by_key(|&(index, start)| (start.manhattan_distance(claim.cell), index))
            .map(|(index, _)| index);
        let Some(index) = nearest else {
            return Err(ConfigError::UnassignedClaim { cell: claim.cell });
        };
        taken[index] = true;
        match owned.get_mut(index) {
            Some(slot) => *slot = Some(claim),
            None => unused.push(claim.id),
        }
    }

    let mut assigned = Vec::with_capacity(players);
    for (index, claim) in owned.into_iter().enumerate() {
        let player = PlayerIndex::new(index);
        let Some(mut claim) = claim else {
            return Err(ConfigError::MissingClaim { player });
        };
        claim.owner = Some(player);
        claim.kind = PieceKind::Claim { nuggets };
        ctx.push(Command::UpdatePiece { piece: claim });
        assigned.push(claim.id);
    }
    for piece in unused {
        ctx.push(Command::RemovePiece { piece });
    }
    Ok(assigned)
}

/// Pays each claim's owner for the nuggets stored in it.
pub(crate) fn bank_claims(ctx: &mut ScenarioContext<'_>, claims: &[PieceId]) {
    for id in claims {
        let Some(claim) = query::piece(ctx.world, *id).copied() else {
            continue;
        };
        let (Some(owner), Some(nuggets)) = (claim.owner, claim.count()) else {
            continue;
        };
        let nuggets = i32::try_from(nuggets).unwrap_or(i32::MAX);
        ctx.grant(owner, nuggets.saturating_mul(POINTS_PER_NUGGET));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_names_parse_both_ways() {
        for ty in ScenarioType::ALL {
            assert_eq!(ty.name().parse::<ScenarioType>(), Ok(ty));
        }
        assert_eq!("Wendigo-Attack".parse::<ScenarioType>(), Ok(ScenarioType::WendigoAttack));
        assert_eq!(
            "poker".parse::<ScenarioType>(),
            Err(ScenarioError::UnknownScenario("poker".to_owned()))
        );
        assert!(!ScenarioType::Shootout.respawns());
    }
}
