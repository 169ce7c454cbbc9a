//! The scenario engine: lifecycle, delegates and the rules shared by every scenario.

use std::{sync::Arc, time::Duration};

use log::{debug, info, warn};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use bang_howdy_core::{
    BonusKind, Cell, Command, ConfigError, Event, GameConfig, Piece, PieceKind, PlayerIndex,
    PlayerRecord, StatType, Tick, UnitState,
};
use bang_howdy_system_respawn::{Config as RespawnConfig, RespawnDelegate};
use bang_howdy_world::{query, BangObject};

use crate::{
    ai::{AiLogic, AiProfile, ObjectiveAi},
    context::{PieceIds, ScenarioContext},
    delegate::ScenarioDelegate,
    error::ScenarioError,
    homestead::HomesteadDelegate,
    markers::{is_marker, BoardMarkers, Purchase},
    nugget::NuggetDelegate,
    scenarios::{ScenarioKind, ScenarioType, TickOutcome, Wave},
};

/// Points paid to the shooter's owner for killing a rival unit.
pub const POINTS_PER_KILL: i32 = 10;

/// Points paid for collecting a points bonus.
pub const POINTS_PER_BONUS: i32 = 25;

/// Distance searched around a start marker when placing purchased units.
pub const START_SEARCH_RADIUS: u32 = 3;

/// Where a scenario is within its round lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    /// No board has been seen yet.
    Uninitialized,
    /// Ready for the first round.
    Ready,
    /// A round is being played.
    InPlay {
        /// Round being played.
        round: usize,
    },
    /// The most recent round has been scored.
    Ended {
        /// Round that ended.
        round: usize,
    },
}

/// Per-game scenario controller.
///
/// Owns the scenario-specific state, the delegates composed into it and the
/// scenario random source. Hooks read the game object and answer with
/// commands; the caller applies them.
#[derive(Debug)]
pub struct Scenario {
    kind: ScenarioKind,
    delegates: Vec<Box<dyn ScenarioDelegate>>,
    config: Arc<GameConfig>,
    rng: ChaCha8Rng,
    ids: PieceIds,
    markers: BoardMarkers,
    state: RoundState,
}

impl Scenario {
    /// Creates a scenario seeded from the configuration.
    #[must_use]
    pub fn new(scenario: ScenarioType, config: Arc<GameConfig>) -> Self {
        let seed = config.seed;
        Self::with_seed(scenario, config, seed)
    }

    /// Creates a scenario with an explicit random seed.
    #[must_use]
    pub fn with_seed(scenario: ScenarioType, config: Arc<GameConfig>, seed: u64) -> Self {
        let mut delegates: Vec<Box<dyn ScenarioDelegate>> = Vec::new();
        match scenario {
            ScenarioType::ClaimJumping => delegates.push(Box::new(NuggetDelegate::claim_jumping())),
            ScenarioType::GoldRush => delegates.push(Box::new(NuggetDelegate::gold_rush())),
            ScenarioType::LandGrab => delegates.push(Box::new(HomesteadDelegate::new())),
            ScenarioType::WendigoAttack | ScenarioType::Shootout | ScenarioType::Practice => {}
        }
        if scenario.respawns() {
            let respawn = RespawnConfig::from_game_config(&config);
            delegates.push(Box::new(RespawnDelegate::new(respawn)));
        }

        Self {
            kind: ScenarioKind::new(scenario, &config),
            delegates,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            ids: PieceIds::new(),
            markers: BoardMarkers::default(),
            state: RoundState::Uninitialized,
        }
    }

    /// Scenario being played.
    #[must_use]
    pub fn scenario_type(&self) -> ScenarioType {
        self.kind.scenario_type()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Markers found on the board.
    #[must_use]
    pub fn markers(&self) -> &BoardMarkers {
        &self.markers
    }

    /// Game configuration shared with the scenario.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Order in which teams were knocked out of a shootout.
    #[must_use]
    pub fn knockouts(&self) -> &[PlayerIndex] {
        self.kind.knockouts()
    }

    /// Wendigo wave waiting to charge.
    #[must_use]
    pub fn wave(&self) -> Option<&Wave> {
        self.kind.wave()
    }

    /// Tick on which the next wendigo wave appears.
    #[must_use]
    pub fn next_wave(&self) -> Option<Tick> {
        self.kind.next_wave()
    }

    /// Board pieces that take part in play; markers are left behind.
    #[must_use]
    pub fn filter_pieces(&self, pieces: &[Piece]) -> Vec<Piece> {
        pieces.iter().filter(|piece| !is_marker(piece)).copied().collect()
    }

    /// Reads the board's markers and checks the scenario can be played on it.
    pub fn init(&mut self, world: &BangObject, pieces: &[Piece]) -> Result<(), ScenarioError> {
        let markers = BoardMarkers::extract(pieces);
        self.kind.validate(&markers, pieces)?;
        debug!(
            "{} initialised with {} start markers and {} bonus spots for {} players",
            self.scenario_type(),
            markers.starts().len(),
            markers.bonus_spots().len(),
            query::player_count(world)
        );
        self.markers = markers;
        self.state = RoundState::Ready;
        Ok(())
    }

    /// Prepares a round on a game object whose round has just been started.
    ///
    /// On failure nothing is written to `out`, so the caller can abandon the
    /// round without having mutated any pieces.
    pub fn round_will_start(
        &mut self,
        world: &BangObject,
        purchases: &[Purchase],
        out: &mut Vec<Command>,
    ) -> Result<(), ScenarioError> {
        match self.state {
            RoundState::Uninitialized => return Err(ScenarioError::NotInitialized),
            RoundState::InPlay { round } => return Err(ScenarioError::RoundInProgress { round }),
            RoundState::Ready | RoundState::Ended { .. } => {}
        }

        let players = query::player_count(world);
        let starts = query::players(world)
            .map(|player| {
                self.markers
                    .start(player)
                    .ok_or(ConfigError::MissingStartMarker { player })
            })
            .collect::<Result<Vec<Cell>, ConfigError>>()?;
        for purchase in purchases {
            if purchase.player.get() >= players {
                return Err(ConfigError::Invalid(format!(
                    "purchase for unseated player {}",
                    purchase.player.get()
                ))
                .into());
            }
            if self.config.unit(purchase.unit_type).is_none() {
                return Err(ConfigError::UnknownUnitType(purchase.unit_type).into());
            }
        }

        self.ids.sync(world);
        let mut staged = Vec::new();
        let mut ctx = ScenarioContext {
            world,
            config: &self.config,
            tick: 0,
            ids: &mut self.ids,
            rng: &mut self.rng,
            out: &mut staged,
        };
        self.kind.round_will_start(&mut ctx, &self.markers)?;
        place_units(&mut ctx, &starts, purchases)?;
        for delegate in &mut self.delegates {
            delegate.round_will_start(&mut ctx);
        }

        let round = query::round(world);
        self.state = RoundState::InPlay { round };
        info!(
            "{} round {round} starting with {} purchased units",
            self.scenario_type(),
            purchases.len()
        );
        out.append(&mut staged);
        Ok(())
    }

    /// Runs the scenario for the tick the game object is on.
    ///
    /// Scenario logic runs before the delegates.
    pub fn tick(
        &mut self,
        world: &BangObject,
        out: &mut Vec<Command>,
    ) -> Result<TickOutcome, ScenarioError> {
        if !matches!(self.state, RoundState::InPlay { .. }) {
            return Err(ScenarioError::RoundNotStarted);
        }
        self.ids.sync(world);
        let mut ctx = ScenarioContext {
            world,
            config: &self.config,
            tick: query::tick(world),
            ids: &mut self.ids,
            rng: &mut self.rng,
            out,
        };
        // Respawn cells are picked against the current shadow, so nothing
        // queued ahead of the delegates may block.
        let outcome = self.kind.tick(&mut ctx);
        for delegate in &mut self.delegates {
            delegate.tick(&mut ctx);
        }
        place_bonus(&mut ctx, &self.markers);
        Ok(outcome)
    }

    /// Reacts to events produced by applying commands during play.
    pub fn handle_events(&mut self, world: &BangObject, events: &[Event], out: &mut Vec<Command>) {
        if !matches!(self.state, RoundState::InPlay { .. }) {
            return;
        }
        self.ids.sync(world);
        let mut ctx = ScenarioContext {
            world,
            config: &self.config,
            tick: query::tick(world),
            ids: &mut self.ids,
            rng: &mut self.rng,
            out,
        };
        for event in events {
            match event {
                Event::PieceMoved { piece, from, .. } => {
                    let Some(moved) = query::piece(world, *piece).copied() else {
                        warn!("moved piece {} is no longer in play", piece.get());
                        continue;
                    };
                    if !moved.is_living_unit() {
                        continue;
                    }
                    collect_bonus(&mut ctx, &moved);
                    self.kind.piece_moved(&mut ctx, &moved);
                    for delegate in &mut self.delegates {
                        delegate.piece_moved(&mut ctx, &moved, *from);
                    }
                }
                Event::PieceKilled {
                    piece,
                    shooter_owner,
                    ..
                } => {
                    score_kill(&mut ctx, piece, *shooter_owner);
                    self.kind.piece_was_killed(&mut ctx, piece, *shooter_owner);
                    for delegate in &mut self.delegates {
                        delegate.piece_was_killed(&mut ctx, piece, *shooter_owner);
                    }
                }
                Event::PieceAffected { piece, effect } => {
                    self.kind.piece_affected(&mut ctx, *piece, *effect);
                    for delegate in &mut self.delegates {
                        delegate.piece_affected(&mut ctx, *piece, *effect);
                    }
                }
                Event::PieceUpdated { after, .. } => self.kind.piece_updated(&mut ctx, after),
                _ => {}
            }
        }
    }

    /// Scores the round. Reporting the end of a round twice is an error.
    pub fn round_did_end(&mut self, world: &BangObject, out: &mut Vec<Command>) -> Result<(), ScenarioError> {
        let round = match self.state {
            RoundState::InPlay { round } => round,
            RoundState::Ended { round } => return Err(ScenarioError::RoundAlreadyEnded { round }),
            RoundState::Uninitialized | RoundState::Ready => {
                return Err(ScenarioError::RoundNotStarted)
            }
        };
        let mut ctx = ScenarioContext {
            world,
            config: &self.config,
            tick: query::tick(world),
            ids: &mut self.ids,
            rng: &mut self.rng,
            out,
        };
        self.kind.round_did_end(&mut ctx);
        for delegate in &mut self.delegates {
            delegate.round_did_end(&mut ctx);
        }
        self.state = RoundState::Ended { round };
        info!(
            "{} round {round} ended on tick {}",
            self.scenario_type(),
            query::tick(world)
        );
        Ok(())
    }

    /// Folds a player's round statistics into their persistent record.
    ///
    /// Practice rounds only count toward game time.
    pub fn record_stats(
        &self,
        world: &BangObject,
        player: PlayerIndex,
        game_time: Duration,
        record: &mut PlayerRecord,
    ) {
        let millis = i64::try_from(game_time.as_millis()).unwrap_or(i64::MAX);
        record.accumulate(StatType::GameTimeMs, millis);
        if self.scenario_type() == ScenarioType::Practice {
            return;
        }
        if let Some(stats) = query::stats(world, player) {
            record.accumulate_set(stats);
        }
        record.accumulate(StatType::RoundsPlayed, 1);
    }

    /// Creates the computer player logic suited to this scenario.
    #[must_use]
    pub fn create_ai_logic(&self, profile: AiProfile) -> Box<dyn AiLogic> {
        Box::new(ObjectiveAi::new(
            self.scenario_type(),
            self.markers.safe_zones().to_vec(),
            Arc::clone(&self.config),
            profile,
        ))
    }
}

/// Places every purchased unit as close to its team's start marker as possible.
fn place_units(
    ctx: &mut ScenarioContext<'_>,
    starts: &[Cell],
    purchases: &[Purchase],
) -> Result<(), ConfigError> {
    let mut reserved = ctx.queued_blockers();
    for purchase in purchases {
        let player = purchase.player;
        let start = starts
            .get(player.get())
            .copied()
            .ok_or(ConfigError::MissingStartMarker { player })?;
        let cell = query::board(ctx.world)
            .occupiable_spot_excluding(start, START_SEARCH_RADIUS, &reserved)
            .ok_or(ConfigError::NoRoomAtStart { player })?;
        reserved.push(cell);
        let unit = PieceKind::Unit(UnitState {
            unit_type: purchase.unit_type,
            holding: None,
            start_cell: start,
        });
        let _ = ctx.add_piece(unit, Some(player), cell);
    }
    Ok(())
}

/// Drops a repair or points bonus on a free bonus spot every bonus interval.
fn place_bonus(ctx: &mut ScenarioContext<'_>, markers: &BoardMarkers) {
    let interval = ctx.config.round.bonus_interval;
    if interval == 0 || ctx.tick == 0 || ctx.tick % interval != 0 {
        return;
    }
    let limit = ctx
        .config
        .round
        .max_bonuses_per_player
        .saturating_mul(query::player_count(ctx.world));
    if query::bonus_count(ctx.world) >= limit {
        return;
    }
    let board = query::board(ctx.world);
    let free: Vec<Cell> = markers
        .bonus_spots()
        .iter()
        .filter(|cell| board.is_occupiable(**cell) && query::bonus_at(ctx.world, **cell).is_none())
        .copied()
        .collect();
    let Some(cell) = free.choose(ctx.rng).copied() else {
        return;
    };
    let kind = if ctx.rng.gen_bool(0.5) {
        BonusKind::Repair
    } else {
        BonusKind::Points
    };
    let _ = ctx.add_piece(PieceKind::Bonus(kind), None, cell);
    debug!("{kind:?} bonus placed at ({}, {})", cell.x(), cell.y());
}

/// Activates a repair or points bonus the unit stepped on.
fn collect_bonus(ctx: &mut ScenarioContext<'_>, unit: &Piece) {
    let Some(owner) = unit.owner else {
        return;
    };
    let Some((bonus, kind)) = query::bonus_at(ctx.world, unit.cell) else {
        return;
    };
    match kind {
        BonusKind::Repair => ctx.push(Command::RepairPiece { piece: unit.id }),
        BonusKind::Points => ctx.grant(owner, POINTS_PER_BONUS),
        BonusKind::Nugget | BonusKind::Talisman => return,
    }
    ctx.push(Command::RemovePiece { piece: bonus });
    ctx.stat(owner, StatType::BonusesCollected, 1);
}

/// Pays for kills of rival units and counts losses.
fn score_kill(ctx: &mut ScenarioContext<'_>, piece: &Piece, shooter_owner: Option<PlayerIndex>) {
    if piece.unit().is_none() {
        return;
    }
    let Some(victim) = piece.owner else {
        return;
    };
    ctx.stat(victim, StatType::UnitsLost, 1);
    if let Some(shooter) = shooter_owner.filter(|shooter| *shooter != victim) {
        ctx.grant(shooter, POINTS_PER_KILL);
        ctx.stat(shooter, StatType::UnitsKilled, 1);
    }
}
