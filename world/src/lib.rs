#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative shared game state for Bang! Howdy.
//!
//! [`BangObject`] is the single source of truth for a game session. It is only
//! ever mutated through [`apply`], which validates each [`Command`] and reports
//! the outcome as [`Event`] values. The [`Replicator`] forwards replicated
//! events to remote observers in submission order.

pub mod board;
pub mod pieces;
pub mod replication;

use log::debug;

use bang_howdy_core::{
    Command, Effect, Event, GamePhase, Orientation, Piece, PieceId, PieceKind, PlayerIndex,
    Rejection, StatSet, StatType, Tick, MAX_DAMAGE,
};

pub use board::{Board, Terrain};
pub use pieces::PieceSet;
pub use replication::{EventLog, Replicator, Subscriber};

/// Authoritative, network-replicated state of one game session.
#[derive(Clone, Debug)]
pub struct BangObject {
    board: Board,
    pieces: PieceSet,
    points: Vec<i32>,
    per_round_earnings: Vec<Vec<i32>>,
    stats: Vec<StatSet>,
    tick: Tick,
    ticking: bool,
    last_tick: Tick,
    duration: Tick,
    round: usize,
    rounds_started: usize,
    phase: GamePhase,
}

impl BangObject {
    /// Creates the game object for `players` seated players.
    #[must_use]
    pub fn new(board: Board, players: usize) -> Self {
        Self {
            board,
            pieces: PieceSet::new(),
            points: vec![0; players],
            per_round_earnings: Vec::new(),
            stats: vec![StatSet::new(); players],
            tick: 0,
            ticking: false,
            last_tick: 0,
            duration: 0,
            round: 0,
            rounds_started: 0,
            phase: GamePhase::PreGame,
        }
    }

    fn player_slot(&self, player: PlayerIndex) -> Option<usize> {
        (player.get() < self.points.len()).then_some(player.get())
    }

    fn in_phase(&self, phase: GamePhase, out_events: &mut Vec<Event>) -> bool {
        if self.phase == phase {
            return true;
        }
        reject(
            Rejection::WrongPhase { phase: self.phase },
            out_events,
        );
        false
    }

    fn store_update(&mut self, before: Piece, after: Piece) {
        let _ = self.pieces.replace(after);
        self.board.update_shadow(Some(&before), Some(&after));
    }

    fn seated_owner(&self, piece: &Piece, out_events: &mut Vec<Event>) -> bool {
        match piece.owner {
            Some(owner) if self.player_slot(owner).is_none() => {
                reject(Rejection::UnknownPlayer(owner), out_events);
                false
            }
            _ => true,
        }
    }

    fn add_piece(&mut self, piece: Piece, direct: bool, out_events: &mut Vec<Event>) {
        if !self.seated_owner(&piece, out_events) {
            return;
        }
        if !self.board.contains(piece.cell) {
            reject(Rejection::OutOfBounds(piece.cell), out_events);
            return;
        }
        if piece.blocks() && self.board.occupant(piece.cell).is_some() {
            reject(Rejection::Occupied(piece.cell), out_events);
            return;
        }
        match self.pieces.insert(piece) {
            Ok(()) => {
                self.board.update_shadow(None, Some(&piece));
                out_events.push(Event::PieceAdded { piece, direct });
            }
            Err(duplicate) => reject(Rejection::DuplicatePiece(duplicate.id), out_events),
        }
    }

    fn remove_piece(&mut self, id: PieceId, direct: bool, out_events: &mut Vec<Event>) {
        match self.pieces.remove(id) {
            Some(piece) => {
                self.board.update_shadow(Some(&piece), None);
                out_events.push(Event::PieceRemoved { piece, direct });
            }
            None => reject(Rejection::UnknownPiece(id), out_events),
        }
    }

    fn damage_piece(
        &mut self,
        id: PieceId,
        amount: u8,
        shooter: Option<PieceId>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(before) = self.pieces.get(id).copied() else {
            reject(Rejection::UnknownPiece(id), out_events);
            return;
        };
        if !before.is_alive() {
            reject(Rejection::PieceDead(id), out_events);
            return;
        }

        let mut after = before;
        after.damage = before.damage.saturating_add(amount).min(MAX_DAMAGE);
        self.store_update(before, after);
        out_events.push(Event::PieceUpdated { before, after });

        if after.is_alive() {
            return;
        }

        let shooter_owner = shooter
            .and_then(|shooter| self.pieces.get(shooter))
            .and_then(|piece| piece.owner);
        out_events.push(Event::PieceKilled {
            piece: after,
            shooter,
            shooter_owner,
        });
        if after.unit().is_none() {
            self.remove_piece(id, false, out_events);
        }
    }

    fn dead_unit(&self, id: PieceId, out_events: &mut Vec<Event>) -> Option<Piece> {
        let Some(before) = self.pieces.get(id).copied() else {
            reject(Rejection::UnknownPiece(id), out_events);
            return None;
        };
        if before.unit().is_none() {
            reject(Rejection::UnknownPiece(id), out_events);
            return None;
        }
        if before.is_alive() {
            reject(Rejection::PieceAlive(id), out_events);
            return None;
        }
        Some(before)
    }
}

/// Applies the provided command to the game object, mutating state deterministically.
pub fn apply(world: &mut BangObject, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetPhase { phase } => {
            let from = world.phase;
            if !from.can_transition_to(phase) {
                reject(Rejection::InvalidTransition { from, to: phase }, out_events);
                return;
            }
            world.phase = phase;
            debug!("phase {from:?} -> {phase:?}");
            out_events.push(Event::PhaseChanged { from, to: phase });
        }
        Command::StartRound { duration } => {
            if !matches!(
                world.phase,
                GamePhase::BuyingPhase | GamePhase::PreTutorial | GamePhase::PrePractice
            ) {
                reject(Rejection::WrongPhase { phase: world.phase }, out_events);
                return;
            }
            world.round = world.rounds_started;
            world.rounds_started += 1;
            world.duration = duration;
            world.tick = 0;
            world.ticking = false;
            world.last_tick = duration.saturating_sub(1);
            world.pieces.clear();
            world.board.clear_shadow();
            world.stats.iter_mut().for_each(StatSet::clear);
            world.per_round_earnings.push(vec![0; world.points.len()]);
            out_events.push(Event::RoundStarted {
                round: world.round,
                duration,
            });
        }
        Command::AdvanceTick => {
            if !world.in_phase(GamePhase::InPlay, out_events) {
                return;
            }
            if world.ticking {
                world.tick = world.tick.saturating_add(1);
            } else {
                world.ticking = true;
            }
            out_events.push(Event::TickAdvanced { tick: world.tick });
        }
        Command::SetLastTick { tick } => {
            if world.last_tick == tick {
                return;
            }
            world.last_tick = tick;
            out_events.push(Event::LastTickChanged { last_tick: tick });
        }
        Command::AddPiece { piece } => world.add_piece(piece, false, out_events),
        Command::AddPieceDirect { piece } => world.add_piece(piece, true, out_events),
        Command::UpdatePiece { piece } => {
            let Some(before) = world.pieces.get(piece.id).copied() else {
                reject(Rejection::UnknownPiece(piece.id), out_events);
                return;
            };
            if !world.seated_owner(&piece, out_events) {
                return;
            }
            if !world.board.contains(piece.cell) {
                reject(Rejection::OutOfBounds(piece.cell), out_events);
                return;
            }
            if piece.blocks()
                && world
                    .board
                    .occupant(piece.cell)
                    .is_some_and(|occupant| occupant != piece.id)
            {
                reject(Rejection::Occupied(piece.cell), out_events);
                return;
            }
            world.store_update(before, piece);
            out_events.push(Event::PieceUpdated {
                before,
                after: piece,
            });
        }
        Command::RemovePiece { piece } => world.remove_piece(piece, false, out_events),
        Command::RemovePieceDirect { piece } => world.remove_piece(piece, true, out_events),
        Command::MovePiece { piece, to } => {
            if !world.in_phase(GamePhase::InPlay, out_events) {
                return;
            }
            let Some(before) = world.pieces.get(piece).copied() else {
                reject(Rejection::UnknownPiece(piece), out_events);
                return;
            };
            if !before.is_alive() {
                reject(Rejection::PieceDead(piece), out_events);
                return;
            }
            if !world.board.contains(to) {
                reject(Rejection::OutOfBounds(to), out_events);
                return;
            }
            if before.blocks() && !world.board.is_occupiable(to) {
                reject(Rejection::Occupied(to), out_events);
                return;
            }
            let mut after = before;
            after.cell = to;
            if let Some(orientation) = Orientation::toward(before.cell, to) {
                after.orientation = orientation;
            }
            world.store_update(before, after);
            out_events.push(Event::PieceMoved {
                piece,
                from: before.cell,
                to,
            });
        }
        Command::DamagePiece {
            piece,
            amount,
            shooter,
        } => {
            if world.in_phase(GamePhase::InPlay, out_events) {
                world.damage_piece(piece, amount, shooter, out_events);
            }
        }
        Command::RespawnPiece { piece, cell } => {
            if !world.in_phase(GamePhase::InPlay, out_events) {
                return;
            }
            let Some(before) = world.dead_unit(piece, out_events) else {
                return;
            };
            let mut after = before;
            if !world.board.is_occupiable(cell) {
                reject(Rejection::Occupied(cell), out_events);
                return;
            }
            after.damage = 0;
            after.cell = cell;
            if let Some(unit) = after.unit_mut() {
                unit.holding = None;
            }
            world.store_update(before, after);
            out_events.push(Event::PieceRespawned { piece: after });
        }
        Command::ResurrectPiece { piece } => {
            if !world.in_phase(GamePhase::InPlay, out_events) {
                return;
            }
            let Some(before) = world.dead_unit(piece, out_events) else {
                return;
            };
            let mut after = before;
            if !world.board.is_occupiable(before.cell) {
                reject(Rejection::Occupied(before.cell), out_events);
                return;
            }
            after.damage = 0;
            world.store_update(before, after);
            out_events.push(Event::PieceUpdated { before, after });
            out_events.push(Event::PieceAffected {
                piece,
                effect: Effect::Resurrected,
            });
        }
        Command::RepairPiece { piece } => {
            let Some(before) = world.pieces.get(piece).copied() else {
                reject(Rejection::UnknownPiece(piece), out_events);
                return;
            };
            if !before.is_alive() {
                reject(Rejection::PieceDead(piece), out_events);
                return;
            }
            let mut after = before;
            after.damage = 0;
            world.store_update(before, after);
            out_events.push(Event::PieceUpdated { before, after });
            out_events.push(Event::PieceAffected {
                piece,
                effect: Effect::Repaired,
            });
        }
        Command::SetHolding { piece, holding } => {
            let Some(before) = world.pieces.get(piece).copied() else {
                reject(Rejection::UnknownPiece(piece), out_events);
                return;
            };
            let mut after = before;
            let Some(unit) = after.unit_mut() else {
                reject(Rejection::Unsupported(piece), out_events);
                return;
            };
            unit.holding = holding;
            world.store_update(before, after);
            out_events.push(Event::PieceUpdated { before, after });
        }
        Command::SetOwner { piece, owner } => {
            let Some(before) = world.pieces.get(piece).copied() else {
                reject(Rejection::UnknownPiece(piece), out_events);
                return;
            };
            if let Some(owner) = owner.filter(|owner| world.player_slot(*owner).is_none()) {
                reject(Rejection::UnknownPlayer(owner), out_events);
                return;
            }
            let mut after = before;
            after.owner = owner;
            world.store_update(before, after);
            out_events.push(Event::PieceUpdated { before, after });
        }
        Command::AdjustCount { piece, delta } => {
            let Some(before) = world.pieces.get(piece).copied() else {
                reject(Rejection::UnknownPiece(piece), out_events);
                return;
            };
            let mut after = before;
            let stored = match &mut after.kind {
                PieceKind::Claim { nuggets } => nuggets,
                PieceKind::Counter { count } => count,
                _ => {
                    reject(Rejection::Unsupported(piece), out_events);
                    return;
                }
            };
            *stored = stored.saturating_add_signed(delta);
            world.store_update(before, after);
            out_events.push(Event::PieceUpdated { before, after });
        }
        Command::GrantPoints { player, amount } => {
            let Some(slot) = world.player_slot(player) else {
                reject(Rejection::UnknownPlayer(player), out_events);
                return;
            };
            let before = world.points[slot];
            let total = before.saturating_add(amount).max(0);
            let delta = total - before;
            world.points[slot] = total;
            if let Some(earnings) = world.per_round_earnings.last_mut() {
                earnings[slot] += delta;
            }
            if delta > 0 {
                let value = world.stats[slot].increment(StatType::PointsEarned, i64::from(delta));
                out_events.push(Event::StatChanged {
                    player,
                    stat: StatType::PointsEarned,
                    value,
                });
            }
            out_events.push(Event::PointsGranted {
                player,
                delta,
                total,
            });
        }
        Command::IncrementStat {
            player,
            stat,
            amount,
        } => {
            let Some(slot) = world.player_slot(player) else {
                reject(Rejection::UnknownPlayer(player), out_events);
                return;
            };
            let value = world.stats[slot].increment(stat, amount);
            out_events.push(Event::StatChanged {
                player,
                stat,
                value,
            });
        }
        Command::EndRound => {
            if !world.in_phase(GamePhase::InPlay, out_events) {
                return;
            }
            world.phase = GamePhase::PostRound;
            out_events.push(Event::RoundEnded {
                round: world.round,
                tick: world.tick,
            });
            out_events.push(Event::PhaseChanged {
                from: GamePhase::InPlay,
                to: GamePhase::PostRound,
            });
        }
    }
}

fn reject(reason: Rejection, out_events: &mut Vec<Event>) {
    debug!("command rejected: {reason:?}");
    out_events.push(Event::CommandRejected { reason });
}

/// Query functions that provide read-only access to the game object.
pub mod query {
    use bang_howdy_core::{
        BonusKind, Cell, GamePhase, Piece, PieceId, PieceKind, PlayerIndex, StatSet, Tick,
    };

    use super::{BangObject, Board, PieceSet};

    /// Current phase of the game.
    #[must_use]
    pub fn phase(world: &BangObject) -> GamePhase {
        world.phase
    }

    /// Tick currently being simulated.
    #[must_use]
    pub fn tick(world: &BangObject) -> Tick {
        world.tick
    }

    /// Final tick of the current round.
    #[must_use]
    pub fn last_tick(world: &BangObject) -> Tick {
        world.last_tick
    }

    /// Configured length of the current round.
    #[must_use]
    pub fn duration(world: &BangObject) -> Tick {
        world.duration
    }

    /// Zero-based index of the current or most recent round.
    #[must_use]
    pub fn round(world: &BangObject) -> usize {
        world.round
    }

    /// Number of rounds started so far.
    #[must_use]
    pub fn rounds_started(world: &BangObject) -> usize {
        world.rounds_started
    }

    /// Number of seated players.
    #[must_use]
    pub fn player_count(world: &BangObject) -> usize {
        world.points.len()
    }

    /// Every seated player in seat order.
    pub fn players(world: &BangObject) -> impl Iterator<Item = PlayerIndex> {
        (0..world.points.len()).map(PlayerIndex::new)
    }

    /// Total points of a player.
    #[must_use]
    pub fn points(world: &BangObject, player: PlayerIndex) -> i32 {
        world.points.get(player.get()).copied().unwrap_or(0)
    }

    /// Points of every player in seat order.
    #[must_use]
    pub fn all_points(world: &BangObject) -> &[i32] {
        &world.points
    }

    /// Points earned by each player in each round so far.
    #[must_use]
    pub fn per_round_earnings(world: &BangObject) -> &[Vec<i32>] {
        &world.per_round_earnings
    }

    /// Round statistics of a player.
    #[must_use]
    pub fn stats(world: &BangObject, player: PlayerIndex) -> Option<&StatSet> {
        world.stats.get(player.get())
    }

    /// Board geometry and shadow map.
    #[must_use]
    pub fn board(world: &BangObject) -> &Board {
        &world.board
    }

    /// Every piece in play.
    #[must_use]
    pub fn pieces(world: &BangObject) -> &PieceSet {
        &world.pieces
    }

    /// Looks up a single piece.
    #[must_use]
    pub fn piece(world: &BangObject, id: PieceId) -> Option<&Piece> {
        world.pieces.get(id)
    }

    /// Number of living units owned by the player.
    #[must_use]
    pub fn living_unit_count(world: &BangObject, player: PlayerIndex) -> usize {
        world.pieces.living_unit_count(player)
    }

    /// Players that still have at least one living unit.
    #[must_use]
    pub fn players_with_living_units(world: &BangObject) -> Vec<PlayerIndex> {
        players(world)
            .filter(|player| world.pieces.living_unit_count(*player) > 0)
            .collect()
    }

    /// Bonus lying on the cell, if any.
    #[must_use]
    pub fn bonus_at(world: &BangObject, cell: Cell) -> Option<(PieceId, BonusKind)> {
        world.pieces.at(cell).find_map(|piece| match piece.kind {
            PieceKind::Bonus(kind) => Some((piece.id, kind)),
            _ => None,
        })
    }

    /// Number of bonuses currently on the board.
    #[must_use]
    pub fn bonus_count(world: &BangObject) -> usize {
        world
            .pieces
            .iter()
            .filter(|piece| matches!(piece.kind, PieceKind::Bonus(_)))
            .count()
    }

    /// First identifier guaranteed to be unused.
    #[must_use]
    pub fn next_piece_id(world: &BangObject) -> PieceId {
        world
            .pieces
            .max_id()
            .map_or(PieceId::new(1), |id| id.next())
    }

    /// Nearest occupiable cell within `radius` of `cell`.
    #[must_use]
    pub fn occupiable_spot(world: &BangObject, cell: Cell, radius: u32) -> Option<Cell> {
        world.board.occupiable_spot(cell, radius)
    }
}
