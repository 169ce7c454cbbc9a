#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Respawn handling for scenarios in which dead units return to play.
//!
//! Killed units wait in a queue ordered by the tick on which they are due,
//! ties broken by the order in which they were queued. Each tick the due
//! units are placed on a free cell near their team's start marker; a unit
//! with no free cell is queued again one respawn delay later.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, warn};

use bang_howdy_core::{
    Cell, Command, Effect, GameConfig, Piece, PieceId, PlayerIndex, StatType, Tick, UnitTypeId,
};
use bang_howdy_world::{query, BangObject};

/// Default search radius around a start marker.
pub const DEFAULT_SEARCH_RADIUS: u32 = 3;

/// Configuration parameters required to construct the respawn delegate.
#[derive(Clone, Debug)]
pub struct Config {
    respawn_ticks: Tick,
    search_radius: u32,
    leaders: BTreeSet<UnitTypeId>,
    permanent: BTreeSet<UnitTypeId>,
}

impl Config {
    /// Creates a configuration with the provided respawn delay.
    #[must_use]
    pub fn new(respawn_ticks: Tick) -> Self {
        Self {
            respawn_ticks,
            search_radius: DEFAULT_SEARCH_RADIUS,
            leaders: BTreeSet::new(),
            permanent: BTreeSet::new(),
        }
    }

    /// Derives the configuration from the game's unit table.
    #[must_use]
    pub fn from_game_config(config: &GameConfig) -> Self {
        let mut respawn = Self::new(config.round.respawn_ticks);
        for unit in &config.units {
            if unit.leader {
                let _ = respawn.leaders.insert(unit.id);
            }
            if !unit.respawns {
                let _ = respawn.permanent.insert(unit.id);
            }
        }
        respawn
    }

    /// Overrides the distance searched around the start marker.
    #[must_use]
    pub fn with_search_radius(mut self, radius: u32) -> Self {
        self.search_radius = radius;
        self
    }

    /// Marks a unit type whose death pulls its team's respawns forward.
    #[must_use]
    pub fn with_leader(mut self, unit_type: UnitTypeId) -> Self {
        let _ = self.leaders.insert(unit_type);
        self
    }

    /// Delay between a unit's death and its respawn.
    #[must_use]
    pub fn respawn_ticks(&self) -> Tick {
        self.respawn_ticks
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct QueueKey {
    due: Tick,
    sequence: u64,
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    piece: PieceId,
    owner: Option<PlayerIndex>,
}

/// Priority queue of dead units keyed by piece identity.
#[derive(Debug, Default)]
struct RespawnQueue {
    order: BTreeMap<QueueKey, Pending>,
    keys: HashMap<PieceId, QueueKey>,
    next_sequence: u64,
}

impl RespawnQueue {
    fn push(&mut self, piece: PieceId, owner: Option<PlayerIndex>, due: Tick) {
        let _ = self.remove(piece);
        let key = QueueKey {
            due,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        let _ = self.order.insert(key, Pending { piece, owner });
        let _ = self.keys.insert(piece, key);
    }

    fn remove(&mut self, piece: PieceId) -> Option<Tick> {
        let key = self.keys.remove(&piece)?;
        let _ = self.order.remove(&key);
        Some(key.due)
    }

    fn due(&self, piece: PieceId) -> Option<Tick> {
        self.keys.get(&piece).map(|key| key.due)
    }

    fn pop_due(&mut self, tick: Tick) -> Vec<Pending> {
        let mut due = Vec::new();
        while let Some(entry) = self.order.first_entry() {
            if entry.key().due > tick {
                break;
            }
            let pending = entry.remove();
            let _ = self.keys.remove(&pending.piece);
            due.push(pending);
        }
        due
    }

    /// Pulls every entry owned by `owner` forward to `tick`, keeping queue order.
    fn collapse(&mut self, owner: PlayerIndex, tick: Tick) -> usize {
        let moved: Vec<QueueKey> = self
            .order
            .iter()
            .filter(|(key, pending)| pending.owner == Some(owner) && key.due > tick)
            .map(|(key, _)| *key)
            .collect();
        for key in &moved {
            if let Some(pending) = self.order.remove(key) {
                let collapsed = QueueKey {
                    due: tick,
                    sequence: key.sequence,
                };
                let _ = self.order.insert(collapsed, pending);
                let _ = self.keys.insert(pending.piece, collapsed);
            }
        }
        moved.len()
    }

    fn iter(&self) -> impl Iterator<Item = (PieceId, Tick)> + '_ {
        self.order.iter().map(|(key, pending)| (pending.piece, key.due))
    }

    fn clear(&mut self) {
        self.order.clear();
        self.keys.clear();
    }
}

/// Returns killed units to play after a delay.
#[derive(Debug)]
pub struct RespawnDelegate {
    config: Config,
    queue: RespawnQueue,
}

impl RespawnDelegate {
    /// Creates a delegate using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            queue: RespawnQueue::default(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Forgets every pending respawn left over from a previous round.
    pub fn round_will_start(&mut self) {
        self.queue.clear();
    }

    /// Queues a killed unit; a fallen leader pulls its team's respawns forward.
    pub fn piece_was_killed(&mut self, piece: &Piece, tick: Tick) {
        let Some(unit) = piece.unit() else {
            return;
        };
        if self.config.permanent.contains(&unit.unit_type) {
            debug!("unit {} does not respawn", piece.id.get());
            return;
        }

        if self.config.leaders.contains(&unit.unit_type) {
            if let Some(owner) = piece.owner {
                let collapsed = self.queue.collapse(owner, tick);
                if collapsed > 0 {
                    debug!(
                        "leader {} fell, {collapsed} units of player {} respawn next tick",
                        piece.id.get(),
                        owner.get()
                    );
                }
            }
        }

        let due = tick.saturating_add(self.config.respawn_ticks);
        self.queue.push(piece.id, piece.owner, due);
    }

    /// Reacts to effects applied to a piece outside of combat.
    pub fn piece_affected(&mut self, piece: PieceId, effect: Effect) {
        if effect == Effect::Resurrected && self.queue.remove(piece).is_some() {
            debug!("unit {} resurrected before respawning", piece.get());
        }
    }

    /// Emits respawn commands for every unit due on `tick`.
    pub fn tick(&mut self, world: &BangObject, tick: Tick, out: &mut Vec<Command>) {
        let due = self.queue.pop_due(tick);
        if due.is_empty() {
            return;
        }

        let mut reserved: Vec<Cell> = Vec::with_capacity(due.len());
        for pending in due {
            let Some(piece) = query::piece(world, pending.piece) else {
                warn!("pending respawn for missing piece {}", pending.piece.get());
                continue;
            };
            let Some(unit) = piece.unit() else {
                warn!("pending respawn for non-unit piece {}", pending.piece.get());
                continue;
            };
            if piece.is_alive() {
                debug!("piece {} already alive, dropping respawn", piece.id.get());
                continue;
            }

            let spot = query::board(world).occupiable_spot_excluding(
                unit.start_cell,
                self.config.search_radius,
                &reserved,
            );
            match spot {
                Some(cell) => {
                    reserved.push(cell);
                    out.push(Command::RespawnPiece {
                        piece: piece.id,
                        cell,
                    });
                    if let Some(owner) = piece.owner {
                        out.push(Command::IncrementStat {
                            player: owner,
                            stat: StatType::Respawns,
                            amount: 1,
                        });
                    }
                }
                None => {
                    let retry = tick.saturating_add(self.config.respawn_ticks);
                    debug!(
                        "no room to respawn {} near ({}, {}), retrying on tick {retry}",
                        piece.id.get(),
                        unit.start_cell.x(),
                        unit.start_cell.y()
                    );
                    self.queue.push(piece.id, pending.owner, retry);
                }
            }
        }
    }

    /// Tick on which the unit is due to respawn, if it is pending.
    #[must_use]
    pub fn respawn_tick(&self, piece: PieceId) -> Option<Tick> {
        self.queue.due(piece)
    }

    /// Pending respawns in the order they will be processed.
    pub fn pending(&self) -> impl Iterator<Item = (PieceId, Tick)> + '_ {
        self.queue.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_break_by_queue_order() {
        let mut queue = RespawnQueue::default();
        queue.push(PieceId::new(9), None, 5);
        queue.push(PieceId::new(3), None, 5);
        queue.push(PieceId::new(7), None, 4);
        let order: Vec<u32> = queue.pop_due(5).iter().map(|p| p.piece.get()).collect();
        assert_eq!(order, vec![7, 9, 3]);
    }

    #[test]
    fn removal_is_by_identity() {
        let mut queue = RespawnQueue::default();
        queue.push(PieceId::new(1), None, 8);
        queue.push(PieceId::new(2), None, 8);
        assert_eq!(queue.remove(PieceId::new(1)), Some(8));
        assert_eq!(queue.remove(PieceId::new(1)), None);
        let left: Vec<PieceId> = queue.iter().map(|(piece, _)| piece).collect();
        assert_eq!(left, vec![PieceId::new(2)]);
    }

    #[test]
    fn collapse_only_touches_the_owner() {
        let mut queue = RespawnQueue::default();
        let red = PlayerIndex::new(0);
        let blue = PlayerIndex::new(1);
        queue.push(PieceId::new(1), Some(red), 20);
        queue.push(PieceId::new(2), Some(blue), 20);
        queue.push(PieceId::new(3), Some(red), 14);
        assert_eq!(queue.collapse(red, 10), 2);
        assert_eq!(queue.due(PieceId::new(1)), Some(10));
        assert_eq!(queue.due(PieceId::new(3)), Some(10));
        assert_eq!(queue.due(PieceId::new(2)), Some(20));
        let order: Vec<u32> = queue.pop_due(10).iter().map(|p| p.piece.get()).collect();
        assert_eq!(order, vec![1, 3]);
    }
}
