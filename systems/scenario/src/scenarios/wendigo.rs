//! Wendigo attack: survive waves that charge along rows or columns.
//!
//! A wave spawns at one edge of the playable area, waits, then sweeps its
//! lanes. Every living unit in a swept lane dies unless it carries a
//! talisman or stands on a safe zone. Survivors earn more the closer they
//! stand to a safe zone.

use log::{debug, info};
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};

use bang_howdy_core::{
    BonusKind, Cell, Command, Holding, Orientation, Piece, PieceId, PieceKind, PlayerIndex,
    StatType, Tick, WendigoConfig, MAX_DAMAGE,
};
use bang_howdy_world::query;

use super::{EarlyEnd, TickOutcome};
use crate::{context::ScenarioContext, markers::BoardMarkers};

/// Points paid per unit alive after a wave.
pub const POINTS_PER_SURVIVAL: i32 = 10;

/// Extra points for a unit that was protected inside a swept lane.
pub const TALISMAN_SURVIVAL_BONUS: i32 = 15;

/// Distance from a safe zone at which survivors stop earning a proximity bonus.
pub const SAFE_ZONE_REACH: u32 = 3;

/// Points per step a survivor stands inside `SAFE_ZONE_REACH`.
pub const POINTS_PER_SAFE_ZONE_STEP: i32 = 5;

/// Ticks left in the round after the final wave.
pub const POST_WAVE_TICKS: Tick = 4;

/// Lanes in the playable area per wendigo in a wave.
const LANES_PER_WENDIGO: usize = 4;

/// Lanes on either side of a unit that count it toward lane density.
const DENSITY_RANGE: i32 = 1;

/// Direction in which the lanes of a wave run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Lanes are rows, swept horizontally.
    Rows,
    /// Lanes are columns, swept vertically.
    Columns,
}

impl Axis {
    /// Lane a cell lies in.
    #[must_use]
    pub const fn lane_of(self, cell: Cell) -> i32 {
        match self {
            Axis::Rows => cell.y(),
            Axis::Columns => cell.x(),
        }
    }
}

/// A wave of wendigos waiting to charge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wave {
    axis: Axis,
    lanes: Vec<i32>,
    spawned: Tick,
    attack: Tick,
    wendigos: Vec<PieceId>,
}

impl Wave {
    /// Direction of the lanes.
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    /// Swept lanes in ascending order.
    #[must_use]
    pub fn lanes(&self) -> &[i32] {
        &self.lanes
    }

    /// Tick on which the wave appeared.
    #[must_use]
    pub const fn spawned(&self) -> Tick {
        self.spawned
    }

    /// Tick on which the wave charges.
    #[must_use]
    pub const fn attack(&self) -> Tick {
        self.attack
    }

    /// Wendigo pieces of the wave.
    #[must_use]
    pub fn wendigos(&self) -> &[PieceId] {
        &self.wendigos
    }
}

#[derive(Debug)]
pub(crate) struct WendigoAttack {
    config: WendigoConfig,
    safe_zones: Vec<Cell>,
    next_wave: Option<Tick>,
    wave: Option<Wave>,
    early_end: EarlyEnd,
}

impl WendigoAttack {
    pub(crate) fn new(config: WendigoConfig) -> Self {
        Self {
            config,
            safe_zones: Vec::new(),
            next_wave: None,
            wave: None,
            early_end: EarlyEnd::default(),
        }
    }

    pub(crate) fn wave(&self) -> Option<&Wave> {
        self.wave.as_ref()
    }

    pub(crate) fn next_wave(&self) -> Option<Tick> {
        self.next_wave
    }

    pub(crate) fn round_will_start(&mut self, ctx: &mut ScenarioContext<'_>, markers: &BoardMarkers) {
        self.safe_zones = markers.safe_zones().to_vec();
        self.wave = None;
        self.early_end.reset();
        for cell in markers.talismans() {
            let _ = ctx.add_piece(PieceKind::Bonus(BonusKind::Talisman), None, *cell);
        }
        self.next_wave = self.schedule(ctx, 0);
        debug!("first wendigo wave due on tick {:?}", self.next_wave);
    }

    /// Picks the tick of the next wave, if its attack still fits in the round.
    fn schedule(&self, ctx: &mut ScenarioContext<'_>, from: Tick) -> Option<Tick> {
        let delay = ctx.rng.gen_range(self.config.min_ticks..=self.config.max_ticks);
        let spawn = from.checked_add(delay)?;
        let attack = spawn.checked_add(self.config.wait)?;
        (attack <= query::last_tick(ctx.world)).then_some(spawn)
    }

    pub(crate) fn tick(&mut self, ctx: &mut ScenarioContext<'_>) -> TickOutcome {
        let now = ctx.tick;
        if let Some(wave) = self.wave.take() {
            if wave.attack == now {
                self.charge(ctx, &wave);
                self.next_wave = self.schedule(ctx, now);
                if self.next_wave.is_none() {
                    self.early_end.shorten(ctx, POST_WAVE_TICKS);
                }
            } else {
                self.wave = Some(wave);
            }
        } else if self.next_wave == Some(now) {
            self.next_wave = None;
            self.wave = Some(self.spawn(ctx));
        }
        TickOutcome::Continue
    }

    fn spawn(&self, ctx: &mut ScenarioContext<'_>) -> Wave {
        let area = query::board(ctx.world).playable_area();
        let axis = if ctx.rng.gen_bool(0.5) {
            Axis::Rows
        } else {
            Axis::Columns
        };
        let (first, last) = match axis {
            Axis::Rows => (area.top(), area.bottom()),
            Axis::Columns => (area.left(), area.right()),
        };
        let lanes = choose_lanes(ctx, axis, first, last);

        let from_start = ctx.rng.gen_bool(0.5);
        let (edge, orientation) = match (axis, from_start) {
            (Axis::Rows, true) => (area.left(), Orientation::East),
            (Axis::Rows, false) => (area.right(), Orientation::West),
            (Axis::Columns, true) => (area.top(), Orientation::South),
            (Axis::Columns, false) => (area.bottom(), Orientation::North),
        };
        let wendigos = lanes
            .iter()
            .map(|lane| {
                let cell = match axis {
                    Axis::Rows => Cell::new(edge, *lane),
                    Axis::Columns => Cell::new(*lane, edge),
                };
                let mut piece = Piece::new(ctx.ids.allocate(), PieceKind::Wendigo, None, cell);
                piece.orientation = orientation;
                ctx.push(Command::AddPiece { piece });
                piece.id
            })
            .collect();

        let attack = ctx.tick.saturating_add(self.config.wait);
        info!(
            "{} wendigos appear along {axis:?} {lanes:?}, charging on tick {attack}",
            lanes.len()
        );
        Wave {
            axis,
            lanes,
            spawned: ctx.tick,
            attack,
            wendigos,
        }
    }

    fn charge(&self, ctx: &mut ScenarioContext<'_>, wave: &Wave) {
        let players = query::player_count(ctx.world);
        let mut survivors = vec![0_i32; players];
        let mut saves = vec![0_i32; players];
        let mut proximity = vec![0_i32; players];
        let mut victims = Vec::new();

        for unit in query::pieces(ctx.world).iter().filter(|piece| piece.is_living_unit()) {
            let Some(owner) = unit.owner.filter(|owner| owner.get() < players) else {
                continue;
            };
            let lane = wave.axis.lane_of(unit.cell);
            if let Some(index) = wave.lanes.iter().position(|swept| *swept == lane) {
                let protected = unit.holding() == Some(Holding::Talisman)
                    || self.safe_zones.contains(&unit.cell);
                if !protected {
                    victims.push((unit.id, wave.wendigos.get(index).copied()));
                    continue;
                }
                saves[owner.get()] += 1;
            }
            survivors[owner.get()] += 1;
            proximity[owner.get()] += safe_zone_bonus(unit.cell, &self.safe_zones);
        }

        for (piece, shooter) in victims {
            ctx.push(Command::DamagePiece {
                piece,
                amount: MAX_DAMAGE,
                shooter,
            });
        }
        for (index, (survived, saved)) in survivors.iter().zip(&saves).enumerate() {
            let player = PlayerIndex::new(index);
            let points = survived
                .saturating_mul(POINTS_PER_SURVIVAL)
                .saturating_add(saved.saturating_mul(TALISMAN_SURVIVAL_BONUS))
                .saturating_add(proximity[index]);
            ctx.grant(player, points);
            ctx.stat(player, StatType::WendigoSurvivals, i64::from(*survived));
            ctx.stat(player, StatType::TalismanSaves, i64::from(*saved));
        }
        for piece in &wave.wendigos {
            ctx.push(Command::RemovePiece { piece: *piece });
        }
        info!("wendigos charged on tick {}", ctx.tick);
    }

    /// Collects talismans lying on the ground.
    pub(crate) fn piece_moved(&mut self, ctx: &mut ScenarioContext<'_>, piece: &Piece) {
        let Some(owner) = piece.owner else {
            return;
        };
        if piece.holding().is_some() {
            return;
        }
        if let Some((bonus, BonusKind::Talisman)) = query::bonus_at(ctx.world, piece.cell) {
            ctx.push(Command::RemovePiece { piece: bonus });
            ctx.push(Command::SetHolding {
                piece: piece.id,
                holding: Some(Holding::Talisman),
            });
            ctx.stat(owner, StatType::BonusesCollected, 1);
        }
    }

    /// Drops a dead carrier's talisman where it fell.
    pub(crate) fn piece_was_killed(&mut self, ctx: &mut ScenarioContext<'_>, piece: &Piece) {
        if piece.holding() != Some(Holding::Talisman) {
            return;
        }
        ctx.push(Command::SetHolding {
            piece: piece.id,
            holding: None,
        });
        let _ = ctx.add_piece(PieceKind::Bonus(BonusKind::Talisman), None, piece.cell);
    }
}

/// Bonus for surviving close to the nearest safe zone.
fn safe_zone_bonus(cell: Cell, zones: &[Cell]) -> i32 {
    let Some(nearest) = zones.iter().map(|zone| cell.chebyshev_distance(*zone)).min() else {
        return 0;
    };
    let steps = i32::try_from(SAFE_ZONE_REACH.saturating_sub(nearest)).unwrap_or(0);
    steps.saturating_mul(POINTS_PER_SAFE_ZONE_STEP)
}

/// Picks the swept lanes, favouring lanes crowded with living units.
///
/// Lanes next to an already chosen lane are never chosen.
fn choose_lanes(ctx: &mut ScenarioContext<'_>, axis: Axis, first: i32, last: i32) -> Vec<i32> {
    let mut candidates: Vec<(i32, u32)> = (first..=last)
        .map(|lane| {
            let density: u32 = query::pieces(ctx.world)
                .iter()
                .filter(|piece| piece.is_living_unit())
                .map(|piece| {
                    let distance = (axis.lane_of(piece.cell) - lane).abs();
                    if distance <= DENSITY_RANGE {
                        (DENSITY_RANGE + 1 - distance).unsigned_abs()
                    } else {
                        0
                    }
                })
                .sum();
            (lane, 1 + density)
        })
        .collect();

    let wanted = (candidates.len() / LANES_PER_WENDIGO).max(1);
    let mut chosen = Vec::with_capacity(wanted);
    while chosen.len() < wanted {
        let Ok(weights) = WeightedIndex::<u32>::new(candidates.iter().map(|(_, weight)| *weight)) else {
            break;
        };
        let (lane, _) = candidates[weights.sample(ctx.rng)];
        chosen.push(lane);
        candidates.retain(|(other, _)| (other - lane).abs() > 1);
    }
    chosen.sort_unstable();
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_follow_their_axis() {
        let cell = Cell::new(3, 7);
        assert_eq!(Axis::Rows.lane_of(cell), 7);
        assert_eq!(Axis::Columns.lane_of(cell), 3);
    }

    #[test]
    fn safe_zone_bonus_fades_with_distance() {
        let zones = [Cell::new(0, 7), Cell::new(6, 0)];
        assert_eq!(safe_zone_bonus(Cell::new(0, 7), &zones), 15);
        assert_eq!(safe_zone_bonus(Cell::new(1, 6), &zones), 10);
        assert_eq!(safe_zone_bonus(Cell::new(4, 1), &zones), 5);
        assert_eq!(safe_zone_bonus(Cell::new(3, 4), &zones), 0);
        assert_eq!(safe_zone_bonus(Cell::new(0, 7), &[]), 0);
    }
}
