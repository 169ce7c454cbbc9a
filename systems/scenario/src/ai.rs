//! Computer players.

use std::{fmt, sync::Arc};

use bang_howdy_core::{
    BonusKind, Cell, Command, GameConfig, Holding, Piece, PieceId, PieceKind, PlayerIndex,
};
use bang_howdy_world::{query, BangObject};

use crate::scenarios::ScenarioType;

/// Decides the actions of a computer-controlled player each tick.
pub trait AiLogic: fmt::Debug {
    /// Emits the player's orders for the current tick.
    fn tick(&mut self, world: &BangObject, player: PlayerIndex, out: &mut Vec<Command>);
}

/// Personality of a computer player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AiProfile {
    /// Shoot adjacent rivals instead of pursuing the objective.
    pub aggressive: bool,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self { aggressive: true }
    }
}

/// Walks every unit one step per tick toward the scenario's objective.
#[derive(Debug)]
pub struct ObjectiveAi {
    scenario: ScenarioType,
    safe_zones: Vec<Cell>,
    config: Arc<GameConfig>,
    profile: AiProfile,
}

impl ObjectiveAi {
    /// Creates the logic for one scenario.
    #[must_use]
    pub fn new(
        scenario: ScenarioType,
        safe_zones: Vec<Cell>,
        config: Arc<GameConfig>,
        profile: AiProfile,
    ) -> Self {
        Self {
            scenario,
            safe_zones,
            config,
            profile,
        }
    }

    fn goal(&self, world: &BangObject, player: PlayerIndex, unit: &Piece) -> Option<Cell> {
        let pieces = query::pieces(world);
        let nearest = |wanted: &dyn Fn(&Piece) -> bool| {
            pieces
                .iter()
                .filter(|&piece| wanted(piece))
                .min_by_key(|piece| piece.cell.manhattan_distance(unit.cell))
                .map(|piece| piece.cell)
        };
        let loose = |kind: BonusKind| move |piece: &Piece| piece.kind == PieceKind::Bonus(kind);

        match self.scenario {
            ScenarioType::ClaimJumping | ScenarioType::GoldRush => {
                if unit.holding() == Some(Holding::Nugget) {
                    return nearest(&|piece| {
                        matches!(piece.kind, PieceKind::Claim { .. }) && piece.owner == Some(player)
                    });
                }
                let rush = self.scenario == ScenarioType::GoldRush;
                nearest(&|piece| match piece.kind {
                    PieceKind::Claim { nuggets } => {
                        !rush && nuggets > 0 && piece.owner.is_some_and(|owner| owner != player)
                    }
                    PieceKind::Counter { count } => rush && count > 0,
                    PieceKind::Bonus(BonusKind::Nugget) => true,
                    _ => false,
                })
            }
            ScenarioType::LandGrab => nearest(&|piece| {
                piece.kind == PieceKind::Homestead && piece.owner != Some(player)
            }),
            ScenarioType::WendigoAttack => {
                if unit.holding() != Some(Holding::Talisman) {
                    if let Some(talisman) = nearest(&loose(BonusKind::Talisman)) {
                        return Some(talisman);
                    }
                }
                if self.safe_zones.contains(&unit.cell) {
                    return None;
                }
                self.safe_zones
                    .iter()
                    .filter(|cell| query::board(world).is_occupiable(**cell))
                    .min_by_key(|cell| cell.manhattan_distance(unit.cell))
                    .copied()
            }
            ScenarioType::Shootout | ScenarioType::Practice => {
                nearest(&|piece| piece.is_living_unit() && piece.owner.is_some_and(|o| o != player))
                    .or_else(|| nearest(&loose(BonusKind::Repair)))
            }
        }
    }

    fn adjacent_rival(world: &BangObject, player: PlayerIndex, unit: &Piece) -> Option<PieceId> {
        query::pieces(world)
            .iter()
            .find(|piece| {
                piece.is_living_unit()
                    && piece.owner.is_some_and(|owner| owner != player)
                    && piece.cell.is_adjacent(unit.cell)
            })
            .map(|piece| piece.id)
    }
}

impl AiLogic for ObjectiveAi {
    fn tick(&mut self, world: &BangObject, player: PlayerIndex, out: &mut Vec<Command>) {
        let units: Vec<Piece> = query::pieces(world)
            .units_of(player)
            .filter(|unit| unit.is_alive())
            .copied()
            .collect();
        let mut claimed: Vec<Cell> = Vec::new();
        for unit in units {
            if self.profile.aggressive {
                let damage = unit
                    .unit()
                    .and_then(|state| self.config.unit(state.unit_type))
                    .map_or(0, |config| config.damage);
                if damage > 0 {
                    if let Some(target) = Self::adjacent_rival(world, player, &unit) {
                        out.push(Command::DamagePiece {
                            piece: target,
                            amount: damage,
                            shooter: Some(unit.id),
                        });
                        continue;
                    }
                }
            }
            let Some(goal) = self.goal(world, player, &unit) else {
                continue;
            };
            if let Some(step) = step_toward(world, unit.cell, goal, &claimed) {
                claimed.push(step);
                out.push(Command::MovePiece {
                    piece: unit.id,
                    to: step,
                });
            }
        }
    }
}

/// Free neighbouring cell that brings `from` strictly closer to `goal`.
fn step_toward(world: &BangObject, from: Cell, goal: Cell, claimed: &[Cell]) -> Option<Cell> {
    let board = query::board(world);
    let current = from.manhattan_distance(goal);
    from.neighbors()
        .into_iter()
        .filter(|cell| board.is_occupiable(*cell) && !claimed.contains(cell))
        .map(|cell| (cell.manhattan_distance(goal), cell))
        .filter(|(distance, _)| *distance < current)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, cell)| cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bang_howdy_core::{GamePhase, UnitState, UnitTypeId};
    use bang_howdy_world::{apply, Board};

    fn world_with(pieces: &[Piece]) -> BangObject {
        let mut world = BangObject::new(Board::new(6, 6), 2);
        let mut events = Vec::new();
        for phase in [GamePhase::SelectPhase, GamePhase::BuyingPhase] {
            apply(&mut world, Command::SetPhase { phase }, &mut events);
        }
        apply(&mut world, Command::StartRound { duration: 30 }, &mut events);
        for piece in pieces {
            apply(&mut world, Command::AddPiece { piece: *piece }, &mut events);
        }
        apply(
            &mut world,
            Command::SetPhase {
                phase: GamePhase::InPlay,
            },
            &mut events,
        );
        world
    }

    fn unit(id: u32, owner: usize, cell: Cell) -> Piece {
        Piece::new(
            PieceId::new(id),
            PieceKind::Unit(UnitState {
                unit_type: UnitTypeId::new(1),
                holding: None,
                start_cell: cell,
            }),
            Some(PlayerIndex::new(owner)),
            cell,
        )
    }

    #[test]
    fn adjacent_rivals_are_shot() {
        let world = world_with(&[unit(1, 0, Cell::new(2, 2)), unit(2, 1, Cell::new(3, 2))]);
        let mut ai = ObjectiveAi::new(
            ScenarioType::Shootout,
            Vec::new(),
            Arc::new(GameConfig::default()),
            AiProfile::default(),
        );
        let mut out = Vec::new();
        ai.tick(&world, PlayerIndex::new(0), &mut out);
        assert_eq!(
            out,
            vec![Command::DamagePiece {
                piece: PieceId::new(2),
                amount: 34,
                shooter: Some(PieceId::new(1)),
            }]
        );
    }

    #[test]
    fn units_walk_toward_unstaked_homesteads() {
        let stead = Piece::new(PieceId::new(5), PieceKind::Homestead, None, Cell::new(5, 0));
        let world = world_with(&[unit(1, 0, Cell::new(0, 0)), stead]);
        let mut ai = ObjectiveAi::new(
            ScenarioType::LandGrab,
            Vec::new(),
            Arc::new(GameConfig::default()),
            AiProfile { aggressive: false },
        );
        let mut out = Vec::new();
        ai.tick(&world, PlayerIndex::new(0), &mut out);
        assert_eq!(
            out,
            vec![Command::MovePiece {
                piece: PieceId::new(1),
                to: Cell::new(1, 0),
            }]
        );
    }
}
