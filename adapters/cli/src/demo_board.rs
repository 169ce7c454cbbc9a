//! Generated boards for headless games.

use bang_howdy_core::{Cell, CellRect, MarkerKind, Piece, PieceId, PieceKind};
use bang_howdy_system_scenario::ScenarioType;
use bang_howdy_world::Board;

/// Smallest board edge on which every scenario layout fits.
pub(crate) const MIN_SIZE: u32 = 12;

/// Distance of the start markers from the board edge.
const START_INSET: i32 = 3;

/// Builds a square board with the markers and pieces the scenario needs.
///
/// Start markers sit in all four corners regardless of how many players are
/// seated, so seats without a player leave their claims unassigned.
pub(crate) fn build(scenario: ScenarioType, size: u32) -> (Board, Vec<Piece>) {
    let size = size.max(MIN_SIZE);
    let board = Board::new(size, size).with_playable_area(CellRect::new(
        Cell::new(1, 1),
        size - 2,
        size - 2,
    ));
    let far = size as i32 - 1 - START_INSET;
    let center = size as i32 / 2;

    let mut layout = Layout::default();
    let starts = [
        Cell::new(START_INSET, START_INSET),
        Cell::new(far, far),
        Cell::new(far, START_INSET),
        Cell::new(START_INSET, far),
    ];
    for start in starts {
        layout.marker(MarkerKind::Start, start);
    }
    for (x, y) in [(center, 2), (center, far + 1), (2, center), (far + 1, center)] {
        layout.marker(MarkerKind::Bonus, Cell::new(x, y));
    }

    match scenario {
        ScenarioType::ClaimJumping | ScenarioType::GoldRush => {
            for start in starts {
                let dy = if start.y() < center { 2 } else { -2 };
                layout.piece(PieceKind::Claim { nuggets: 0 }, start.offset(0, dy));
            }
            if scenario == ScenarioType::GoldRush {
                for (dx, dy) in [(-2, 0), (1, 0), (0, 2)] {
                    layout.marker(MarkerKind::Lode, Cell::new(center + dx, center + dy));
                }
            }
        }
        ScenarioType::LandGrab => {
            for (dx, dy) in [(0, 0), (-2, 2), (2, -2)] {
                layout.piece(PieceKind::Homestead, Cell::new(center + dx, center + dy));
            }
        }
        ScenarioType::WendigoAttack => {
            layout.marker(MarkerKind::SafeZone, Cell::new(center, center));
            layout.marker(MarkerKind::SafeZone, Cell::new(center - 1, center));
            layout.marker(MarkerKind::Talisman, Cell::new(center - 3, center));
            layout.marker(MarkerKind::Talisman, Cell::new(center + 3, center));
        }
        ScenarioType::Shootout | ScenarioType::Practice => {
            layout.piece(PieceKind::Prop, Cell::new(center - 1, center - 1));
            layout.piece(PieceKind::Prop, Cell::new(center + 1, center + 1));
        }
    }
    (board, layout.pieces)
}

#[derive(Default)]
struct Layout {
    pieces: Vec<Piece>,
}

impl Layout {
    fn piece(&mut self, kind: PieceKind, cell: Cell) {
        let id = PieceId::new(self.pieces.len() as u32 + 1);
        self.pieces.push(Piece::new(id, kind, None, cell));
    }

    fn marker(&mut self, kind: MarkerKind, cell: Cell) {
        self.piece(PieceKind::Marker(kind), cell);
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, sync::Arc};

    use super::*;
    use bang_howdy_core::GameConfig;
    use bang_howdy_system_scenario::Session;

    #[test]
    fn every_scenario_accepts_its_board() {
        for scenario in ScenarioType::ALL {
            for size in [MIN_SIZE, 20] {
                let (board, pieces) = build(scenario, size);
                let session = Session::new(
                    Arc::new(GameConfig::default()),
                    board,
                    pieces,
                    ["one", "two"],
                    scenario,
                );
                assert!(session.is_ok(), "{scenario} rejected a {size}x{size} board");
            }
        }
    }

    #[test]
    fn blocking_pieces_never_share_a_cell() {
        for scenario in ScenarioType::ALL {
            let (board, pieces) = build(scenario, MIN_SIZE);
            let mut cells = BTreeSet::new();
            for piece in pieces.iter().filter(|piece| piece.blocks()) {
                assert!(board.is_occupiable(piece.cell), "{piece:?} off the playable area");
                assert!(cells.insert(piece.cell), "{scenario} stacks pieces on {:?}", piece.cell);
            }
        }
    }
}
