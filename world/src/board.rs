//! Board geometry and the occupancy shadow used for placement queries.

use bang_howdy_core::{Cell, CellRect, Piece, PieceId};

/// Passability of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// Units may stand on the tile.
    Open,
    /// Water, cliffs and buildings.
    Blocked,
}

/// Terrain grid plus the shadow map of blocking pieces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: u32,
    height: u32,
    playable: CellRect,
    terrain: Vec<Terrain>,
    shadow: Vec<Option<PieceId>>,
}

impl Board {
    /// Creates an entirely open board.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let cells = (width as usize) * (height as usize);
        Self {
            width,
            height,
            playable: CellRect::new(Cell::new(0, 0), width, height),
            terrain: vec![Terrain::Open; cells],
            shadow: vec![None; cells],
        }
    }

    /// Creates a board from rows of text where `#` marks blocked terrain.
    #[must_use]
    pub fn parse(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0) as u32;
        let mut board = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, glyph) in row.chars().enumerate() {
                if glyph == '#' {
                    board.set_terrain(Cell::new(x as i32, y as i32), Terrain::Blocked);
                }
            }
        }
        board
    }

    /// Restricts placement queries to the provided rectangle.
    #[must_use]
    pub fn with_playable_area(mut self, area: CellRect) -> Self {
        self.playable = area;
        self
    }

    /// Changes the terrain of a tile; out-of-bounds cells are ignored.
    pub fn set_terrain(&mut self, cell: Cell, terrain: Terrain) {
        if let Some(index) = self.index(cell) {
            self.terrain[index] = terrain;
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Region in which pieces may be placed during play.
    #[must_use]
    pub const fn playable_area(&self) -> CellRect {
        self.playable
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    /// Terrain of a tile, `None` outside the board.
    #[must_use]
    pub fn terrain(&self, cell: Cell) -> Option<Terrain> {
        self.index(cell).map(|index| self.terrain[index])
    }

    /// Blocking piece currently shadowing the cell.
    #[must_use]
    pub fn occupant(&self, cell: Cell) -> Option<PieceId> {
        self.index(cell).and_then(|index| self.shadow[index])
    }

    /// Reports whether a blocking piece could be placed on the cell.
    #[must_use]
    pub fn is_occupiable(&self, cell: Cell) -> bool {
        self.playable.contains(cell)
            && self
                .index(cell)
                .is_some_and(|index| self.terrain[index] == Terrain::Open && self.shadow[index].is_none())
    }

    /// Finds the nearest occupiable cell within `radius` tiles of `cell`.
    ///
    /// The exact cell is tried first, then each surrounding ring in turn.
    /// Cells within a ring are visited in row-major order so the result is
    /// stable across participants.
    #[must_use]
    pub fn occupiable_spot(&self, cell: Cell, radius: u32) -> Option<Cell> {
        self.occupiable_spot_excluding(cell, radius, &[])
    }

    /// Same as [`Board::occupiable_spot`], additionally skipping `reserved` cells.
    ///
    /// Callers placing several pieces in one batch pass the cells already
    /// chosen, since the shadow only updates once the batch is applied.
    #[must_use]
    pub fn occupiable_spot_excluding(&self, cell: Cell, radius: u32, reserved: &[Cell]) -> Option<Cell> {
        let radius = radius as i32;
        for ring in 0..=radius {
            for dy in -ring..=ring {
                for dx in -ring..=ring {
                    if dx.abs() != ring && dy.abs() != ring {
                        continue;
                    }
                    let candidate = cell.offset(dx, dy);
                    if self.is_occupiable(candidate) && !reserved.contains(&candidate) {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }

    /// Keeps the shadow map consistent with a piece changing from `old` to `new`.
    ///
    /// Either side may be absent for additions and removals.
    pub fn update_shadow(&mut self, old: Option<&Piece>, new: Option<&Piece>) {
        if let Some(old) = old {
            if let Some(index) = self.index(old.cell) {
                if self.shadow[index] == Some(old.id) {
                    self.shadow[index] = None;
                }
            }
        }
        if let Some(new) = new {
            if new.blocks() {
                if let Some(index) = self.index(new.cell) {
                    self.shadow[index] = Some(new.id);
                }
            }
        }
    }

    /// Forgets every shadowed piece.
    pub fn clear_shadow(&mut self) {
        self.shadow.iter_mut().for_each(|slot| *slot = None);
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let x = u32::try_from(cell.x()).ok()?;
        let y = u32::try_from(cell.y()).ok()?;
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bang_howdy_core::PieceKind;

    #[test]
    fn spot_search_prefers_exact_cell_then_rings() {
        let mut board = Board::new(5, 5);
        let center = Cell::new(2, 2);
        assert_eq!(board.occupiable_spot(center, 3), Some(center));

        let blocker = Piece::new(PieceId::new(1), PieceKind::Prop, None, center);
        board.update_shadow(None, Some(&blocker));
        assert_eq!(board.occupiable_spot(center, 3), Some(Cell::new(1, 1)));
        assert_eq!(board.occupiable_spot(center, 0), None);
    }

    #[test]
    fn parsed_terrain_blocks_placement() {
        let board = Board::parse(&["..#", "###", "..."]);
        assert_eq!(board.width(), 3);
        assert!(!board.is_occupiable(Cell::new(2, 0)));
        assert!(board.is_occupiable(Cell::new(0, 0)));
        assert_eq!(board.occupiable_spot(Cell::new(1, 1), 1), Some(Cell::new(0, 0)));
    }

    #[test]
    fn shadow_only_clears_its_own_piece() {
        let mut board = Board::new(3, 3);
        let cell = Cell::new(1, 1);
        let first = Piece::new(PieceId::new(1), PieceKind::Prop, None, cell);
        let second = Piece::new(PieceId::new(2), PieceKind::Prop, None, cell);
        board.update_shadow(None, Some(&second));
        board.update_shadow(Some(&first), None);
        assert_eq!(board.occupant(cell), Some(PieceId::new(2)));
    }

    #[test]
    fn playable_area_limits_search() {
        let board = Board::new(6, 6).with_playable_area(CellRect::new(Cell::new(1, 1), 4, 4));
        assert!(!board.is_occupiable(Cell::new(0, 0)));
        assert_eq!(board.occupiable_spot(Cell::new(0, 0), 1), Some(Cell::new(1, 1)));
    }
}
