//! Identifier-indexed storage for every piece on the board.

use std::collections::HashMap;

use bang_howdy_core::{Cell, Piece, PieceId, PlayerIndex};

/// Set of pieces keyed by identifier, iterated in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PieceSet {
    pieces: Vec<Piece>,
    index: HashMap<PieceId, usize>,
}

impl PieceSet {
    /// Creates an empty piece set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pieces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Reports whether the set holds no pieces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Looks up a piece by identifier.
    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.index.get(&id).map(|&slot| &self.pieces[slot])
    }

    /// Reports whether a piece with the identifier exists.
    #[must_use]
    pub fn contains(&self, id: PieceId) -> bool {
        self.index.contains_key(&id)
    }

    /// Inserts a new piece, handing it back if the identifier is taken.
    pub fn insert(&mut self, piece: Piece) -> Result<(), Piece> {
        if self.contains(piece.id) {
            return Err(piece);
        }
        let _ = self.index.insert(piece.id, self.pieces.len());
        self.pieces.push(piece);
        Ok(())
    }

    /// Replaces a stored piece, returning the previous state.
    pub fn replace(&mut self, piece: Piece) -> Option<Piece> {
        let slot = *self.index.get(&piece.id)?;
        Some(std::mem::replace(&mut self.pieces[slot], piece))
    }

    /// Removes a piece, returning it if it was present.
    pub fn remove(&mut self, id: PieceId) -> Option<Piece> {
        let slot = self.index.remove(&id)?;
        let piece = self.pieces.remove(slot);
        for shifted in &self.pieces[slot..] {
            if let Some(position) = self.index.get_mut(&shifted.id) {
                *position -= 1;
            }
        }
        Some(piece)
    }

    /// Removes every piece.
    pub fn clear(&mut self) {
        self.pieces.clear();
        self.index.clear();
    }

    /// Iterator over all pieces in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Pieces located on the provided cell.
    pub fn at(&self, cell: Cell) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(move |piece| piece.cell == cell)
    }

    /// Pieces sharing a cell with `piece`, excluding the piece itself.
    pub fn overlappers<'a>(&'a self, piece: &'a Piece) -> impl Iterator<Item = &'a Piece> {
        self.at(piece.cell).filter(move |other| other.id != piece.id)
    }

    /// Units owned by the player, dead or alive.
    pub fn units_of(&self, player: PlayerIndex) -> impl Iterator<Item = &Piece> {
        self.pieces
            .iter()
            .filter(move |piece| piece.unit().is_some() && piece.owner == Some(player))
    }

    /// Number of living units owned by the player.
    #[must_use]
    pub fn living_unit_count(&self, player: PlayerIndex) -> usize {
        self.units_of(player).filter(|piece| piece.is_alive()).count()
    }

    /// Largest identifier in use.
    #[must_use]
    pub fn max_id(&self) -> Option<PieceId> {
        self.pieces.iter().map(|piece| piece.id).max()
    }
}
