//! Board markers extracted before a scenario is played.

use bang_howdy_core::{Cell, MarkerKind, Piece, PieceKind, PlayerIndex, UnitTypeId};

/// Configuration markers found on a board, in board order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardMarkers {
    starts: Vec<Cell>,
    bonus_spots: Vec<Cell>,
    lodes: Vec<Cell>,
    talismans: Vec<Cell>,
    safe_zones: Vec<Cell>,
}

impl BoardMarkers {
    /// Collects every marker among the board pieces.
    #[must_use]
    pub fn extract(pieces: &[Piece]) -> Self {
        let mut markers = Self::default();
        for piece in pieces {
            let PieceKind::Marker(kind) = piece.kind else {
                continue;
            };
            let list = match kind {
                MarkerKind::Start => &mut markers.starts,
                MarkerKind::Bonus => &mut markers.bonus_spots,
                MarkerKind::Lode => &mut markers.lodes,
                MarkerKind::Talisman => &mut markers.talismans,
                MarkerKind::SafeZone => &mut markers.safe_zones,
            };
            list.push(piece.cell);
        }
        markers
    }

    /// Start marker of a player. Players take start markers in board order.
    #[must_use]
    pub fn start(&self, player: PlayerIndex) -> Option<Cell> {
        self.starts.get(player.get()).copied()
    }

    /// Every start marker.
    #[must_use]
    pub fn starts(&self) -> &[Cell] {
        &self.starts
    }

    /// Spots on which bonuses may appear.
    #[must_use]
    pub fn bonus_spots(&self) -> &[Cell] {
        &self.bonus_spots
    }

    /// Gold lode positions.
    #[must_use]
    pub fn lodes(&self) -> &[Cell] {
        &self.lodes
    }

    /// Talisman positions.
    #[must_use]
    pub fn talismans(&self) -> &[Cell] {
        &self.talismans
    }

    /// Sacred ground protecting units from the wendigo.
    #[must_use]
    pub fn safe_zones(&self) -> &[Cell] {
        &self.safe_zones
    }
}

/// Reports whether a board piece only configures the scenario.
#[must_use]
pub fn is_marker(piece: &Piece) -> bool {
    matches!(piece.kind, PieceKind::Marker(_))
}

/// A unit bought by a player for the coming round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Purchase {
    /// Buying player.
    pub player: PlayerIndex,
    /// Type of the purchased unit.
    pub unit_type: UnitTypeId,
}

impl Purchase {
    /// Creates a purchase.
    #[must_use]
    pub const fn new(player: PlayerIndex, unit_type: UnitTypeId) -> Self {
        Self { player, unit_type }
    }
}
