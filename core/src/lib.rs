#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bang! Howdy scenario engine.
//!
//! This crate defines the message surface that connects the tick driver, the
//! authoritative game object, and the scenario systems. Drivers and scenarios
//! submit [`Command`] values describing desired mutations, the game object
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values that scenarios and remote observers react to. Scenarios
//! query immutable state and respond exclusively with new command batches.

pub mod config;
pub mod stats;

use serde::{Deserialize, Serialize};

pub use config::{
    ConfigError, GameConfig, RoundConfig, UnitConfig, UnitMake, WendigoConfig,
};
pub use stats::{PlayerRecord, StatSet, StatType};

/// Discrete simulation step counter. Rounds count ticks from zero.
pub type Tick = u16;

/// Damage at which a piece is considered dead.
pub const MAX_DAMAGE: u8 = 100;

/// Phases the shared game object moves through during a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Players are still joining.
    PreGame,
    /// Tutorial entry state feeding directly into play.
    PreTutorial,
    /// Practice entry state feeding directly into play.
    PrePractice,
    /// Players select their big shots and cards.
    SelectPhase,
    /// Players purchase units for the coming round.
    BuyingPhase,
    /// The round is being simulated.
    InPlay,
    /// The round has finished and results are displayed.
    PostRound,
    /// The configured number of rounds has completed.
    GameOver,
}

impl GamePhase {
    /// Reports whether the phase may be followed by `next`.
    #[must_use]
    pub fn can_transition_to(self, next: GamePhase) -> bool {
        use GamePhase::*;
        matches!(
            (self, next),
            (PreGame, SelectPhase)
                | (PreGame, PreTutorial)
                | (PreGame, PrePractice)
                | (PreTutorial, InPlay)
                | (PrePractice, InPlay)
                | (SelectPhase, BuyingPhase)
                | (BuyingPhase, InPlay)
                | (BuyingPhase, SelectPhase)
                | (InPlay, PostRound)
                | (PostRound, SelectPhase)
                | (PostRound, PrePractice)
                | (PostRound, GameOver)
        )
    }

    /// Reports whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver)
    }
}

/// Index of a player seated in the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerIndex(usize);

impl PlayerIndex {
    /// Creates a new player index.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the numeric seat index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Unique identifier assigned to a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(u32);

impl PieceId {
    /// Creates a new piece identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier immediately following this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Identifier of a unit type within the [`GameConfig`] unit table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitTypeId(u16);

impl UnitTypeId {
    /// Creates a new unit type identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Tile coordinate on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    x: i32,
    y: i32,
}

impl Cell {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell displaced by the provided offsets.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the Chebyshev (king move) distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Reports whether `other` shares an edge with this cell.
    #[must_use]
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Cells sharing an edge with this one, in north, east, south, west order.
    #[must_use]
    pub const fn neighbors(&self) -> [Cell; 4] {
        [
            self.offset(0, -1),
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
        ]
    }
}

/// Axis-aligned rectangle expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: Cell,
    width: u32,
    height: u32,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn new(origin: Cell, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> Cell {
        self.origin
    }

    /// Width of the rectangle in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Leftmost column inside the rectangle.
    #[must_use]
    pub const fn left(&self) -> i32 {
        self.origin.x()
    }

    /// Topmost row inside the rectangle.
    #[must_use]
    pub const fn top(&self) -> i32 {
        self.origin.y()
    }

    /// Rightmost column inside the rectangle.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.origin.x() + self.width as i32 - 1
    }

    /// Bottommost row inside the rectangle.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.origin.y() + self.height as i32 - 1
    }

    /// Reports whether the rectangle contains the provided cell.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x() >= self.left()
            && cell.x() <= self.right()
            && cell.y() >= self.top()
            && cell.y() <= self.bottom()
    }
}

/// Facing of a piece on the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Facing decreasing rows.
    #[default]
    North,
    /// Facing increasing columns.
    East,
    /// Facing increasing rows.
    South,
    /// Facing decreasing columns.
    West,
}

impl Orientation {
    /// Orientation of a single step from `from` toward `to`, if they differ.
    #[must_use]
    pub fn toward(from: Cell, to: Cell) -> Option<Self> {
        let dx = to.x() - from.x();
        let dy = to.y() - from.y();
        if dx == 0 && dy == 0 {
            return None;
        }
        if dx.abs() >= dy.abs() {
            Some(if dx > 0 { Orientation::East } else { Orientation::West })
        } else {
            Some(if dy > 0 { Orientation::South } else { Orientation::North })
        }
    }
}

/// Item carried by a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holding {
    /// A gold nugget taken from a claim or lode.
    Nugget,
    /// A talisman that wards off the wendigo.
    Talisman,
}

/// Bonus varieties that may lie on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// Repairs all damage of the collecting unit.
    Repair,
    /// Grants points to the collecting unit's owner.
    Points,
    /// A loose nugget that may be carried to a claim.
    Nugget,
    /// A talisman that protects its carrier from the wendigo.
    Talisman,
}

impl BonusKind {
    /// Item a unit holds after collecting the bonus, if any.
    #[must_use]
    pub const fn holding(&self) -> Option<Holding> {
        match self {
            BonusKind::Nugget => Some(Holding::Nugget),
            BonusKind::Talisman => Some(Holding::Talisman),
            BonusKind::Repair | BonusKind::Points => None,
        }
    }
}

/// Board markers that configure a scenario but never take part in play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Team start position.
    Start,
    /// Spot on which bonuses may appear.
    Bonus,
    /// Gold lode position used by gold rush.
    Lode,
    /// Spot on which a talisman appears in wendigo attack.
    Talisman,
    /// Sacred ground that protects units from the wendigo.
    SafeZone,
}

/// Per-unit state carried by unit pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitState {
    /// Type of the unit within the configured unit table.
    pub unit_type: UnitTypeId,
    /// Item currently carried by the unit.
    pub holding: Option<Holding>,
    /// Start marker the unit's team entered the board from.
    pub start_cell: Cell,
}

/// Polymorphic behavior of a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceKind {
    /// A player-controlled unit.
    Unit(UnitState),
    /// A collectable bonus.
    Bonus(BonusKind),
    /// A configuration marker.
    Marker(MarkerKind),
    /// Static scenery.
    Prop,
    /// Railway track.
    Track,
    /// Camera viewpoint.
    Viewpoint,
    /// A mining claim holding nuggets for its owner.
    Claim {
        /// Nuggets currently stored in the claim.
        nuggets: u32,
    },
    /// A homestead that may be claimed by a player.
    Homestead,
    /// Generic counter, used for gold lodes.
    Counter {
        /// Current value of the counter.
        count: u32,
    },
    /// A wendigo waiting to charge along its lane.
    Wendigo,
}

/// An entity occupying a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Unique identifier of the piece.
    pub id: PieceId,
    /// Behavioral variant of the piece.
    pub kind: PieceKind,
    /// Owning player, or `None` for neutral pieces.
    pub owner: Option<PlayerIndex>,
    /// Current board position.
    pub cell: Cell,
    /// Accumulated damage in the range `0..=100`.
    pub damage: u8,
    /// Current facing.
    pub orientation: Orientation,
}

impl Piece {
    /// Creates an undamaged piece.
    #[must_use]
    pub const fn new(id: PieceId, kind: PieceKind, owner: Option<PlayerIndex>, cell: Cell) -> Self {
        Self {
            id,
            kind,
            owner,
            cell,
            damage: 0,
            orientation: Orientation::North,
        }
    }

    /// Reports whether the piece has taken less than lethal damage.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.damage < MAX_DAMAGE
    }

    /// Reports whether the piece prevents other pieces from entering its cell.
    #[must_use]
    pub const fn blocks(&self) -> bool {
        match self.kind {
            PieceKind::Unit(_) => self.is_alive(),
            PieceKind::Prop
            | PieceKind::Claim { .. }
            | PieceKind::Homestead
            | PieceKind::Counter { .. } => true,
            PieceKind::Bonus(_)
            | PieceKind::Marker(_)
            | PieceKind::Track
            | PieceKind::Viewpoint
            | PieceKind::Wendigo => false,
        }
    }

    /// Unit state when the piece is a unit.
    #[must_use]
    pub const fn unit(&self) -> Option<&UnitState> {
        match &self.kind {
            PieceKind::Unit(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable unit state when the piece is a unit.
    pub fn unit_mut(&mut self) -> Option<&mut UnitState> {
        match &mut self.kind {
            PieceKind::Unit(state) => Some(state),
            _ => None,
        }
    }

    /// Reports whether the piece is a living unit.
    #[must_use]
    pub const fn is_living_unit(&self) -> bool {
        matches!(self.kind, PieceKind::Unit(_)) && self.is_alive()
    }

    /// Stored count of a claim or counter.
    #[must_use]
    pub const fn count(&self) -> Option<u32> {
        match self.kind {
            PieceKind::Claim { nuggets } => Some(nuggets),
            PieceKind::Counter { count } => Some(count),
            _ => None,
        }
    }

    /// Item carried by the piece, if it is a unit holding one.
    #[must_use]
    pub const fn holding(&self) -> Option<Holding> {
        match &self.kind {
            PieceKind::Unit(state) => state.holding,
            _ => None,
        }
    }
}

/// Effect applied to a piece by something other than movement or damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    /// A dead unit was brought back to life in place.
    Resurrected,
    /// All damage was repaired.
    Repaired,
}

/// Commands that express all permissible game object mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests a transition to another game phase.
    SetPhase {
        /// Phase to enter.
        phase: GamePhase,
    },
    /// Resets per-round counters and starts a round of the given length.
    StartRound {
        /// Number of ticks the round lasts.
        duration: Tick,
    },
    /// Advances the round clock by one tick.
    AdvanceTick,
    /// Moves the tick on which the round ends.
    SetLastTick {
        /// New final tick of the round.
        tick: Tick,
    },
    /// Adds a piece and broadcasts it.
    AddPiece {
        /// Piece to add.
        piece: Piece,
    },
    /// Adds a piece without broadcasting it; every participant derives it locally.
    AddPieceDirect {
        /// Piece to add.
        piece: Piece,
    },
    /// Replaces the stored state of an existing piece.
    UpdatePiece {
        /// New state of the piece.
        piece: Piece,
    },
    /// Removes a piece and broadcasts the removal.
    RemovePiece {
        /// Piece to remove.
        piece: PieceId,
    },
    /// Removes a piece without broadcasting the removal.
    RemovePieceDirect {
        /// Piece to remove.
        piece: PieceId,
    },
    /// Moves a piece to a new cell.
    MovePiece {
        /// Piece to move.
        piece: PieceId,
        /// Destination cell.
        to: Cell,
    },
    /// Applies damage to a piece.
    DamagePiece {
        /// Piece receiving damage.
        piece: PieceId,
        /// Damage to apply.
        amount: u8,
        /// Piece responsible for the damage, if any.
        shooter: Option<PieceId>,
    },
    /// Returns a dead unit to play at a new position.
    RespawnPiece {
        /// Unit to respawn.
        piece: PieceId,
        /// Cell the unit reappears on.
        cell: Cell,
    },
    /// Brings a dead unit back to life where it fell.
    ResurrectPiece {
        /// Unit to resurrect.
        piece: PieceId,
    },
    /// Repairs all damage of a living piece.
    RepairPiece {
        /// Piece to repair.
        piece: PieceId,
    },
    /// Changes the item carried by a unit.
    SetHolding {
        /// Unit whose cargo changes.
        piece: PieceId,
        /// New cargo.
        holding: Option<Holding>,
    },
    /// Changes the owner of a piece.
    SetOwner {
        /// Piece changing hands.
        piece: PieceId,
        /// New owner.
        owner: Option<PlayerIndex>,
    },
    /// Adjusts the nuggets of a claim or the count of a counter, never below zero.
    AdjustCount {
        /// Claim or counter to adjust.
        piece: PieceId,
        /// Signed change.
        delta: i32,
    },
    /// Adds (or with a negative amount, removes) points from a player.
    GrantPoints {
        /// Receiving player.
        player: PlayerIndex,
        /// Signed amount of points.
        amount: i32,
    },
    /// Increments a round statistic of a player.
    IncrementStat {
        /// Player whose statistic changes.
        player: PlayerIndex,
        /// Statistic to increment.
        stat: StatType,
        /// Amount to add.
        amount: i64,
    },
    /// Marks the current round as finished.
    EndRound,
}

/// Events broadcast by the game object after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The game entered a new phase.
    PhaseChanged {
        /// Phase left behind.
        from: GamePhase,
        /// Phase entered.
        to: GamePhase,
    },
    /// A round started.
    RoundStarted {
        /// Zero-based index of the round.
        round: usize,
        /// Configured length of the round.
        duration: Tick,
    },
    /// The round clock advanced.
    TickAdvanced {
        /// Tick now being simulated.
        tick: Tick,
    },
    /// The final tick of the round changed.
    LastTickChanged {
        /// New final tick.
        last_tick: Tick,
    },
    /// A piece entered the board.
    PieceAdded {
        /// Snapshot of the added piece.
        piece: Piece,
        /// Whether the addition bypassed broadcast.
        direct: bool,
    },
    /// A piece's stored state changed.
    PieceUpdated {
        /// Snapshot prior to the update.
        before: Piece,
        /// Snapshot after the update.
        after: Piece,
    },
    /// A piece left the board.
    PieceRemoved {
        /// Snapshot of the removed piece.
        piece: Piece,
        /// Whether the removal bypassed broadcast.
        direct: bool,
    },
    /// A piece moved between two cells.
    PieceMoved {
        /// Moved piece.
        piece: PieceId,
        /// Cell left behind.
        from: Cell,
        /// Cell entered.
        to: Cell,
    },
    /// A piece took lethal damage.
    PieceKilled {
        /// Snapshot of the piece at the moment it died.
        piece: Piece,
        /// Piece responsible for the kill, if any.
        shooter: Option<PieceId>,
        /// Owner of the responsible piece, if any.
        shooter_owner: Option<PlayerIndex>,
    },
    /// A dead unit returned to play.
    PieceRespawned {
        /// Snapshot of the unit after respawning.
        piece: Piece,
    },
    /// A piece was affected by a special effect.
    PieceAffected {
        /// Affected piece.
        piece: PieceId,
        /// Applied effect.
        effect: Effect,
    },
    /// A player's score changed.
    PointsGranted {
        /// Receiving player.
        player: PlayerIndex,
        /// Signed change actually applied after clamping.
        delta: i32,
        /// Resulting total.
        total: i32,
    },
    /// A round statistic changed.
    StatChanged {
        /// Player whose statistic changed.
        player: PlayerIndex,
        /// Statistic that changed.
        stat: StatType,
        /// Resulting value.
        value: i64,
    },
    /// The round finished.
    RoundEnded {
        /// Zero-based index of the round.
        round: usize,
        /// Tick on which the round ended.
        tick: Tick,
    },
    /// A command could not be applied.
    CommandRejected {
        /// Specific reason the command failed.
        reason: Rejection,
    },
}

impl Event {
    /// Reports whether the event must be forwarded to remote observers.
    #[must_use]
    pub const fn is_replicated(&self) -> bool {
        match self {
            Event::PieceAdded { direct, .. } | Event::PieceRemoved { direct, .. } => !*direct,
            Event::CommandRejected { .. } => false,
            _ => true,
        }
    }
}

/// Reasons a command may be rejected by the game object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The requested phase transition is not permitted.
    InvalidTransition {
        /// Current phase.
        from: GamePhase,
        /// Requested phase.
        to: GamePhase,
    },
    /// The command is not permitted in the current phase.
    WrongPhase {
        /// Phase the game object was in.
        phase: GamePhase,
    },
    /// A piece with the same identifier already exists.
    DuplicatePiece(PieceId),
    /// The referenced piece does not exist.
    UnknownPiece(PieceId),
    /// The referenced player is not seated.
    UnknownPlayer(PlayerIndex),
    /// The cell lies outside the board.
    OutOfBounds(Cell),
    /// The cell is blocked or occupied.
    Occupied(Cell),
    /// The piece is dead and cannot act.
    PieceDead(PieceId),
    /// The piece is alive and cannot be respawned.
    PieceAlive(PieceId),
    /// The piece does not support the requested change.
    Unsupported(PieceId),
}
