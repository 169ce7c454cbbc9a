//! State handed to every scenario and delegate hook.

use rand_chacha::ChaCha8Rng;

use bang_howdy_core::{
    Cell, Command, GameConfig, Piece, PieceId, PieceKind, PlayerIndex, StatType, Tick,
};
use bang_howdy_world::{query, BangObject};

/// Allocates piece identifiers that never collide with pieces in play.
#[derive(Clone, Copy, Debug)]
pub struct PieceIds {
    next: PieceId,
}

impl Default for PieceIds {
    fn default() -> Self {
        Self {
            next: PieceId::new(1),
        }
    }
}

impl PieceIds {
    /// Creates an allocator starting at the first identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skips past every identifier used by the game object.
    pub fn sync(&mut self, world: &BangObject) {
        let floor = query::next_piece_id(world);
        if floor > self.next {
            self.next = floor;
        }
    }

    /// Hands out the next unused identifier.
    pub fn allocate(&mut self) -> PieceId {
        let id = self.next;
        self.next = id.next();
        id
    }
}

/// Read access to the game object plus the sinks scenario hooks write into.
///
/// Hooks never mutate the game object. Everything they want changed is pushed
/// to `out` and applied by the caller once the hook returns.
#[derive(Debug)]
pub struct ScenarioContext<'a> {
    /// Game object as of the start of the hook.
    pub world: &'a BangObject,
    /// Game configuration.
    pub config: &'a GameConfig,
    /// Tick being simulated.
    pub tick: Tick,
    /// Identifier allocator for new pieces.
    pub ids: &'a mut PieceIds,
    /// Scenario random source.
    pub rng: &'a mut ChaCha8Rng,
    /// Commands produced by the hook.
    pub out: &'a mut Vec<Command>,
}

impl ScenarioContext<'_> {
    /// Queues a command.
    pub fn push(&mut self, command: Command) {
        self.out.push(command);
    }

    /// Queues a new replicated piece and returns its identifier.
    pub fn add_piece(&mut self, kind: PieceKind, owner: Option<PlayerIndex>, cell: Cell) -> PieceId {
        let piece = Piece::new(self.ids.allocate(), kind, owner, cell);
        self.out.push(Command::AddPiece { piece });
        piece.id
    }

    /// Queues a point grant.
    pub fn grant(&mut self, player: PlayerIndex, amount: i32) {
        if amount != 0 {
            self.out.push(Command::GrantPoints { player, amount });
        }
    }

    /// Queues a statistic increment.
    pub fn stat(&mut self, player: PlayerIndex, stat: StatType, amount: i64) {
        if amount != 0 {
            self.out.push(Command::IncrementStat {
                player,
                stat,
                amount,
            });
        }
    }

    /// Cells of blocking pieces queued for addition but not yet applied.
    #[must_use]
    pub fn queued_blockers(&self) -> Vec<Cell> {
        self.out
            .iter()
            .filter_map(|command| match command {
                Command::AddPiece { piece } | Command::AddPieceDirect { piece } if piece.blocks() => {
                    Some(piece.cell)
                }
                _ => None,
            })
            .collect()
    }
}
