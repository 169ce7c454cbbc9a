use bang_howdy_core::{
    Cell, Command, Event, GamePhase, Piece, PieceId, PieceKind, PlayerIndex, Tick, UnitState,
    UnitTypeId,
};
use bang_howdy_system_respawn::{Config, RespawnDelegate};
use bang_howdy_world::{self as world, query, BangObject, Board};

const GUNSLINGER: UnitTypeId = UnitTypeId::new(1);
const REVOLUTIONARY: UnitTypeId = UnitTypeId::new(4);

struct Harness {
    world: BangObject,
    respawn: RespawnDelegate,
    ticked: bool,
}

impl Harness {
    fn new(config: Config) -> Self {
        let mut world = BangObject::new(Board::new(8, 8), 2);
        let mut events = Vec::new();
        for command in [
            Command::SetPhase {
                phase: GamePhase::SelectPhase,
            },
            Command::SetPhase {
                phase: GamePhase::BuyingPhase,
            },
            Command::StartRound { duration: 100 },
            Command::SetPhase {
                phase: GamePhase::InPlay,
            },
        ] {
            world::apply(&mut world, command, &mut events);
        }
        let mut respawn = RespawnDelegate::new(config);
        respawn.round_will_start();
        Self {
            world,
            respawn,
            ticked: false,
        }
    }

    fn add(&mut self, piece: Piece) {
        let events = self.apply(Command::AddPiece { piece });
        assert!(
            matches!(events.as_slice(), [Event::PieceAdded { .. }]),
            "failed to add {piece:?}: {events:?}"
        );
    }

    fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        let tick = query::tick(&self.world);
        for event in &events {
            match event {
                Event::PieceKilled { piece, .. } => self.respawn.piece_was_killed(piece, tick),
                Event::PieceAffected { piece, effect } => {
                    self.respawn.piece_affected(*piece, *effect)
                }
                _ => {}
            }
        }
        events
    }

    fn advance(&mut self) -> Tick {
        let _ = self.apply(Command::AdvanceTick);
        self.ticked = true;
        let tick = query::tick(&self.world);
        let mut commands = Vec::new();
        self.respawn.tick(&self.world, tick, &mut commands);
        for command in commands {
            let _ = self.apply(command);
        }
        tick
    }

    fn advance_to(&mut self, target: Tick) {
        if !self.ticked {
            let _ = self.advance();
        }
        while query::tick(&self.world) < target {
            let _ = self.advance();
        }
    }

    fn kill(&mut self, piece: u32) {
        let events = self.apply(Command::DamagePiece {
            piece: PieceId::new(piece),
            amount: 100,
            shooter: None,
        });
        assert!(
            events
                .iter()
                .any(|event| matches!(event, Event::PieceKilled { .. })),
            "piece {piece} should have died"
        );
    }

    fn alive(&self, piece: u32) -> bool {
        query::piece(&self.world, PieceId::new(piece)).is_some_and(Piece::is_alive)
    }

    fn cell(&self, piece: u32) -> Option<Cell> {
        query::piece(&self.world, PieceId::new(piece)).map(|piece| piece.cell)
    }
}

fn unit(id: u32, owner: usize, unit_type: UnitTypeId, cell: Cell, start: Cell) -> Piece {
    Piece::new(
        PieceId::new(id),
        PieceKind::Unit(UnitState {
            unit_type,
            holding: None,
            start_cell: start,
        }),
        Some(PlayerIndex::new(owner)),
        cell,
    )
}

fn prop(id: u32, cell: Cell) -> Piece {
    Piece::new(PieceId::new(id), PieceKind::Prop, None, cell)
}

#[test]
fn killed_unit_returns_exactly_after_the_delay() {
    let start = Cell::new(1, 1);
    let mut harness = Harness::new(Config::new(4));
    harness.add(unit(1, 0, GUNSLINGER, Cell::new(5, 5), start));
    harness.add(prop(2, start));

    harness.advance_to(5);
    harness.kill(1);
    assert_eq!(harness.respawn.respawn_tick(PieceId::new(1)), Some(9));

    for expected in 6..9 {
        assert_eq!(harness.advance(), expected);
        assert!(!harness.alive(1), "unit respawned early on tick {expected}");
    }
    assert_eq!(harness.advance(), 9);
    assert!(harness.alive(1));

    let cell = harness.cell(1).expect("unit must still exist");
    assert_ne!(cell, start, "start marker cell is blocked by a prop");
    assert!(cell.chebyshev_distance(start) <= 3);
    assert_eq!(harness.respawn.pending().count(), 0);
}

#[test]
fn unit_without_room_is_requeued_rather_than_lost() {
    let start = Cell::new(0, 0);
    let mut harness = Harness::new(Config::new(3).with_search_radius(1));
    harness.add(unit(1, 0, GUNSLINGER, Cell::new(4, 4), start));
    let blockers = [
        (10, Cell::new(0, 0)),
        (11, Cell::new(1, 0)),
        (12, Cell::new(0, 1)),
        (13, Cell::new(1, 1)),
    ];
    for (id, cell) in blockers {
        harness.add(prop(id, cell));
    }

    harness.advance_to(2);
    harness.kill(1);
    harness.advance_to(5);
    assert!(!harness.alive(1));
    assert_eq!(harness.respawn.respawn_tick(PieceId::new(1)), Some(8));

    let _ = harness.apply(Command::RemovePiece {
        piece: PieceId::new(13),
    });
    harness.advance_to(7);
    assert!(!harness.alive(1), "retry waits for the full delay");
    harness.advance_to(8);
    assert!(harness.alive(1));
    assert_eq!(harness.cell(1), Some(Cell::new(1, 1)));
}

#[test]
fn fallen_leader_pulls_team_respawns_forward() {
    let red_start = Cell::new(1, 1);
    let blue_start = Cell::new(6, 6);
    let config = Config::new(10).with_leader(REVOLUTIONARY);
    let mut harness = Harness::new(config);
    harness.add(unit(1, 0, GUNSLINGER, Cell::new(2, 3), red_start));
    harness.add(unit(2, 0, GUNSLINGER, Cell::new(3, 3), red_start));
    harness.add(unit(3, 0, REVOLUTIONARY, Cell::new(4, 3), red_start));
    harness.add(unit(4, 1, GUNSLINGER, Cell::new(5, 3), blue_start));

    harness.advance_to(2);
    harness.kill(1);
    harness.advance_to(3);
    harness.kill(2);
    harness.advance_to(4);
    harness.kill(4);
    harness.advance_to(5);
    harness.kill(3);

    assert_eq!(harness.respawn.respawn_tick(PieceId::new(1)), Some(5));
    assert_eq!(harness.respawn.respawn_tick(PieceId::new(2)), Some(5));
    assert_eq!(harness.respawn.respawn_tick(PieceId::new(3)), Some(15));
    assert_eq!(harness.respawn.respawn_tick(PieceId::new(4)), Some(14));

    assert_eq!(harness.advance(), 6);
    assert!(harness.alive(1));
    assert!(harness.alive(2));
    assert!(!harness.alive(3));
    assert!(!harness.alive(4));
    assert_ne!(harness.cell(1), harness.cell(2));
}

#[test]
fn resurrection_cancels_the_pending_respawn() {
    let start = Cell::new(1, 1);
    let mut harness = Harness::new(Config::new(5));
    harness.add(unit(1, 0, GUNSLINGER, Cell::new(3, 3), start));

    harness.advance_to(1);
    harness.kill(1);
    assert!(harness.respawn.respawn_tick(PieceId::new(1)).is_some());

    let _ = harness.apply(Command::ResurrectPiece {
        piece: PieceId::new(1),
    });
    assert!(harness.alive(1));
    assert_eq!(harness.respawn.respawn_tick(PieceId::new(1)), None);

    harness.advance_to(8);
    assert_eq!(harness.cell(1), Some(Cell::new(3, 3)), "unit stays where it was raised");
}
