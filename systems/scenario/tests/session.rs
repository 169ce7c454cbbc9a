use std::{cell::RefCell, collections::BTreeSet, rc::Rc, sync::Arc};

use bang_howdy_core::{
    Cell, Command, ConfigError, Event, GameConfig, GamePhase, Holding, MarkerKind, Piece,
    PieceId, PieceKind, PlayerIndex, StatType, UnitTypeId, WendigoConfig,
};
use bang_howdy_system_scenario::{
    scenarios::{
        Axis, POINTS_PER_RANK, POINTS_PER_SAFE_ZONE_STEP, POINTS_PER_STEAD, POINTS_PER_SURVIVAL,
        SAFE_ZONE_REACH, TALISMAN_SURVIVAL_BONUS,
    },
    AiProfile, Purchase, ScenarioError, ScenarioType, Session, SessionError, POINTS_PER_KILL,
};
use bang_howdy_world::{query, Board, EventLog, Subscriber};

const GUNSLINGER: UnitTypeId = UnitTypeId::new(1);

#[derive(Clone, Default)]
struct SharedLog(Rc<RefCell<EventLog>>);

impl Subscriber for SharedLog {
    fn receive(&mut self, event: &Event) {
        self.0.borrow_mut().receive(event);
    }
}

fn config(duration: u16, rounds: usize) -> Arc<GameConfig> {
    let mut config = GameConfig::default();
    config.round.duration = duration;
    config.round.rounds = rounds;
    config.round.bonus_interval = 0;
    Arc::new(config)
}

fn marker(id: u32, kind: MarkerKind, x: i32, y: i32) -> Piece {
    Piece::new(PieceId::new(id), PieceKind::Marker(kind), None, Cell::new(x, y))
}

fn piece(id: u32, kind: PieceKind, x: i32, y: i32) -> Piece {
    Piece::new(PieceId::new(id), kind, None, Cell::new(x, y))
}

fn claims_board() -> Vec<Piece> {
    vec![
        marker(1, MarkerKind::Start, 1, 1),
        marker(2, MarkerKind::Start, 8, 8),
        piece(3, PieceKind::Claim { nuggets: 0 }, 1, 3),
        piece(4, PieceKind::Claim { nuggets: 0 }, 8, 6),
    ]
}

fn one_each(players: usize) -> Vec<Purchase> {
    (0..players)
        .map(|player| Purchase::new(PlayerIndex::new(player), GUNSLINGER))
        .collect()
}

fn session(
    config: Arc<GameConfig>,
    pieces: Vec<Piece>,
    players: usize,
    scenario: ScenarioType,
) -> Session {
    let names: Vec<String> = (0..players).map(|player| format!("player{player}")).collect();
    Session::new(config, Board::new(10, 10), pieces, names, scenario).expect("session")
}

fn unit_of(session: &Session, player: usize) -> PieceId {
    query::pieces(session.world())
        .units_of(PlayerIndex::new(player))
        .map(|unit| unit.id)
        .next()
        .expect("player has a unit")
}

fn move_to(session: &mut Session, piece: PieceId, x: i32, y: i32) -> Vec<Event> {
    let events = session
        .submit(vec![Command::MovePiece {
            piece,
            to: Cell::new(x, y),
        }])
        .expect("in play");
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::CommandRejected { .. })),
        "move of {piece:?} rejected: {events:?}"
    );
    events
}

fn tick_until(session: &mut Session, target: u16) {
    loop {
        let report = session.tick().expect("tick");
        assert!(!report.round_over, "round ended before tick {target}");
        if report.tick >= target {
            return;
        }
    }
}

fn nuggets(session: &Session, claim: u32) -> Option<u32> {
    query::piece(session.world(), PieceId::new(claim)).and_then(Piece::count)
}

fn stat(session: &Session, player: usize, stat: StatType) -> i64 {
    query::stats(session.world(), PlayerIndex::new(player)).map_or(0, |stats| stats.get(stat))
}

#[test]
fn emptied_claim_shortens_the_round_until_refilled() {
    let mut session = session(config(100, 3), claims_board(), 2, ScenarioType::ClaimJumping);
    session.start_round(&one_each(2)).expect("round starts");
    assert_eq!(nuggets(&session, 3), Some(2));
    assert_eq!(nuggets(&session, 4), Some(2));
    assert_eq!(query::last_tick(session.world()), 99);

    tick_until(&mut session, 4);
    let robber = unit_of(&session, 1);
    let _ = move_to(&mut session, robber, 2, 3);
    let _ = move_to(&mut session, robber, 8, 7);
    assert_eq!(nuggets(&session, 4), Some(3));
    let _ = move_to(&mut session, robber, 2, 3);
    assert_eq!(nuggets(&session, 3), Some(0));
    assert_eq!(stat(&session, 1, StatType::NuggetsStolen), 2);
    assert_eq!(query::last_tick(session.world()), 4 + 28);

    let owner = unit_of(&session, 0);
    let _ = move_to(&mut session, owner, 7, 6);
    let _ = move_to(&mut session, owner, 1, 2);
    assert_eq!(nuggets(&session, 3), Some(1));
    assert_eq!(query::last_tick(session.world()), 99);

    session.end_round().expect("round ends");
    assert_eq!(query::all_points(session.world()), &[50, 100]);
    assert_eq!(query::phase(session.world()), GamePhase::PostRound);
}

#[test]
fn ending_a_round_twice_is_an_error() {
    let mut session = session(config(100, 3), claims_board(), 2, ScenarioType::ClaimJumping);
    session.start_round(&one_each(2)).expect("round starts");
    session.end_round().expect("round ends");
    let points = query::all_points(session.world()).to_vec();
    let error = session.end_round().expect_err("already ended");
    assert!(matches!(
        error,
        SessionError::Scenario(ScenarioError::RoundAlreadyEnded { round: 0 })
    ));
    assert_eq!(query::all_points(session.world()), points.as_slice());
}

#[test]
fn claims_without_start_markers_abort_the_round() {
    let mut pieces = claims_board();
    pieces.push(piece(5, PieceKind::Claim { nuggets: 0 }, 5, 5));
    let mut session = session(config(100, 3), pieces, 2, ScenarioType::ClaimJumping);

    let error = session.start_round(&one_each(2)).expect_err("claim left over");
    let SessionError::Scenario(error) = error else {
        panic!("unexpected error {error:?}");
    };
    assert_eq!(
        error,
        ScenarioError::Config(ConfigError::UnassignedClaim {
            cell: Cell::new(5, 5)
        })
    );
    assert_eq!(error.user_message(), "no start marker for claim at (5, 5)");
    assert_eq!(query::phase(session.world()), GamePhase::SelectPhase);
    assert!(query::pieces(session.world()).is_empty());
    assert_eq!(query::rounds_started(session.world()), 0);
}

#[test]
fn missing_start_marker_is_reported_for_the_seat() {
    let pieces = vec![
        marker(1, MarkerKind::Start, 1, 1),
        marker(2, MarkerKind::Start, 8, 8),
    ];
    let mut session = session(config(100, 3), pieces, 3, ScenarioType::Shootout);
    let error = session.start_round(&one_each(3)).expect_err("seat without start");
    assert!(matches!(
        error,
        SessionError::Scenario(ScenarioError::Config(ConfigError::MissingStartMarker { player }))
            if player == PlayerIndex::new(2)
    ));
}

#[test]
fn rejected_round_leaves_the_previous_board_untouched() {
    let mut session = session(config(100, 3), claims_board(), 2, ScenarioType::ClaimJumping);
    session.start_round(&one_each(2)).expect("first round");
    tick_until(&mut session, 2);
    session.end_round().expect("first round ends");
    let before: Vec<Piece> = query::pieces(session.world()).iter().copied().collect();

    let bogus = [Purchase::new(PlayerIndex::new(0), UnitTypeId::new(99))];
    let error = session.start_round(&bogus).expect_err("unknown unit type");
    assert!(matches!(
        error,
        SessionError::Scenario(ScenarioError::Config(ConfigError::UnknownUnitType(_)))
    ));
    let after: Vec<Piece> = query::pieces(session.world()).iter().copied().collect();
    assert_eq!(before, after);
    assert_eq!(query::phase(session.world()), GamePhase::SelectPhase);
    assert_eq!(query::rounds_started(session.world()), 1);

    session.start_round(&one_each(2)).expect("second round");
    assert_eq!(query::rounds_started(session.world()), 2);
    assert_eq!(query::phase(session.world()), GamePhase::InPlay);
}

#[test]
fn wendigos_spare_protected_units() {
    let mut config = GameConfig::default();
    config.round.duration = 100;
    config.round.bonus_interval = 0;
    config.wendigo = WendigoConfig {
        min_ticks: 10,
        max_ticks: 10,
        wait: 6,
    };
    let pieces = vec![
        marker(1, MarkerKind::Start, 1, 1),
        marker(2, MarkerKind::Start, 6, 6),
        marker(3, MarkerKind::Talisman, 3, 3),
        marker(4, MarkerKind::SafeZone, 0, 7),
    ];
    let mut session = Session::new(
        Arc::new(config),
        Board::new(8, 8),
        pieces,
        ["warded", "exposed"],
        ScenarioType::WendigoAttack,
    )
    .expect("session");
    session.start_round(&one_each(2)).expect("round starts");
    assert_eq!(session.scenario().next_wave(), Some(10));

    let warded = unit_of(&session, 0);
    let exposed = unit_of(&session, 1);
    tick_until(&mut session, 0);
    let _ = move_to(&mut session, warded, 3, 3);
    assert_eq!(
        query::piece(session.world(), warded).and_then(Piece::holding),
        Some(Holding::Talisman)
    );

    tick_until(&mut session, 10);
    let wave = session.scenario().wave().cloned().expect("wave spawned");
    assert_eq!(wave.spawned(), 10);
    assert_eq!(wave.attack(), 16);
    let lane = wave.lanes()[0];
    let cell = |position: i32| match wave.axis() {
        Axis::Rows => (position, lane),
        Axis::Columns => (lane, position),
    };
    let (x, y) = cell(2);
    let _ = move_to(&mut session, warded, x, y);
    let distance = Cell::new(x, y).chebyshev_distance(Cell::new(0, 7));
    let proximity = i32::try_from(SAFE_ZONE_REACH.saturating_sub(distance)).expect("small")
        * POINTS_PER_SAFE_ZONE_STEP;
    let (x, y) = cell(5);
    let _ = move_to(&mut session, exposed, x, y);

    tick_until(&mut session, 15);
    assert!(session.scenario().wave().is_some());
    tick_until(&mut session, 16);

    let alive = |piece: PieceId| query::piece(session.world(), piece).map(Piece::is_alive);
    assert_eq!(alive(warded), Some(true));
    assert_eq!(alive(exposed), Some(false));
    assert_eq!(
        query::all_points(session.world()),
        &[POINTS_PER_SURVIVAL + TALISMAN_SURVIVAL_BONUS + proximity, 0]
    );
    assert_eq!(stat(&session, 0, StatType::TalismanSaves), 1);
    assert_eq!(stat(&session, 1, StatType::UnitsLost), 1);
    assert!(session.scenario().wave().is_none());
    assert_eq!(session.scenario().next_wave(), Some(26));
    assert!(query::pieces(session.world())
        .iter()
        .all(|piece| piece.kind != PieceKind::Wendigo));
}

#[test]
fn first_wendigo_wave_lands_inside_the_configured_window() {
    for seed in 0..50 {
        let mut config = GameConfig::default();
        config.seed = seed;
        config.round.duration = 100;
        config.round.bonus_interval = 0;
        config.wendigo = WendigoConfig {
            min_ticks: 20,
            max_ticks: 30,
            wait: 5,
        };
        let pieces = vec![
            marker(1, MarkerKind::Start, 1, 1),
            marker(2, MarkerKind::Start, 6, 6),
            marker(3, MarkerKind::SafeZone, 0, 7),
        ];
        let mut session = Session::new(
            Arc::new(config),
            Board::new(8, 8),
            pieces,
            ["first", "second"],
            ScenarioType::WendigoAttack,
        )
        .expect("session");
        session.start_round(&one_each(2)).expect("round starts");

        let due = session.scenario().next_wave().expect("first wave scheduled");
        assert!((20..=30).contains(&due), "seed {seed} scheduled tick {due}");
        tick_until(&mut session, due);
        let wave = session.scenario().wave().cloned().expect("wave spawned");
        assert_eq!(wave.spawned(), due, "seed {seed}");
        assert_eq!(wave.attack(), due + 5, "seed {seed}");
    }
}

#[test]
fn shootout_ranks_teams_by_knockout_order() {
    let pieces = vec![
        marker(1, MarkerKind::Start, 1, 1),
        marker(2, MarkerKind::Start, 8, 1),
        marker(3, MarkerKind::Start, 1, 8),
    ];
    let mut session = session(config(100, 1), pieces, 3, ScenarioType::Shootout);
    session.start_round(&one_each(3)).expect("round starts");
    tick_until(&mut session, 0);

    let shooter = unit_of(&session, 0);
    for victim in [1, 2] {
        let target = unit_of(&session, victim);
        let _ = session
            .submit(vec![Command::DamagePiece {
                piece: target,
                amount: 100,
                shooter: Some(shooter),
            }])
            .expect("in play");
    }
    assert_eq!(
        session.scenario().knockouts(),
        &[PlayerIndex::new(1), PlayerIndex::new(2)]
    );

    let report = session.tick().expect("tick");
    assert!(report.round_over);
    assert_eq!(
        query::all_points(session.world()),
        &[2 * POINTS_PER_RANK + 2 * POINTS_PER_KILL, 0, POINTS_PER_RANK]
    );
    assert_eq!(session.records()[0].get(StatType::Knockouts), 2);
    assert_eq!(session.records()[0].get(StatType::RoundsPlayed), 1);
    assert_eq!(query::phase(session.world()), GamePhase::GameOver);
    assert!(matches!(
        session.start_round(&one_each(3)),
        Err(SessionError::GameOver)
    ));
}

#[test]
fn resurrected_team_keeps_the_shootout_going() {
    let pieces = vec![
        marker(1, MarkerKind::Start, 1, 1),
        marker(2, MarkerKind::Start, 8, 8),
    ];
    let mut session = session(config(100, 1), pieces, 2, ScenarioType::Shootout);
    session.start_round(&one_each(2)).expect("round starts");
    tick_until(&mut session, 0);

    let shooter = unit_of(&session, 0);
    let victim = unit_of(&session, 1);
    let _ = session
        .submit(vec![Command::DamagePiece {
            piece: victim,
            amount: 100,
            shooter: Some(shooter),
        }])
        .expect("in play");
    assert_eq!(session.scenario().knockouts(), &[PlayerIndex::new(1)]);

    let events = session
        .submit(vec![Command::ResurrectPiece { piece: victim }])
        .expect("in play");
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::CommandRejected { .. })));
    assert!(session.scenario().knockouts().is_empty());
    assert_eq!(query::players_with_living_units(session.world()).len(), 2);

    let report = session.tick().expect("tick");
    assert!(!report.round_over);
    assert_eq!(query::last_tick(session.world()), 99);
}

#[test]
fn gold_rush_units_mine_lodes_and_bank_at_home() {
    let mut pieces = claims_board();
    pieces.push(marker(5, MarkerKind::Lode, 5, 5));
    let mut session = session(config(100, 3), pieces, 2, ScenarioType::GoldRush);
    session.start_round(&one_each(2)).expect("round starts");
    assert_eq!(nuggets(&session, 3), Some(0));
    tick_until(&mut session, 1);

    let miner = unit_of(&session, 0);
    let _ = move_to(&mut session, miner, 5, 4);
    let lode = query::pieces(session.world())
        .iter()
        .find(|piece| matches!(piece.kind, PieceKind::Counter { .. }))
        .copied()
        .expect("lode in play");
    assert_eq!(lode.count(), Some(2));
    assert_eq!(stat(&session, 0, StatType::NuggetsStolen), 0);

    let _ = move_to(&mut session, miner, 1, 4);
    assert_eq!(nuggets(&session, 3), Some(1));
    assert_eq!(stat(&session, 0, StatType::NuggetsClaimed), 1);

    session.end_round().expect("round ends");
    assert_eq!(query::all_points(session.world()), &[50, 0]);
}

#[test]
fn homesteads_belong_to_the_last_visitor() {
    let pieces = vec![
        marker(1, MarkerKind::Start, 1, 1),
        marker(2, MarkerKind::Start, 8, 8),
        piece(3, PieceKind::Homestead, 4, 4),
        piece(4, PieceKind::Homestead, 6, 6),
    ];
    let mut session = session(config(100, 3), pieces, 2, ScenarioType::LandGrab);
    session.start_round(&one_each(2)).expect("round starts");
    tick_until(&mut session, 0);

    let first = unit_of(&session, 0);
    let second = unit_of(&session, 1);
    let _ = move_to(&mut session, first, 4, 5);
    let _ = move_to(&mut session, second, 4, 3);
    let _ = move_to(&mut session, first, 6, 5);

    let owner = |id: u32| query::piece(session.world(), PieceId::new(id)).and_then(|stead| stead.owner);
    assert_eq!(owner(3), Some(PlayerIndex::new(1)));
    assert_eq!(owner(4), Some(PlayerIndex::new(0)));
    assert_eq!(stat(&session, 0, StatType::StakesClaimed), 2);
    assert_eq!(stat(&session, 1, StatType::StakesClaimed), 1);

    session.end_round().expect("round ends");
    assert_eq!(
        query::all_points(session.world()),
        &[POINTS_PER_STEAD, POINTS_PER_STEAD]
    );
}

#[test]
fn practice_rounds_only_count_game_time() {
    let pieces = vec![
        marker(1, MarkerKind::Start, 1, 1),
        marker(2, MarkerKind::Start, 8, 8),
    ];
    let mut session = session(config(5, 3), pieces, 2, ScenarioType::Practice);
    session.start_round(&one_each(2)).expect("round starts");
    tick_until(&mut session, 3);
    let report = session.tick().expect("last tick");
    assert!(report.round_over);
    assert_eq!(report.tick, 4);
    assert!(session
        .records()
        .iter()
        .all(|record| record.get(StatType::RoundsPlayed) == 0));
    assert!(session
        .records()
        .iter()
        .all(|record| record.get(StatType::GameTimeMs) == 5 * 1_750));
    assert!(matches!(
        session.submit(Vec::new()),
        Err(SessionError::WrongPhase {
            phase: GamePhase::PostRound
        })
    ));
}

fn play_out(seed: u64) -> (Vec<Event>, Vec<i32>) {
    let mut config = GameConfig::default();
    config.seed = seed;
    config.round.duration = 60;
    config.round.rounds = 2;
    config.round.bonus_interval = 5;
    let mut pieces = claims_board();
    pieces.push(marker(5, MarkerKind::Bonus, 5, 5));
    pieces.push(marker(6, MarkerKind::Bonus, 4, 7));
    let mut session = session(Arc::new(config), pieces, 2, ScenarioType::ClaimJumping);
    let log = SharedLog::default();
    session.subscribe(Box::new(log.clone()));
    session.add_ai(PlayerIndex::new(0), AiProfile::default());
    session.add_ai(PlayerIndex::new(1), AiProfile { aggressive: false });

    let purchases: Vec<Purchase> = one_each(2).into_iter().chain(one_each(2)).collect();
    while query::phase(session.world()) != GamePhase::GameOver {
        session.start_round(&purchases).expect("round starts");
        loop {
            let report = session.tick().expect("tick");
            assert!(query::all_points(session.world()).iter().all(|points| *points >= 0));
            let ids: BTreeSet<PieceId> = query::pieces(session.world()).iter().map(|piece| piece.id).collect();
            assert_eq!(ids.len(), query::pieces(session.world()).len());
            if report.round_over {
                break;
            }
        }
    }
    let events = log.0.borrow().events().to_vec();
    (events, query::all_points(session.world()).to_vec())
}

#[test]
fn identical_seeds_replay_identically() {
    let (first, points) = play_out(7);
    let (second, replayed) = play_out(7);
    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(points, replayed);
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::RoundEnded { round: 1, .. })));
}
