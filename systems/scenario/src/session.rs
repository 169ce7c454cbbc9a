//! Drives one game: phases, round starts, ticks and round ends.

use std::{sync::Arc, time::Duration};

use log::{info, warn};

use bang_howdy_core::{
    Command, Event, GameConfig, GamePhase, Piece, PlayerIndex, PlayerRecord, Tick,
};
use bang_howdy_world::{apply, query, BangObject, Board, Replicator, Subscriber};

use crate::{
    ai::{AiLogic, AiProfile},
    error::{ScenarioError, SessionError},
    markers::Purchase,
    scenario::Scenario,
    scenarios::{ScenarioType, TickOutcome},
};

/// Reaction passes applied after a batch before remaining commands are dropped.
const MAX_REACTION_PASSES: usize = 16;

/// Result of one simulated tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Tick that was simulated.
    pub tick: Tick,
    /// Whether the round ended on this tick.
    pub round_over: bool,
}

/// Authoritative host of one game session.
///
/// Owns the game object, the scenario and the computer players, and is the
/// only code that applies commands. Every applied batch is forwarded to the
/// subscribers and fed back to the scenario until no reactions remain.
#[derive(Debug)]
pub struct Session {
    world: BangObject,
    scenario: Scenario,
    replicator: Replicator,
    board_pieces: Vec<Piece>,
    config: Arc<GameConfig>,
    ai: Vec<(PlayerIndex, Box<dyn AiLogic>)>,
    records: Vec<PlayerRecord>,
    ticks_run: u64,
}

impl Session {
    /// Seats the named players on the board and prepares the scenario.
    pub fn new<I, S>(
        config: Arc<GameConfig>,
        board: Board,
        board_pieces: Vec<Piece>,
        players: I,
        scenario: ScenarioType,
    ) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        config.validate()?;
        let records: Vec<PlayerRecord> = players.into_iter().map(PlayerRecord::new).collect();
        let world = BangObject::new(board, records.len());
        let mut scenario = Scenario::new(scenario, Arc::clone(&config));
        scenario.init(&world, &board_pieces)?;
        Ok(Self {
            world,
            scenario,
            replicator: Replicator::new(),
            board_pieces,
            config,
            ai: Vec::new(),
            records,
            ticks_run: 0,
        })
    }

    /// Authoritative game object.
    #[must_use]
    pub fn world(&self) -> &BangObject {
        &self.world
    }

    /// Scenario being played.
    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Persistent records of every seated player.
    #[must_use]
    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    /// Registers a remote observer of replicated events.
    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) {
        self.replicator.subscribe(subscriber);
    }

    /// Hands control of a player to the computer.
    pub fn add_ai(&mut self, player: PlayerIndex, profile: AiProfile) {
        let logic = self.scenario.create_ai_logic(profile);
        self.ai.push((player, logic));
    }

    /// Moves through the buying phase and starts the next round.
    ///
    /// The round is assembled on a copy of the game object. If the scenario
    /// rejects it, the copy is discarded and the game returns to the select
    /// phase with its pieces untouched.
    pub fn start_round(&mut self, purchases: &[Purchase]) -> Result<(), SessionError> {
        let phase = query::phase(&self.world);
        let practice = self.scenario.scenario_type() == ScenarioType::Practice;
        let entry = match phase {
            GamePhase::GameOver => return Err(SessionError::GameOver),
            GamePhase::PreGame | GamePhase::PostRound if practice => vec![GamePhase::PrePractice],
            GamePhase::PreGame | GamePhase::PostRound => {
                vec![GamePhase::SelectPhase, GamePhase::BuyingPhase]
            }
            GamePhase::PrePractice if practice => Vec::new(),
            GamePhase::SelectPhase if !practice => vec![GamePhase::BuyingPhase],
            _ => return Err(SessionError::WrongPhase { phase }),
        };
        let mut events = Vec::new();
        self.run(
            entry.into_iter().map(|phase| Command::SetPhase { phase }).collect(),
            &mut events,
        );

        let mut staged = self.world.clone();
        let mut staged_events = Vec::new();
        apply(
            &mut staged,
            Command::StartRound {
                duration: self.config.round.duration,
            },
            &mut staged_events,
        );
        for piece in self.scenario.filter_pieces(&self.board_pieces) {
            apply(&mut staged, Command::AddPieceDirect { piece }, &mut staged_events);
        }

        let mut commands = Vec::new();
        if let Err(error) = self.scenario.round_will_start(&staged, purchases, &mut commands) {
            warn!("round could not start: {error}");
            if !practice {
                self.run(
                    vec![Command::SetPhase {
                        phase: GamePhase::SelectPhase,
                    }],
                    &mut events,
                );
            }
            return Err(error.into());
        }

        commands.push(Command::SetPhase {
            phase: GamePhase::InPlay,
        });
        for command in commands {
            apply(&mut staged, command, &mut staged_events);
        }
        for event in &staged_events {
            if let Event::CommandRejected { reason } = event {
                warn!("round setup command rejected: {reason:?}");
            }
        }
        self.world = staged;
        self.replicator.forward(&staged_events);
        self.ticks_run = 0;
        info!(
            "round {} of {} in play until tick {}",
            query::round(&self.world) + 1,
            self.config.round.rounds,
            query::last_tick(&self.world)
        );
        Ok(())
    }

    /// Simulates one tick: the scenario first, then the computer players.
    ///
    /// Ends the round when the scenario asks for it or the last tick is reached.
    pub fn tick(&mut self) -> Result<TickReport, SessionError> {
        let phase = query::phase(&self.world);
        if phase != GamePhase::InPlay {
            return Err(SessionError::WrongPhase { phase });
        }
        let mut events = Vec::new();
        self.run(vec![Command::AdvanceTick], &mut events);
        self.ticks_run += 1;
        let tick = query::tick(&self.world);

        let mut commands = Vec::new();
        let outcome = self.scenario.tick(&self.world, &mut commands)?;
        self.run(commands, &mut events);

        let mut orders = Vec::new();
        for (player, logic) in &mut self.ai {
            logic.tick(&self.world, *player, &mut orders);
        }
        for order in orders {
            if query::phase(&self.world) != GamePhase::InPlay {
                break;
            }
            self.run(vec![order], &mut events);
        }

        let round_over = outcome == TickOutcome::EndRound || tick >= query::last_tick(&self.world);
        if round_over {
            self.end_round()?;
        }
        Ok(TickReport { tick, round_over })
    }

    /// Applies externally submitted commands during play.
    pub fn submit(&mut self, commands: Vec<Command>) -> Result<Vec<Event>, SessionError> {
        let phase = query::phase(&self.world);
        if phase != GamePhase::InPlay {
            return Err(SessionError::WrongPhase { phase });
        }
        let mut events = Vec::new();
        for command in commands {
            self.run(vec![command], &mut events);
        }
        Ok(events)
    }

    /// Scores the round, records statistics and moves to the post-round phase.
    ///
    /// After the configured number of rounds the game is over.
    pub fn end_round(&mut self) -> Result<(), SessionError> {
        let mut commands = Vec::new();
        self.scenario.round_did_end(&self.world, &mut commands)?;
        let mut events = Vec::new();
        self.run(commands, &mut events);
        self.run(vec![Command::EndRound], &mut events);

        let game_time = Duration::from_millis(self.ticks_run.saturating_mul(self.config.round.tick_millis));
        for (index, record) in self.records.iter_mut().enumerate() {
            self.scenario
                .record_stats(&self.world, PlayerIndex::new(index), game_time, record);
        }

        info!(
            "round {} over, points {:?}",
            query::round(&self.world) + 1,
            query::all_points(&self.world)
        );
        if query::rounds_started(&self.world) >= self.config.round.rounds {
            self.run(
                vec![Command::SetPhase {
                    phase: GamePhase::GameOver,
                }],
                &mut events,
            );
            info!("game over");
        }
        Ok(())
    }

    /// Applies a batch, then the scenario's reactions to it, pass after pass.
    fn run(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        let mut pending = commands;
        for _ in 0..MAX_REACTION_PASSES {
            if pending.is_empty() {
                return;
            }
            let start = events.len();
            self.replicator
                .submit(&mut self.world, std::mem::take(&mut pending), events);
            self.scenario
                .handle_events(&self.world, &events[start..], &mut pending);
        }
        if !pending.is_empty() {
            warn!(
                "dropping {} commands after {MAX_REACTION_PASSES} reaction passes",
                pending.len()
            );
        }
    }
}
