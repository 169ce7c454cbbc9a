//! End-of-game results.

use std::fmt;

use serde::Serialize;

use bang_howdy_core::{PlayerIndex, PlayerRecord, StatType};
use bang_howdy_system_scenario::Session;
use bang_howdy_world::query;

/// Final standings of a finished game.
#[derive(Debug, Serialize)]
pub(crate) struct GameReport {
    scenario: String,
    rounds: usize,
    players: Vec<PlayerReport>,
}

#[derive(Debug, Serialize)]
struct PlayerReport {
    points: i32,
    earnings: Vec<i32>,
    record: PlayerRecord,
}

impl GameReport {
    pub(crate) fn collect(session: &Session) -> Self {
        let world = session.world();
        let earnings = query::per_round_earnings(world);
        let players = session
            .records()
            .iter()
            .enumerate()
            .map(|(index, record)| PlayerReport {
                points: query::points(world, PlayerIndex::new(index)),
                earnings: earnings
                    .iter()
                    .map(|round| round.get(index).copied().unwrap_or(0))
                    .collect(),
                record: record.clone(),
            })
            .collect();
        Self {
            scenario: session.scenario().scenario_type().to_string(),
            rounds: query::rounds_started(world),
            players,
        }
    }
}

impl fmt::Display for GameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} after {} rounds", self.scenario, self.rounds)?;
        let mut standings: Vec<&PlayerReport> = self.players.iter().collect();
        standings.sort_by_key(|player| std::cmp::Reverse(player.points));
        for (place, player) in standings.into_iter().enumerate() {
            writeln!(
                f,
                "{:>2}. {:<12} {:>6} pts  rounds {:?}  kills {}  losses {}",
                place + 1,
                player.record.name,
                player.points,
                player.earnings,
                player.record.get(StatType::UnitsKilled),
                player.record.get(StatType::UnitsLost),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> GameReport {
        let mut ace = PlayerRecord::new("ace");
        ace.accumulate(StatType::UnitsKilled, 3);
        GameReport {
            scenario: "sa".to_owned(),
            rounds: 2,
            players: vec![
                PlayerReport {
                    points: 40,
                    earnings: vec![10, 30],
                    record: PlayerRecord::new("deuce"),
                },
                PlayerReport {
                    points: 120,
                    earnings: vec![100, 20],
                    record: ace,
                },
            ],
        }
    }

    #[test]
    fn standings_list_the_leader_first() {
        let text = report().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "sa after 2 rounds");
        assert!(lines[1].contains("ace") && lines[1].contains("kills 3"));
        assert!(lines[2].contains("deuce"));
    }

    #[test]
    fn json_report_keeps_seat_order() {
        let json = serde_json::to_value(report()).expect("serializable");
        assert_eq!(json["players"][0]["record"]["name"], "deuce");
        assert_eq!(json["players"][1]["points"], 120);
        assert_eq!(json["players"][1]["record"]["stats"]["UnitsKilled"], 3);
    }
}
