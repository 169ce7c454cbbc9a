//! Per-round statistics and the persistent player record they feed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Statistics tracked per player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatType {
    /// Enemy units destroyed.
    UnitsKilled,
    /// Own units destroyed.
    UnitsLost,
    /// Points earned over the round.
    PointsEarned,
    /// Bonuses collected from the board.
    BonusesCollected,
    /// Nuggets deposited into a claim.
    NuggetsClaimed,
    /// Nuggets taken from an enemy claim.
    NuggetsStolen,
    /// Homesteads claimed.
    StakesClaimed,
    /// Units that lived through a wendigo attack.
    WendigoSurvivals,
    /// Units saved by a talisman or sacred ground.
    TalismanSaves,
    /// Times the player lost every unit in a shootout.
    Knockouts,
    /// Units returned to play after dying.
    Respawns,
    /// Rounds completed.
    RoundsPlayed,
    /// Milliseconds spent in play.
    GameTimeMs,
}

impl StatType {
    /// Every statistic, in code order.
    pub const ALL: [StatType; 13] = [
        StatType::UnitsKilled,
        StatType::UnitsLost,
        StatType::PointsEarned,
        StatType::BonusesCollected,
        StatType::NuggetsClaimed,
        StatType::NuggetsStolen,
        StatType::StakesClaimed,
        StatType::WendigoSurvivals,
        StatType::TalismanSaves,
        StatType::Knockouts,
        StatType::Respawns,
        StatType::RoundsPlayed,
        StatType::GameTimeMs,
    ];

    /// Stable numeric code used when persisting the statistic.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            StatType::UnitsKilled => 1,
            StatType::UnitsLost => 2,
            StatType::PointsEarned => 3,
            StatType::BonusesCollected => 4,
            StatType::NuggetsClaimed => 5,
            StatType::NuggetsStolen => 6,
            StatType::StakesClaimed => 7,
            StatType::WendigoSurvivals => 8,
            StatType::TalismanSaves => 9,
            StatType::Knockouts => 10,
            StatType::Respawns => 11,
            StatType::RoundsPlayed => 12,
            StatType::GameTimeMs => 13,
        }
    }

    /// Resolves a persisted code back into a statistic.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|stat| stat.code() == code)
    }
}

/// Round statistics accumulated for one player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSet {
    values: BTreeMap<StatType, i64>,
}

impl StatSet {
    /// Creates an empty statistic set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a statistic, zero when never recorded.
    #[must_use]
    pub fn get(&self, stat: StatType) -> i64 {
        self.values.get(&stat).copied().unwrap_or(0)
    }

    /// Adds `amount` to a statistic and returns the new value.
    pub fn increment(&mut self, stat: StatType, amount: i64) -> i64 {
        let value = self.values.entry(stat).or_insert(0);
        *value = value.saturating_add(amount);
        *value
    }

    /// Iterator over all recorded statistics in code order.
    pub fn iter(&self) -> impl Iterator<Item = (StatType, i64)> + '_ {
        self.values.iter().map(|(stat, value)| (*stat, *value))
    }

    /// Discards every recorded value.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Long-lived statistics of a player persisted across games.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Display name of the player.
    pub name: String,
    stats: BTreeMap<StatType, i64>,
}

impl PlayerRecord {
    /// Creates an empty record for the named player.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: BTreeMap::new(),
        }
    }

    /// Accumulated value of a statistic.
    #[must_use]
    pub fn get(&self, stat: StatType) -> i64 {
        self.stats.get(&stat).copied().unwrap_or(0)
    }

    /// Adds `amount` to a persistent statistic.
    pub fn accumulate(&mut self, stat: StatType, amount: i64) {
        if amount == 0 {
            return;
        }
        let value = self.stats.entry(stat).or_insert(0);
        *value = value.saturating_add(amount);
    }

    /// Folds every value of a round statistic set into the record.
    pub fn accumulate_set(&mut self, set: &StatSet) {
        for (stat, value) in set.iter() {
            self.accumulate(stat, value);
        }
    }
}
