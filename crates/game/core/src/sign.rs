//! Signs and round outcomes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// One of the three signs a combatant can reveal.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum Sign {
    Rock,
    Paper,
    Scissors,
}

impl Sign {
    /// Number of distinct signs.
    pub const COUNT: usize = 3;

    /// The sign this sign defeats.
    pub fn beats(self) -> Sign {
        match self {
            Sign::Rock => Sign::Scissors,
            Sign::Paper => Sign::Rock,
            Sign::Scissors => Sign::Paper,
        }
    }

    /// The sign that defeats this sign.
    pub fn beaten_by(self) -> Sign {
        match self {
            Sign::Rock => Sign::Paper,
            Sign::Paper => Sign::Scissors,
            Sign::Scissors => Sign::Rock,
        }
    }

    /// Stable index used for seed mixing and per-sign tables.
    pub fn index(self) -> usize {
        match self {
            Sign::Rock => 0,
            Sign::Paper => 1,
            Sign::Scissors => 2,
        }
    }

    /// Map a small roll onto a sign (used by random choice strategies).
    pub fn from_roll(roll: u32) -> Sign {
        match roll % 3 {
            0 => Sign::Rock,
            1 => Sign::Paper,
            _ => Sign::Scissors,
        }
    }
}

/// Result of one reveal, always from the player's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum RoundOutcome {
    Win,
    Draw,
    Lose,
}

impl RoundOutcome {
    /// Judge a pair of revealed signs.
    ///
    /// Same sign is a draw; otherwise Rock beats Scissors, Paper beats Rock,
    /// Scissors beats Paper.
    pub fn judge(player: Sign, opponent: Sign) -> RoundOutcome {
        if player == opponent {
            RoundOutcome::Draw
        } else if player.beats() == opponent {
            RoundOutcome::Win
        } else {
            RoundOutcome::Lose
        }
    }

    /// Flip the perspective.
    pub fn invert(self) -> RoundOutcome {
        match self {
            RoundOutcome::Win => RoundOutcome::Lose,
            RoundOutcome::Draw => RoundOutcome::Draw,
            RoundOutcome::Lose => RoundOutcome::Win,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn outcome_table_is_fixed() {
        assert_eq!(RoundOutcome::judge(Sign::Rock, Sign::Scissors), RoundOutcome::Win);
        assert_eq!(RoundOutcome::judge(Sign::Paper, Sign::Rock), RoundOutcome::Win);
        assert_eq!(RoundOutcome::judge(Sign::Scissors, Sign::Paper), RoundOutcome::Win);

        for sign in Sign::iter() {
            assert_eq!(RoundOutcome::judge(sign, sign), RoundOutcome::Draw);
        }

        // Symmetric reverses lose.
        assert_eq!(RoundOutcome::judge(Sign::Scissors, Sign::Rock), RoundOutcome::Lose);
        assert_eq!(RoundOutcome::judge(Sign::Rock, Sign::Paper), RoundOutcome::Lose);
        assert_eq!(RoundOutcome::judge(Sign::Paper, Sign::Scissors), RoundOutcome::Lose);
    }

    #[test]
    fn beats_and_beaten_by_are_inverse() {
        for sign in Sign::iter() {
            assert_eq!(sign.beats().beaten_by(), sign);
            assert_eq!(sign.beaten_by().beats(), sign);
        }
    }
}
