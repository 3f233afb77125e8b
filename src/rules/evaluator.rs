//! Eight-ball adjudication.
//!
//! Rules are checked strictly in this order, first match wins:
//!
//! | # | Condition | Result |
//! |---|-----------|--------|
//! | 1 | eight sunk, open table or opening break | turn passes, re-break |
//! | 2 | eight sunk, closed table | shooter wins if own group was already cleared, else loses |
//! | 3 | white sunk | turn passes, placement region on a closed table |
//! | 4 | open, nothing relevant sunk | turn passes |
//! | 5 | open, as many solids as stripes | turn retained, no group |
//! | 6 | open, more of one group | majority group to the shooter, turn retained |
//! | 7 | closed, own group only | turn retained |
//! | 8 | closed, no own ball or any opponent ball | turn passes |
//!
//! Rule 2 uses the own-group count from *before* the round: sinking the last
//! own ball together with the eight loses.

use serde::{Deserialize, Serialize};

use super::outcome::MatchOutcome;
use super::record::PlayerRecord;
use super::report::Report;
use crate::core::{BallGroup, PlayerId, Region, TableConfig};

/// Which rule decided a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    EightOnOpenTable,
    EightOnClosedTable,
    Scratch,
    OpenNothingSunk,
    OpenUndecided,
    OpenAssigned,
    OwnGroup,
    Foul,
}

impl Rule {
    /// Position in the priority order, 1-based.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::EightOnOpenTable => 1,
            Self::EightOnClosedTable => 2,
            Self::Scratch => 3,
            Self::OpenNothingSunk => 4,
            Self::OpenUndecided => 5,
            Self::OpenAssigned => 6,
            Self::OwnGroup => 7,
            Self::Foul => 8,
        }
    }
}

/// Whether the shooter keeps the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Retained,
    Passed,
}

/// Result of adjudicating one round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundVerdict {
    pub shooter: PlayerId,
    pub rule: Rule,
    pub turn: Turn,
    /// Human-readable audit line naming the rule.
    pub rationale: String,
    pub report: Report,
    /// Group newly assigned to the shooter.
    pub assigned: Option<BallGroup>,
    /// Where the incoming player may place the white ball.
    pub placement: Option<Region>,
    /// The table has to be racked again.
    pub rerack: bool,
    pub outcome: Option<MatchOutcome>,
}

impl RoundVerdict {
    fn new(shooter: PlayerId, rule: Rule, turn: Turn, report: Report, rationale: String) -> Self {
        Self {
            shooter,
            rule,
            turn,
            rationale: format!("rule {}: {rationale}", rule.number()),
            report,
            assigned: None,
            placement: None,
            rerack: false,
            outcome: None,
        }
    }

    /// Who holds the table after this round.
    #[must_use]
    pub fn next_player(&self) -> PlayerId {
        match self.turn {
            Turn::Retained => self.shooter,
            Turn::Passed => self.shooter.other(),
        }
    }
}

/// Adjudication policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleEvaluator {
    placement_region: Region,
}

impl RuleEvaluator {
    #[must_use]
    pub fn new(config: &TableConfig) -> Self {
        Self {
            placement_region: config.placement_region,
        }
    }

    #[must_use]
    pub fn placement_region(&self) -> Region {
        self.placement_region
    }

    /// Decide a round from its report and the shooter's record as it was
    /// before the round.
    #[must_use]
    pub fn adjudicate(
        &self,
        shooter: PlayerId,
        record: &PlayerRecord,
        report: Report,
        opening_break: bool,
    ) -> RoundVerdict {
        let other = shooter.other();

        let Some(group) = record.group.filter(|_| !opening_break) else {
            return self.adjudicate_open(shooter, report);
        };

        if report.eight_sunk {
            let winner = if record.remaining == 0 { shooter } else { other };
            let reason = if winner == shooter {
                format!("{shooter} sank the eight after clearing the {group} group")
            } else {
                format!(
                    "{shooter} sank the eight with {} {group} left, {other} wins",
                    record.remaining
                )
            };
            let mut verdict =
                RoundVerdict::new(shooter, Rule::EightOnClosedTable, Turn::Retained, report, reason);
            verdict.outcome = Some(MatchOutcome::Winner(winner));
            return verdict;
        }

        if report.white_sunk {
            let mut verdict = RoundVerdict::new(
                shooter,
                Rule::Scratch,
                Turn::Passed,
                report,
                format!("{shooter} scratched, {other} places the white ball"),
            );
            verdict.placement = Some(self.placement_region);
            return verdict;
        }

        let own = report.sunk_of(group);
        let foreign = report.sunk_of(group.other());
        if own >= 1 && foreign == 0 {
            RoundVerdict::new(
                shooter,
                Rule::OwnGroup,
                Turn::Retained,
                report,
                format!("{shooter} sank {own} {group} and continues"),
            )
        } else {
            let reason = if foreign > 0 {
                format!("{shooter} sank {foreign} of the opponent's balls")
            } else {
                format!("{shooter} sank no {group} ball")
            };
            RoundVerdict::new(shooter, Rule::Foul, Turn::Passed, report, reason)
        }
    }

    fn adjudicate_open(&self, shooter: PlayerId, report: Report) -> RoundVerdict {
        let other = shooter.other();

        if report.eight_sunk {
            let mut verdict = RoundVerdict::new(
                shooter,
                Rule::EightOnOpenTable,
                Turn::Passed,
                report,
                format!("eight sunk on an open table, {other} breaks again"),
            );
            verdict.rerack = true;
            return verdict;
        }

        if report.white_sunk {
            return RoundVerdict::new(
                shooter,
                Rule::Scratch,
                Turn::Passed,
                report,
                format!("{shooter} scratched, turn passes to {other}"),
            );
        }

        let (solid, striped) = (report.sunk_solid, report.sunk_striped);
        if solid + striped == 0 {
            RoundVerdict::new(
                shooter,
                Rule::OpenNothingSunk,
                Turn::Passed,
                report,
                format!("nothing sunk, turn passes to {other}"),
            )
        } else if solid == striped {
            RoundVerdict::new(
                shooter,
                Rule::OpenUndecided,
                Turn::Retained,
                report,
                format!("{solid} solid and {striped} striped sunk, groups undecided"),
            )
        } else {
            let group = if solid > striped { BallGroup::Solid } else { BallGroup::Striped };
            let mut verdict = RoundVerdict::new(
                shooter,
                Rule::OpenAssigned,
                Turn::Retained,
                report,
                format!("{shooter} takes {group}, {other} takes {}", group.other()),
            );
            verdict.assigned = Some(group);
            verdict
        }
    }
}
