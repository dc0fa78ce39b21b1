//! Movement alignment
//!
//! A statement reports cash movements with a date that can lag or lead the
//! valuation snapshot that actually absorbed them by a day or two
//! (settlement delay). For each movement this module scans nearby valuation
//! transitions and assigns the movement to the transition whose liquidity
//! and/or financing delta numerically explains it, so the statistics pass
//! can exclude the flow from true gain/loss.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::statement::{RawMovement, ValuationSnapshot};

/// Movements further than this many calendar days from a transition are
/// never matched against it, exactly or by proximity.
const MATCH_WINDOW_DAYS: i64 = 3;

/// Absolute tolerance for an "exact" numeric match, absorbing rounding
/// noise in statement exports.
const EXACT_TOLERANCE: Decimal = dec!(0.01);

/// How a movement was matched to its assigned date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The combined liquidity + financing delta explains the movement
    Total,
    /// Only the liquidity delta explains it
    Liquidity,
    /// Only the financing delta explains it
    Financing,
    /// No numeric match; assigned to the nearest in-window snapshot
    Closest,
    /// No snapshot within the window at all; original date kept
    Unmatched,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Total => "total",
            MatchKind::Liquidity => "liquidity",
            MatchKind::Financing => "financing",
            MatchKind::Closest => "closest",
            MatchKind::Unmatched => "unmatched",
        }
    }

    /// True when the match is backed by a numeric delta, not mere proximity.
    pub fn is_exact(&self) -> bool {
        matches!(
            self,
            MatchKind::Total | MatchKind::Liquidity | MatchKind::Financing
        )
    }
}

/// A movement after alignment. `date` is the assigned date and may differ
/// from `original_date` when the movement was reassigned to the valuation
/// transition that best explains it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedMovement {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub original_date: NaiveDate,
    pub match_kind: MatchKind,
}

/// Deltas across one snapshot transition. Financing is prev − next: paying
/// a financing line down counts as an inflow.
#[derive(Debug, Clone, Copy)]
struct TransitionDeltas {
    liquidity: Decimal,
    financing: Decimal,
    total: Decimal,
}

fn transition_deltas(curr: &ValuationSnapshot, next: &ValuationSnapshot) -> TransitionDeltas {
    let liquidity = next.liquidity - curr.liquidity;
    let financing = curr.financing - next.financing;
    TransitionDeltas {
        liquidity,
        financing,
        total: liquidity + financing,
    }
}

#[derive(Debug, Clone, Copy)]
struct ExactMatch {
    date: NaiveDate,
    kind: MatchKind,
}

#[derive(Debug, Clone, Copy)]
struct ClosestMatch {
    date: NaiveDate,
    days_off: i64,
}

/// Accumulated result of scanning the in-window transitions for one
/// movement. The exact and closest tracks are independent: closest keeps
/// updating even after an exact match exists, but only the exact match is
/// emitted when both survive the scan.
#[derive(Debug, Clone, Copy, Default)]
struct ScanOutcome {
    exact: Option<ExactMatch>,
    closest: Option<ClosestMatch>,
}

impl ScanOutcome {
    /// Apply the match-priority rules for one transition. Returns the
    /// updated outcome and whether the scan should stop: a Total match wins
    /// outright, overwriting any weaker exact match recorded earlier, and
    /// short-circuits the search. Liquidity and Financing matches are only
    /// recorded while no exact match exists and keep the scan going, since
    /// a later Total can still override them.
    fn consider_exact(self, deltas: TransitionDeltas, amount: Decimal, date: NaiveDate) -> (Self, bool) {
        if (deltas.total - amount).abs() <= EXACT_TOLERANCE {
            let outcome = Self {
                exact: Some(ExactMatch {
                    date,
                    kind: MatchKind::Total,
                }),
                ..self
            };
            return (outcome, true);
        }

        if self.exact.is_none() {
            let kind = if (deltas.liquidity - amount).abs() <= EXACT_TOLERANCE {
                Some(MatchKind::Liquidity)
            } else if (deltas.financing - amount).abs() <= EXACT_TOLERANCE {
                Some(MatchKind::Financing)
            } else {
                None
            };
            if let Some(kind) = kind {
                let outcome = Self {
                    exact: Some(ExactMatch { date, kind }),
                    ..self
                };
                return (outcome, false);
            }
        }

        (self, false)
    }

    /// Track the transition whose start date is nearest to the movement.
    /// Strictly-smaller wins, so ties keep the earlier transition.
    fn consider_closest(self, days_off: i64, date: NaiveDate) -> Self {
        match self.closest {
            Some(best) if best.days_off <= days_off => self,
            _ => Self {
                closest: Some(ClosestMatch { date, days_off }),
                ..self
            },
        }
    }
}

/// Scan every consecutive snapshot pair within the match window of one
/// movement, folding into the final `ScanOutcome`.
fn scan_transitions(snapshots: &[ValuationSnapshot], movement: &RawMovement) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for pair in snapshots.windows(2) {
        let (curr, next) = (&pair[0], &pair[1]);
        let days_off = (curr.date - movement.date).num_days().abs();
        if days_off > MATCH_WINDOW_DAYS {
            continue;
        }

        let deltas = transition_deltas(curr, next);
        let (updated, stop) = outcome.consider_exact(deltas, movement.amount, next.date);
        outcome = updated.consider_closest(days_off, curr.date);
        if stop {
            break;
        }
    }

    outcome
}

/// Turn a scan outcome into the aligned movement, warning when the
/// assignment lacks a numeric justification. Warnings are diagnostics;
/// an unmatched movement is a normal, representable result.
fn resolve(movement: &RawMovement, outcome: ScanOutcome) -> AlignedMovement {
    if let Some(exact) = outcome.exact {
        return AlignedMovement {
            date: exact.date,
            amount: movement.amount,
            original_date: movement.date,
            match_kind: exact.kind,
        };
    }

    if let Some(closest) = outcome.closest {
        warn!(
            "No exact match for movement of {} on {}; assigned closest date {}",
            movement.amount, movement.date, closest.date
        );
        return AlignedMovement {
            date: closest.date,
            amount: movement.amount,
            original_date: movement.date,
            match_kind: MatchKind::Closest,
        };
    }

    warn!(
        "No snapshot within {} days of movement of {} on {}; left unmatched",
        MATCH_WINDOW_DAYS, movement.amount, movement.date
    );
    AlignedMovement {
        date: movement.date,
        amount: movement.amount,
        original_date: movement.date,
        match_kind: MatchKind::Unmatched,
    }
}

/// Align every movement against the valuation series.
///
/// Emits exactly one `AlignedMovement` per input movement, in input order.
/// Snapshots must already be date-sorted ascending; this function never
/// sorts or mutates its inputs.
pub fn align_movements(
    snapshots: &[ValuationSnapshot],
    movements: &[RawMovement],
) -> Vec<AlignedMovement> {
    movements
        .iter()
        .map(|movement| resolve(movement, scan_transitions(snapshots, movement)))
        .collect()
}
