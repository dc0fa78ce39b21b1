//! Performance statistics
//!
//! Sequential pass over the valuation series and the aligned movements,
//! producing the per-day gain/loss decomposition, a Modified-Dietz-style
//! percentage and the chained time-weighted return.
//!
//! Division guards degrade silently rather than erroring: a zero weighted
//! capital base yields a tagged `UndefinedCapital` percentage and a
//! non-positive day-start capital excludes that day from compounding.
//! Both branches carry explicit tags so callers (and tests) can observe
//! the degradation instead of a bare zero.

use anyhow::Result;
use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::AnalysisError;
use crate::reports::alignment::AlignedMovement;
use crate::statement::ValuationSnapshot;

/// One valuation transition's decomposition. N snapshots yield N−1 entries;
/// the first snapshot has no prior value to diff against.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyGain {
    pub date: NaiveDate,
    /// Change in patrimony minus the part explained by that day's flows
    pub gain_loss: Decimal,
    pub cumulative_gain_loss: Decimal,
    pub cumulative_investment: Decimal,
    /// `None` when the day-start capital was non-positive and the day was
    /// excluded from compounding
    pub daily_return: Option<Decimal>,
    /// Chained return up to and including this day, as a fraction
    pub twr_to_date: Decimal,
}

/// Modified-Dietz percentage, tagged so the zero-denominator guard is
/// observable rather than collapsed into a bare zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DietzReturn {
    Computed(Decimal),
    /// The weighted capital base was zero; renders as zero downstream
    UndefinedCapital,
}

impl DietzReturn {
    /// Numeric value for display; the degraded branch is zero.
    pub fn value(&self) -> Decimal {
        match self {
            DietzReturn::Computed(v) => *v,
            DietzReturn::UndefinedCapital => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PerformanceReport {
    pub daily_gains: Vec<DailyGain>,
    pub total_gain_loss: Decimal,
    /// Modified-Dietz-style percentage over the weighted capital base
    pub gain_loss_pct: DietzReturn,
    /// Chained daily time-weighted return, as a fraction
    pub time_weighted_return: Decimal,
    /// Net flows bucketed into the snapshot series (final cumulative)
    pub total_investment: Decimal,
    /// Net of all aligned movements, independent of daily bucketing
    pub total_movements: Decimal,
    pub patrimony_initial: Decimal,
    pub patrimony_final: Decimal,
}

/// Compute the daily decomposition and summary returns.
///
/// Snapshots must be date-sorted ascending and non-empty; a single snapshot
/// yields an empty daily series with initial and final patrimony equal.
pub fn calculate_performance(
    snapshots: &[ValuationSnapshot],
    aligned: &[AlignedMovement],
) -> Result<PerformanceReport> {
    let (first, last) = match (snapshots.first(), snapshots.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AnalysisError::EmptySnapshots.into()),
    };

    // Multiple movements can land on one day; all contribute to that
    // day's flow.
    let day_flows: HashMap<NaiveDate, Decimal> = aligned
        .iter()
        .map(|m| (m.date, m.amount))
        .into_grouping_map()
        .sum();

    let total_days = snapshots.len();
    let mut daily_gains = Vec::with_capacity(total_days.saturating_sub(1));
    let mut cumulative_gain_loss = Decimal::ZERO;
    let mut cumulative_investment = Decimal::ZERO;
    // Day 0 anchors the Modified Dietz capital base
    let mut weighted_average_capital = first.total_value;
    let mut twr_factor = Decimal::ONE;

    for (index, day) in snapshots.iter().enumerate() {
        let day_flow = day_flows.get(&day.date).copied().unwrap_or(Decimal::ZERO);
        cumulative_investment += day_flow;

        if index == 0 {
            continue;
        }

        let previous = &snapshots[index - 1];
        let gain_loss = (day.total_value - previous.total_value) - day_flow;
        cumulative_gain_loss += gain_loss;

        // Modified Dietz: each flow is weighted by the fraction of the
        // period remaining after it occurs. Note this is the inverse of
        // the conventional elapsed-time weighting; do not "correct" it,
        // downstream consumers expect these figures.
        if total_days > 1 {
            let days_remaining = (total_days - 1 - index) as i64;
            let weight = Decimal::from(days_remaining) / Decimal::from((total_days - 1) as i64);
            weighted_average_capital += day_flow * weight;
        }

        let start_capital = previous.total_value + day_flow;
        let daily_return = if start_capital > Decimal::ZERO {
            let r = gain_loss / start_capital;
            twr_factor *= Decimal::ONE + r;
            Some(r)
        } else {
            // Non-positive capital base: the day is excluded from
            // compounding rather than producing a nonsensical return.
            None
        };

        daily_gains.push(DailyGain {
            date: day.date,
            gain_loss,
            cumulative_gain_loss,
            cumulative_investment,
            daily_return,
            twr_to_date: twr_factor - Decimal::ONE,
        });
    }

    let gain_loss_pct = if weighted_average_capital != Decimal::ZERO {
        DietzReturn::Computed(cumulative_gain_loss / weighted_average_capital)
    } else {
        DietzReturn::UndefinedCapital
    };

    let total_movements = aligned.iter().map(|m| m.amount).sum();

    Ok(PerformanceReport {
        daily_gains,
        total_gain_loss: cumulative_gain_loss,
        gain_loss_pct,
        time_weighted_return: twr_factor - Decimal::ONE,
        total_investment: cumulative_investment,
        total_movements,
        patrimony_initial: first.total_value,
        patrimony_final: last.total_value,
    })
}

/// A day and its flow-adjusted gain/loss, as tracked by the extremes scan
#[derive(Debug, Clone, PartialEq)]
pub struct DayGainLoss {
    pub date: NaiveDate,
    pub gain_loss: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GainLossExtremes {
    pub best: DayGainLoss,
    pub worst: DayGainLoss,
}

/// Best and worst single days by `gain_loss`; `None` when there is no
/// daily series at all, so an empty run is never mistaken for a flat day.
pub fn find_extremes(daily_gains: &[DailyGain]) -> Option<GainLossExtremes> {
    let mut iter = daily_gains.iter();
    let seed = iter.next()?;
    let mut best = seed;
    let mut worst = seed;

    for day in iter {
        if day.gain_loss > best.gain_loss {
            best = day;
        }
        if day.gain_loss < worst.gain_loss {
            worst = day;
        }
    }

    Some(GainLossExtremes {
        best: DayGainLoss {
            date: best.date,
            gain_loss: best.gain_loss,
        },
        worst: DayGainLoss {
            date: worst.date,
            gain_loss: worst.gain_loss,
        },
    })
}
