//! Parsed account-statement records
//!
//! A broker statement carries two interleaved series: end-of-day valuation
//! snapshots and cash movements (deposits/withdrawals). These records are
//! what the importer produces and the report layer consumes. Snapshots must
//! be date-sorted ascending before analysis; the analysis core never sorts.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// End-of-day portfolio valuation.
///
/// `total_value` is the headline patrimony figure used for gain/loss deltas;
/// `liquidity` and `financing` expose the sub-components a cash movement
/// settles through, which movement alignment inspects.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationSnapshot {
    pub date: NaiveDate,
    pub liquidity: Decimal,
    pub financing: Decimal,
    pub total_value: Decimal,
}

/// A cash movement as reported by the statement, before alignment.
///
/// Positive amounts are deposits, negative are withdrawals. The reported
/// date may lag or lead the valuation snapshot that actually reflects the
/// flow by a couple of days (settlement delay).
#[derive(Debug, Clone, PartialEq)]
pub struct RawMovement {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// First and last snapshot dates, or None for an empty series.
pub fn date_bounds(snapshots: &[ValuationSnapshot]) -> Option<(NaiveDate, NaiveDate)> {
    let first = snapshots.first()?.date;
    let last = snapshots.last()?.date;
    Some((first, last))
}

/// Snapshots within the inclusive `[from, to]` range, order preserved.
pub fn snapshots_in_range(
    snapshots: &[ValuationSnapshot],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<ValuationSnapshot> {
    snapshots
        .iter()
        .filter(|s| s.date >= from && s.date <= to)
        .cloned()
        .collect()
}

/// Movements within the inclusive `[from, to]` range, order preserved.
pub fn movements_in_range(
    movements: &[RawMovement],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<RawMovement> {
    movements
        .iter()
        .filter(|m| m.date >= from && m.date <= to)
        .cloned()
        .collect()
}
