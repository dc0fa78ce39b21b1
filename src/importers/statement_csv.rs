//! Broker statement CSV parser
//!
//! The export is positionally addressed: somewhere in the file sits a header
//! line (`Data,Liquidità,...,Patrimonio,...`), and each data line below it
//! can carry up to two logical sub-records. Columns 0/1/2/6 hold a valuation
//! row (date, liquidity, financing, total patrimony); columns 8/10 hold an
//! independent movement row (date, amount). Real exports arrive with mangled
//! accents, so header matching is tolerant and decoding falls back to
//! ISO-8859-15.
//!
//! Malformed rows are skipped with a per-row warning; they never abort the
//! parse.

use anyhow::Result;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::statement::{RawMovement, ValuationSnapshot};

// Column offsets of the two sub-records within one physical line
const COL_VALUATION_DATE: usize = 0;
const COL_LIQUIDITY: usize = 1;
const COL_FINANCING: usize = 2;
const COL_PATRIMONY: usize = 6;
const COL_MOVEMENT_DATE: usize = 8;
const COL_MOVEMENT_AMOUNT: usize = 10;

/// Strict guard: a cell is a sub-record anchor only when it is exactly a
/// dd/mm/yyyy date.
static ROW_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap());

/// Header detection. The liquidity column name carries mojibake in real
/// exports ("Liquidit√†"), so only the stable prefix is matched.
static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^data,liquidit").unwrap());

/// Everything extracted from one statement
#[derive(Debug, Clone, Default)]
pub struct ParsedStatement {
    pub snapshots: Vec<ValuationSnapshot>,
    pub movements: Vec<RawMovement>,
    /// Per-row parse diagnostics, non-fatal
    pub warnings: Vec<String>,
    /// Zero-based line index of the header within the file
    pub header_row: usize,
}

/// Parse statement text. The only hard failure is a missing header line;
/// every row-level problem is a warning.
pub fn parse_statement_content(content: &str) -> Result<ParsedStatement> {
    let lines: Vec<&str> = content.lines().collect();
    let header_row = lines
        .iter()
        .position(|line| is_header(line))
        .ok_or(AnalysisError::HeaderNotFound)?;

    debug!("Statement header found at line {}", header_row + 1);

    let mut statement = ParsedStatement {
        header_row,
        ..Default::default()
    };

    let body = lines[header_row + 1..].join("\n");
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // Lines carry a variable number of columns
        .from_reader(body.as_bytes());

    for (idx, result) in reader.records().enumerate() {
        // 1-based file line of this record, for diagnostics
        let line_no = header_row + 2 + idx;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                push_warning(&mut statement.warnings, line_no, &format!("unreadable row: {e}"));
                continue;
            }
        };

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        parse_valuation_cells(&record, line_no, &mut statement);
        parse_movement_cells(&record, line_no, &mut statement);
    }

    debug!(
        "Parsed {} snapshots and {} movements ({} warnings)",
        statement.snapshots.len(),
        statement.movements.len(),
        statement.warnings.len()
    );

    Ok(statement)
}

fn is_header(line: &str) -> bool {
    let trimmed = line.trim();
    HEADER.is_match(trimmed) && trimmed.to_lowercase().contains("patrimonio")
}

fn push_warning(warnings: &mut Vec<String>, line_no: usize, reason: &str) {
    let message = format!("line {line_no}: {reason}");
    warn!("{}", message);
    warnings.push(message);
}

fn cell(record: &csv::StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_valuation_cells(record: &csv::StringRecord, line_no: usize, out: &mut ParsedStatement) {
    let Some(date_cell) = cell(record, COL_VALUATION_DATE) else {
        return;
    };
    if !ROW_DATE.is_match(date_cell) {
        return;
    }

    let parsed = parse_statement_date(date_cell).and_then(|date| {
        let liquidity = amount_at(record, COL_LIQUIDITY, "liquidity")?;
        let financing = amount_at(record, COL_FINANCING, "financing")?;
        let total_value = amount_at(record, COL_PATRIMONY, "patrimony")?;
        Ok(ValuationSnapshot {
            date,
            liquidity,
            financing,
            total_value,
        })
    });

    match parsed {
        Ok(snapshot) => {
            // The analysis core requires sorted input and never sorts
            if let Some(previous) = out.snapshots.last() {
                if snapshot.date < previous.date {
                    push_warning(
                        &mut out.warnings,
                        line_no,
                        &format!(
                            "valuation rows out of chronological order ({} after {})",
                            snapshot.date, previous.date
                        ),
                    );
                }
            }
            out.snapshots.push(snapshot);
        }
        Err(e) => push_warning(&mut out.warnings, line_no, &format!("bad valuation row: {e}")),
    }
}

fn parse_movement_cells(record: &csv::StringRecord, line_no: usize, out: &mut ParsedStatement) {
    let Some(date_cell) = cell(record, COL_MOVEMENT_DATE) else {
        return;
    };
    if !ROW_DATE.is_match(date_cell) {
        return;
    }

    let parsed = parse_statement_date(date_cell).and_then(|date| {
        let amount = amount_at(record, COL_MOVEMENT_AMOUNT, "movement amount")?;
        Ok(RawMovement { date, amount })
    });

    match parsed {
        Ok(movement) => out.movements.push(movement),
        Err(e) => push_warning(&mut out.warnings, line_no, &format!("bad movement row: {e}")),
    }
}

fn amount_at(record: &csv::StringRecord, idx: usize, label: &str) -> Result<Decimal> {
    let text = cell(record, idx)
        .ok_or_else(|| AnalysisError::Parse(format!("missing {label} column {idx}")))?;
    parse_statement_amount(text)
        .map_err(|_| AnalysisError::Parse(format!("invalid {label} '{text}'")).into())
}

fn parse_statement_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%d/%m/%Y")
        .map_err(|_| AnalysisError::Parse(format!("invalid date '{text}'")).into())
}

/// Parse a plain ("1234.56") or European ("1.234,56") decimal, with any
/// currency symbol and spaces stripped.
fn parse_statement_amount(text: &str) -> Result<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€' && *c != '$')
        .collect();

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    Decimal::from_str(&normalized)
        .map_err(|_| AnalysisError::Parse(format!("invalid amount '{text}'")).into())
}
