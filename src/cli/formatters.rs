//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating the
//! concerns of data calculation from presentation. Signed figures render
//! green when non-negative and red otherwise; `--json` swaps the whole
//! surface for a serde document.

use colored::Colorize;
use dietz::importers::ParsedStatement;
use dietz::reports::{AlignedMovement, DailyGain, GainLossExtremes, PerformanceReport};
use dietz::statement::date_bounds;
use dietz::utils::{format_currency, format_percentage};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

fn signed_currency(value: Decimal) -> String {
    let text = format_currency(value);
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn signed_percentage(fraction: Decimal) -> String {
    let text = format_percentage(fraction);
    if fraction >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Format the analysis summary cards for terminal output
pub fn format_summary(
    report: &PerformanceReport,
    extremes: Option<&GainLossExtremes>,
    warnings: &[String],
) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} Performance Summary\n\n", "📈".cyan().bold()));
    output.push_str(&format!(
        "  Initial Patrimony:    {}\n",
        format_currency(report.patrimony_initial).cyan()
    ));
    output.push_str(&format!(
        "  Final Patrimony:      {}\n",
        format_currency(report.patrimony_final).cyan()
    ));
    output.push_str(&format!(
        "  Total Movements:      {}\n",
        format_currency(report.total_movements)
    ));
    output.push('\n');
    output.push_str(&format!(
        "  Total Gain/Loss:      {} ({})\n",
        signed_currency(report.total_gain_loss),
        signed_percentage(report.gain_loss_pct.value())
    ));
    output.push_str(&format!(
        "  Time-Weighted Return: {}\n",
        signed_percentage(report.time_weighted_return)
    ));

    if let Some(extremes) = extremes {
        output.push('\n');
        output.push_str(&format!(
            "  Best Day:             {} ({})\n",
            extremes.best.date.format("%d/%m/%Y"),
            signed_currency(extremes.best.gain_loss)
        ));
        output.push_str(&format!(
            "  Worst Day:            {} ({})\n",
            extremes.worst.date.format("%d/%m/%Y"),
            signed_currency(extremes.worst.gain_loss)
        ));
    }

    if !warnings.is_empty() {
        output.push_str(&format!(
            "\n{} {} warning(s):\n",
            "⚠".yellow().bold(),
            warnings.len()
        ));
        for warning in warnings {
            output.push_str(&format!("  - {}\n", warning.yellow()));
        }
    }

    output
}

/// Format the per-day gain/loss breakdown as a table
pub fn format_daily_table(daily_gains: &[DailyGain]) -> String {
    #[derive(Tabled)]
    struct DailyRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Gain/Loss")]
        gain_loss: String,
        #[tabled(rename = "Cum. Gain/Loss")]
        cumulative_gain_loss: String,
        #[tabled(rename = "Cum. Investment")]
        cumulative_investment: String,
        #[tabled(rename = "TWR to Date")]
        twr_to_date: String,
    }

    let rows: Vec<DailyRow> = daily_gains
        .iter()
        .map(|day| DailyRow {
            date: day.date.format("%d/%m/%Y").to_string(),
            gain_loss: signed_currency(day.gain_loss),
            cumulative_gain_loss: signed_currency(day.cumulative_gain_loss),
            cumulative_investment: format_currency(day.cumulative_investment),
            twr_to_date: signed_percentage(day.twr_to_date),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string()
}

/// Format the aligned-movement table; rows without a numeric match are
/// highlighted.
pub fn format_movements_table(aligned: &[AlignedMovement]) -> String {
    #[derive(Tabled)]
    struct MovementRow {
        #[tabled(rename = "Original Date")]
        original_date: String,
        #[tabled(rename = "Assigned Date")]
        assigned_date: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Match")]
        match_kind: String,
    }

    let rows: Vec<MovementRow> = aligned
        .iter()
        .map(|movement| {
            let kind = movement.match_kind.as_str().to_string();
            let kind = if movement.match_kind.is_exact() {
                kind
            } else {
                kind.yellow().to_string()
            };
            let assigned = movement.date.format("%d/%m/%Y").to_string();
            let assigned = if movement.date == movement.original_date {
                assigned
            } else {
                assigned.yellow().to_string()
            };
            MovementRow {
                original_date: movement.original_date.format("%d/%m/%Y").to_string(),
                assigned_date: assigned,
                amount: signed_currency(movement.amount),
                match_kind: kind,
            }
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string()
}

/// Format the statement-debugging output for `inspect`
pub fn format_inspect(parsed: &ParsedStatement) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} Statement Contents\n\n", "🔍".cyan().bold()));
    output.push_str(&format!("  Header at line:  {}\n", parsed.header_row + 1));
    output.push_str(&format!("  Snapshots:       {}\n", parsed.snapshots.len()));
    output.push_str(&format!("  Movements:       {}\n", parsed.movements.len()));

    if let Some((min, max)) = date_bounds(&parsed.snapshots) {
        output.push_str(&format!(
            "  Date bounds:     {} → {}\n",
            min.format("%d/%m/%Y"),
            max.format("%d/%m/%Y")
        ));
    }

    if parsed.warnings.is_empty() {
        output.push_str(&format!("\n{} No parse warnings\n", "✓".green().bold()));
    } else {
        output.push_str(&format!(
            "\n{} {} warning(s):\n",
            "⚠".yellow().bold(),
            parsed.warnings.len()
        ));
        for warning in &parsed.warnings {
            output.push_str(&format!("  - {}\n", warning.yellow()));
        }
    }

    output
}

#[derive(Serialize)]
struct JsonDailyGain {
    date: chrono::NaiveDate,
    gain_loss: Decimal,
    cumulative_gain_loss: Decimal,
    cumulative_investment: Decimal,
    daily_return: Option<Decimal>,
    twr_to_date: Decimal,
}

#[derive(Serialize)]
struct JsonMovement {
    original_date: chrono::NaiveDate,
    assigned_date: chrono::NaiveDate,
    amount: Decimal,
    match_kind: &'static str,
}

#[derive(Serialize)]
struct JsonExtreme {
    date: chrono::NaiveDate,
    gain_loss: Decimal,
}

#[derive(Serialize)]
struct JsonAnalysis {
    patrimony_initial: Decimal,
    patrimony_final: Decimal,
    total_gain_loss: Decimal,
    /// Null when the weighted capital base was zero
    gain_loss_pct: Option<Decimal>,
    time_weighted_return: Decimal,
    total_investment: Decimal,
    total_movements: Decimal,
    best_day: Option<JsonExtreme>,
    worst_day: Option<JsonExtreme>,
    daily_gains: Vec<JsonDailyGain>,
    movements: Vec<JsonMovement>,
    warnings: Vec<String>,
}

fn json_movements(aligned: &[AlignedMovement]) -> Vec<JsonMovement> {
    aligned
        .iter()
        .map(|m| JsonMovement {
            original_date: m.original_date,
            assigned_date: m.date,
            amount: m.amount,
            match_kind: m.match_kind.as_str(),
        })
        .collect()
}

/// Format the whole analysis as a JSON document
pub fn format_analysis_json(
    report: &PerformanceReport,
    extremes: Option<&GainLossExtremes>,
    aligned: &[AlignedMovement],
    warnings: &[String],
) -> String {
    let payload = JsonAnalysis {
        patrimony_initial: report.patrimony_initial,
        patrimony_final: report.patrimony_final,
        total_gain_loss: report.total_gain_loss,
        gain_loss_pct: match report.gain_loss_pct {
            dietz::reports::DietzReturn::Computed(v) => Some(v),
            dietz::reports::DietzReturn::UndefinedCapital => None,
        },
        time_weighted_return: report.time_weighted_return,
        total_investment: report.total_investment,
        total_movements: report.total_movements,
        best_day: extremes.map(|e| JsonExtreme {
            date: e.best.date,
            gain_loss: e.best.gain_loss,
        }),
        worst_day: extremes.map(|e| JsonExtreme {
            date: e.worst.date,
            gain_loss: e.worst.gain_loss,
        }),
        daily_gains: report
            .daily_gains
            .iter()
            .map(|day| JsonDailyGain {
                date: day.date,
                gain_loss: day.gain_loss,
                cumulative_gain_loss: day.cumulative_gain_loss,
                cumulative_investment: day.cumulative_investment,
                daily_return: day.daily_return,
                twr_to_date: day.twr_to_date,
            })
            .collect(),
        movements: json_movements(aligned),
        warnings: warnings.to_vec(),
    };

    serde_json::to_string_pretty(&payload)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the aligned-movement list as a JSON document
pub fn format_movements_json(aligned: &[AlignedMovement], warnings: &[String]) -> String {
    #[derive(Serialize)]
    struct Payload {
        movements: Vec<JsonMovement>,
        warnings: Vec<String>,
    }

    let payload = Payload {
        movements: json_movements(aligned),
        warnings: warnings.to_vec(),
    };

    serde_json::to_string_pretty(&payload)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the inspect report as a JSON document
pub fn format_inspect_json(parsed: &ParsedStatement) -> String {
    let bounds = date_bounds(&parsed.snapshots);
    let payload = serde_json::json!({
        "header_line": parsed.header_row + 1,
        "snapshots": parsed.snapshots.len(),
        "movements": parsed.movements.len(),
        "first_date": bounds.map(|(min, _)| min),
        "last_date": bounds.map(|(_, max)| max),
        "warnings": parsed.warnings,
    });

    serde_json::to_string_pretty(&payload)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dietz::reports::{align_movements, calculate_performance, find_extremes};
    use dietz::statement::{RawMovement, ValuationSnapshot};
    use rust_decimal_macros::dec;

    fn sample_report() -> (PerformanceReport, Vec<AlignedMovement>) {
        let snapshots = vec![
            ValuationSnapshot {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                liquidity: dec!(100),
                financing: dec!(0),
                total_value: dec!(1000),
            },
            ValuationSnapshot {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                liquidity: dec!(150),
                financing: dec!(0),
                total_value: dec!(1060),
            },
        ];
        let movements = vec![RawMovement {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            amount: dec!(50),
        }];
        let aligned = align_movements(&snapshots, &movements);
        let report = calculate_performance(&snapshots, &aligned).unwrap();
        (report, aligned)
    }

    #[test]
    fn test_summary_contains_key_figures() {
        colored::control::set_override(false);
        let (report, _) = sample_report();
        let extremes = find_extremes(&report.daily_gains);
        let text = format_summary(&report, extremes.as_ref(), &[]);

        assert!(text.contains("1.000,00 €"));
        assert!(text.contains("1.060,00 €"));
        assert!(text.contains("10,00 €"));
        assert!(text.contains("Best Day"));
    }

    #[test]
    fn test_analysis_json_is_parseable() {
        let (report, aligned) = sample_report();
        let extremes = find_extremes(&report.daily_gains);
        let text = format_analysis_json(&report, extremes.as_ref(), &aligned, &[]);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["daily_gains"].as_array().unwrap().len(), 1);
        assert_eq!(value["movements"][0]["match_kind"], "total");
    }

    #[test]
    fn test_movements_table_lists_kinds() {
        colored::control::set_override(false);
        let (_, aligned) = sample_report();
        let table = format_movements_table(&aligned);

        assert!(table.contains("total"));
        assert!(table.contains("02/01/2024"));
    }
}
