use chrono::{Local, Utc};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS,
    presets::UTF8_BORDERS_ONLY,
};
use serde::Serialize;
use std::path::PathBuf;

use crate::analysis::AnalysisReport;
use crate::movement::Horizon;
use crate::ranking::RankedMovement;
use crate::storage::Storage;

/// Tint strength for a move, relative to the largest absolute move shown.
fn get_visibility_ratio(pct: f64, top_abs_pct: f64) -> f64 {
    if !pct.is_finite() || top_abs_pct <= 0.0 {
        return 0.4;
    }
    (0.4 + 0.6 * (pct.abs() / top_abs_pct)).clamp(0.4, 1.0)
}

fn format_pct(pct: f64) -> String {
    if pct.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.2}", pct)
    }
}

fn pct_cell(pct: f64, top_abs_pct: f64) -> Cell {
    let ratio = get_visibility_ratio(pct, top_abs_pct);
    let level = (255.0 * ratio) as u8;

    let color = if pct.is_nan() || pct == 0.0 {
        Color::DarkGrey
    } else if pct > 0.0 {
        Color::Rgb { r: 0, g: level, b: 0 }
    } else {
        Color::Rgb { r: level, g: 0, b: 0 }
    };

    Cell::new(format_pct(pct))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Renders ranked rows as a table with Ranking, Ticker and the three moves.
pub fn render_table(rows: &[RankedMovement]) -> Table {
    let mut header = vec![
        Cell::new("Ranking").add_attribute(Attribute::Bold),
        Cell::new("Ticker").add_attribute(Attribute::Bold),
    ];
    header.extend(Horizon::ALL.iter().map(|h| {
        Cell::new(h.label())
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right)
    }));

    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    let top_abs_pct = rows
        .iter()
        .flat_map(|r| Horizon::ALL.map(|h| r.movement.pct(h)))
        .filter(|p| p.is_finite())
        .fold(0.0f64, |acc, p| acc.max(p.abs()));

    for row in rows {
        let mut cells = vec![
            Cell::new(row.rank).fg(Color::DarkGrey),
            Cell::new(row.movement.symbol()).fg(Color::Cyan),
        ];
        cells.extend(Horizon::ALL.iter().map(|h| pct_cell(row.movement.pct(*h), top_abs_pct)));
        table.add_row(cells);
    }

    table
}

/// Full console report: portfolio ranking, all-negative tickers, universe top N.
pub fn render_report(report: &AnalysisReport) -> String {
    let time_str = Local::now().format("%d-%m-%Y %H:%M:%S");
    let mut out = format!("\n(Report generated at {})\n", time_str);

    out.push_str("\nPortfolio Performance:\n");
    if report.filtered_ranked.is_empty() {
        out.push_str("None\n");
    } else {
        out.push_str(&format!("{}\n", render_table(&report.filtered_ranked)));
    }

    out.push_str("\nTickers with All Negative % Movements:\n");
    if report.negative_movers.is_empty() {
        out.push_str("None\n");
    } else {
        out.push_str(&format!("{}\n", render_table(&report.negative_movers)));
    }

    out.push_str(&format!("\nTop {} Tickers Available:\n", report.top_n));
    if report.top_movers.is_empty() {
        out.push_str("None\n");
    } else {
        out.push_str(&format!("{}\n", render_table(&report.top_movers)));
    }

    out
}

#[derive(Serialize)]
struct ExportedReport<'a> {
    last_updated_timestamp: i64,
    #[serde(flatten)]
    report: &'a AnalysisReport,
}

/// Saves the report as `results.json` in `storage`. NaN moves become `null`.
pub fn export(storage: &Storage, report: &AnalysisReport) -> anyhow::Result<PathBuf> {
    let exported = ExportedReport {
        last_updated_timestamp: Utc::now().timestamp_millis(),
        report,
    };
    storage.save("results", &exported)
}
