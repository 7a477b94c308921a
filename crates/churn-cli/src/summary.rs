use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use churn_model::{RiskTier, ScoredAccount};

use crate::commands::{ScoreRun, TrainRun};

pub fn print_score_summary(run: &ScoreRun, top: usize) {
    print!("{}", render_score_summary(run, top));
    if !run.outcome.warnings.is_empty() {
        eprintln!("Warnings:");
        for warning in &run.outcome.warnings {
            eprintln!("- {warning}");
        }
    }
}

pub fn print_train_summary(run: &TrainRun) {
    print!("{}", render_train_summary(run));
}

/// Render the score summary: headline counts, then the top accounts.
fn render_score_summary(run: &ScoreRun, top: usize) -> String {
    let outcome = &run.outcome;
    let mut out = String::new();
    out.push_str(&format!("Accounts scored: {}\n", outcome.accounts.len()));
    let (high, medium, low) = tier_counts(&outcome.accounts);
    out.push_str(&format!(
        "Risk tiers: {high} High / {medium} Medium / {low} Low\n"
    ));
    if let Some(path) = &run.written {
        out.push_str(&format!("Scored table: {}\n", path.display()));
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Account"),
        header_cell("Plan"),
        header_cell("Score"),
        header_cell("Tier"),
        header_cell("Timeline"),
        header_cell("Top Drivers"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for account in outcome.accounts.iter().take(top) {
        table.add_row(vec![
            Cell::new(&account.account_id),
            Cell::new(account.plan_tier.as_deref().unwrap_or("-")),
            Cell::new(account.risk_score),
            tier_cell(account.risk_tier),
            Cell::new(account.churn_timeline.as_str()),
            Cell::new(account.top_drivers.join(", ")),
        ]);
    }
    out.push_str(&table.to_string());
    out.push('\n');
    if outcome.accounts.len() > top {
        out.push_str(&format!(
            "... and {} more\n",
            outcome.accounts.len() - top
        ));
    }
    out
}

fn render_train_summary(run: &TrainRun) -> String {
    format!(
        "Model: {}\nTrained on {} accounts ({} churned) over {} epochs, {} plan tier(s)\n",
        run.model_path.display(),
        run.report.rows,
        run.report.positives,
        run.report.epochs,
        run.report.plan_tiers
    )
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn tier_cell(tier: RiskTier) -> Cell {
    let color = match tier {
        RiskTier::High => Color::Red,
        RiskTier::Medium => Color::Yellow,
        RiskTier::Low => Color::Green,
    };
    Cell::new(tier.as_str()).fg(color)
}

fn tier_counts(accounts: &[ScoredAccount]) -> (usize, usize, usize) {
    let mut high = 0;
    let mut medium = 0;
    let mut low = 0;
    for account in accounts {
        match account.risk_tier {
            RiskTier::High => high += 1,
            RiskTier::Medium => medium += 1,
            RiskTier::Low => low += 1,
        }
    }
    (high, medium, low)
}
