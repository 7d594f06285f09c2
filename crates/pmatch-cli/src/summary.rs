use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pmatch_core::{MatchExplanation, ScoreBreakdown};
use pmatch_model::{MatchKey, MatchResult, MatchStatus, PatientRecord};

pub fn print_matches(matches: &[MatchResult]) {
    if matches.is_empty() {
        println!("No matches.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Score"),
        header_cell("External"),
        header_cell("Internal"),
        header_cell("Name (ext / int)"),
        header_cell("DOB (ext / int)"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Center);
    for (index, result) in matches.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            score_cell(result.score),
            Cell::new(result.external.id()),
            Cell::new(result.internal.id()),
            Cell::new(pair_text(
                &result.external.display_name(),
                &result.internal.display_name(),
            )),
            Cell::new(pair_text(result.external.dob(), result.internal.dob())),
            status_cell(result.status),
        ]);
    }
    println!("{table}");
    println!("{} match(es)", matches.len());
}

pub fn print_missing(missing: &[MatchKey]) {
    if missing.is_empty() {
        return;
    }
    eprintln!("Stored decisions whose records are no longer in the registries:");
    for key in missing {
        eprintln!("- {key}");
    }
}

pub fn print_explanation(
    external: &PatientRecord,
    internal: &PatientRecord,
    explanation: &MatchExplanation,
) {
    println!(
        "{} <-> {}: {}",
        external.id(),
        internal.id(),
        if explanation.is_match {
            "candidate match"
        } else if explanation.comparison.is_rejected() {
            "rejected (no shared name and different date of birth)"
        } else {
            "not a match"
        }
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("External"),
        header_cell("Internal"),
        header_cell("Exact"),
        header_cell("Value"),
        header_cell("Weight"),
        header_cell("Points"),
    ]);
    apply_table_style(&mut table);
    for column in 3..=6 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for contribution in &explanation.breakdown.contributions {
        table.add_row(vec![
            Cell::new(contribution.field).add_attribute(Attribute::Bold),
            Cell::new(external.field(contribution.field)),
            Cell::new(internal.field(contribution.field)),
            flag_cell(contribution.exact),
            Cell::new(format!("{:.3}", contribution.value)),
            dim_cell(format!("{:.2}", contribution.weight)),
            Cell::new(format!("{:.3}", contribution.weighted())),
        ]);
    }
    println!("{table}");
    print_score_lines(&explanation.breakdown);
}

fn print_score_lines(breakdown: &ScoreBreakdown) {
    println!("Base score:   {:.3}", breakdown.base);
    println!(
        "Exact fields: {} (bonus {:.0}%)",
        breakdown.exact_count,
        breakdown.bonus * 100.0
    );
    println!("Final score:  {:.3}", breakdown.score);
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn pair_text(external: &str, internal: &str) -> String {
    if external == internal {
        external.to_string()
    } else {
        format!("{external} / {internal}")
    }
}

fn score_cell(score: f64) -> Cell {
    let color = if score >= 0.9 {
        Color::Green
    } else if score >= 0.7 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{:.1}%", score * 100.0)).fg(color)
}

fn status_cell(status: MatchStatus) -> Cell {
    let cell = Cell::new(status.label());
    match status {
        MatchStatus::None => cell.fg(Color::DarkGrey),
        MatchStatus::Approved => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        MatchStatus::Denied => cell.fg(Color::Red),
    }
}

fn flag_cell(exact: bool) -> Cell {
    if exact {
        Cell::new("yes").fg(Color::Green)
    } else {
        dim_cell("no")
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
