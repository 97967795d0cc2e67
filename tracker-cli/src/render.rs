//! Plain-text rendering for the list and analytics views.

use std::fmt::Write as _;

use tracker_core::query::{Analytics, Highlight, ProjectRow};

const BAR_WIDTH: usize = 30;

fn flag(highlight: Highlight) -> &'static str {
    match highlight {
        Highlight::Overdue => "OVERDUE",
        Highlight::DueSoon => "DUE SOON",
        Highlight::None => "",
    }
}

fn date_cell(date: Option<chrono::NaiveDate>) -> String {
    date.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Column-aligned project table. Overdue and due-soon rows carry a flag.
pub fn project_table(rows: &[ProjectRow]) -> String {
    if rows.is_empty() {
        return "No projects found.\n".to_string();
    }

    let header = [
        "PROJECT", "OWNER", "STATUS", "START", "END", "DEADLINE", "DAYS LEFT", "UPDATED", "",
    ];
    let body: Vec<[String; 9]> = rows
        .iter()
        .map(|row| {
            let r = &row.record;
            [
                r.name.clone(),
                r.owner.clone(),
                r.status.to_string(),
                date_cell(r.start_date),
                date_cell(r.end_date),
                r.deadline.to_string(),
                row.days_left.to_string(),
                r.last_updated.to_string(),
                flag(row.highlight).to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, header.iter().copied(), &widths);
    for cells in &body {
        push_line(&mut out, cells.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (cell, &width) in cells.zip(widths) {
        let _ = write!(line, "{cell:<width$}  ");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Status breakdown and deadlines per week, with `#` bars.
pub fn analytics(analytics: &Analytics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Projects: {}", analytics.total);
    if analytics.total == 0 {
        return out;
    }

    out.push_str("\nStatus\n");
    for share in &analytics.status_counts {
        let _ = writeln!(
            out,
            "  {:<12} {:>4}  {:>5.1}%  {}",
            share.status.label(),
            share.count,
            share.percent,
            bar(share.count, analytics.total)
        );
    }

    out.push_str("\nDue per week\n");
    let busiest = analytics
        .due_by_week
        .iter()
        .map(|w| w.count)
        .max()
        .unwrap_or(0);
    for week in &analytics.due_by_week {
        let _ = writeln!(
            out,
            "  {}  {:>4}  {}",
            week.label,
            week.count,
            bar(week.count, busiest)
        );
    }
    out
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    // At least one mark for any non-zero count.
    let len = (count * BAR_WIDTH).div_ceil(max);
    "#".repeat(len)
}
