//! Plain-text rendering of the month grid and the entry detail for the CLI.

use shared::{CalendarSlot, HelpType};

use crate::domain::calendar::{rows, WEEKDAY_LABELS};
use crate::domain::{DetailView, MonthViewState};
use crate::services::date_utils::format_timestamp_for_display;

const CELL_WIDTH: usize = 5;

fn cell(slot: &CalendarSlot) -> String {
    match slot {
        None => String::new(),
        Some(day) if day.entry.is_some() => format!("{}*", day.day),
        Some(day) => day.day.to_string(),
    }
}

fn grid_line<I, T>(cells: I) -> String
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    let mut line: String = cells
        .into_iter()
        .map(|cell| format!("{:>width$}", cell, width = CELL_WIDTH))
        .collect();
    line.push('\n');
    line
}

/// Month title, weekday header, the grid, then one line per entry.
/// Days with an entry are marked with `*`.
pub fn render_month(view: &MonthViewState) -> String {
    let mut out = format!("{}\n", view.title());
    out.push_str(&grid_line(WEEKDAY_LABELS));
    for row in rows(&view.calendar.slots) {
        out.push_str(&grid_line(row.iter().map(cell)));
    }

    if view.entries_by_day.is_empty() {
        out.push_str("\nNo journal entries this month.\n");
        return out;
    }

    out.push('\n');
    for (day, entry) in &view.entries_by_day {
        let title = entry.title.as_deref().unwrap_or("Untitled");
        out.push_str(&format!("{:>3}  {}: {}\n", day, title, entry.content_preview));
    }
    out
}

/// One line per help type: wire name, label and what it offers
pub fn render_help_types() -> String {
    HelpType::ALL
        .iter()
        .map(|help_type| {
            format!(
                "{:<20}{:<26}{}\n",
                help_type.as_str(),
                help_type.label(),
                help_type.description()
            )
        })
        .collect()
}

/// Title, date and the display payload of an opened entry
pub fn render_detail(view: &DetailView) -> String {
    let mut out = format!(
        "{}\n{}\n",
        view.title(),
        format_timestamp_for_display(&view.detail.created_at)
    );
    if let Some(help_type) = view.detail.requested_help_type {
        out.push_str(&format!(
            "Help requested: {} ({})\n",
            help_type.label(),
            help_type.description()
        ));
    }
    out.push('\n');
    out.push_str(&view.payload);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, NaiveDate};
    use shared::{EntryDetail, EntrySummary};

    fn summary(id: i64, created_at: &str) -> EntrySummary {
        EntrySummary {
            id,
            title: Some("Tuesday".to_string()),
            content_preview: "I walked by the river.".to_string(),
            requested_help_type: None,
            created_at: DateTime::parse_from_rfc3339(created_at).unwrap(),
        }
    }

    #[test]
    fn test_render_month_marks_entry_days() {
        let view = MonthViewState::compute_in(
            &[summary(1, "2024-03-05T10:00:00Z")],
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            &FixedOffset::east_opt(0).unwrap(),
        );

        let text = render_month(&view);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "March 2024");
        assert!(lines[1].starts_with("  Sun"));
        // March 2024 starts on a Friday: five empty cells before day 1
        assert_eq!(lines[2], format!("{}{:>5}{:>5}", " ".repeat(25), "1", "2"));
        assert!(text.contains("5*"));
        assert!(text.contains("  5  Tuesday: I walked by the river."));
    }

    #[test]
    fn test_render_empty_month() {
        let view = MonthViewState::empty(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        let text = render_month(&view);
        assert!(text.starts_with("February 2024\n"));
        assert!(text.contains("No journal entries this month."));
        assert!(!text.contains('*'));
    }

    #[test]
    fn test_render_help_types_lists_every_type() {
        let text = render_help_types();
        assert_eq!(text.lines().count(), HelpType::ALL.len());
        assert!(text
            .lines()
            .any(|line| line.starts_with("save_only") && line.ends_with("Save your entry without requesting AI support")));
    }

    #[test]
    fn test_render_detail() {
        let detail = EntryDetail {
            id: 1,
            title: None,
            content: "Hard day.".to_string(),
            requested_help_type: Some(HelpType::AcuteValidation),
            is_continuation: false,
            references_past_entries: false,
            created_at: DateTime::parse_from_rfc3339("2024-03-05T12:00:00Z").unwrap(),
            context_window_size: 0,
            ai_interaction: None,
        };

        let text = render_detail(&DetailView::new(detail));

        assert!(text.starts_with("Journal Entry\n"));
        assert!(text.contains("Help requested: Just Listen (Immediate emotional validation"));
        assert!(text.ends_with("Hard day.\n"));
    }
}
