//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;

use anyhow::anyhow;
use nds_api_models::NdsRecord;
use nds_core::clock::parse_timestamp;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Placeholder for absent values.
pub(crate) const ABSENT: &str = "—";
pub(crate) const EMPTY_LIST_MESSAGE: &str = "No records to display.";
const DELETED_AT_WIDTH: usize = 20;

pub(crate) fn render_records(records: &[&NdsRecord], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(records)?),
        OutputFormat::Table => print!("{}", format_records_table(records)),
    }
    Ok(())
}

pub(crate) fn render_record(record: &NdsRecord, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(record)?),
        OutputFormat::Table => print!("{}", format_record_detail(record)),
    }
    Ok(())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

#[must_use]
pub(crate) fn format_records_table(records: &[&NdsRecord]) -> String {
    if records.is_empty() {
        return format!("{EMPTY_LIST_MESSAGE}\n");
    }
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|record| {
            [
                record.id.to_string(),
                text_or_absent(record.name.as_deref()),
                text_or_absent(record.description.as_deref()),
                format_rate(record.value),
                format_deleted_at(record.deleted_at.as_deref()),
            ]
        })
        .collect();

    let headers = ["ID", "NAME", "DESCRIPTION", "RATE", "DELETED"];
    let mut widths = headers.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    push_row(&mut table, &headers.map(str::to_string), &widths);
    for row in &rows {
        push_row(&mut table, row, &widths);
    }
    table
}

fn push_row(table: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let padding = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(table, "{}", line.trim_end());
}

#[must_use]
pub(crate) fn format_record_detail(record: &NdsRecord) -> String {
    let mut detail = String::new();
    let _ = writeln!(detail, "id: {}", record.id);
    let _ = writeln!(detail, "name: {}", text_or_absent(record.name.as_deref()));
    let _ = writeln!(
        detail,
        "description: {}",
        text_or_absent(record.description.as_deref())
    );
    let _ = writeln!(detail, "rate: {}", format_rate(record.value));
    let _ = writeln!(
        detail,
        "deleted: {}",
        format_deleted_at(record.deleted_at.as_deref())
    );
    if let Some(created) = &record.created_at {
        let _ = writeln!(detail, "created: {created}");
    }
    if let Some(updated) = &record.updated_at {
        let _ = writeln!(detail, "updated: {updated}");
    }
    detail
}

fn text_or_absent(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => ABSENT.to_string(),
    }
}

#[must_use]
pub(crate) fn format_rate(value: f64) -> String {
    format!("{value}%")
}

/// `dd.mm.yyyy, HH:MM` in UTC; unparseable values are shown as received.
#[must_use]
pub(crate) fn format_deleted_at(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return ABSENT.to_string();
    };
    let text = parse_timestamp(raw).map_or_else(
        || raw.to_string(),
        |moment| moment.format("%d.%m.%Y, %H:%M").to_string(),
    );
    truncate_text(&text, DELETED_AT_WIDTH)
}

#[must_use]
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nds_api_models::RecordId;

    fn record(id: &str, name: Option<&str>, deleted_at: Option<&str>) -> NdsRecord {
        NdsRecord {
            id: RecordId::from(id),
            name: name.map(str::to_string),
            description: None,
            value: 20.0,
            deleted_at: deleted_at.map(str::to_string),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn empty_list_has_a_message() {
        assert_eq!(format_records_table(&[]), "No records to display.\n");
    }

    #[test]
    fn table_renders_placeholders_and_rates() {
        let active = record("a", Some("Standard"), None);
        let deleted = record("bb", None, Some("2024-03-01T10:05:00.000Z"));
        let table = format_records_table(&[&active, &deleted]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID  NAME"));
        assert!(lines[1].contains("Standard"));
        assert!(lines[1].contains("20%"));
        assert!(lines[1].ends_with(ABSENT));
        assert!(lines[2].contains("01.03.2024, 10:05"));
    }

    #[test]
    fn rate_keeps_fractional_part() {
        assert_eq!(format_rate(7.5), "7.5%");
        assert_eq!(format_rate(0.0), "0%");
    }

    #[test]
    fn deleted_at_falls_back_to_raw_text() {
        assert_eq!(format_deleted_at(None), ABSENT);
        assert_eq!(
            format_deleted_at(Some("2024-03-01T10:05:00")),
            "01.03.2024, 10:05"
        );
        assert_eq!(
            format_deleted_at(Some("sometime in early spring")),
            "sometime in early sp..."
        );
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_text("Ставка НДС", 6), "Ставка...");
        assert_eq!(truncate_text("short", 20), "short");
    }

    #[test]
    fn detail_lists_every_field() {
        let mut item = record("a", Some("Standard"), None);
        item.created_at = Some("2024-01-01T00:00:00Z".to_string());
        let detail = format_record_detail(&item);
        assert!(detail.contains("id: a\n"));
        assert!(detail.contains("description: —\n"));
        assert!(detail.contains("rate: 20%\n"));
        assert!(detail.contains("created: 2024-01-01T00:00:00Z\n"));
        assert!(!detail.contains("updated:"));
    }
}
