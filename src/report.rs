use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

use crate::models::configuration::Configuration;
use crate::models::history_record::HistoryRecord;

/// Hours added to UTC timestamps before display.
const DISPLAY_OFFSET_HOURS: i64 = 8;
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ") {
        return Some(naive);
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }
    [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ]
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    .or_else(|| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

fn to_display(utc: NaiveDateTime) -> String {
    (utc + TimeDelta::hours(DISPLAY_OFFSET_HOURS))
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// `2024-03-01T10:00:00Z` becomes `2024-03-01 18:00:00`. Anything that does
/// not parse is returned as given.
pub fn format_time(raw: &str) -> String {
    if raw.is_empty() {
        return "Unknown".to_string();
    }
    match parse_timestamp(raw) {
        Some(utc) => to_display(utc),
        None => raw.to_string(),
    }
}

/// Renders the Markdown status page, newest release first.
pub fn render(
    history: &[HistoryRecord],
    configuration: &Configuration,
    now: DateTime<Utc>,
) -> String {
    let mut sorted: Vec<&HistoryRecord> = history.iter().collect();
    sorted.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let (latest_tag, latest_time) = match sorted.first() {
        Some(latest) => (
            latest.tag_name.as_str(),
            parse_timestamp(&latest.published_at).unwrap_or_else(|| now.naive_utc()),
        ),
        None => ("N/A", now.naive_utc()),
    };

    let mut md = String::new();
    let _ = write!(
        md,
        "# {repo} Release Archive\n\
         \n\
         > [!TIP]\n\
         > This repository watches and archives the releases of [{owner}/{repo}]({url}).\n\
         > It syncs once an hour.\n\
         \n\
         ## Latest version: `{tag}`\n\
         **Published**: `{time}`\n\
         \n\
         ## Release history\n\
         | Version | Published | Assets | Source |\n\
         | :--- | :--- | :--- | :--- |\n",
        repo = configuration.repo,
        owner = configuration.owner,
        url = configuration.repository_url(),
        tag = latest_tag,
        time = to_display(latest_time),
    );

    for record in sorted {
        let assets: String = record
            .assets
            .iter()
            .map(|asset| format!("`{}`<br>", asset.name))
            .collect();
        let url = if record.html_url.is_empty() {
            "#"
        } else {
            record.html_url.as_str()
        };
        let _ = writeln!(
            md,
            "| `{}` | {} | {} | [Source]({}) |",
            record.tag_name,
            format_time(&record.published_at),
            assets,
            url
        );
    }

    md.push_str("\n---\n*Generated automatically by release-keeper*\n");
    md
}
