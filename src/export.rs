//! CSV export of grievances
//!
//! Produces the text offered to administrators as `grievances.csv`. Fields
//! that contain a delimiter, quote or line break are quoted (RFC 4180);
//! everything else is written as-is.

use std::path::Path;
use tracing::info;

use crate::model::Grievance;
use crate::types::Result;

/// File name the export is offered under
pub const EXPORT_FILE_NAME: &str = "grievances.csv";

/// Header row, in column order
pub const CSV_HEADER: [&str; 7] = [
    "Domain",
    "Problem Title",
    "Description",
    "Status",
    "Submitted Date",
    "Submitted Time",
    "Votes",
];

/// Render `grievances` as CSV, one row per grievance in input order
pub fn to_csv(grievances: &[Grievance]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|h| h.to_string()));
    for g in grievances {
        push_row(&mut out, row(g).into_iter());
    }
    out
}

/// Write the export to `dir/grievances.csv`, returning the full path
pub fn write_export(dir: &Path, grievances: &[Grievance]) -> Result<std::path::PathBuf> {
    let path = dir.join(EXPORT_FILE_NAME);
    std::fs::write(&path, to_csv(grievances))?;
    info!("Exported {} grievances to {}", grievances.len(), path.display());
    Ok(path)
}

fn row(g: &Grievance) -> [String; 7] {
    let (date, time) = match g.submitted_at() {
        Some(at) => (
            at.format("%Y-%m-%d").to_string(),
            at.format("%H:%M:%S").to_string(),
        ),
        None => (String::new(), String::new()),
    };
    [
        g.domain.to_string(),
        g.problem_title.clone(),
        g.description.clone(),
        g.effective_status().to_string(),
        date,
        time,
        g.vote_count().to_string(),
    ]
}

fn push_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let line = fields.map(|f| escape(&f)).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push('\n');
}

fn escape(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grievance(value: serde_json::Value) -> Grievance {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_header_and_row_order() {
        let rows = vec![
            grievance(json!({
                "domain": "Water Supply",
                "problemTitle": "Leak",
                "description": "Pipe burst",
                "status": "In Progress",
                "createdAt": 1_700_000_000_000i64,
                "votes": ["u2", "u3"]
            })),
            grievance(json!({ "domain": "Health", "problemTitle": "Clinic" })),
        ];
        let csv = to_csv(&rows);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Domain,Problem Title,Description,Status,Submitted Date,Submitted Time,Votes"
        );
        assert_eq!(
            lines[1],
            "Water Supply,Leak,Pipe burst,In Progress,2023-11-14,22:13:20,2"
        );
        assert_eq!(lines[2], "Health,Clinic,,Pending,,,0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_date_falls_back_to_last_update() {
        let g = grievance(json!({
            "domain": "Health",
            "problemTitle": "Clinic",
            "lastUpdatedAt": 0
        }));
        let csv = to_csv(&[g]);
        assert!(csv.lines().nth(1).unwrap().contains("1970-01-01,00:00:00"));
    }

    #[test]
    fn test_quotes_fields_with_delimiters() {
        let g = grievance(json!({
            "domain": "Transport",
            "problemTitle": "Bus late, again",
            "description": "Driver said \"soon\"\nthen left"
        }));
        let csv = to_csv(&[g]);
        assert!(csv.contains("\"Bus late, again\""));
        assert!(csv.contains("\"Driver said \"\"soon\"\"\nthen left\""));
    }

    #[test]
    fn test_empty_collection_is_header_only() {
        assert_eq!(to_csv(&[]).lines().count(), 1);
    }
}
