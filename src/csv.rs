//! Plain-text CSV import and export for participant lists. The format is
//! deliberately narrow: one name per row, no escaping, quotes stripped.

use std::collections::HashSet;

use chrono::NaiveDate;
use log::warn;

use crate::error::LotteryError;

/// Header row written on export and expected (then skipped) on import.
pub const EXPORT_HEADER: &str = "Nama Peserta";
/// Column holding the name in a plain participant file.
pub const FILE_COLUMN: usize = 0;
/// Column holding the name in a spreadsheet export (timestamp comes first).
pub const SPREADSHEET_COLUMN: usize = 1;

const SAMPLE_NAMES: [&str; 15] = [
    "Ahmad Santoso",
    "Siti Nurhaliza",
    "Budi Prasetyo",
    "Dewi Sartika",
    "Eko Wijaya",
    "Fitri Rahmawati",
    "Gunawan Setiawan",
    "Heni Purwanti",
    "Indra Kurniawan",
    "Jasmin Maharani",
    "Kartika Sari",
    "Lukman Hakim",
    "Maya Sari",
    "Nanda Pratama",
    "Oktavia Damayanti",
];

/// Names pulled from a CSV document plus the rows that had to be skipped.
#[derive(Debug, Default)]
pub struct ParsedImport {
    pub names: Vec<String>,
    pub skipped: Vec<LotteryError>,
}

/// Extract participant names from `text`, reading `column` of every line after
/// the header. Blank lines and blank names are ignored; a row without the
/// requested column is reported in `skipped`. Names repeated within the file
/// keep only their first occurrence.
pub fn parse_participants(text: &str, column: usize) -> ParsedImport {
    let mut parsed = ParsedImport::default();
    let mut seen = HashSet::new();

    for (idx, raw_line) in text.split('\n').enumerate().skip(1) {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(field) = line.split(',').nth(column) else {
            let err = LotteryError::ImportParse {
                line: idx + 1,
                reason: format!("no column {}", column + 1),
            };
            warn!("skipping CSV row: {err}");
            parsed.skipped.push(err);
            continue;
        };

        let name = field.replace('"', "");
        let name = name.trim();
        if !name.is_empty() && seen.insert(name.to_string()) {
            parsed.names.push(name.to_string());
        }
    }

    parsed
}

/// Render the registry as a one-column CSV document.
pub fn export_participants(names: &[String]) -> String {
    let rows: Vec<String> = names.iter().map(|name| format!("\"{name}\"")).collect();
    format!("{EXPORT_HEADER}\n{}", rows.join("\n"))
}

/// Template document operators can fill in and import back.
pub fn sample_csv() -> String {
    std::iter::once(EXPORT_HEADER)
        .chain(SAMPLE_NAMES)
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default export file name for the given day.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("peserta-undian-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_always_skipped() {
        let parsed = parse_participants("Ana\nBob\n", FILE_COLUMN);
        assert_eq!(parsed.names, ["Bob"]);
    }

    #[test]
    fn crlf_quotes_and_blank_lines_are_tolerated() {
        let text = "Nama Peserta\r\n\"Ana\"\r\n\r\n  \" Bob \"  ,extra\r\n\"\"\r\n";
        let parsed = parse_participants(text, FILE_COLUMN);
        assert_eq!(parsed.names, ["Ana", "Bob"]);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn duplicates_within_file_keep_first_occurrence() {
        let parsed = parse_participants("h\nCy\nAna\nCy\nAna\nBob", FILE_COLUMN);
        assert_eq!(parsed.names, ["Cy", "Ana", "Bob"]);
    }

    #[test]
    fn spreadsheet_variant_reads_second_column() {
        let text = "Timestamp,Nama\n\"2024/01/01\",\"Ana\"\n2024/01/02,Bob\njust-one-column\n";
        let parsed = parse_participants(text, SPREADSHEET_COLUMN);
        assert_eq!(parsed.names, ["Ana", "Bob"]);
        assert_eq!(parsed.skipped.len(), 1);
        assert!(matches!(
            parsed.skipped[0],
            LotteryError::ImportParse { line: 4, .. }
        ));
    }

    #[test]
    fn export_then_import_round_trips() {
        let names = vec!["Ana".to_string(), "Bob".to_string()];
        let exported = export_participants(&names);
        assert_eq!(exported, "Nama Peserta\n\"Ana\"\n\"Bob\"");
        assert_eq!(parse_participants(&exported, FILE_COLUMN).names, names);
    }

    #[test]
    fn sample_parses_to_fifteen_names() {
        let parsed = parse_participants(&sample_csv(), FILE_COLUMN);
        assert_eq!(parsed.names.len(), 15);
        assert_eq!(parsed.names[0], "Ahmad Santoso");
    }

    #[test]
    fn export_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 17).unwrap();
        assert_eq!(export_file_name(date), "peserta-undian-2024-08-17.csv");
    }
}
