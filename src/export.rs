//! Output rendering: CSV, readable text blocks and JSON.

use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::record::ExtractionResult;

pub const CSV_HEADER: [&str; 4] = ["Code", "Description", "Zusatzkennzeichen", "DirectLink"];

/// Flat four-column row used for CSV export. Failed lookups carry
/// `ERROR: <message>` as description and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Zusatzkennzeichen")]
    pub qualifiers: String,
    #[serde(rename = "DirectLink")]
    pub direct_link: String,
}

impl From<&ExtractionResult> for OutputRow {
    fn from(result: &ExtractionResult) -> Self {
        match &result.error {
            Some(error) => OutputRow {
                code: result.code.clone(),
                description: format!("ERROR: {}", error),
                qualifiers: String::new(),
                direct_link: String::new(),
            },
            None => OutputRow {
                code: result.code.clone(),
                description: result.description.clone(),
                qualifiers: result.qualifiers_joined(),
                direct_link: result.direct_link.clone(),
            },
        }
    }
}

/// Write results as CSV. The header row is always written, even for an
/// empty batch.
pub fn write_csv<W: Write>(results: &[ExtractionResult], writer: W) -> Result<(), csv::Error> {
    let mut out = WriterBuilder::new().has_headers(false).from_writer(writer);
    out.write_record(CSV_HEADER)?;
    for result in results {
        out.serialize(OutputRow::from(result))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(results: &[ExtractionResult], writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, results)
}

/// Human-readable block for one result.
pub fn render_block(result: &ExtractionResult) -> String {
    match &result.error {
        Some(error) => format!("**{}**\nError: {}\n", result.code, error),
        None => {
            let description = if result.description.is_empty() {
                "(no description found)".to_string()
            } else {
                result.description.clone()
            };
            let qualifiers = if result.qualifiers.is_empty() {
                "(none listed)".to_string()
            } else {
                result.qualifiers_joined()
            };
            format!(
                "**{}**\n{}\n{}\n{}\n",
                result.code, description, qualifiers, result.direct_link
            )
        }
    }
}

/// All blocks back to back, surrounding whitespace trimmed.
pub fn render_text(results: &[ExtractionResult]) -> String {
    results
        .iter()
        .map(render_block)
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_result() -> ExtractionResult {
        ExtractionResult {
            code: "5-787.3M".to_string(),
            description: "Entfernung von Osteosynthesematerial: Platte, Tibia".to_string(),
            qualifiers: vec!["R: Rechts".to_string(), "L: Links".to_string()],
            direct_link: "https://gesund.bund.de/ops-code-suche/5-787-3m".to_string(),
            error: None,
        }
    }

    fn failed_result() -> ExtractionResult {
        ExtractionResult {
            code: "0-000".to_string(),
            description: String::new(),
            qualifiers: vec![],
            direct_link: String::new(),
            error: Some("HTTP 404".to_string()),
        }
    }

    #[test]
    fn test_output_row_projection() {
        let row = OutputRow::from(&ok_result());
        assert_eq!(row.qualifiers, "R: Rechts; L: Links");

        let row = OutputRow::from(&failed_result());
        assert_eq!(row.description, "ERROR: HTTP 404");
        assert_eq!(row.qualifiers, "");
        assert_eq!(row.direct_link, "");
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_csv(&[ok_result(), failed_result()], &mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Code,Description,Zusatzkennzeichen,DirectLink");
        assert_eq!(
            lines[1],
            "5-787.3M,\"Entfernung von Osteosynthesematerial: Platte, Tibia\",R: Rechts; L: Links,https://gesund.bund.de/ops-code-suche/5-787-3m"
        );
        assert_eq!(lines[2], "0-000,ERROR: HTTP 404,,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_header_for_empty_batch() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Code,Description,Zusatzkennzeichen,DirectLink\n"
        );
    }

    #[test]
    fn test_text_blocks() {
        let mut empty = ok_result();
        empty.description.clear();
        empty.qualifiers.clear();

        let text = render_text(&[ok_result(), failed_result(), empty]);
        assert_eq!(
            text,
            "**5-787.3M**\nEntfernung von Osteosynthesematerial: Platte, Tibia\nR: Rechts; L: Links\nhttps://gesund.bund.de/ops-code-suche/5-787-3m\n\
             **0-000**\nError: HTTP 404\n\
             **5-787.3M**\n(no description found)\n(none listed)\nhttps://gesund.bund.de/ops-code-suche/5-787-3m"
        );
    }

    #[test]
    fn test_json_output() {
        let mut buf = Vec::new();
        write_json(&[failed_result()], &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["code"], "0-000");
        assert_eq!(value[0]["error"], "HTTP 404");
    }
}
