//! Ledger export formats
//!
//! Three read-only renditions of a span set: newline-delimited JSON
//! (one compact object per line, trailing newline), a pretty-printed
//! JSON array, and CSV with a fixed column order.

use std::fmt;
use std::str::FromStr;

use pacta_domain::Span;

use crate::StoreError;

/// Fixed CSV column order; `signature` is the empty string when the
/// span is unsigned.
const CSV_HEADER: &str = "id,trace_id,type,entity,started_at,hash,signature";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One compact span object per line, trailing newline
    Ndjson,
    /// Pretty-printed array of all spans
    Json,
    /// Fixed columns: id, trace_id, type, entity, started_at, hash, signature
    Csv,
}

impl FromStr for ExportFormat {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ndjson" => Ok(ExportFormat::Ndjson),
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(StoreError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::Ndjson => "ndjson",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        };
        write!(f, "{}", s)
    }
}

/// Render a span set in the given format
pub fn export_spans(spans: &[Span], format: ExportFormat) -> Result<String, StoreError> {
    match format {
        ExportFormat::Ndjson => {
            let mut out = String::new();
            for span in spans {
                out.push_str(&serde_json::to_string(span)?);
                out.push('\n');
            }
            Ok(out)
        }
        ExportFormat::Json => Ok(serde_json::to_string_pretty(spans)?),
        ExportFormat::Csv => {
            let mut out = String::from(CSV_HEADER);
            out.push('\n');
            for span in spans {
                let signature = span
                    .confirmation
                    .as_ref()
                    .map(|c| c.signature.as_str())
                    .unwrap_or("");
                let row = [
                    span.id.as_str(),
                    &span.trace_id,
                    &span.span_type,
                    &span.entity,
                    &span.started_at,
                    &span.integrity.hash,
                    signature,
                ];
                let escaped: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
                out.push_str(&escaped.join(","));
                out.push('\n');
            }
            Ok(out)
        }
    }
}

/// RFC 4180 quoting: fields containing commas, quotes, or newlines
/// are wrapped in double quotes with inner quotes doubled.
fn csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacta_domain::{Confirmation, Span, SpanBody};
    use serde_json::json;

    fn spans() -> Vec<Span> {
        let mut s1 = Span::new(
            "t1",
            "contract.created",
            "minicontrato",
            SpanBody::new("create_contract", json!({"title": "Aluguel"})),
        );
        s1.id = "s1".into();
        s1.integrity.hash = "blake3:aa".to_string();
        s1.confirmation = Some(Confirmation {
            signature: "ed25519:bb".to_string(),
            domain: "pacta.local".to_string(),
            timestamp: s1.started_at.clone(),
            signer_id: "user-1".to_string(),
        });

        let mut s2 = Span::new(
            "t1",
            "obligation.added",
            "minicontrato",
            SpanBody::new("add_obligation", json!({})),
        );
        s2.id = "s2".into();
        s2.integrity.hash = "blake3:cc".to_string();

        vec![s1, s2]
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("ndjson".parse::<ExportFormat>().unwrap(), ExportFormat::Ndjson);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);

        let err = "xml".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFormat(f) if f == "xml"));
    }

    #[test]
    fn test_ndjson_one_line_per_span() {
        let out = export_spans(&spans(), ExportFormat::Ndjson).unwrap();
        assert!(out.ends_with('\n'));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let span: Span = serde_json::from_str(line).unwrap();
            assert!(!span.trace_id.is_empty());
        }
    }

    #[test]
    fn test_json_array_roundtrip() {
        let original = spans();
        let out = export_spans(&original, ExportFormat::Json).unwrap();
        let back: Vec<Span> = serde_json::from_str(&out).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_csv_columns_and_empty_signature() {
        let out = export_spans(&spans(), ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 3);

        let signed: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(signed[0], "s1");
        assert_eq!(signed[5], "blake3:aa");
        assert_eq!(signed[6], "ed25519:bb");

        // Unsigned span ends with an empty signature field
        assert!(lines[2].ends_with(','));
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_export_empty_set() {
        let out = export_spans(&[], ExportFormat::Ndjson).unwrap();
        assert_eq!(out, "");
        let out = export_spans(&[], ExportFormat::Json).unwrap();
        assert_eq!(out, "[]");
        let out = export_spans(&[], ExportFormat::Csv).unwrap();
        assert_eq!(out, format!("{}\n", CSV_HEADER));
    }
}
