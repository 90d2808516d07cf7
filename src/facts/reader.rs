//! JSON Lines reader for front-end output.
//!
//! One record per line. Blank lines are ignored; a line that is not a valid
//! fact record, including one that is not UTF-8, becomes
//! [`RawEntry::Unparsable`] so that ingestion can count and report it instead
//! of failing the whole run. Only a failing underlying reader is an error.

use super::{FactBatch, RawEntry, RawFact};
use crate::errors::{AssessmentError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Read one batch of facts from a JSON Lines stream.
pub fn read_fact_batch(name: impl Into<String>, reader: impl Read) -> std::io::Result<FactBatch> {
    let mut entries = Vec::new();

    for line in BufReader::new(reader).split(b'\n') {
        let line = line?;
        let text = match String::from_utf8(line) {
            Ok(text) => text,
            Err(e) => {
                entries.push(RawEntry::Unparsable(format!("line is not valid UTF-8: {e}")));
                continue;
            }
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let entry = match serde_json::from_str::<RawFact>(trimmed) {
            Ok(fact) => RawEntry::Fact(fact),
            Err(e) => RawEntry::Unparsable(e.to_string()),
        };
        entries.push(entry);
    }

    Ok(FactBatch {
        name: name.into(),
        entries,
    })
}

/// Read a JSON Lines file as one batch named after the file.
pub fn read_fact_file(path: &Path) -> Result<FactBatch> {
    let file = File::open(path).map_err(|e| AssessmentError::io(path, e))?;
    read_fact_batch(path.display().to_string(), file).map_err(|e| AssessmentError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_reads_records_and_flags_garbage() {
        let input = indoc! {r#"
            {"kind": "reference", "source_unit": "Orders", "target_unit": "Billing"}

            {"kind": "declaration", "source": "Orders", "metadata": {"team": "checkout", "abstract": false}}
            not json at all
        "#};

        let batch = read_fact_batch("orders.jsonl", input.as_bytes()).unwrap();
        assert_eq!(batch.name, "orders.jsonl");
        assert_eq!(batch.len(), 3);
        assert!(matches!(&batch.entries[0], RawEntry::Fact(f) if f.target_unit.as_deref() == Some("Billing")));
        assert!(matches!(&batch.entries[1], RawEntry::Fact(f) if f.source_unit == "Orders"));
        assert!(matches!(batch.entries[2], RawEntry::Unparsable(_)));
    }

    #[test]
    fn test_missing_kind_is_unparsable() {
        let batch = read_fact_batch("x", r#"{"source_unit": "A"}"#.as_bytes()).unwrap();
        assert!(matches!(batch.entries[0], RawEntry::Unparsable(_)));
    }

    #[test]
    fn test_invalid_utf8_line_is_unparsable_and_neighbours_survive() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"kind": "reference", "source_unit": "A", "target_unit": "B"}"#);
        input.extend_from_slice(b"\n\xff\xfe\n");
        input.extend_from_slice(br#"{"kind": "reference", "source_unit": "B", "target_unit": "C"}"#);
        input.extend_from_slice(b"\r\n");

        let batch = read_fact_batch("corrupt.jsonl", input.as_slice()).unwrap();
        assert_eq!(batch.len(), 3);
        assert!(matches!(&batch.entries[0], RawEntry::Fact(f) if f.source_unit == "A"));
        assert!(matches!(&batch.entries[1], RawEntry::Unparsable(reason) if reason.contains("UTF-8")));
        assert!(matches!(&batch.entries[2], RawEntry::Fact(f) if f.source_unit == "B"));
    }
}
