//! CSV export of unit records

use crate::models::UnitRecord;
use std::io::Write;

/// Column names across all records, in first-seen order
///
/// Blocks publish different detail labels, so a later record can introduce
/// a column the earlier ones lack.
pub fn header(records: &[UnitRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for (name, _) in record.fields() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

/// Writes records as CSV with a header row
///
/// Cells for columns a record does not carry are left empty. Nothing is
/// written when there are no records.
pub fn write_csv<W: Write>(w: W, records: &[UnitRecord]) -> csv::Result<()> {
    let columns = header(records);
    if columns.is_empty() {
        return Ok(());
    }

    let mut writer = csv::Writer::from_writer(w);
    writer.write_record(&columns)?;

    for record in records {
        let fields = record.fields();
        writer.write_record(columns.iter().map(|column| {
            fields
                .iter()
                .find(|(name, _)| name == column)
                .map_or("", |(_, value)| *value)
        }))?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlockDetails;

    fn record(block: &str, extra: Option<(&str, &str)>, unit: &str) -> UnitRecord {
        let mut pairs = vec![("Block".to_string(), block.to_string())];
        if let Some((label, value)) = extra {
            pairs.push((label.to_string(), value.to_string()));
        }
        UnitRecord {
            town: "Yishun".to_string(),
            flat_type: "3".to_string(),
            block_id: block.to_string(),
            unit: unit.to_string(),
            price: "$250,000".to_string(),
            size: "70 Sqm".to_string(),
            details: BlockDetails::from_pairs(pairs).unwrap(),
        }
    }

    #[test]
    fn test_csv_layout_and_quoting() {
        let records = vec![
            record("315A", None, "#05-123"),
            record("316B", Some(("Street", "Yishun Ave 9, \"North\"")), "#11-456"),
        ];

        let mut out = Vec::new();
        write_csv(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Town,Flat Type,Block,Price,Size,Unit,Street");
        assert_eq!(lines[1], "Yishun,3,315A,\"$250,000\",70 Sqm,#05-123,");
        assert_eq!(
            lines[2],
            "Yishun,3,316B,\"$250,000\",70 Sqm,#11-456,\"Yishun Ave 9, \"\"North\"\"\""
        );
    }

    #[test]
    fn test_empty_records_write_nothing() {
        let mut out = Vec::new();
        write_csv(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
