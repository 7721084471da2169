use super::table::Table;
use crate::workflows::jobsearch::flatten_hit;
use serde_json::Value;
use std::io::Read;

/// Reads a delimited export. Swedish spreadsheet tools default to `;`, so the
/// delimiter is sniffed from the header line.
pub fn read_csv<R: Read>(mut reader: R) -> Result<Table, csv::Error> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&bytes))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let headers = csv_reader
        .byte_headers()?
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect();
    let mut table = Table::new(headers);

    for record in csv_reader.byte_records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let semicolons = header_line.iter().filter(|b| **b == b';').count();
    let commas = header_line.iter().filter(|b| **b == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Reads job-search hits, either a full search response (`{"hits": [...]}`)
/// or a bare array, flattening each hit into dotted columns.
pub fn read_json_hits<R: Read>(reader: R) -> Result<Table, serde_json::Error> {
    let value: Value = serde_json::from_reader(reader)?;
    let hits = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("hits") {
            Some(Value::Array(items)) => items,
            Some(_) => Vec::new(),
            None => vec![Value::Object(object)],
        },
        _ => Vec::new(),
    };

    let records: Vec<_> = hits.iter().map(flatten_hit).collect();
    Ok(Table::from_records(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_csv_detects_semicolon_exports() {
        let table = read_csv(Cursor::new(
            "orgnr;Säljare\n556123-4567;Eva\n556000-0001\n",
        ))
        .expect("csv parses");
        assert_eq!(table.headers, vec!["orgnr".to_string(), "Säljare".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1], vec!["556000-0001".to_string(), String::new()]);
    }

    #[test]
    fn read_csv_keeps_quoted_commas() {
        let table = read_csv(Cursor::new(
            "headline,description\nKock,\"Ring 08-123456, fråga efter Anna\"\n",
        ))
        .expect("csv parses");
        assert_eq!(table.rows[0][1], "Ring 08-123456, fråga efter Anna");
    }

    #[test]
    fn read_json_hits_accepts_response_and_array() {
        let response = r#"{"total":{"value":1},"hits":[{"id":"1","employer":{"name":"Acme AB"}}]}"#;
        let table = read_json_hits(Cursor::new(response)).expect("json parses");
        assert_eq!(table.len(), 1);
        assert!(table.headers.contains(&"employer.name".to_string()));

        let array = r#"[{"id":"1"},{"id":"2","headline":"Kock"}]"#;
        let table = read_json_hits(Cursor::new(array)).expect("json parses");
        assert_eq!(table.len(), 2);
        assert_eq!(table.headers, vec!["id".to_string(), "headline".to_string()]);
    }
}
