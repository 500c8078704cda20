use crate::error::{KpiError, Result};
use crate::model::ParsedTable;
use csv::{ReaderBuilder, StringRecord, Trim};

const BOM: char = '\u{feff}';

/// Tokenize one version of the tracked file.
///
/// The first record is the header. Records whose field count differs from the
/// header are returned unchanged; deciding what to do with them is up to the
/// caller. Fails with [`KpiError::MalformedInput`] when the bytes are not UTF-8
/// or a quoted field is never closed.
pub fn parse(raw: &[u8]) -> Result<ParsedTable> {
    let content = std::str::from_utf8(raw)
        .map_err(|e| KpiError::MalformedInput(format!("invalid UTF-8: {e}")))?;
    let content = content.strip_prefix(BOM).unwrap_or(content);

    if has_unterminated_quote(content.as_bytes()) {
        return Err(KpiError::MalformedInput("unterminated quoted field".to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => into_fields(record.map_err(malformed)?),
        None => return Ok(ParsedTable::default()),
    };

    let mut rows = Vec::new();
    for record in records {
        rows.push(into_fields(record.map_err(malformed)?));
    }

    Ok(ParsedTable { header, rows })
}

fn into_fields(record: StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

fn malformed(err: csv::Error) -> KpiError {
    match err.position() {
        Some(pos) => KpiError::MalformedInput(format!("line {}: {err}", pos.line())),
        None => KpiError::MalformedInput(err.to_string()),
    }
}

/// The csv reader silently runs an open quote to end of input, so detect it
/// up front. Quotes only open a quoted field at the start of a field; `""`
/// inside a quoted field is an escaped quote.
fn has_unterminated_quote(bytes: &[u8]) -> bool {
    let mut in_quotes = false;
    let mut field_start = true;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            if b == b'"' {
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 1;
                } else {
                    in_quotes = false;
                }
            }
        } else {
            match b {
                b'"' if field_start => in_quotes = true,
                b',' | b'\n' | b'\r' => {
                    field_start = true;
                    i += 1;
                    continue;
                }
                _ => {}
            }
            field_start = false;
        }
        i += 1;
    }

    in_quotes
}
