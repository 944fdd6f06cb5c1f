use crate::BomError;
use csv::{ByteRecord, ReaderBuilder};
use hwtools_model::{BomTable, Row};
use std::fs;
use std::path::Path;

/// Load a comma-delimited, double-quoted BOM file.
///
/// Every line becomes a row, the header included; rows keep their own
/// lengths and blank lines are kept as empty rows, so row indices match
/// line order in the file. Bytes that are not valid UTF-8 are replaced
/// rather than rejected, since EDA exports are not always clean UTF-8.
pub fn read_bom(path: &Path) -> Result<BomTable, BomError> {
    let read_err = |source| BomError::Read {
        path: path.to_path_buf(),
        source,
    };

    let bytes = fs::read(path).map_err(|e| read_err(csv::Error::from(e)))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b',')
        .quote(b'"')
        .from_reader(bytes.as_slice());

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    // End offset of the previous record; None before the first one.
    let mut prev_end: Option<usize> = None;
    while reader.read_byte_record(&mut record).map_err(read_err)? {
        let end = byte_offset(reader.position().byte());
        let start = prev_end.unwrap_or(0);
        rows.extend(blank_rows(&bytes, prev_end, start, end));
        rows.push(decode_record(&record));
        prev_end = Some(end);
    }
    let start = prev_end.unwrap_or(0);
    rows.extend(blank_rows(&bytes, prev_end, start, bytes.len()));

    tracing::debug!(path = %path.display(), rows = rows.len(), "Read BOM");
    Ok(BomTable::new(rows))
}

fn byte_offset(position: u64) -> usize {
    usize::try_from(position).unwrap_or(usize::MAX)
}

/// Empty rows for the blank lines the csv reader skipped in `bytes[start..end]`.
///
/// The gap opens with the line breaks ahead of the next record. When the
/// previous record's own terminator was left unconsumed it also sits at the
/// front of the gap and is not a blank line.
fn blank_rows(bytes: &[u8], prev_end: Option<usize>, start: usize, end: usize) -> Vec<Row> {
    let end = end.min(bytes.len());
    let start = start.min(end);
    let mut gap = &bytes[start..end];

    let prev_terminated = match prev_end {
        Some(prev) if prev > 0 => matches!(bytes.get(prev - 1), Some(b'\r' | b'\n')),
        _ => true,
    };
    // CRLF split across two reads: the '\n' belongs to the previous record.
    if prev_end.is_some() && prev_terminated && bytes.get(start.wrapping_sub(1)) == Some(&b'\r') {
        if let Some(rest) = gap.strip_prefix(b"\n") {
            gap = rest;
        }
    }

    let breaks = leading_line_breaks(gap);
    let blanks = if prev_terminated { breaks } else { breaks.saturating_sub(1) };
    vec![Row::new(); blanks]
}

/// Count line breaks ("\r\n", "\r" or "\n") before the first other byte.
fn leading_line_breaks(bytes: &[u8]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                count += 1;
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
            }
            b'\n' => {
                count += 1;
                i += 1;
            }
            _ => break,
        }
    }
    count
}

fn decode_record(record: &ByteRecord) -> Row {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}
