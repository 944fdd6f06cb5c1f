use crate::BomError;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use hwtools_model::BomTable;
use std::io::Write;
use std::path::{Path, PathBuf};

const INPUT_SUFFIX: &str = ".csv";
const OUTPUT_SUFFIX: &str = "-prices.csv";

/// Output path for a priced BOM.
///
/// Plain string substitution, not path-aware: every ".csv" becomes
/// "-prices.csv", and a path without ".csv" gets "-prices.csv" appended.
pub fn output_path(input: &Path) -> PathBuf {
    let input = input.to_string_lossy();
    if input.contains(INPUT_SUFFIX) {
        PathBuf::from(input.replace(INPUT_SUFFIX, OUTPUT_SUFFIX))
    } else {
        PathBuf::from(format!("{input}{OUTPUT_SUFFIX}"))
    }
}

/// Write the table in the same CSV dialect it was read in, replacing any
/// existing file. Fields are quoted only when they need it; empty rows are
/// written as blank lines.
pub fn write_bom(path: &Path, table: &BomTable) -> Result<(), BomError> {
    let write_err = |source| BomError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .flexible(true)
        .delimiter(b',')
        .quote(b'"')
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_path(path)
        .map_err(write_err)?;

    for row in table.rows() {
        if row.is_empty() {
            // A blank line, as it was read; bypass the record encoder.
            writer
                .flush()
                .and_then(|()| {
                    let mut file = writer.get_ref();
                    file.write_all(b"\r\n")
                })
                .map_err(|e| write_err(csv::Error::from(e)))?;
        } else {
            writer.write_record(row).map_err(write_err)?;
        }
    }
    writer
        .flush()
        .map_err(|e| write_err(csv::Error::from(e)))?;

    tracing::debug!(path = %path.display(), rows = table.len(), "Wrote BOM");
    Ok(())
}
