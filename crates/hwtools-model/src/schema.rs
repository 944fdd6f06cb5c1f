use crate::table::{LIBREF_COLUMN, PRODUCT_ID_COLUMN};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("BOM has no header row")]
    EmptyTable,

    #[error("required column '{0}' not found in header")]
    MissingColumn(String),
}

/// Column positions resolved from the header by name.
///
/// Header layouts differ between exports, so indices are looked up once
/// before any row is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BomSchema {
    product_id: usize,
    libref: usize,
}

impl BomSchema {
    /// Resolve the required columns. `None` means the table had no rows.
    pub fn resolve(header: Option<&[String]>) -> Result<Self, SchemaError> {
        let header = header.ok_or(SchemaError::EmptyTable)?;
        Ok(Self {
            product_id: find_column(header, PRODUCT_ID_COLUMN)?,
            libref: find_column(header, LIBREF_COLUMN)?,
        })
    }

    pub fn product_id_index(&self) -> usize {
        self.product_id
    }

    pub fn libref_index(&self) -> usize {
        self.libref
    }

    /// Product identifier of a row; a cell missing from a short row reads as empty.
    pub fn product_id<'a>(&self, row: &'a [String]) -> &'a str {
        cell(row, self.product_id)
    }

    pub fn libref<'a>(&self, row: &'a [String]) -> &'a str {
        cell(row, self.libref)
    }
}

fn find_column(header: &[String], name: &str) -> Result<usize, SchemaError> {
    header
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
