/// One line of a BOM: cells in the order they appear in the file.
pub type Row = Vec<String>;

/// Header name of the column holding the Digi-Key catalog number.
pub const PRODUCT_ID_COLUMN: &str = "Supplier - Digikey";

/// Header name of the human-readable library reference, used in diagnostics.
pub const LIBREF_COLUMN: &str = "LibRef";

/// Header cell appended to the header row when prices are added.
pub const PRICE_COLUMN: &str = "Single Price";

/// Index of the first row that carries a line item. Row 0 is the header,
/// row 1 is a descriptive row that is never priced.
pub const FIRST_PRICED_ROW: usize = 2;

/// An in-memory bill of materials.
///
/// Rows keep their original order and length; nothing here enforces a
/// rectangular shape. Row 0, when present, is the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BomTable {
    rows: Vec<Row>,
}

impl BomTable {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn header_mut(&mut self) -> Option<&mut Row> {
        self.rows.first_mut()
    }

    /// Line-item rows eligible for pricing, paired with their row index.
    pub fn line_items_mut(&mut self) -> impl Iterator<Item = (usize, &mut Row)> {
        self.rows
            .iter_mut()
            .enumerate()
            .skip(FIRST_PRICED_ROW)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Row>> for BomTable {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}
