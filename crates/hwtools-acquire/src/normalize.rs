use scraper::ElementRef;
use unicode_normalization::UnicodeNormalization;

/// Normalize scraped text to NFC and collapse all whitespace runs
/// (including non-breaking spaces) into single spaces.
pub fn normalize_text(input: &str) -> String {
    let nfc: String = input.nfc().collect();
    nfc.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of a table cell, normalized.
pub fn cell_text(cell: ElementRef) -> String {
    normalize_text(&cell.text().collect::<String>())
}

/// Visible text of a table cell with only the surrounding whitespace removed.
pub fn trimmed_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
