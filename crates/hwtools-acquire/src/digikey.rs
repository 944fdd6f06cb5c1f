use crate::extract::PriceExtractor;
use crate::normalize::{cell_text, trimmed_text};
use crate::source::{FetchError, HttpPriceSource};
use hwtools_model::PriceResult;
use scraper::{Html, Selector};

/// Digi-Key keyword search endpoint; the product identifier goes in `keywords`.
pub const SEARCH_URL: &str = "https://www.digikey.com/product-search/en";
pub const QUERY_KEY: &str = "keywords";

/// Quantity column text of the price break we report.
const QUANTITY_ONE: &str = "1";

/// Build the HTTP price source for Digi-Key product search pages.
pub fn price_source() -> Result<HttpPriceSource<DigikeyPricingTable>, FetchError> {
    HttpPriceSource::new(SEARCH_URL, QUERY_KEY, DigikeyPricingTable::new())
}

/// Reads the quantity-1 unit price from a Digi-Key product page.
///
/// The price breaks live in `table#pricing`, nested inside the
/// `td.catalog-pricing` cell. Each row is `quantity, unit price, extended
/// price`; the row whose first cell is exactly "1" gives the unit price.
/// The quantity is compared after normalization; the price is returned as
/// the page shows it, trimmed of surrounding whitespace.
pub struct DigikeyPricingTable {
    container: Selector,
    table: Selector,
    row: Selector,
    cell: Selector,
}

impl DigikeyPricingTable {
    pub fn new() -> Self {
        Self {
            container: Selector::parse("td.catalog-pricing").expect("valid selector"),
            table: Selector::parse("table#pricing").expect("valid selector"),
            row: Selector::parse("tr").expect("valid selector"),
            cell: Selector::parse("td").expect("valid selector"),
        }
    }
}

impl Default for DigikeyPricingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceExtractor for DigikeyPricingTable {
    fn extract(&self, html: &str) -> PriceResult {
        let document = Html::parse_document(html);

        let Some(container) = document.select(&self.container).next() else {
            tracing::debug!("No td.catalog-pricing on page");
            return PriceResult::Unavailable;
        };
        let Some(table) = container.select(&self.table).next() else {
            tracing::debug!("No table#pricing inside catalog-pricing cell");
            return PriceResult::Unavailable;
        };

        for tr in table.select(&self.row) {
            let mut cells = tr.select(&self.cell);
            if cells.next().map(cell_text).as_deref() != Some(QUANTITY_ONE) {
                continue;
            }
            return match cells.next().map(trimmed_text) {
                Some(price) if !price.is_empty() => PriceResult::Price(price),
                _ => {
                    tracing::debug!("Quantity-1 row has no price cell");
                    PriceResult::Unavailable
                }
            };
        }

        tracing::debug!("No quantity-1 row in pricing table");
        PriceResult::Unavailable
    }
}
