use hwtools_model::PriceResult;

/// Pulls a quantity-1 unit price out of a vendor page.
///
/// Implementations hold the vendor-specific markup heuristics so the
/// fetch path stays generic and extraction can be tested on canned HTML.
pub trait PriceExtractor {
    fn extract(&self, html: &str) -> PriceResult;
}

impl<F> PriceExtractor for F
where
    F: Fn(&str) -> PriceResult,
{
    fn extract(&self, html: &str) -> PriceResult {
        self(html)
    }
}
