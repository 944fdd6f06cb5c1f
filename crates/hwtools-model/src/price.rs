/// Outcome of a price lookup for a single product identifier.
///
/// Prices are opaque text copied from the vendor page (e.g. "$0.42");
/// they are never parsed into numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceResult {
    /// Unit price at quantity 1.
    Price(String),
    /// The page was retrieved but carried no quantity-1 price.
    Unavailable,
}
