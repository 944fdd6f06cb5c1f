pub mod digikey;
pub mod extract;
pub mod normalize;
pub mod source;

pub use digikey::DigikeyPricingTable;
pub use extract::PriceExtractor;
pub use source::{FetchError, HttpPriceSource, PriceSource};
