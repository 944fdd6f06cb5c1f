pub mod table;
pub mod schema;
pub mod price;

pub use table::*;
pub use schema::*;
pub use price::*;
