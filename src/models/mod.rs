pub mod product;
pub mod row;

pub use product::*;
pub use row::*;

/// Fallback vendor when the input row names none.
pub const DEFAULT_VENDOR: &str = "Amazon";

/// Tag prepended to every imported product.
pub const IMPORT_TAG: &str = "Amazon Import";
