pub mod comparison;
pub mod portfolio;
pub mod prices;

pub use comparison::{ComparisonResult, ComparisonRun, ReturnSeries};
pub use portfolio::{Portfolio, PortfolioSpec};
pub use prices::PriceTable;
