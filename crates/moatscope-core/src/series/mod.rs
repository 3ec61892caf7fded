pub mod financial_series;
pub mod math;

pub use financial_series::{
    FinancialSeries, FinancialSeriesInput, LineItem, QuarterlySeries, QuarterlySeriesInput,
};
