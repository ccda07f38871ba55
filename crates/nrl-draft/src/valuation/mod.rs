// Valuation: per-position recommendations and the dashboard summary.

pub mod recommend;
pub mod summary;
