// Record processing: normalization, scoring and aggregation

pub mod aggregate;
pub mod normalize;
pub mod sentiment;
