pub mod aggregate;

pub use aggregate::{Adjuster, AdjusterDto, AdjusterId};
