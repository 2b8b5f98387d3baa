pub mod aggregate;

pub use aggregate::{CheckDelta, CommissionCheck, CommissionCheckDto, CommissionCheckId};
