pub mod aggregate;

pub use aggregate::{PlanReviewRequest, SalesPlan, SalesPlanDto, SalesPlanId};
