pub mod dto;

pub use dto::{SalesOverviewRequest, SalesOverviewResponse, SalespersonSummary};
