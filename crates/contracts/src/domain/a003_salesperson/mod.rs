pub mod aggregate;

pub use aggregate::{Salesperson, SalespersonDto, SalespersonId};
