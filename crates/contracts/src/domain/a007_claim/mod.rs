pub mod aggregate;

pub use aggregate::{Claim, ClaimDto, ClaimId, ClaimListQuery};
