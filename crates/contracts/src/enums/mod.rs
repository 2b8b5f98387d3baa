pub mod approval_status;
pub mod claim_status;
pub mod commission_status;
pub mod sales_role;

pub use approval_status::ApprovalStatus;
pub use claim_status::ClaimStatus;
pub use commission_status::CommissionStatus;
pub use sales_role::SalesRole;
