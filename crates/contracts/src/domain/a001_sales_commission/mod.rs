pub mod aggregate;
pub mod metrics;
pub mod splits;

pub use aggregate::{
    EstimateUpdateRequest, SalesCommission, SalesCommissionDto, SalesCommissionId,
    SalesCommissionListQuery, SalesCommissionPatch, SalesCommissionView, SaveSplitsRequest,
    SaveSplitsResponse, SplitParticipantDto,
};
pub use metrics::{CommissionFigures, CommissionInputs, DealPreview};
pub use splits::{SplitError, SplitParticipant, SplitPlan, SplitWarning};
