pub mod aggregate;

pub use aggregate::{GoalProgress, SalesGoal, SalesGoalDto, SalesGoalId};
