use serde::{Deserialize, Serialize};

/// Статус согласования плана продаж
///
/// draft → submitted → approved, либо submitted → rejected → submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Draft => "draft",
            ApprovalStatus::Submitted => "submitted",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "draft" => Some(ApprovalStatus::Draft),
            "submitted" => Some(ApprovalStatus::Submitted),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }

    /// План можно редактировать только до отправки или после отклонения
    pub fn is_editable(&self) -> bool {
        matches!(self, ApprovalStatus::Draft | ApprovalStatus::Rejected)
    }

    pub fn can_transition_to(&self, next: ApprovalStatus) -> bool {
        use ApprovalStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted) | (Rejected, Submitted) | (Submitted, Approved) | (Submitted, Rejected)
        )
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ApprovalStatus::*;

    #[test]
    fn workflow_transitions() {
        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(Rejected.can_transition_to(Submitted));

        assert!(!Draft.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Draft));
        assert!(!Approved.can_transition_to(Submitted));
    }

    #[test]
    fn only_draft_and_rejected_are_editable() {
        assert!(Draft.is_editable());
        assert!(Rejected.is_editable());
        assert!(!Submitted.is_editable());
        assert!(!Approved.is_editable());
    }
}
