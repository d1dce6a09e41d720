use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a candidate in the hiring pipeline. Shared by every dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    New,
    Review,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 6] = [
        PipelineStage::New,
        PipelineStage::Review,
        PipelineStage::Interview,
        PipelineStage::Offer,
        PipelineStage::Hired,
        PipelineStage::Rejected,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PipelineStage::New => "new",
            PipelineStage::Review => "review",
            PipelineStage::Interview => "interview",
            PipelineStage::Offer => "offer",
            PipelineStage::Hired => "hired",
            PipelineStage::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.key().eq_ignore_ascii_case(value))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Hired | PipelineStage::Rejected)
    }

    pub fn next(self) -> Option<Self> {
        match self {
            PipelineStage::New => Some(PipelineStage::Review),
            PipelineStage::Review => Some(PipelineStage::Interview),
            PipelineStage::Interview => Some(PipelineStage::Offer),
            PipelineStage::Offer => Some(PipelineStage::Hired),
            PipelineStage::Hired | PipelineStage::Rejected => None,
        }
    }

    /// One step forward, or straight to rejected from any open stage.
    pub fn can_transition_to(self, target: PipelineStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == PipelineStage::Rejected || self.next() == Some(target)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_advance_one_step_at_a_time() {
        assert!(PipelineStage::New.can_transition_to(PipelineStage::Review));
        assert!(!PipelineStage::New.can_transition_to(PipelineStage::Interview));
        assert!(PipelineStage::Offer.can_transition_to(PipelineStage::Hired));
        assert!(!PipelineStage::Review.can_transition_to(PipelineStage::New));
    }

    #[test]
    fn rejection_is_open_until_terminal() {
        for stage in [
            PipelineStage::New,
            PipelineStage::Review,
            PipelineStage::Interview,
            PipelineStage::Offer,
        ] {
            assert!(stage.can_transition_to(PipelineStage::Rejected));
        }
        assert!(!PipelineStage::Hired.can_transition_to(PipelineStage::Rejected));
        assert!(!PipelineStage::Rejected.can_transition_to(PipelineStage::Review));
    }

    #[test]
    fn parse_accepts_any_case() {
        assert_eq!(PipelineStage::parse("Interview"), Some(PipelineStage::Interview));
        assert_eq!(PipelineStage::parse("phase-3"), None);
    }
}
