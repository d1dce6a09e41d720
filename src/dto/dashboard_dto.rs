use serde::Serialize;

use crate::models::candidate::CandidateRecord;
use crate::models::interview::InterviewRecord;
use crate::models::offer::OfferRecord;
use crate::models::pipeline::PipelineStage;
use crate::services::dashboard_service::DashboardChange;

/// Candidate list wording for a stage.
pub fn candidate_status_label(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::New => "New application",
        PipelineStage::Review => "Under review",
        PipelineStage::Interview => "Interviewing",
        PipelineStage::Offer => "Offer extended",
        PipelineStage::Hired => "Hired",
        PipelineStage::Rejected => "Not selected",
    }
}

/// Interview page wording for a stage.
pub fn interview_phase_label(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::New => "Screening",
        PipelineStage::Review => "Shortlisted",
        PipelineStage::Interview => "Committee interview",
        PipelineStage::Offer => "Final approval",
        PipelineStage::Hired => "Onboarding",
        PipelineStage::Rejected => "Closed",
    }
}

/// Offer page wording for a stage.
pub fn offer_stage_label(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::New | PipelineStage::Review | PipelineStage::Interview => "Pre-offer",
        PipelineStage::Offer => "Awaiting response",
        PipelineStage::Hired => "Signed",
        PipelineStage::Rejected => "Closed",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateRow {
    #[serde(flatten)]
    pub record: CandidateRecord,
    pub status_label: &'static str,
}

impl From<CandidateRecord> for CandidateRow {
    fn from(record: CandidateRecord) -> Self {
        Self {
            status_label: candidate_status_label(record.stage),
            record,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferRow {
    #[serde(flatten)]
    pub record: OfferRecord,
    pub candidate_stage: Option<PipelineStage>,
    pub stage_label: Option<&'static str>,
}

impl OfferRow {
    pub fn new(record: OfferRecord, candidate_stage: Option<PipelineStage>) -> Self {
        Self {
            record,
            candidate_stage,
            stage_label: candidate_stage.map(offer_stage_label),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewRow {
    #[serde(flatten)]
    pub record: InterviewRecord,
    pub candidate_stage: Option<PipelineStage>,
    pub phase_label: Option<&'static str>,
    pub average_score: Option<f64>,
}

impl InterviewRow {
    pub fn new(record: InterviewRecord, candidate_stage: Option<PipelineStage>) -> Self {
        Self {
            average_score: record.evaluation.as_ref().map(|e| e.average()),
            phase_label: candidate_stage.map(interview_phase_label),
            candidate_stage,
            record,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub changed: DashboardChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_page_names_stages_its_own_way() {
        let stage = PipelineStage::Offer;
        assert_eq!(candidate_status_label(stage), "Offer extended");
        assert_eq!(interview_phase_label(stage), "Final approval");
        assert_eq!(offer_stage_label(stage), "Awaiting response");
    }
}
