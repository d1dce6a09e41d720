use std::collections::BTreeMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::candidate::CandidateRecord;
use crate::models::interview::{Evaluation, InterviewRecord, Recommendation};
use crate::models::offer::{OfferRecord, OfferStatus};
use crate::models::pipeline::PipelineStage;
use crate::models::position::{PositionRecord, PositionStatus};

pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Candidate,
    Offer,
    Interview,
    Position,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Candidate => "candidate",
            RecordKind::Offer => "offer",
            RecordKind::Interview => "interview",
            RecordKind::Position => "position",
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: Uuid },
    #[error("cannot move a candidate from {from} to {to}")]
    InvalidTransition {
        from: PipelineStage,
        to: PipelineStage,
    },
    #[error("scores must be between 1 and 5, got {0}")]
    InvalidScore(u8),
}

/// What the list pages need to know about a row to filter and order it.
pub trait DashboardRecord: Clone {
    fn search_fields(&self) -> Vec<&str>;
    fn status_key(&self) -> &'static str;
    fn business_unit(&self) -> &str;
    fn primary_date(&self) -> NaiveDate;
    fn display_name(&self) -> &str;
}

impl DashboardRecord for CandidateRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.position.as_str()]
    }

    fn status_key(&self) -> &'static str {
        self.stage.key()
    }

    fn business_unit(&self) -> &str {
        &self.business_unit
    }

    fn primary_date(&self) -> NaiveDate {
        self.applied_on
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl DashboardRecord for OfferRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.candidate_name.as_str(), self.position.as_str()]
    }

    fn status_key(&self) -> &'static str {
        self.status.key()
    }

    fn business_unit(&self) -> &str {
        &self.business_unit
    }

    fn primary_date(&self) -> NaiveDate {
        self.sent_on
    }

    fn display_name(&self) -> &str {
        &self.candidate_name
    }
}

impl DashboardRecord for InterviewRecord {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.candidate_name.as_str(), self.position.as_str()];
        fields.extend(self.committee.iter().map(String::as_str));
        fields
    }

    fn status_key(&self) -> &'static str {
        match self.evaluation {
            Some(_) => "evaluated",
            None => "scheduled",
        }
    }

    fn business_unit(&self) -> &str {
        &self.business_unit
    }

    fn primary_date(&self) -> NaiveDate {
        self.scheduled_on
    }

    fn display_name(&self) -> &str {
        &self.candidate_name
    }
}

impl DashboardRecord for PositionRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.business_unit.as_str()]
    }

    fn status_key(&self) -> &'static str {
        self.status.key()
    }

    fn business_unit(&self) -> &str {
        &self.business_unit
    }

    fn primary_date(&self) -> NaiveDate {
        self.opened_on
    }

    fn display_name(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub business_unit: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl DashboardQuery {
    fn matches<R: DashboardRecord>(&self, record: &R) -> bool {
        if let Some(needle) = non_blank(&self.search) {
            let needle = needle.to_lowercase();
            if !record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        if let Some(status) = non_blank(&self.status) {
            if !record.status_key().eq_ignore_ascii_case(status) {
                return false;
            }
        }
        if let Some(unit) = non_blank(&self.business_unit) {
            if !record.business_unit().eq_ignore_ascii_case(unit) {
                return false;
            }
        }
        let date = record.primary_date();
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Records matching `query`, newest first, ties broken by name.
pub fn filter_records<'a, R: DashboardRecord>(records: &'a [R], query: &DashboardQuery) -> Vec<&'a R> {
    let mut matched: Vec<&R> = records.iter().filter(|r| query.matches(*r)).collect();
    matched.sort_by(|a, b| {
        b.primary_date()
            .cmp(&a.primary_date())
            .then_with(|| a.display_name().cmp(b.display_name()))
    });
    matched
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

pub fn paginate<R: Clone>(matched: &[&R], page: Option<usize>, per_page: usize) -> Page<R> {
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let page = page.unwrap_or(1).max(1);
    let total = matched.len();
    let items = matched
        .iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .map(|r| (*r).clone())
        .collect();
    Page {
        items,
        page,
        per_page,
        total,
        total_pages: total.div_ceil(per_page),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateKpis {
    pub total: usize,
    pub by_stage: BTreeMap<&'static str, usize>,
    pub average_score: f64,
    pub hired: usize,
}

pub fn candidate_kpis(records: &[&CandidateRecord]) -> CandidateKpis {
    let mut by_stage: BTreeMap<&'static str, usize> =
        PipelineStage::ALL.iter().map(|s| (s.key(), 0)).collect();
    for record in records {
        *by_stage.entry(record.stage.key()).or_default() += 1;
    }
    CandidateKpis {
        total: records.len(),
        average_score: mean(records.iter().map(|r| r.assessment_score)),
        hired: by_stage[PipelineStage::Hired.key()],
        by_stage,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferKpis {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub declined: usize,
    /// Accepted over accepted plus declined.
    pub acceptance_rate: f64,
    pub average_salary: Decimal,
}

pub fn offer_kpis(records: &[&OfferRecord]) -> OfferKpis {
    let count = |status: OfferStatus| records.iter().filter(|r| r.status == status).count();
    let accepted = count(OfferStatus::Accepted);
    let declined = count(OfferStatus::Declined);
    let average_salary = if records.is_empty() {
        Decimal::ZERO
    } else {
        (records.iter().map(|r| r.salary).sum::<Decimal>() / Decimal::from(records.len()))
            .round_dp(2)
    };
    OfferKpis {
        total: records.len(),
        pending: count(OfferStatus::Pending),
        accepted,
        declined,
        acceptance_rate: ratio(accepted, accepted + declined),
        average_salary,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewKpis {
    pub total: usize,
    pub evaluated: usize,
    pub awaiting_evaluation: usize,
    pub average_score: f64,
    pub hire_recommendations: usize,
}

pub fn interview_kpis(records: &[&InterviewRecord]) -> InterviewKpis {
    let evaluations: Vec<&Evaluation> = records.iter().filter_map(|r| r.evaluation.as_ref()).collect();
    InterviewKpis {
        total: records.len(),
        evaluated: evaluations.len(),
        awaiting_evaluation: records.len() - evaluations.len(),
        average_score: mean(evaluations.iter().map(|e| e.average())),
        hire_recommendations: evaluations
            .iter()
            .filter(|e| e.recommendation == Recommendation::Hire)
            .count(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionKpis {
    pub positions: usize,
    pub planned_headcount: u32,
    pub filled_headcount: u32,
    pub open_vacancies: u32,
    pub fill_rate: f64,
}

pub fn position_kpis(records: &[&PositionRecord]) -> PositionKpis {
    let planned: u32 = records.iter().map(|r| r.planned_headcount).sum();
    let filled: u32 = records.iter().map(|r| r.filled_headcount).sum();
    PositionKpis {
        positions: records.len(),
        planned_headcount: planned,
        filled_headcount: filled,
        open_vacancies: records.iter().map(|r| r.open_vacancies()).sum(),
        fill_rate: ratio(filled as usize, planned as usize),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView<T, K> {
    #[serde(flatten)]
    pub page: Page<T>,
    pub kpis: K,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardAction {
    AdvanceCandidate { id: Uuid, stage: PipelineStage },
    RejectCandidate { id: Uuid },
    SetOfferStatus { id: Uuid, status: OfferStatus },
    RecordEvaluation { id: Uuid, evaluation: Evaluation },
    SetPositionStatus { id: Uuid, status: PositionStatus },
}

/// The record an action touched, after the change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum DashboardChange {
    Candidate(CandidateRecord),
    Offer(OfferRecord),
    Interview(InterviewRecord),
    Position(PositionRecord),
}

#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub candidates: Vec<CandidateRecord>,
    pub offers: Vec<OfferRecord>,
    pub interviews: Vec<InterviewRecord>,
    pub positions: Vec<PositionRecord>,
}

fn find_mut<'a, T>(
    records: &'a mut [T],
    kind: RecordKind,
    id: Uuid,
    id_of: impl Fn(&T) -> Uuid,
) -> Result<&'a mut T, DashboardError> {
    records
        .iter_mut()
        .find(|r| id_of(r) == id)
        .ok_or(DashboardError::NotFound { kind, id })
}

impl DashboardData {
    fn move_candidate(&mut self, id: Uuid, to: PipelineStage) -> Result<&CandidateRecord, DashboardError> {
        let candidate = find_mut(&mut self.candidates, RecordKind::Candidate, id, |c| c.id)?;
        if !candidate.stage.can_transition_to(to) {
            return Err(DashboardError::InvalidTransition {
                from: candidate.stage,
                to,
            });
        }
        tracing::info!(candidate_id = %id, from = %candidate.stage, to = %to, "Candidate moved");
        candidate.stage = to;
        Ok(candidate)
    }

    fn apply(&mut self, action: DashboardAction) -> Result<DashboardChange, DashboardError> {
        match action {
            DashboardAction::AdvanceCandidate { id, stage } => {
                Ok(DashboardChange::Candidate(self.move_candidate(id, stage)?.clone()))
            }
            DashboardAction::RejectCandidate { id } => Ok(DashboardChange::Candidate(
                self.move_candidate(id, PipelineStage::Rejected)?.clone(),
            )),
            DashboardAction::SetOfferStatus { id, status } => {
                let offer = find_mut(&mut self.offers, RecordKind::Offer, id, |o| o.id)?;
                offer.status = status;
                let offer = offer.clone();
                tracing::info!(offer_id = %id, status = status.key(), "Offer status changed");

                let follow_up = match status {
                    OfferStatus::Accepted => Some(PipelineStage::Hired),
                    OfferStatus::Declined => Some(PipelineStage::Rejected),
                    OfferStatus::Pending | OfferStatus::Withdrawn => None,
                };
                if let Some(stage) = follow_up {
                    if let Err(e) = self.move_candidate(offer.candidate_id, stage) {
                        tracing::warn!(offer_id = %id, error = %e, "Candidate stage left unchanged");
                    }
                }
                Ok(DashboardChange::Offer(offer))
            }
            DashboardAction::RecordEvaluation { id, evaluation } => {
                for score in [
                    evaluation.technical,
                    evaluation.communication,
                    evaluation.culture_fit,
                ] {
                    if !(1..=5).contains(&score) {
                        return Err(DashboardError::InvalidScore(score));
                    }
                }
                let interview = find_mut(&mut self.interviews, RecordKind::Interview, id, |i| i.id)?;
                interview.evaluation = Some(evaluation);
                tracing::info!(interview_id = %id, "Interview evaluation recorded");
                Ok(DashboardChange::Interview(interview.clone()))
            }
            DashboardAction::SetPositionStatus { id, status } => {
                let position = find_mut(&mut self.positions, RecordKind::Position, id, |p| p.id)?;
                position.status = status;
                tracing::info!(position_id = %id, status = status.key(), "Position status changed");
                Ok(DashboardChange::Position(position.clone()))
            }
        }
    }
}

/// In-memory records behind the four HR dashboards.
#[derive(Debug, Default)]
pub struct DashboardStore {
    data: RwLock<DashboardData>,
}

impl DashboardStore {
    pub fn new(data: DashboardData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&DashboardData) -> T) -> T {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn dispatch(&self, action: DashboardAction) -> Result<DashboardChange, DashboardError> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        guard.apply(action)
    }

    pub fn candidate_stage(&self, id: Uuid) -> Option<PipelineStage> {
        self.read(|d| d.candidates.iter().find(|c| c.id == id).map(|c| c.stage))
    }

    pub fn candidates(
        &self,
        query: &DashboardQuery,
        per_page: usize,
    ) -> DashboardView<CandidateRecord, CandidateKpis> {
        self.read(|d| {
            let matched = filter_records(&d.candidates, query);
            DashboardView {
                kpis: candidate_kpis(&matched),
                page: paginate(&matched, query.page, query.per_page.unwrap_or(per_page)),
            }
        })
    }

    pub fn offers(&self, query: &DashboardQuery, per_page: usize) -> DashboardView<OfferRecord, OfferKpis> {
        self.read(|d| {
            let matched = filter_records(&d.offers, query);
            DashboardView {
                kpis: offer_kpis(&matched),
                page: paginate(&matched, query.page, query.per_page.unwrap_or(per_page)),
            }
        })
    }

    pub fn interviews(
        &self,
        query: &DashboardQuery,
        per_page: usize,
    ) -> DashboardView<InterviewRecord, InterviewKpis> {
        self.read(|d| {
            let matched = filter_records(&d.interviews, query);
            DashboardView {
                kpis: interview_kpis(&matched),
                page: paginate(&matched, query.page, query.per_page.unwrap_or(per_page)),
            }
        })
    }

    pub fn positions(
        &self,
        query: &DashboardQuery,
        per_page: usize,
    ) -> DashboardView<PositionRecord, PositionKpis> {
        self.read(|d| {
            let matched = filter_records(&d.positions, query);
            DashboardView {
                kpis: position_kpis(&matched),
                page: paginate(&matched, query.page, query.per_page.unwrap_or(per_page)),
            }
        })
    }
}
