use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::candidate::CandidateRecord;
use crate::models::interview::{Evaluation, InterviewRecord, Recommendation};
use crate::models::offer::{OfferRecord, OfferStatus};
use crate::models::pipeline::PipelineStage;
use crate::models::position::{PositionRecord, PositionStatus};
use crate::services::dashboard_service::DashboardData;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn candidate_id(n: u128) -> Uuid {
    Uuid::from_u128(0x1000 + n)
}

struct CandidateSeed(
    u128,
    &'static str,
    &'static str,
    &'static str,
    PipelineStage,
    f64,
    u32,
    NaiveDate,
);

/// Demo records loaded into the dashboard store at startup.
pub fn sample_data() -> DashboardData {
    let candidates: Vec<CandidateRecord> = [
        CandidateSeed(1, "Layla Mansour", "Data Analyst", "Retail", PipelineStage::New, 72.5, 3, day(2024, 5, 2)),
        CandidateSeed(2, "Karim Aziz", "Backend Engineer", "Technology", PipelineStage::Review, 81.0, 5, day(2024, 4, 28)),
        CandidateSeed(3, "Sara Nasser", "Backend Engineer", "Technology", PipelineStage::Interview, 88.0, 7, day(2024, 4, 20)),
        CandidateSeed(4, "Omar Haddad", "Store Manager", "Retail", PipelineStage::Offer, 77.0, 9, day(2024, 4, 11)),
        CandidateSeed(5, "Nadia Farouk", "HR Business Partner", "Corporate", PipelineStage::Hired, 91.5, 8, day(2024, 3, 18)),
        CandidateSeed(6, "Yusuf Rahimov", "Field Engineer", "Energy", PipelineStage::Rejected, 54.0, 2, day(2024, 3, 9)),
        CandidateSeed(7, "Dilnoza Karimova", "Financial Controller", "Corporate", PipelineStage::Offer, 84.0, 10, day(2024, 4, 2)),
        CandidateSeed(8, "Rustam Saidov", "Field Engineer", "Energy", PipelineStage::Interview, 69.5, 4, day(2024, 4, 25)),
    ]
    .into_iter()
    .map(
        |CandidateSeed(n, name, position, unit, stage, score, years, applied_on)| CandidateRecord {
            id: candidate_id(n),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            position: position.to_string(),
            business_unit: unit.to_string(),
            stage,
            assessment_score: score,
            experience_years: years,
            applied_on,
        },
    )
    .collect();

    let name_of = |id: Uuid| {
        candidates
            .iter()
            .find(|c| c.id == id)
            .map(|c| (c.name.clone(), c.position.clone(), c.business_unit.clone()))
            .unwrap_or_default()
    };

    let offers = [
        (0x2001, 4, Decimal::new(4_200_00, 2), day(2024, 5, 6), OfferStatus::Pending),
        (0x2002, 5, Decimal::new(5_800_00, 2), day(2024, 3, 30), OfferStatus::Accepted),
        (0x2003, 7, Decimal::new(7_500_00, 2), day(2024, 4, 22), OfferStatus::Pending),
        (0x2004, 6, Decimal::new(3_900_00, 2), day(2024, 3, 20), OfferStatus::Declined),
    ]
    .into_iter()
    .map(|(id, candidate, salary, sent_on, status)| {
        let candidate_id = candidate_id(candidate);
        let (candidate_name, position, business_unit) = name_of(candidate_id);
        OfferRecord {
            id: Uuid::from_u128(id),
            candidate_id,
            candidate_name,
            position,
            business_unit,
            salary,
            currency: "USD".to_string(),
            sent_on,
            status,
        }
    })
    .collect();

    let interviews = [
        (0x3001, 3, day(2024, 5, 8), None),
        (0x3002, 8, day(2024, 5, 3), None),
        (
            0x3003,
            4,
            day(2024, 4, 18),
            Some(Evaluation {
                technical: 4,
                communication: 5,
                culture_fit: 4,
                recommendation: Recommendation::Hire,
                notes: Some("Strong operations background".to_string()),
            }),
        ),
        (
            0x3004,
            6,
            day(2024, 3, 15),
            Some(Evaluation {
                technical: 2,
                communication: 3,
                culture_fit: 3,
                recommendation: Recommendation::Reject,
                notes: None,
            }),
        ),
    ]
    .into_iter()
    .map(|(id, candidate, scheduled_on, evaluation)| {
        let candidate_id = candidate_id(candidate);
        let (candidate_name, position, business_unit) = name_of(candidate_id);
        InterviewRecord {
            id: Uuid::from_u128(id),
            candidate_id,
            candidate_name,
            position,
            business_unit,
            scheduled_on,
            committee: vec!["HR Lead".to_string(), "Hiring Manager".to_string()],
            evaluation,
        }
    })
    .collect();

    let positions = [
        (0x4001, "Backend Engineer", "Technology", 4, 1, day(2024, 2, 1), PositionStatus::Open),
        (0x4002, "Store Manager", "Retail", 6, 5, day(2024, 1, 15), PositionStatus::Open),
        (0x4003, "Field Engineer", "Energy", 10, 4, day(2024, 1, 8), PositionStatus::OnHold),
        (0x4004, "HR Business Partner", "Corporate", 2, 2, day(2023, 11, 20), PositionStatus::Filled),
    ]
    .into_iter()
    .map(|(id, title, unit, planned, filled, opened_on, status)| PositionRecord {
        id: Uuid::from_u128(id),
        title: title.to_string(),
        business_unit: unit.to_string(),
        planned_headcount: planned,
        filled_headcount: filled,
        opened_on,
        status,
    })
    .collect();

    DashboardData {
        candidates,
        offers,
        interviews,
        positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_records_point_at_seeded_candidates() {
        let data = sample_data();
        for offer in &data.offers {
            assert!(data.candidates.iter().any(|c| c.id == offer.candidate_id));
            assert!(!offer.candidate_name.is_empty());
        }
        for interview in &data.interviews {
            assert!(data.candidates.iter().any(|c| c.id == interview.candidate_id));
        }
    }
}
