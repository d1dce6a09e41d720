use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Declined,
    Withdrawn,
}

impl OfferStatus {
    pub fn key(self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Declined => "declined",
            OfferStatus::Withdrawn => "withdrawn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub position: String,
    pub business_unit: String,
    pub salary: Decimal,
    pub currency: String,
    pub sent_on: NaiveDate,
    pub status: OfferStatus,
}
