use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::draft::{ApplicationDraft, AttachmentSlot, ScalarField};
use crate::services::wizard_service::{WizardSession, WizardStep};

/// Top-level form fields keyed by their camelCase names.
pub type ScalarFieldsPayload = HashMap<ScalarField, String>;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RowFieldPayload {
    #[validate(length(min = 1))]
    pub field: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SkillPayload {
    #[validate(length(min = 1, max = 100))]
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermsPayload {
    pub accepted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowAddedResponse {
    pub index: usize,
    pub rows: usize,
}

/// Which row or skill an attachment belongs to, for slots that need one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentQuery {
    pub index: Option<usize>,
    pub label: Option<String>,
}

impl AttachmentQuery {
    pub fn slot(&self, name: &str) -> Result<AttachmentSlot> {
        let index = || {
            self.index
                .ok_or_else(|| Error::BadRequest(format!("Attachment slot '{}' needs an index", name)))
        };
        let label = || {
            self.label
                .clone()
                .filter(|l| !l.trim().is_empty())
                .ok_or_else(|| Error::BadRequest(format!("Attachment slot '{}' needs a label", name)))
        };

        Ok(match name {
            "cv" => AttachmentSlot::Cv,
            "video" => AttachmentSlot::Video,
            "education" => AttachmentSlot::Education(index()?),
            "certifications" => AttachmentSlot::Certification(index()?),
            "experience" => AttachmentSlot::Achievement(index()?),
            "languages" => AttachmentSlot::LanguageCertificate(index()?),
            "technical" => AttachmentSlot::TechnicalSkill(label()?),
            "managerial" => AttachmentSlot::ManagerialSkill(label()?),
            other => return Err(Error::NotFound(format!("Unknown attachment slot '{}'", other))),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    pub number: u8,
    pub title: &'static str,
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInfo {
    pub slot: String,
    pub name: String,
    pub content_type: String,
    pub size: usize,
    /// Restored from storage without its bytes.
    pub needs_upload: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub id: Uuid,
    pub current_step: u8,
    pub step_title: &'static str,
    pub steps: Vec<StepState>,
    pub accept_terms: bool,
    pub submitting: bool,
    pub submitted: bool,
    pub submit_error: Option<String>,
    pub application_id: Option<String>,
    pub capturing: bool,
    pub attachments: Vec<AttachmentInfo>,
    pub draft: ApplicationDraft,
}

impl WizardView {
    pub fn new(id: Uuid, session: &WizardSession) -> Self {
        let step = session.current_step();
        Self {
            id,
            current_step: step.number(),
            step_title: step.title(),
            steps: WizardStep::ALL
                .into_iter()
                .map(|s| StepState {
                    number: s.number(),
                    title: s.title(),
                    valid: session.is_step_valid(s),
                })
                .collect(),
            accept_terms: session.accept_terms(),
            submitting: session.is_submitting(),
            submitted: session.is_submitted(),
            submit_error: session.submit_error().map(str::to_string),
            application_id: session.application_id().map(str::to_string),
            capturing: session.is_capturing(),
            attachments: session
                .draft()
                .attachments()
                .into_iter()
                .map(|(slot, file)| AttachmentInfo {
                    slot: slot.to_string(),
                    name: file.name.clone(),
                    content_type: file.content_type.clone(),
                    size: file.size(),
                    needs_upload: file.is_placeholder(),
                })
                .collect(),
            draft: session.draft().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_slots_require_an_index() {
        let query = AttachmentQuery::default();
        assert!(matches!(query.slot("cv"), Ok(AttachmentSlot::Cv)));
        assert!(matches!(query.slot("education"), Err(Error::BadRequest(_))));
        assert!(matches!(query.slot("portfolio"), Err(Error::NotFound(_))));

        let query = AttachmentQuery {
            index: Some(2),
            label: Some("Rust".into()),
        };
        assert!(matches!(
            query.slot("languages"),
            Ok(AttachmentSlot::LanguageCertificate(2))
        ));
        assert!(matches!(
            query.slot("technical"),
            Ok(AttachmentSlot::TechnicalSkill(label)) if label == "Rust"
        ));
    }

    #[test]
    fn scalar_payload_uses_form_field_names() {
        let payload: ScalarFieldsPayload =
            serde_json::from_str(r#"{"fullName": "Amal", "countryCode": "+992"}"#).unwrap();
        assert_eq!(payload[&ScalarField::FullName], "Amal");
        assert_eq!(payload[&ScalarField::CountryCode], "+992");
    }
}
