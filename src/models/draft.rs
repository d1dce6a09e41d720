use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utils::countries;
use crate::utils::validation::is_filled as filled;

pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("{0} must keep at least one row")]
    LastRow(SectionKind),
    #[error("{section} has no row at index {index}")]
    RowOutOfRange { section: SectionKind, index: usize },
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },
    #[error("file '{0}' is empty")]
    EmptyFile(String),
    #[error("file '{name}' exceeds the {limit} byte limit")]
    FileTooLarge { name: String, limit: usize },
    #[error("skill label cannot be empty")]
    EmptySkill,
    #[error("skill '{0}' is already listed")]
    DuplicateSkill(String),
    #[error("skill '{0}' is not listed")]
    UnknownSkill(String),
    #[error("this achievement expects a {0} as evidence")]
    EvidenceMismatch(EvidenceKind),
    #[error("unknown country code '{0}'")]
    UnknownCountryCode(String),
}

/// An uploaded file held in memory. Serialized form is always the storage
/// placeholder `{"name": .., "hasFile": true}`; bytes never leave the process as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FileAttachment {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Zero-byte stand-in for a file whose bytes could not be recovered.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, "application/octet-stream", Bytes::new())
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Uploads with no bytes are refused, so only restored files are empty.
    pub fn is_placeholder(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilePlaceholder {
    name: String,
    #[serde(default)]
    has_file: bool,
}

impl Serialize for FileAttachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FilePlaceholder {
            name: self.name.clone(),
            has_file: true,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FileAttachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let placeholder = FilePlaceholder::deserialize(deserializer)?;
        Ok(FileAttachment::placeholder(placeholder.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    Education,
    Certifications,
    Experience,
    Languages,
    SocialMedia,
    References,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Education,
        SectionKind::Certifications,
        SectionKind::Experience,
        SectionKind::Languages,
        SectionKind::SocialMedia,
        SectionKind::References,
    ];
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SectionKind::Education => "education",
            SectionKind::Certifications => "certifications",
            SectionKind::Experience => "experience",
            SectionKind::Languages => "languages",
            SectionKind::SocialMedia => "social-media",
            SectionKind::References => "references",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillKind {
    Technical,
    Managerial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarField {
    OfferId,
    FullName,
    Email,
    CountryCode,
    Phone,
    Nationality,
    DateOfBirth,
    Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementType {
    #[default]
    Report,
    Acknowledgment,
    Certificate,
    Press,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceKind {
    File,
    Url,
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceKind::File => f.write_str("file"),
            EvidenceKind::Url => f.write_str("URL"),
        }
    }
}

impl AchievementType {
    pub fn evidence_kind(self) -> EvidenceKind {
        match self {
            AchievementType::Press => EvidenceKind::Url,
            _ => EvidenceKind::File,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "report" => Some(AchievementType::Report),
            "acknowledgment" | "acknowledgement" => Some(AchievementType::Acknowledgment),
            "certificate" => Some(AchievementType::Certificate),
            "press" => Some(AchievementType::Press),
            _ => None,
        }
    }
}

/// Identifies a single file-valued slot in the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSlot {
    Cv,
    Video,
    Education(usize),
    Certification(usize),
    Achievement(usize),
    LanguageCertificate(usize),
    TechnicalSkill(String),
    ManagerialSkill(String),
}

impl AttachmentSlot {
    pub fn size_limit(&self) -> usize {
        match self {
            AttachmentSlot::Video => MAX_VIDEO_BYTES,
            _ => MAX_DOCUMENT_BYTES,
        }
    }
}

impl fmt::Display for AttachmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentSlot::Cv => f.write_str("cv"),
            AttachmentSlot::Video => f.write_str("video"),
            AttachmentSlot::Education(i) => write!(f, "education[{}]", i),
            AttachmentSlot::Certification(i) => write!(f, "certifications[{}]", i),
            AttachmentSlot::Achievement(i) => write!(f, "experience[{}]", i),
            AttachmentSlot::LanguageCertificate(i) => write!(f, "languages[{}]", i),
            AttachmentSlot::TechnicalSkill(label) => write!(f, "technical:{}", label),
            AttachmentSlot::ManagerialSkill(label) => write!(f, "managerial:{}", label),
        }
    }
}

/// A row of an array-valued draft section that can be edited field by field.
pub trait EditableRow: Default {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), DraftError>;

    /// True when no user-entered field carries a value.
    fn is_blank(&self) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    pub institution: String,
    pub diploma: String,
    pub start_date: String,
    pub end_date: String,
    pub evidence: Option<FileAttachment>,
}

impl EditableRow for EducationEntry {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), DraftError> {
        match field {
            "institution" => self.institution = value,
            "diploma" => self.diploma = value,
            "startDate" => self.start_date = value,
            "endDate" => self.end_date = value,
            other => return Err(DraftError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn is_blank(&self) -> bool {
        ![
            &self.institution,
            &self.diploma,
            &self.start_date,
            &self.end_date,
        ]
        .iter()
        .any(|v| filled(v))
            && self.evidence.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificationEntry {
    pub title: String,
    pub issuer: String,
    pub date: String,
    pub url: String,
    pub evidence: Option<FileAttachment>,
}

impl EditableRow for CertificationEntry {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), DraftError> {
        match field {
            "title" => self.title = value,
            "issuer" => self.issuer = value,
            "date" => self.date = value,
            "url" => self.url = value,
            other => return Err(DraftError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn is_blank(&self) -> bool {
        ![&self.title, &self.issuer, &self.date, &self.url]
            .iter()
            .any(|v| filled(v))
            && self.evidence.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub company: String,
    pub job_title: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
    pub achievement_type: AchievementType,
    pub achievement_file: Option<FileAttachment>,
    pub achievement_url: String,
}

impl ExperienceEntry {
    pub fn is_complete(&self) -> bool {
        filled(&self.company)
            && filled(&self.job_title)
            && filled(&self.start_date)
            && filled(&self.description)
            && (self.current || filled(&self.end_date))
    }

    fn set_achievement_type(&mut self, kind: AchievementType) {
        self.achievement_type = kind;
        match kind.evidence_kind() {
            EvidenceKind::Url => self.achievement_file = None,
            EvidenceKind::File => self.achievement_url.clear(),
        }
    }
}

impl EditableRow for ExperienceEntry {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), DraftError> {
        match field {
            "company" => self.company = value,
            "jobTitle" => self.job_title = value,
            "startDate" => self.start_date = value,
            "endDate" => self.end_date = value,
            "description" => self.description = value,
            "current" => {
                self.current = match value.trim() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(DraftError::InvalidValue {
                            field: field.to_string(),
                            value,
                        })
                    }
                };
                if self.current {
                    self.end_date.clear();
                }
            }
            "achievementType" => {
                let kind = AchievementType::parse(&value).ok_or_else(|| {
                    DraftError::InvalidValue {
                        field: field.to_string(),
                        value: value.clone(),
                    }
                })?;
                self.set_achievement_type(kind);
            }
            "achievementUrl" => {
                if self.achievement_type.evidence_kind() != EvidenceKind::Url {
                    return Err(DraftError::EvidenceMismatch(EvidenceKind::File));
                }
                self.achievement_url = value;
            }
            other => return Err(DraftError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn is_blank(&self) -> bool {
        ![
            &self.company,
            &self.job_title,
            &self.start_date,
            &self.end_date,
            &self.description,
            &self.achievement_url,
        ]
        .iter()
        .any(|v| filled(v))
            && !self.current
            && self.achievement_file.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageEntry {
    pub language: String,
    pub level: String,
    pub how_learned: String,
    pub certificate: Option<FileAttachment>,
}

impl EditableRow for LanguageEntry {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), DraftError> {
        match field {
            "language" => self.language = value,
            "level" => self.level = value,
            "howLearned" => self.how_learned = value,
            other => return Err(DraftError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn is_blank(&self) -> bool {
        ![&self.language, &self.level, &self.how_learned]
            .iter()
            .any(|v| filled(v))
            && self.certificate.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialMediaEntry {
    pub platform: String,
    pub url: String,
}

impl EditableRow for SocialMediaEntry {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), DraftError> {
        match field {
            "platform" => self.platform = value,
            "url" => self.url = value,
            other => return Err(DraftError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn is_blank(&self) -> bool {
        !filled(&self.platform) && !filled(&self.url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceEntry {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub company_url: String,
    pub note: String,
}

impl EditableRow for ReferenceEntry {
    fn set_field(&mut self, field: &str, value: String) -> Result<(), DraftError> {
        match field {
            "name" => self.name = value,
            "title" => self.title = value,
            "email" => self.email = value,
            "phone" => self.phone = value,
            "company" => self.company = value,
            "companyUrl" => self.company_url = value,
            "note" => self.note = value,
            other => return Err(DraftError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn is_blank(&self) -> bool {
        ![
            &self.name,
            &self.title,
            &self.email,
            &self.phone,
            &self.company,
            &self.company_url,
            &self.note,
        ]
        .iter()
        .any(|v| filled(v))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillSet {
    pub skills: Vec<String>,
    pub evidence: BTreeMap<String, FileAttachment>,
}

impl SkillSet {
    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    pub fn has_any(&self) -> bool {
        self.skills.iter().any(|s| filled(s))
    }

    fn position(&self, label: &str) -> Option<usize> {
        let needle = label.trim().to_lowercase();
        self.skills
            .iter()
            .position(|s| s.trim().to_lowercase() == needle)
    }

    fn add(&mut self, label: &str) -> Result<(), DraftError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(DraftError::EmptySkill);
        }
        if self.contains(label) {
            return Err(DraftError::DuplicateSkill(label.to_string()));
        }
        self.skills.push(label.to_string());
        Ok(())
    }

    fn remove(&mut self, label: &str) -> Result<String, DraftError> {
        let index = self
            .position(label)
            .ok_or_else(|| DraftError::UnknownSkill(label.trim().to_string()))?;
        let removed = self.skills.remove(index);
        self.evidence.remove(&removed);
        Ok(removed)
    }

    /// Trims labels, drops blank and repeated ones, and keeps evidence only for
    /// skills that remain listed.
    fn normalize(&mut self) {
        let incoming = std::mem::take(self);
        for label in &incoming.skills {
            if let Err(e) = self.add(label) {
                tracing::debug!(error = %e, "Dropping skill label");
            }
        }
        for (label, file) in incoming.evidence {
            if self.put_evidence(&label, Some(file)).is_err() {
                tracing::debug!(skill = %label, "Dropping evidence for an unlisted skill");
            }
        }
    }

    fn put_evidence(
        &mut self,
        label: &str,
        file: Option<FileAttachment>,
    ) -> Result<Option<FileAttachment>, DraftError> {
        let canonical = self
            .position(label)
            .map(|i| self.skills[i].clone())
            .ok_or_else(|| DraftError::UnknownSkill(label.trim().to_string()))?;
        Ok(match file {
            Some(file) => self.evidence.insert(canonical, file),
            None => self.evidence.remove(&canonical),
        })
    }
}

/// The in-progress application held by the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub offer_id: String,
    pub full_name: String,
    pub email: String,
    pub country_code: String,
    pub phone: String,
    pub nationality: String,
    pub date_of_birth: String,
    pub address: String,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub technical_skills: SkillSet,
    pub managerial_skills: SkillSet,
    pub languages: Vec<LanguageEntry>,
    pub social_media: Vec<SocialMediaEntry>,
    pub references: Vec<ReferenceEntry>,
    pub cv: Option<FileAttachment>,
    pub video_file: Option<FileAttachment>,
    pub video_intro_submitted: bool,
}

impl Default for ApplicationDraft {
    fn default() -> Self {
        Self {
            offer_id: String::new(),
            full_name: String::new(),
            email: String::new(),
            country_code: String::new(),
            phone: String::new(),
            nationality: String::new(),
            date_of_birth: String::new(),
            address: String::new(),
            education: vec![EducationEntry::default()],
            certifications: vec![CertificationEntry::default()],
            experience: vec![ExperienceEntry::default()],
            technical_skills: SkillSet::default(),
            managerial_skills: SkillSet::default(),
            languages: vec![LanguageEntry::default()],
            social_media: vec![SocialMediaEntry::default()],
            references: vec![ReferenceEntry::default()],
            cv: None,
            video_file: None,
            video_intro_submitted: false,
        }
    }
}

macro_rules! with_section {
    ($draft:expr, $section:expr, $rows:ident => $body:expr) => {
        match $section {
            SectionKind::Education => {
                let $rows = &mut $draft.education;
                $body
            }
            SectionKind::Certifications => {
                let $rows = &mut $draft.certifications;
                $body
            }
            SectionKind::Experience => {
                let $rows = &mut $draft.experience;
                $body
            }
            SectionKind::Languages => {
                let $rows = &mut $draft.languages;
                $body
            }
            SectionKind::SocialMedia => {
                let $rows = &mut $draft.social_media;
                $body
            }
            SectionKind::References => {
                let $rows = &mut $draft.references;
                $body
            }
        }
    };
}

fn push_blank<T: EditableRow>(rows: &mut Vec<T>) -> usize {
    rows.push(T::default());
    rows.len() - 1
}

fn remove_at<T>(rows: &mut Vec<T>, section: SectionKind, index: usize) -> Result<(), DraftError> {
    if index >= rows.len() {
        return Err(DraftError::RowOutOfRange { section, index });
    }
    if rows.len() == 1 {
        return Err(DraftError::LastRow(section));
    }
    rows.remove(index);
    Ok(())
}

fn update_at<T: EditableRow>(
    rows: &mut [T],
    section: SectionKind,
    index: usize,
    field: &str,
    value: String,
) -> Result<(), DraftError> {
    rows.get_mut(index)
        .ok_or(DraftError::RowOutOfRange { section, index })?
        .set_field(field, value)
}

fn slot_in<T>(
    rows: &mut [T],
    section: SectionKind,
    index: usize,
) -> Result<&mut T, DraftError> {
    rows.get_mut(index)
        .ok_or(DraftError::RowOutOfRange { section, index })
}

impl ApplicationDraft {
    pub fn section_len(&self, section: SectionKind) -> usize {
        match section {
            SectionKind::Education => self.education.len(),
            SectionKind::Certifications => self.certifications.len(),
            SectionKind::Experience => self.experience.len(),
            SectionKind::Languages => self.languages.len(),
            SectionKind::SocialMedia => self.social_media.len(),
            SectionKind::References => self.references.len(),
        }
    }

    /// Appends a blank row and returns its index.
    pub fn add_row(&mut self, section: SectionKind) -> usize {
        with_section!(self, section, rows => push_blank(rows))
    }

    pub fn remove_row(&mut self, section: SectionKind, index: usize) -> Result<(), DraftError> {
        with_section!(self, section, rows => remove_at(rows, section, index))
    }

    pub fn update_field(
        &mut self,
        section: SectionKind,
        index: usize,
        field: &str,
        value: String,
    ) -> Result<(), DraftError> {
        with_section!(self, section, rows => update_at(rows, section, index, field, value))
    }

    pub fn set_scalar(&mut self, field: ScalarField, value: String) -> Result<(), DraftError> {
        match field {
            ScalarField::OfferId => self.offer_id = value,
            ScalarField::FullName => self.full_name = value,
            ScalarField::Email => self.email = value,
            ScalarField::CountryCode => {
                let code = value.trim();
                if !code.is_empty() && countries::find_by_dial_code(code).is_none() {
                    return Err(DraftError::UnknownCountryCode(code.to_string()));
                }
                self.country_code = code.to_string();
            }
            ScalarField::Phone => self.phone = value,
            ScalarField::Nationality => self.nationality = value,
            ScalarField::DateOfBirth => self.date_of_birth = value,
            ScalarField::Address => self.address = value,
        }
        Ok(())
    }

    pub fn skills(&self, kind: SkillKind) -> &SkillSet {
        match kind {
            SkillKind::Technical => &self.technical_skills,
            SkillKind::Managerial => &self.managerial_skills,
        }
    }

    fn skills_mut(&mut self, kind: SkillKind) -> &mut SkillSet {
        match kind {
            SkillKind::Technical => &mut self.technical_skills,
            SkillKind::Managerial => &mut self.managerial_skills,
        }
    }

    pub fn add_skill(&mut self, kind: SkillKind, label: &str) -> Result<(), DraftError> {
        self.skills_mut(kind).add(label)
    }

    pub fn remove_skill(&mut self, kind: SkillKind, label: &str) -> Result<(), DraftError> {
        self.skills_mut(kind).remove(label).map(|_| ())
    }

    pub fn attach(&mut self, slot: &AttachmentSlot, file: FileAttachment) -> Result<(), DraftError> {
        if file.data.is_empty() {
            return Err(DraftError::EmptyFile(file.name));
        }
        let limit = slot.size_limit();
        if file.size() > limit {
            return Err(DraftError::FileTooLarge {
                name: file.name,
                limit,
            });
        }
        self.put_slot(slot, Some(file))?;
        Ok(())
    }

    /// Clears the attachment in `slot` without removing its row.
    pub fn detach(&mut self, slot: &AttachmentSlot) -> Result<Option<FileAttachment>, DraftError> {
        let removed = self.put_slot(slot, None)?;
        if matches!(slot, AttachmentSlot::Video) {
            self.video_intro_submitted = false;
        }
        Ok(removed)
    }

    fn put_slot(
        &mut self,
        slot: &AttachmentSlot,
        file: Option<FileAttachment>,
    ) -> Result<Option<FileAttachment>, DraftError> {
        let cell = match slot {
            AttachmentSlot::TechnicalSkill(label) => {
                return self.technical_skills.put_evidence(label, file)
            }
            AttachmentSlot::ManagerialSkill(label) => {
                return self.managerial_skills.put_evidence(label, file)
            }
            AttachmentSlot::Cv => &mut self.cv,
            AttachmentSlot::Video => &mut self.video_file,
            AttachmentSlot::Education(i) => {
                &mut slot_in(&mut self.education, SectionKind::Education, *i)?.evidence
            }
            AttachmentSlot::Certification(i) => {
                &mut slot_in(&mut self.certifications, SectionKind::Certifications, *i)?.evidence
            }
            AttachmentSlot::Achievement(i) => {
                let row = slot_in(&mut self.experience, SectionKind::Experience, *i)?;
                if file.is_some() && row.achievement_type.evidence_kind() != EvidenceKind::File {
                    return Err(DraftError::EvidenceMismatch(EvidenceKind::Url));
                }
                &mut row.achievement_file
            }
            AttachmentSlot::LanguageCertificate(i) => {
                &mut slot_in(&mut self.languages, SectionKind::Languages, *i)?.certificate
            }
        };
        Ok(std::mem::replace(cell, file))
    }

    pub fn attachment(&self, slot: &AttachmentSlot) -> Option<&FileAttachment> {
        self.attachments()
            .into_iter()
            .find(|(s, _)| s == slot)
            .map(|(_, file)| file)
    }

    /// Every populated file slot, in section order.
    pub fn attachments(&self) -> Vec<(AttachmentSlot, &FileAttachment)> {
        let mut out = Vec::new();
        if let Some(file) = &self.cv {
            out.push((AttachmentSlot::Cv, file));
        }
        if let Some(file) = &self.video_file {
            out.push((AttachmentSlot::Video, file));
        }
        for (i, row) in self.education.iter().enumerate() {
            if let Some(file) = &row.evidence {
                out.push((AttachmentSlot::Education(i), file));
            }
        }
        for (i, row) in self.certifications.iter().enumerate() {
            if let Some(file) = &row.evidence {
                out.push((AttachmentSlot::Certification(i), file));
            }
        }
        for (i, row) in self.experience.iter().enumerate() {
            if let Some(file) = &row.achievement_file {
                out.push((AttachmentSlot::Achievement(i), file));
            }
        }
        for (i, row) in self.languages.iter().enumerate() {
            if let Some(file) = &row.certificate {
                out.push((AttachmentSlot::LanguageCertificate(i), file));
            }
        }
        for (label, file) in &self.technical_skills.evidence {
            out.push((AttachmentSlot::TechnicalSkill(label.clone()), file));
        }
        for (label, file) in &self.managerial_skills.evidence {
            out.push((AttachmentSlot::ManagerialSkill(label.clone()), file));
        }
        out
    }

    /// Brings a draft received as a whole record to the shape the field-level
    /// edits maintain: every section keeps a row, the country code is known,
    /// skill lists are clean, and achievement evidence matches its type.
    pub fn normalize(&mut self) -> Result<(), DraftError> {
        if let Some(section) = SectionKind::ALL
            .into_iter()
            .find(|&s| self.section_len(s) == 0)
        {
            return Err(DraftError::LastRow(section));
        }
        let code = self.country_code.clone();
        self.set_scalar(ScalarField::CountryCode, code)?;
        self.technical_skills.normalize();
        self.managerial_skills.normalize();
        for row in &mut self.experience {
            row.set_achievement_type(row.achievement_type);
            if row.current {
                row.end_date.clear();
            }
        }
        Ok(())
    }

    /// Keeps the bytes of `previous` for every slot that still names the same file.
    /// Slots that arrive empty stay empty; a slot never gains bytes from here.
    pub fn carry_files_from(&mut self, previous: &ApplicationDraft) {
        let slots: Vec<AttachmentSlot> = self
            .attachments()
            .into_iter()
            .map(|(slot, _)| slot)
            .collect();
        for slot in slots {
            let incoming_name = self.attachment(&slot).map(|f| f.name.clone());
            let kept = previous
                .attachment(&slot)
                .filter(|f| Some(&f.name) == incoming_name.as_ref())
                .cloned();
            if self.put_slot(&slot, kept).is_err() {
                tracing::warn!(slot = %slot, "Dropping attachment for a slot that no longer exists");
            }
        }
    }
}
