use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::api_client::ApiResult;
use super::application_service::{ApplicationGateway, Submission};
use super::media_service::{CaptureDevice, CaptureGuard};
use crate::middleware::auth::Bearer;
use crate::models::application::SubmitResponse;
use crate::models::draft::{
    ApplicationDraft, AttachmentSlot, DraftError, EditableRow, FileAttachment, ScalarField,
    SectionKind, SkillKind,
};
use crate::storage::{DraftStore, KeyValueStore, StorageError};
use crate::utils::validation::all_filled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PersonalInfo = 1,
    Education = 2,
    Experience = 3,
    Skills = 4,
    Languages = 5,
    SocialMedia = 6,
    References = 7,
    Documents = 8,
    Video = 9,
    Review = 10,
}

impl WizardStep {
    pub const ALL: [WizardStep; 10] = [
        WizardStep::PersonalInfo,
        WizardStep::Education,
        WizardStep::Experience,
        WizardStep::Skills,
        WizardStep::Languages,
        WizardStep::SocialMedia,
        WizardStep::References,
        WizardStep::Documents,
        WizardStep::Video,
        WizardStep::Review,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.number().saturating_sub(1))
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::PersonalInfo => "Personal information",
            WizardStep::Education => "Education & certifications",
            WizardStep::Experience => "Professional experience",
            WizardStep::Skills => "Skills",
            WizardStep::Languages => "Languages",
            WizardStep::SocialMedia => "Social media",
            WizardStep::References => "References",
            WizardStep::Documents => "Documents",
            WizardStep::Video => "Video introduction",
            WizardStep::Review => "Review & submit",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{0} is incomplete")]
    StepInvalid(WizardStep),
    #[error("there is no step {0}")]
    StepOutOfRange(u8),
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    #[error("this application has already been submitted")]
    AlreadySubmitted,
    #[error("the terms must be accepted before submitting")]
    TermsNotAccepted,
    #[error("record or upload a video before confirming it")]
    VideoMissing,
    #[error("the {0} file was restored without its content; upload it again")]
    AttachmentNeedsReupload(String),
    #[error("could not encode the application: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Whether `step` would let the applicant move on, given the draft and the terms checkbox.
pub fn step_is_valid(draft: &ApplicationDraft, accept_terms: bool, step: WizardStep) -> bool {
    match step {
        WizardStep::PersonalInfo => all_filled(&[
            &draft.full_name,
            &draft.email,
            &draft.phone,
            &draft.nationality,
            &draft.date_of_birth,
            &draft.address,
        ]),
        WizardStep::Education => {
            draft.education.iter().any(|e| !e.is_blank())
                && draft.certifications.iter().any(|c| !c.is_blank())
        }
        WizardStep::Experience => {
            !draft.experience.is_empty() && draft.experience.iter().all(|e| e.is_complete())
        }
        WizardStep::Skills => draft.technical_skills.has_any() && draft.managerial_skills.has_any(),
        WizardStep::Languages => {
            !draft.languages.is_empty()
                && draft
                    .languages
                    .iter()
                    .all(|l| all_filled(&[&l.language, &l.level]))
        }
        WizardStep::SocialMedia => {
            !draft.social_media.is_empty()
                && draft
                    .social_media
                    .iter()
                    .all(|s| all_filled(&[&s.platform, &s.url]))
        }
        WizardStep::References => {
            !draft.references.is_empty()
                && draft
                    .references
                    .iter()
                    .all(|r| all_filled(&[&r.name, &r.title, &r.email]))
        }
        WizardStep::Documents => draft.cv.is_some(),
        WizardStep::Video => draft.video_intro_submitted,
        WizardStep::Review => accept_terms,
    }
}

/// One applicant's pass through the ten-step application form.
pub struct WizardSession {
    draft: ApplicationDraft,
    step: WizardStep,
    accept_terms: bool,
    submitting: bool,
    submitted: bool,
    submit_error: Option<String>,
    application_id: Option<String>,
    store: DraftStore,
    capture_device: Option<Arc<dyn CaptureDevice>>,
    capture: Option<CaptureGuard>,
}

impl WizardSession {
    pub fn new(store: DraftStore) -> Self {
        Self::with_draft(store, ApplicationDraft::default())
    }

    fn with_draft(store: DraftStore, draft: ApplicationDraft) -> Self {
        Self {
            draft,
            step: WizardStep::PersonalInfo,
            accept_terms: false,
            submitting: false,
            submitted: false,
            submit_error: None,
            application_id: None,
            store,
            capture_device: None,
            capture: None,
        }
    }

    /// Reconstitutes a saved draft, if the store holds one.
    pub async fn restore(store: DraftStore) -> Result<Option<Self>, StorageError> {
        Ok(store.load().await?.map(|draft| {
            tracing::info!("Restored application draft from storage");
            Self::with_draft(store, draft)
        }))
    }

    /// Saved draft when readable, otherwise a fresh one.
    pub async fn open(store: DraftStore) -> Self {
        match Self::restore(store.clone()).await {
            Ok(Some(session)) => session,
            Ok(None) => Self::new(store),
            Err(e) => {
                tracing::warn!(error = %e, "Saved draft is unreadable; starting over");
                Self::new(store)
            }
        }
    }

    pub fn with_capture_device(mut self, device: Arc<dyn CaptureDevice>) -> Self {
        self.capture_device = Some(device);
        self
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn current_step(&self) -> WizardStep {
        self.step
    }

    pub fn accept_terms(&self) -> bool {
        self.accept_terms
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    pub fn is_step_valid(&self, step: WizardStep) -> bool {
        step_is_valid(&self.draft, self.accept_terms, step)
    }

    pub fn first_invalid_step(&self) -> Option<WizardStep> {
        WizardStep::ALL
            .into_iter()
            .find(|&step| !self.is_step_valid(step))
    }

    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        if !self.is_step_valid(self.step) {
            return Err(WizardError::StepInvalid(self.step));
        }
        if let Some(next) = self.step.next() {
            self.enter(next);
        }
        Ok(self.step)
    }

    pub fn previous(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.enter(previous);
        }
        self.step
    }

    /// Backward jumps always succeed; forward jumps need every earlier step valid.
    pub fn jump_to(&mut self, number: u8) -> Result<WizardStep, WizardError> {
        let target = WizardStep::from_number(number).ok_or(WizardError::StepOutOfRange(number))?;
        if target > self.step {
            if let Some(blocking) = WizardStep::ALL
                .into_iter()
                .take_while(|&s| s < target)
                .find(|&s| !self.is_step_valid(s))
            {
                return Err(WizardError::StepInvalid(blocking));
            }
        }
        self.enter(target);
        Ok(self.step)
    }

    fn enter(&mut self, step: WizardStep) {
        self.step = step;
        if step != WizardStep::Video {
            self.capture = None;
            return;
        }
        if self.capture.is_some() {
            return;
        }
        if let Some(device) = &self.capture_device {
            match CaptureGuard::acquire(device.clone()) {
                Ok(guard) => self.capture = Some(guard),
                Err(e) => tracing::warn!(error = %e, "Could not start video capture"),
            }
        }
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        Ok(())
    }

    /// Saves the form slots, and the video blob only when the video itself changed.
    async fn persist(&self, video_changed: bool) {
        let saved = if video_changed {
            self.store.save(&self.draft).await
        } else {
            self.store.save_form(&self.draft).await
        };
        if let Err(e) = saved {
            tracing::warn!(error = %e, "Could not persist application draft");
        }
    }

    async fn edit<T>(
        &mut self,
        video_changed: bool,
        change: impl FnOnce(&mut ApplicationDraft) -> Result<T, DraftError>,
    ) -> Result<T, WizardError> {
        self.ensure_editable()?;
        let out = change(&mut self.draft)?;
        self.persist(video_changed).await;
        Ok(out)
    }

    /// Whole-record replacement. The incoming draft is normalized first; files only
    /// survive when the slot still names them.
    pub async fn replace_draft(&mut self, mut draft: ApplicationDraft) -> Result<(), WizardError> {
        self.ensure_editable()?;
        draft.normalize()?;
        draft.carry_files_from(&self.draft);
        if draft.video_intro_submitted && draft.video_file.is_none() {
            draft.video_intro_submitted = false;
        }
        let video_changed = draft.video_file != self.draft.video_file;
        self.draft = draft;
        self.persist(video_changed).await;
        Ok(())
    }

    pub async fn set_scalar(&mut self, field: ScalarField, value: String) -> Result<(), WizardError> {
        self.edit(false, |d| d.set_scalar(field, value)).await
    }

    pub async fn add_row(&mut self, section: SectionKind) -> Result<usize, WizardError> {
        self.edit(false, |d| Ok(d.add_row(section))).await
    }

    pub async fn remove_row(&mut self, section: SectionKind, index: usize) -> Result<(), WizardError> {
        self.edit(false, |d| d.remove_row(section, index)).await
    }

    pub async fn update_field(
        &mut self,
        section: SectionKind,
        index: usize,
        field: &str,
        value: String,
    ) -> Result<(), WizardError> {
        self.edit(false, |d| d.update_field(section, index, field, value))
            .await
    }

    pub async fn add_skill(&mut self, kind: SkillKind, label: &str) -> Result<(), WizardError> {
        self.edit(false, |d| d.add_skill(kind, label)).await
    }

    pub async fn remove_skill(&mut self, kind: SkillKind, label: &str) -> Result<(), WizardError> {
        self.edit(false, |d| d.remove_skill(kind, label)).await
    }

    pub async fn attach(&mut self, slot: &AttachmentSlot, file: FileAttachment) -> Result<(), WizardError> {
        let video = matches!(slot, AttachmentSlot::Video);
        self.edit(video, |d| d.attach(slot, file)).await
    }

    pub async fn detach(&mut self, slot: &AttachmentSlot) -> Result<Option<FileAttachment>, WizardError> {
        let video = matches!(slot, AttachmentSlot::Video);
        self.edit(video, |d| d.detach(slot)).await
    }

    pub async fn confirm_video(&mut self) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if self.draft.video_file.is_none() {
            return Err(WizardError::VideoMissing);
        }
        self.draft.video_intro_submitted = true;
        self.persist(false).await;
        Ok(())
    }

    pub fn set_terms(&mut self, accepted: bool) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.accept_terms = accepted;
        Ok(())
    }

    /// Validates the whole draft and marks the session as submitting.
    pub fn begin_submission(&mut self, bearer: Bearer) -> Result<Submission, WizardError> {
        self.ensure_editable()?;
        if !self.accept_terms {
            return Err(WizardError::TermsNotAccepted);
        }
        if let Some(step) = self.first_invalid_step() {
            return Err(WizardError::StepInvalid(step));
        }
        for (slot, file) in [
            (AttachmentSlot::Cv, &self.draft.cv),
            (AttachmentSlot::Video, &self.draft.video_file),
        ] {
            if file.as_ref().is_some_and(|f| f.is_placeholder()) {
                return Err(WizardError::AttachmentNeedsReupload(slot.to_string()));
            }
        }

        let submission = Submission {
            application_data: serde_json::to_value(&self.draft)?,
            cv: self.draft.cv.clone(),
            video: self.draft.video_file.clone(),
            bearer,
        };
        self.submitting = true;
        self.submit_error = None;
        Ok(submission)
    }

    pub async fn complete_submission(&mut self, result: ApiResult<SubmitResponse>) {
        self.submitting = false;
        match result {
            Ok(response) => {
                tracing::info!(application_id = %response.application_id, "Application accepted");
                if let Err(e) = self.store.clear().await {
                    tracing::warn!(error = %e, "Could not clear saved draft after submission");
                }
                if let Err(e) = self
                    .store
                    .record_application_id(&response.application_id)
                    .await
                {
                    tracing::warn!(error = %e, "Could not record application id");
                }
                self.submitted = true;
                self.application_id = Some(response.application_id);
                self.capture = None;
            }
            Err(err) => {
                tracing::warn!(status = err.status, message = %err.message, "Application submission failed");
                self.submitted = false;
                self.submit_error = Some(err.user_message());
            }
        }
    }

    /// Runs a whole submission. Returns whether the application was accepted.
    pub async fn submit(
        &mut self,
        gateway: &dyn ApplicationGateway,
        bearer: Bearer,
    ) -> Result<bool, WizardError> {
        let submission = self.begin_submission(bearer)?;
        let result = gateway.submit(submission).await;
        self.complete_submission(result).await;
        Ok(self.submitted)
    }
}

pub type SharedSession = Arc<Mutex<WizardSession>>;

struct LiveSession {
    session: SharedSession,
    last_seen: Instant,
}

/// Live wizard sessions, each persisting under its own key namespace.
///
/// Sessions leave memory once submitted or after sitting idle; an idle draft
/// comes back from storage on its next request.
#[derive(Clone)]
pub struct WizardRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, LiveSession>>>,
    store: Arc<dyn KeyValueStore>,
    capture_device: Option<Arc<dyn CaptureDevice>>,
}

impl WizardRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            store,
            capture_device: None,
        }
    }

    pub fn with_capture_device(mut self, device: Arc<dyn CaptureDevice>) -> Self {
        self.capture_device = Some(device);
        self
    }

    fn draft_store(&self, id: Uuid) -> DraftStore {
        DraftStore::namespaced(self.store.clone(), format!("wizard-{}", id))
    }

    fn wrap(&self, session: WizardSession) -> SharedSession {
        let session = match &self.capture_device {
            Some(device) => session.with_capture_device(device.clone()),
            None => session,
        };
        Arc::new(Mutex::new(session))
    }

    pub async fn create(&self) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session = self.wrap(WizardSession::new(self.draft_store(id)));
        self.sessions.write().await.insert(
            id,
            LiveSession {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::info!(wizard_id = %id, "Wizard session started");
        (id, session)
    }

    /// Live session, or one rebuilt from its saved draft.
    pub async fn get(&self, id: Uuid) -> Result<Option<SharedSession>, StorageError> {
        if let Some(live) = self.sessions.write().await.get_mut(&id) {
            live.last_seen = Instant::now();
            return Ok(Some(live.session.clone()));
        }

        let Some(restored) = WizardSession::restore(self.draft_store(id)).await? else {
            return Ok(None);
        };
        let mut sessions = self.sessions.write().await;
        let live = sessions.entry(id).or_insert_with(|| LiveSession {
            session: self.wrap(restored),
            last_seen: Instant::now(),
        });
        tracing::info!(wizard_id = %id, "Wizard session restored");
        Ok(Some(live.session.clone()))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(wizard_id = %id, "Wizard session closed");
        }
        removed
    }

    /// Drops sessions untouched for `max_idle`. Sessions in use or mid-submission stay.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, live| {
            if live.last_seen.elapsed() < max_idle {
                return true;
            }
            match live.session.try_lock() {
                Ok(session) => session.is_submitting(),
                Err(_) => true,
            }
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle wizard sessions");
        }
        evicted
    }

    pub async fn live_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api_client::ApiError;
    use crate::services::media_service::testing::{BusyDevice, CountingDevice};
    use crate::storage::{KeyValueStore, MemoryStore};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    struct StubGateway {
        outcome: ApiResult<SubmitResponse>,
        seen: Mutex<Vec<Submission>>,
    }

    impl StubGateway {
        fn accepting(id: &str) -> Self {
            Self {
                outcome: Ok(SubmitResponse {
                    application_id: id.to_string(),
                    message: None,
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                outcome: Err(ApiError::from_response(status, None)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ApplicationGateway for StubGateway {
        async fn submit(&self, submission: Submission) -> ApiResult<SubmitResponse> {
            self.seen.lock().unwrap().push(submission);
            self.outcome.clone()
        }
    }

    /// Memory store that counts writes per key.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: Mutex<HashMap<String, usize>>,
    }

    impl CountingStore {
        fn writes(&self, key: &str) -> usize {
            self.writes.lock().unwrap().get(key).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl KeyValueStore for CountingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            *self.writes.lock().unwrap().entry(key.to_string()).or_default() += 1;
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }
    }

    fn session() -> (WizardSession, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        (WizardSession::new(DraftStore::new(backend.clone())), backend)
    }

    fn file(name: &str, content_type: &str) -> FileAttachment {
        FileAttachment::new(name, content_type, Bytes::from_static(b"%PDF-1.4"))
    }

    async fn complete(session: &mut WizardSession) {
        use ScalarField::*;
        for (field, value) in [
            (FullName, "Omar Said"),
            (Email, "omar@example.com"),
            (Phone, "555 0100"),
            (Nationality, "Jordanian"),
            (DateOfBirth, "1990-04-01"),
            (Address, "12 Palm St"),
        ] {
            session.set_scalar(field, value.to_string()).await.unwrap();
        }
        for (section, field, value) in [
            (SectionKind::Education, "institution", "University of Jordan"),
            (SectionKind::Education, "diploma", "BSc"),
            (SectionKind::Certifications, "title", "PMP"),
            (SectionKind::Certifications, "issuer", "PMI"),
            (SectionKind::Experience, "company", "Acme"),
            (SectionKind::Experience, "jobTitle", "Engineer"),
            (SectionKind::Experience, "startDate", "2015-01"),
            (SectionKind::Experience, "current", "true"),
            (SectionKind::Experience, "description", "Built things"),
            (SectionKind::Languages, "language", "Arabic"),
            (SectionKind::Languages, "level", "Native"),
            (SectionKind::SocialMedia, "platform", "LinkedIn"),
            (SectionKind::SocialMedia, "url", "https://linkedin.com/in/omar"),
            (SectionKind::References, "name", "Lina"),
            (SectionKind::References, "title", "CTO"),
            (SectionKind::References, "email", "lina@example.com"),
        ] {
            session
                .update_field(section, 0, field, value.to_string())
                .await
                .unwrap();
        }
        session.add_skill(SkillKind::Technical, "Rust").await.unwrap();
        session
            .add_skill(SkillKind::Managerial, "Coaching")
            .await
            .unwrap();
        session
            .attach(&AttachmentSlot::Cv, file("cv.pdf", "application/pdf"))
            .await
            .unwrap();
        session
            .attach(&AttachmentSlot::Video, file("intro.webm", "video/webm"))
            .await
            .unwrap();
        session.confirm_video().await.unwrap();
        session.set_terms(true).unwrap();
    }

    fn copy_of(draft: &ApplicationDraft) -> ApplicationDraft {
        serde_json::from_value(serde_json::to_value(draft).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn personal_info_rejects_whitespace() {
        let (mut s, _) = session();
        complete(&mut s).await;
        assert!(s.is_step_valid(WizardStep::PersonalInfo));
        s.set_scalar(ScalarField::Nationality, "   ".into())
            .await
            .unwrap();
        assert!(!s.is_step_valid(WizardStep::PersonalInfo));
    }

    #[tokio::test]
    async fn education_step_needs_both_education_and_certification() {
        let (mut s, _) = session();
        assert!(!s.is_step_valid(WizardStep::Education));

        s.update_field(SectionKind::Education, 0, "institution", "MIT".into())
            .await
            .unwrap();
        s.update_field(SectionKind::Education, 0, "diploma", "BSc".into())
            .await
            .unwrap();
        assert!(!s.is_step_valid(WizardStep::Education));

        s.update_field(SectionKind::Certifications, 0, "title", "CCNA".into())
            .await
            .unwrap();
        s.update_field(SectionKind::Certifications, 0, "issuer", "Cisco".into())
            .await
            .unwrap();
        assert!(s.is_step_valid(WizardStep::Education));
    }

    #[tokio::test]
    async fn experience_needs_end_date_unless_current() {
        let (mut s, _) = session();
        for (field, value) in [
            ("company", "Acme"),
            ("jobTitle", "Analyst"),
            ("startDate", "2019-02"),
            ("description", "Reports"),
        ] {
            s.update_field(SectionKind::Experience, 0, field, value.into())
                .await
                .unwrap();
        }
        assert!(!s.is_step_valid(WizardStep::Experience));
        s.update_field(SectionKind::Experience, 0, "endDate", "2021-03".into())
            .await
            .unwrap();
        assert!(s.is_step_valid(WizardStep::Experience));

        s.add_row(SectionKind::Experience).await.unwrap();
        assert!(!s.is_step_valid(WizardStep::Experience));
    }

    #[tokio::test]
    async fn row_steps_require_every_row() {
        let (mut s, _) = session();
        complete(&mut s).await;
        for (section, step) in [
            (SectionKind::Languages, WizardStep::Languages),
            (SectionKind::SocialMedia, WizardStep::SocialMedia),
            (SectionKind::References, WizardStep::References),
        ] {
            assert!(s.is_step_valid(step));
            let index = s.add_row(section).await.unwrap();
            assert!(!s.is_step_valid(step), "{step}");
            s.remove_row(section, index).await.unwrap();
            assert!(s.is_step_valid(step));
        }
    }

    #[tokio::test]
    async fn skills_step_needs_both_kinds() {
        let (mut s, _) = session();
        s.add_skill(SkillKind::Technical, "SQL").await.unwrap();
        assert!(!s.is_step_valid(WizardStep::Skills));
        s.add_skill(SkillKind::Managerial, "Leadership").await.unwrap();
        assert!(s.is_step_valid(WizardStep::Skills));
    }

    #[tokio::test]
    async fn next_is_gated_and_previous_clamps() {
        let (mut s, _) = session();
        assert!(matches!(
            s.next(),
            Err(WizardError::StepInvalid(WizardStep::PersonalInfo))
        ));
        assert_eq!(s.previous(), WizardStep::PersonalInfo);

        complete(&mut s).await;
        for expected in 2..=10 {
            assert_eq!(s.next().unwrap().number(), expected);
        }
        assert_eq!(s.next().unwrap(), WizardStep::Review);
    }

    #[tokio::test]
    async fn jump_forward_stops_at_first_invalid_step() {
        let (mut s, _) = session();
        complete(&mut s).await;
        s.remove_skill(SkillKind::Managerial, "Coaching").await.unwrap();

        assert_eq!(s.jump_to(4).unwrap(), WizardStep::Skills);
        assert!(matches!(
            s.jump_to(7),
            Err(WizardError::StepInvalid(WizardStep::Skills))
        ));
        assert_eq!(s.current_step(), WizardStep::Skills);

        assert_eq!(s.jump_to(1).unwrap(), WizardStep::PersonalInfo);
        assert!(matches!(s.jump_to(11), Err(WizardError::StepOutOfRange(11))));
        assert!(matches!(s.jump_to(0), Err(WizardError::StepOutOfRange(0))));
    }

    #[tokio::test]
    async fn every_edit_is_persisted() {
        let (mut s, backend) = session();
        s.set_scalar(ScalarField::FullName, "Nadia".into())
            .await
            .unwrap();
        let saved = backend.get("applicationFormData").await.unwrap().unwrap();
        assert!(saved.contains("Nadia"));

        s.add_row(SectionKind::References).await.unwrap();
        let restored = WizardSession::open(DraftStore::new(backend.clone())).await;
        assert_eq!(restored.draft().references.len(), 2);
        assert_eq!(restored.draft().full_name, "Nadia");
    }

    #[tokio::test]
    async fn video_blob_is_written_only_when_the_video_changes() {
        let backend = Arc::new(CountingStore::default());
        let mut s = WizardSession::new(DraftStore::new(backend.clone()));
        let video = FileAttachment::new(
            "intro.webm",
            "video/webm",
            Bytes::from(vec![7u8; 5 * 1024 * 1024]),
        );
        s.attach(&AttachmentSlot::Video, video).await.unwrap();
        assert_eq!(backend.writes("recordedVideoBlob"), 1);

        for name in ["A", "Ab", "Abc", "Abcd", "Abcde"] {
            s.set_scalar(ScalarField::FullName, name.into()).await.unwrap();
        }
        s.confirm_video().await.unwrap();
        let incoming = copy_of(s.draft());
        s.replace_draft(incoming).await.unwrap();
        assert_eq!(backend.writes("recordedVideoBlob"), 1);
        assert_eq!(backend.writes("applicationFormData"), 8);

        s.detach(&AttachmentSlot::Video).await.unwrap();
        assert_eq!(backend.get("recordedVideoBlob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn replace_draft_keeps_matching_files() {
        let (mut s, _) = session();
        s.attach(&AttachmentSlot::Cv, file("cv.pdf", "application/pdf"))
            .await
            .unwrap();
        let mut incoming = copy_of(s.draft());
        incoming.full_name = "Changed".into();
        s.replace_draft(incoming).await.unwrap();

        assert_eq!(s.draft().full_name, "Changed");
        assert!(!s.draft().cv.as_ref().unwrap().is_placeholder());
    }

    #[tokio::test]
    async fn replace_draft_rejects_broken_records_and_keeps_the_old_one() {
        let (mut s, backend) = session();
        s.set_scalar(ScalarField::FullName, "Nadia".into())
            .await
            .unwrap();

        let mut incoming = copy_of(s.draft());
        incoming.full_name = "Changed".into();
        incoming.references.clear();
        assert!(matches!(
            s.replace_draft(incoming).await,
            Err(WizardError::Draft(DraftError::LastRow(_)))
        ));
        assert_eq!(s.draft().full_name, "Nadia");
        assert_eq!(s.draft().references.len(), 1);
        let saved = backend.get("applicationFormData").await.unwrap().unwrap();
        assert!(!saved.contains("Changed"));
    }

    #[tokio::test]
    async fn replace_draft_normalizes_skills() {
        let (mut s, _) = session();
        s.add_skill(SkillKind::Technical, "Rust").await.unwrap();
        s.attach(
            &AttachmentSlot::TechnicalSkill("Rust".into()),
            file("rust.pdf", "application/pdf"),
        )
        .await
        .unwrap();

        let mut incoming = copy_of(s.draft());
        incoming.technical_skills = serde_json::from_value(serde_json::json!({
            "skills": ["Rust", " rust ", "", "SQL"],
            "evidence": {
                "rust": { "name": "rust.pdf", "hasFile": true },
                "Ghost": { "name": "ghost.pdf", "hasFile": true }
            }
        }))
        .unwrap();
        s.replace_draft(incoming).await.unwrap();

        let skills = &s.draft().technical_skills;
        assert_eq!(skills.skills, vec!["Rust".to_string(), "SQL".to_string()]);
        assert!(!skills.evidence.contains_key("Ghost"));
        assert!(!skills.evidence["Rust"].is_placeholder());
    }

    #[tokio::test]
    async fn confirm_video_requires_a_recording() {
        let (mut s, _) = session();
        assert!(matches!(
            s.confirm_video().await,
            Err(WizardError::VideoMissing)
        ));
    }

    #[tokio::test]
    async fn capture_is_held_only_on_the_video_step() {
        let device = Arc::new(CountingDevice::default());
        let (s, _) = session();
        let mut s = s.with_capture_device(device.clone());
        complete(&mut s).await;

        s.jump_to(9).unwrap();
        assert!(s.is_capturing());
        assert_eq!(device.held(), 1);

        s.next().unwrap();
        assert!(!s.is_capturing());
        assert_eq!(device.held(), 0);

        s.jump_to(9).unwrap();
        drop(s);
        assert_eq!(device.held(), 0);
    }

    #[tokio::test]
    async fn busy_camera_does_not_block_the_video_step() {
        let (s, _) = session();
        let mut s = s.with_capture_device(Arc::new(BusyDevice));
        complete(&mut s).await;
        assert_eq!(s.jump_to(9).unwrap(), WizardStep::Video);
        assert!(!s.is_capturing());
    }

    #[tokio::test]
    async fn failed_submission_keeps_the_draft() {
        let (mut s, backend) = session();
        complete(&mut s).await;
        let gateway = StubGateway::failing(413);

        let accepted = s.submit(&gateway, Bearer::anonymous()).await.unwrap();
        assert!(!accepted);
        assert!(!s.is_submitted());
        assert!(!s.is_submitting());
        assert!(s.submit_error().unwrap().contains("too large"));
        assert!(backend.get("applicationFormData").await.unwrap().is_some());
        assert_eq!(s.draft().full_name, "Omar Said");
    }

    #[tokio::test]
    async fn successful_submission_clears_storage() {
        let (mut s, backend) = session();
        complete(&mut s).await;
        let gateway = StubGateway::accepting("APP-7");

        assert!(s.submit(&gateway, Bearer::new("tok-omar")).await.unwrap());
        assert!(s.is_submitted());
        assert_eq!(s.application_id(), Some("APP-7"));
        assert_eq!(backend.get("applicationFormData").await.unwrap(), None);
        assert_eq!(backend.get("recordedVideoBlob").await.unwrap(), None);
        assert_eq!(
            backend.get("lastApplicationId").await.unwrap().as_deref(),
            Some("APP-7")
        );

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].application_data["fullName"], "Omar Said");
        assert_eq!(seen[0].cv.as_ref().unwrap().name, "cv.pdf");
        assert_eq!(seen[0].bearer.token(), Some("tok-omar"));
        drop(seen);

        assert!(matches!(
            s.submit(&gateway, Bearer::anonymous()).await,
            Err(WizardError::AlreadySubmitted)
        ));
    }

    #[tokio::test]
    async fn submission_requires_terms_and_rejects_double_submit() {
        let (mut s, _) = session();
        complete(&mut s).await;
        s.set_terms(false).unwrap();
        assert!(matches!(
            s.begin_submission(Bearer::anonymous()),
            Err(WizardError::TermsNotAccepted)
        ));

        s.set_terms(true).unwrap();
        s.begin_submission(Bearer::anonymous()).unwrap();
        assert!(s.is_submitting());
        assert!(matches!(
            s.begin_submission(Bearer::anonymous()),
            Err(WizardError::SubmissionInFlight)
        ));
    }

    #[tokio::test]
    async fn restored_cv_must_be_uploaded_again() {
        let (mut s, backend) = session();
        complete(&mut s).await;
        let mut restored = WizardSession::open(DraftStore::new(backend.clone())).await;
        restored.set_terms(true).unwrap();
        assert!(restored.is_step_valid(WizardStep::Documents));
        assert!(matches!(
            restored.begin_submission(Bearer::anonymous()),
            Err(WizardError::AttachmentNeedsReupload(slot)) if slot == "cv"
        ));
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_and_restored_on_demand() {
        let registry = WizardRegistry::new(Arc::new(MemoryStore::new()));
        let (id, session) = registry.create().await;
        session
            .lock()
            .await
            .set_scalar(ScalarField::FullName, "Nadia".into())
            .await
            .unwrap();
        let (fresh, _) = registry.create().await;

        assert_eq!(registry.evict_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(registry.evict_idle(Duration::ZERO).await, 2);
        assert_eq!(registry.live_sessions().await, 0);

        let restored = registry.get(id).await.unwrap().unwrap();
        assert_eq!(restored.lock().await.draft().full_name, "Nadia");
        assert_eq!(registry.live_sessions().await, 1);
        assert!(registry.get(fresh).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn busy_sessions_survive_eviction() {
        let registry = WizardRegistry::new(Arc::new(MemoryStore::new()));
        let (_, session) = registry.create().await;
        let guard = session.lock().await;
        assert_eq!(registry.evict_idle(Duration::ZERO).await, 0);
        drop(guard);

        let (id, _) = registry.create().await;
        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert_eq!(registry.live_sessions().await, 1);
    }
}
