use std::sync::Arc;

use base64::prelude::*;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{KeyValueStore, StorageError};
use crate::models::draft::{ApplicationDraft, FileAttachment};

pub const FORM_DATA_KEY: &str = "applicationFormData";
pub const CV_META_KEY: &str = "uploadedCvFile";
pub const VIDEO_BLOB_KEY: &str = "recordedVideoBlob";
pub const LAST_APPLICATION_KEY: &str = "lastApplicationId";

#[derive(Debug, Serialize, Deserialize)]
struct StoredCvMeta {
    name: String,
    size: usize,
    #[serde(rename = "type")]
    content_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredVideo {
    name: String,
    #[serde(rename = "type")]
    content_type: String,
    data: String,
}

/// Save/load contract for a wizard draft.
///
/// Files cannot live in the JSON slot, so `applicationFormData` only carries
/// `{name, hasFile}` placeholders. The CV keeps its metadata in `uploadedCvFile`
/// and comes back as a zero-byte placeholder; the recorded video is kept whole,
/// base64-encoded, in `recordedVideoBlob`.
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
    namespace: Option<String>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            namespace: None,
        }
    }

    pub fn namespaced(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: Some(namespace.into()),
        }
    }

    fn key(&self, slot: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}:{}", ns, slot),
            None => slot.to_string(),
        }
    }

    /// Writes the form and CV slots and the video blob.
    pub async fn save(&self, draft: &ApplicationDraft) -> Result<(), StorageError> {
        self.save_form(draft).await?;
        self.save_video(draft.video_file.as_ref()).await
    }

    /// Writes the form and CV slots only; the video blob is left as it is.
    pub async fn save_form(&self, draft: &ApplicationDraft) -> Result<(), StorageError> {
        let form = serde_json::to_string(draft)?;
        self.store.set(&self.key(FORM_DATA_KEY), &form).await?;

        match &draft.cv {
            Some(cv) => {
                let meta = StoredCvMeta {
                    name: cv.name.clone(),
                    size: cv.size(),
                    content_type: cv.content_type.clone(),
                };
                self.store
                    .set(&self.key(CV_META_KEY), &serde_json::to_string(&meta)?)
                    .await
            }
            None => self.store.remove(&self.key(CV_META_KEY)).await,
        }
    }

    pub async fn save_video(&self, video: Option<&FileAttachment>) -> Result<(), StorageError> {
        match video {
            Some(video) if !video.is_placeholder() => {
                let blob = StoredVideo {
                    name: video.name.clone(),
                    content_type: video.content_type.clone(),
                    data: BASE64_STANDARD.encode(&video.data),
                };
                self.store
                    .set(&self.key(VIDEO_BLOB_KEY), &serde_json::to_string(&blob)?)
                    .await
            }
            // A placeholder video means the blob slot already holds the bytes, or never did.
            Some(_) => Ok(()),
            None => self.store.remove(&self.key(VIDEO_BLOB_KEY)).await,
        }
    }

    pub async fn load(&self) -> Result<Option<ApplicationDraft>, StorageError> {
        let Some(form) = self.store.get(&self.key(FORM_DATA_KEY)).await? else {
            return Ok(None);
        };
        let mut draft: ApplicationDraft = serde_json::from_str(&form)?;

        if let Some(raw) = self.store.get(&self.key(CV_META_KEY)).await? {
            let meta: StoredCvMeta = serde_json::from_str(&raw)?;
            let mut cv = draft
                .cv
                .take()
                .unwrap_or_else(|| FileAttachment::placeholder(meta.name.clone()));
            cv.content_type = meta.content_type;
            draft.cv = Some(cv);
        }

        if let Some(raw) = self.store.get(&self.key(VIDEO_BLOB_KEY)).await? {
            let blob: StoredVideo = serde_json::from_str(&raw)?;
            let data = BASE64_STANDARD.decode(blob.data.as_bytes())?;
            draft.video_file = Some(FileAttachment::new(
                blob.name,
                blob.content_type,
                Bytes::from(data),
            ));
        }

        Ok(Some(draft))
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key(FORM_DATA_KEY)).await?;
        self.store.remove(&self.key(CV_META_KEY)).await?;
        self.store.remove(&self.key(VIDEO_BLOB_KEY)).await?;
        Ok(())
    }

    pub async fn record_application_id(&self, id: &str) -> Result<(), StorageError> {
        self.store.set(&self.key(LAST_APPLICATION_KEY), id).await
    }

    pub async fn last_application_id(&self) -> Result<Option<String>, StorageError> {
        self.store.get(&self.key(LAST_APPLICATION_KEY)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::draft::{AttachmentSlot, SectionKind, SkillKind};
    use crate::storage::MemoryStore;

    fn filled_draft() -> ApplicationDraft {
        let mut draft = ApplicationDraft::default();
        draft.full_name = "Amina Haddad".into();
        draft.email = "amina@example.com".into();
        draft.country_code = "+971".into();
        draft
            .update_field(SectionKind::Education, 0, "institution", "AUS".into())
            .unwrap();
        draft.add_row(SectionKind::Education);
        draft
            .update_field(SectionKind::Education, 1, "diploma", "MSc".into())
            .unwrap();
        draft.add_skill(SkillKind::Technical, "Rust").unwrap();
        draft.add_skill(SkillKind::Managerial, "Coaching").unwrap();
        draft
            .attach(
                &AttachmentSlot::Cv,
                FileAttachment::new("cv.pdf", "application/pdf", Bytes::from_static(b"%PDF-1.7")),
            )
            .unwrap();
        draft
            .attach(
                &AttachmentSlot::Education(0),
                FileAttachment::new("transcript.pdf", "application/pdf", Bytes::from_static(b"%PDF")),
            )
            .unwrap();
        draft
            .attach(
                &AttachmentSlot::Video,
                FileAttachment::new("intro.webm", "video/webm", Bytes::from_static(&[1, 2, 3, 0, 255])),
            )
            .unwrap();
        draft.video_intro_submitted = true;
        draft
    }

    #[tokio::test]
    async fn form_slot_holds_placeholders_only() {
        let backend = Arc::new(MemoryStore::new());
        let store = DraftStore::new(backend.clone());
        store.save(&filled_draft()).await.unwrap();

        let raw = backend.get(FORM_DATA_KEY).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["cv"], serde_json::json!({"name": "cv.pdf", "hasFile": true}));
        assert_eq!(
            json["education"][0]["evidence"],
            serde_json::json!({"name": "transcript.pdf", "hasFile": true})
        );
        assert_eq!(
            json["videoFile"],
            serde_json::json!({"name": "intro.webm", "hasFile": true})
        );
    }

    #[tokio::test]
    async fn round_trip_keeps_fields_and_degrades_files() {
        let store = DraftStore::new(Arc::new(MemoryStore::new()));
        let original = filled_draft();
        store.save(&original).await.unwrap();

        let restored = store.load().await.unwrap().expect("draft saved");
        assert_eq!(restored.full_name, original.full_name);
        assert_eq!(restored.country_code, original.country_code);
        assert_eq!(restored.education.len(), 2);
        assert_eq!(restored.education[1].diploma, "MSc");
        assert_eq!(restored.technical_skills.skills, vec!["Rust".to_string()]);
        assert!(restored.video_intro_submitted);

        let cv = restored.cv.as_ref().unwrap();
        assert_eq!(cv.name, "cv.pdf");
        assert_eq!(cv.size(), 0);
        assert_eq!(cv.content_type, "application/pdf");

        let evidence = restored.education[0].evidence.as_ref().unwrap();
        assert_eq!(evidence.name, "transcript.pdf");
        assert!(evidence.is_placeholder());

        assert_eq!(restored.video_file, original.video_file);
    }

    #[tokio::test]
    async fn saving_a_restored_draft_keeps_the_video_blob() {
        let store = DraftStore::new(Arc::new(MemoryStore::new()));
        store.save(&filled_draft()).await.unwrap();
        let mut restored = store.load().await.unwrap().unwrap();
        restored.video_file = Some(FileAttachment::placeholder("intro.webm"));
        store.save(&restored).await.unwrap();

        let again = store.load().await.unwrap().unwrap();
        assert_eq!(again.video_file.unwrap().data.as_ref(), &[1u8, 2, 3, 0, 255][..]);
    }

    #[tokio::test]
    async fn clear_empties_draft_slots_but_not_the_application_id() {
        let backend = Arc::new(MemoryStore::new());
        let store = DraftStore::namespaced(backend.clone(), "s1");
        store.save(&filled_draft()).await.unwrap();
        store.record_application_id("APP-42").await.unwrap();

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        assert_eq!(backend.get("s1:recordedVideoBlob").await.unwrap(), None);
        assert_eq!(backend.get("s1:uploadedCvFile").await.unwrap(), None);
        assert_eq!(
            store.last_application_id().await.unwrap().as_deref(),
            Some("APP-42")
        );
    }

    #[tokio::test]
    async fn form_saves_leave_the_video_blob_alone() {
        let backend = Arc::new(MemoryStore::new());
        let store = DraftStore::new(backend.clone());
        let mut draft = filled_draft();
        store.save(&draft).await.unwrap();
        let blob = backend.get(VIDEO_BLOB_KEY).await.unwrap();

        draft.video_file = None;
        draft.full_name = "Amina H.".into();
        store.save_form(&draft).await.unwrap();
        assert_eq!(backend.get(VIDEO_BLOB_KEY).await.unwrap(), blob);

        store.save_video(None).await.unwrap();
        assert_eq!(backend.get(VIDEO_BLOB_KEY).await.unwrap(), None);
    }
}
