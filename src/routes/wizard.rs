use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::wizard_dto::{
        AttachmentQuery, RowAddedResponse, RowFieldPayload, ScalarFieldsPayload, SkillPayload,
        SuggestionQuery, SuggestionsResponse, TermsPayload, WizardView,
    },
    error::{Error, Result},
    models::draft::{ApplicationDraft, AttachmentSlot, FileAttachment, SectionKind, SkillKind},
    services::wizard_service::{SharedSession, WizardSession},
    utils::suggestions::{
        rank, LANGUAGES, LANGUAGE_SUGGESTION_LIMIT, MANAGERIAL_SKILLS, SKILL_SUGGESTION_LIMIT,
        TECHNICAL_SKILLS,
    },
    middleware::auth::Bearer,
    AppState,
};

async fn session(state: &AppState, id: Uuid) -> Result<SharedSession> {
    state
        .wizards
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Wizard session {} not found", id)))
}

fn view(id: Uuid, session: &WizardSession) -> Json<WizardView> {
    Json(WizardView::new(id, session))
}

#[axum::debug_handler]
pub async fn create_wizard(State(state): State<AppState>) -> impl IntoResponse {
    let (id, session) = state.wizards.create().await;
    let session = session.lock().await;
    (StatusCode::CREATED, view(id, &session))
}

#[axum::debug_handler]
pub async fn get_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let session = session.lock().await;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn replace_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<ApplicationDraft>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session.replace_draft(draft).await?;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session.next()?;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn previous_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session.previous();
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn jump_to_step(
    State(state): State<AppState>,
    Path((id, step)): Path<(Uuid, u8)>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session.jump_to(step)?;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn update_fields(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(fields): Json<ScalarFieldsPayload>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    for (field, value) in fields {
        session.set_scalar(field, value).await?;
    }
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn add_row(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, SectionKind)>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    let index = session.add_row(section).await?;
    Ok((
        StatusCode::CREATED,
        Json(RowAddedResponse {
            index,
            rows: session.draft().section_len(section),
        }),
    ))
}

#[axum::debug_handler]
pub async fn update_row(
    State(state): State<AppState>,
    Path((id, section, index)): Path<(Uuid, SectionKind, usize)>,
    Json(payload): Json<RowFieldPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session
        .update_field(section, index, &payload.field, payload.value)
        .await?;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn remove_row(
    State(state): State<AppState>,
    Path((id, section, index)): Path<(Uuid, SectionKind, usize)>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session.remove_row(section, index).await?;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn add_skill(
    State(state): State<AppState>,
    Path((id, kind)): Path<(Uuid, SkillKind)>,
    Json(payload): Json<SkillPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session.add_skill(kind, &payload.label).await?;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn remove_skill(
    State(state): State<AppState>,
    Path((id, kind, label)): Path<(Uuid, SkillKind, String)>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session.remove_skill(kind, &label).await?;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn suggestions(
    State(state): State<AppState>,
    Path((id, kind)): Path<(Uuid, String)>,
    Query(query): Query<SuggestionQuery>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let session = session.lock().await;
    let draft = session.draft();

    let suggestions = match kind.as_str() {
        "technical" => rank(
            &query.q,
            TECHNICAL_SKILLS,
            &draft.technical_skills.skills[..],
            SKILL_SUGGESTION_LIMIT,
        ),
        "managerial" => rank(
            &query.q,
            MANAGERIAL_SKILLS,
            &draft.managerial_skills.skills[..],
            SKILL_SUGGESTION_LIMIT,
        ),
        "languages" => {
            let taken: Vec<&str> = draft.languages.iter().map(|l| l.language.as_str()).collect();
            rank(&query.q, LANGUAGES, &taken, LANGUAGE_SUGGESTION_LIMIT)
        }
        other => return Err(Error::NotFound(format!("No suggestions for '{}'", other))),
    };
    Ok(Json(SuggestionsResponse { suggestions }))
}

async fn read_file(multipart: &mut Multipart) -> Result<(String, Option<String>, Bytes)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| Error::BadRequest("Uploaded file has no name".to_string()))?;
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        return Ok((name, content_type, data));
    }
    Err(Error::BadRequest("Missing multipart field 'file'".to_string()))
}

#[axum::debug_handler]
pub async fn upload_attachment(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, String)>,
    Query(query): Query<AttachmentQuery>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let slot = query.slot(&slot)?;
    let session = session(&state, id).await?;
    let (name, content_type, data) = read_file(&mut multipart).await?;

    // CV parsing runs before the session is locked.
    let file = match slot {
        AttachmentSlot::Cv => {
            state
                .document_service
                .accept_cv(&name, content_type.as_deref(), data)
                .await?
        }
        _ => FileAttachment::new(
            name,
            content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            data,
        ),
    };

    let mut session = session.lock().await;
    session.attach(&slot, file).await?;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn remove_attachment(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, String)>,
    Query(query): Query<AttachmentQuery>,
) -> Result<impl IntoResponse> {
    let slot = query.slot(&slot)?;
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session.detach(&slot).await?;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn confirm_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session.confirm_video().await?;
    Ok(view(id, &session))
}

#[axum::debug_handler]
pub async fn set_terms(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TermsPayload>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let mut session = session.lock().await;
    session.set_terms(payload.accepted)?;
    Ok(view(id, &session))
}

/// The session lock is released while the upstream call is in flight. An accepted
/// application closes the session; later requests for it get a 404.
#[axum::debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let session = session(&state, id).await?;
    let submission = session.lock().await.begin_submission(bearer)?;

    let result = state.gateway.submit(submission).await;

    let mut session = session.lock().await;
    session.complete_submission(result).await;
    if !session.is_submitted() {
        return Ok((StatusCode::BAD_GATEWAY, view(id, &session)));
    }
    let body = view(id, &session);
    drop(session);
    state.wizards.remove(id).await;
    Ok((StatusCode::OK, body))
}
