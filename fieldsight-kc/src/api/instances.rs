//! Instance ingestion, media and Enketo endpoints

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fieldsight_common::db::{Attachment, Instance};
use fieldsight_common::{parse_xform_instance, ParsedInstance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{attachments, instances, xforms};
use crate::services::{
    build_zip, client_ip, form_url, image_urls, request_host, EnketoRequest, EnketoUrl,
};
use crate::{ApiError, ApiResult, AppState};

/// Response to a stored submission
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: i64,
    pub uuid: String,
    pub xform: i64,
    pub data: ParsedInstance,
}

#[derive(Debug, Serialize)]
pub struct EnketoUrlResponse {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditQuery {
    pub return_url: Option<String>,
}

/// POST /api/instances
///
/// Body is the raw instance XML. The form is resolved from the root `id`
/// attribute; the instance uuid comes from `meta/instanceID` when present.
pub async fn submit_instance(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    xml: String,
) -> ApiResult<(StatusCode, Json<SubmissionResponse>)> {
    let ip = client_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    debug!(client_ip = ?ip, bytes = xml.len(), "Instance submission received");

    let parsed = parse_xform_instance(&xml)?;
    let xform = xforms::get_xform_by_id_string(&state.db, parsed.id_string())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Form '{}'", parsed.id_string())))?;

    let uuid = parsed
        .instance_uuid()
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let instance = instances::create_instance(&state.db, xform.id, &uuid, &xml).await?;
    info!(
        instance_id = instance.id,
        form_id = %xform.id_string,
        client_ip = ?ip,
        "Instance stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            id: instance.id,
            uuid,
            xform: xform.id,
            data: parsed,
        }),
    ))
}

/// GET /api/instances/:id/attachments.zip
pub async fn download_attachments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let instance = load_instance(&state, id).await?;
    let attachments = attachments::list_attachments_for_instance(&state.db, id).await?;

    let storage = state.storage.clone();
    let reporter = state.reporter.clone();
    let file = tokio::task::spawn_blocking(move || {
        build_zip(&attachments, storage.as_ref(), reporter.as_ref())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Archive task failed: {}", e)))?
    .map_err(|e| ApiError::Internal(format!("Failed to build archive: {}", e)))?;

    let stream = ReaderStream::new(tokio::fs::File::from_std(file));
    let disposition = format!("attachment; filename=\"{}.zip\"", instance.uuid);

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// POST /api/instances/:id/attachments/:name
///
/// Body is the raw file. Stored as `<owner>/attachments/<name>`; the mimetype
/// comes from `Content-Type`.
pub async fn upload_attachment(
    State(state): State<AppState>,
    Path((id, name)): Path<(i64, String)>,
    headers: HeaderMap,
    content: Bytes,
) -> ApiResult<(StatusCode, Json<Attachment>)> {
    if name.trim().is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return Err(ApiError::BadRequest(format!(
            "Invalid attachment name '{}'",
            name
        )));
    }

    let instance = load_instance(&state, id).await?;
    let xform = xforms::get_xform_with_owner(&state.db, instance.xform_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Form {}", instance.xform_id)))?;

    let media_file = format!("{}/attachments/{}", xform.username, name);
    let mimetype = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("application/octet-stream")
        .to_string();

    let storage = state.storage.clone();
    let path = media_file.clone();
    tokio::task::spawn_blocking(move || storage.save(&path, &content))
        .await
        .map_err(|e| ApiError::Internal(format!("Storage task failed: {}", e)))??;

    let attachment =
        attachments::create_attachment(&state.db, instance.id, &media_file, &mimetype).await?;
    info!(
        instance_id = instance.id,
        attachment_id = attachment.id,
        file = %media_file,
        "Attachment stored"
    );

    Ok((StatusCode::CREATED, Json(attachment)))
}

/// GET /api/instances/:id/image-urls
pub async fn instance_image_urls(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<String>>> {
    load_instance(&state, id).await?;
    let attachments = attachments::list_attachments_for_instance(&state.db, id).await?;

    Ok(Json(image_urls(
        &attachments,
        state.storage.as_ref(),
        &state.config.media.thumbnail_suffix,
    )))
}

/// GET /api/forms/:id/image-urls
pub async fn form_image_urls(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<String>>> {
    xforms::get_xform(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Form {}", id)))?;
    let attachments = attachments::list_attachments_for_xform(&state.db, id).await?;

    Ok(Json(image_urls(
        &attachments,
        state.storage.as_ref(),
        &state.config.media.thumbnail_suffix,
    )))
}

/// GET /api/instances/:id/enketo/edit?return_url=...
pub async fn enketo_edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<EditQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<EnketoUrlResponse>> {
    let request = instance_enketo_request(&state, id, &headers, query.return_url).await?;
    let outcome = state.enketo.edit_url(&request).await?;
    enketo_response(outcome)
}

/// GET /api/instances/:id/enketo/view
pub async fn enketo_view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult<Json<EnketoUrlResponse>> {
    let request = instance_enketo_request(&state, id, &headers, None).await?;
    let outcome = state.enketo.view_url(&request).await?;
    enketo_response(outcome)
}

/// GET /api/forms/:id/enketo
///
/// Web form URL for a blank submission.
pub async fn enketo_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult<Json<EnketoUrlResponse>> {
    let xform = xforms::get_xform_with_owner(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Form {}", id)))?;

    let server_url = server_form_url(&state, &headers, &xform.username);
    let request = EnketoRequest::for_form(server_url, xform.id_string);
    let outcome = state.enketo.url(&request).await?;
    enketo_response(outcome)
}

async fn load_instance(state: &AppState, id: i64) -> ApiResult<Instance> {
    instances::get_instance(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Instance {}", id)))
}

fn server_form_url(state: &AppState, headers: &HeaderMap, username: &str) -> String {
    form_url(
        request_host(headers),
        username,
        &state.config.enketo.protocol,
        &state.config.hosts,
        &state.config.testing,
    )
}

async fn instance_enketo_request(
    state: &AppState,
    id: i64,
    headers: &HeaderMap,
    return_url: Option<String>,
) -> ApiResult<EnketoRequest> {
    let instance = load_instance(state, id).await?;
    let xform = xforms::get_xform_with_owner(&state.db, instance.xform_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Form {}", instance.xform_id)))?;

    let attachment_urls: BTreeMap<String, String> =
        attachments::list_attachments_for_instance(&state.db, id)
            .await?
            .into_iter()
            .map(|a| {
                let name = a
                    .media_file
                    .rsplit('/')
                    .next()
                    .unwrap_or(a.media_file.as_str())
                    .to_string();
                (name, state.storage.url(&a.media_file))
            })
            .collect();

    let server_url = server_form_url(state, headers, &xform.username);
    Ok(EnketoRequest::for_form(server_url, xform.id_string)
        .with_instance(instance.xml, instance.uuid, return_url)
        .with_attachments(attachment_urls))
}

fn enketo_response(outcome: EnketoUrl) -> ApiResult<Json<EnketoUrlResponse>> {
    match outcome.into_result()? {
        Some(url) => Ok(Json(EnketoUrlResponse { url })),
        None => Err(ApiError::ServiceUnavailable(
            "Enketo did not provide a form URL".to_string(),
        )),
    }
}

/// Build instance routes
pub fn instance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/instances", post(submit_instance))
        .route("/api/instances/:id/attachments.zip", get(download_attachments))
        .route("/api/instances/:id/attachments/:name", post(upload_attachment))
        .route("/api/instances/:id/image-urls", get(instance_image_urls))
        .route("/api/instances/:id/enketo/edit", get(enketo_edit))
        .route("/api/instances/:id/enketo/view", get(enketo_view))
        .route("/api/forms/:id/image-urls", get(form_image_urls))
        .route("/api/forms/:id/enketo", get(enketo_form))
}
