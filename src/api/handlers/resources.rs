use crate::AppState;
use crate::api::error::RestError;
use crate::api::pageable::Pageable;
use crate::models::{
    CreateResourceRequest, ECategory, EVersions, EditResourceRequest, ErrorDto, PageDto,
    ResourceDto, VersionsDto,
};
use crate::repositories::filter::ResourceFilter;
use crate::services::resource::ResourceKey;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

/// Raw token from the `authorization` header, empty when absent.
fn auth_token(headers: &HeaderMap) -> &str {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

async fn search(
    state: &AppState,
    category: ECategory,
    params: &HashMap<String, String>,
) -> Result<Json<PageDto>, RestError> {
    let pageable = Pageable::from_params(params);
    // Cap check happens before the store is touched.
    pageable.ensure_within_cap()?;
    let filter = ResourceFilter::from_params(params);

    let page = state
        .resources
        .search_resources(category, &pageable, &filter)
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/archive/mods",
    responses(
        (status = 200, description = "One page of mods", body = PageDto),
        (status = 400, description = "Page size over the cap", body = ErrorDto)
    ),
    tag = "archive"
)]
pub async fn search_mods(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PageDto>, RestError> {
    search(&state, ECategory::Mods, &params).await
}

#[utoipa::path(
    get,
    path = "/api/archive/plugins",
    responses(
        (status = 200, description = "One page of plugins", body = PageDto),
        (status = 400, description = "Page size over the cap", body = ErrorDto)
    ),
    tag = "archive"
)]
pub async fn search_plugins(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PageDto>, RestError> {
    search(&state, ECategory::Plugins, &params).await
}

#[utoipa::path(
    get,
    path = "/api/archive/software",
    responses(
        (status = 200, description = "One page of server software", body = PageDto),
        (status = 400, description = "Page size over the cap", body = ErrorDto)
    ),
    tag = "archive"
)]
pub async fn search_software(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PageDto>, RestError> {
    search(&state, ECategory::Software, &params).await
}

#[utoipa::path(
    post,
    path = "/api/archive/create",
    request_body = CreateResourceRequest,
    responses(
        (status = 200, description = "Resource created"),
        (status = 400, description = "Malformed body", body = ErrorDto),
        (status = 403, description = "Token lacks upload permission", body = ErrorDto),
        (status = 409, description = "Slug already taken", body = ErrorDto)
    ),
    tag = "archive"
)]
pub async fn create_resource(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, RestError> {
    // The web client sends the body as raw text, so parsing stays manual.
    let account = state
        .accounts
        .find_by_token(auth_token(&headers))
        .await?
        .filter(|account| account.can_upload)
        .ok_or_else(RestError::not_authorized)?;

    let request: CreateResourceRequest =
        serde_json::from_str(&body).map_err(RestError::malformed_body)?;
    state.resources.create_resource(request, account.id).await?;
    Ok(StatusCode::OK)
}

async fn edit(
    state: &AppState,
    headers: &HeaderMap,
    key: ResourceKey,
    request: &EditResourceRequest,
) -> Result<StatusCode, RestError> {
    if !state
        .accounts
        .has_permission_to_upload(auth_token(headers))
        .await?
    {
        return Err(RestError::not_authorized());
    }

    state.resources.update_resource(&key, request).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/archive/{resourceId}/edit",
    params(("resourceId" = i32, Path, description = "Resource id")),
    request_body = EditResourceRequest,
    responses(
        (status = 200, description = "Edit applied"),
        (status = 400, description = "Malformed body", body = ErrorDto),
        (status = 403, description = "Token lacks upload permission", body = ErrorDto),
        (status = 404, description = "Unknown resource", body = ErrorDto)
    ),
    tag = "archive"
)]
pub async fn edit_resource(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(resource_id): Path<i32>,
    body: String,
) -> Result<StatusCode, RestError> {
    let request: EditResourceRequest =
        serde_json::from_str(&body).map_err(RestError::malformed_body)?;
    edit(&state, &headers, ResourceKey::Id(resource_id), &request).await
}

#[utoipa::path(
    post,
    path = "/api/archive/slug/{slug}/edit",
    params(("slug" = String, Path, description = "Resource slug")),
    request_body = EditResourceRequest,
    responses(
        (status = 200, description = "Edit applied"),
        (status = 400, description = "Malformed body", body = ErrorDto),
        (status = 403, description = "Token lacks upload permission", body = ErrorDto),
        (status = 404, description = "Unknown resource", body = ErrorDto)
    ),
    tag = "archive"
)]
pub async fn edit_resource_by_slug(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    body: String,
) -> Result<StatusCode, RestError> {
    let request: EditResourceRequest =
        serde_json::from_str(&body).map_err(RestError::malformed_body)?;
    edit(&state, &headers, ResourceKey::Slug(slug), &request).await
}

async fn fetch(state: &AppState, key: ResourceKey) -> Result<Response, RestError> {
    match state.resources.get_resource_dto(&key).await? {
        Some(dto) => Ok(Json(dto).into_response()),
        // Unknown keys are a bare 404 with no body.
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/archive/{resourceId}",
    params(("resourceId" = i32, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Full resource view", body = ResourceDto),
        (status = 404, description = "Unknown resource")
    ),
    tag = "archive"
)]
pub async fn get_resource(
    State(state): State<AppState>,
    Path(resource_id): Path<i32>,
) -> Result<Response, RestError> {
    fetch(&state, ResourceKey::Id(resource_id)).await
}

#[utoipa::path(
    get,
    path = "/api/archive/slug/{slug}",
    params(("slug" = String, Path, description = "Resource slug")),
    responses(
        (status = 200, description = "Full resource view", body = ResourceDto),
        (status = 404, description = "Unknown resource")
    ),
    tag = "archive"
)]
pub async fn get_resource_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, RestError> {
    fetch(&state, ResourceKey::Slug(slug)).await
}

#[utoipa::path(
    delete,
    path = "/api/archive/{resourceId}/delete",
    params(("resourceId" = i32, Path, description = "Resource id")),
    responses((status = 200, description = "Resource removed from the catalog")),
    tag = "archive"
)]
pub async fn delete_resource(
    State(state): State<AppState>,
    Path(resource_id): Path<i32>,
) -> Result<StatusCode, RestError> {
    state.resources.delete_resource(resource_id).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/archive/versions",
    responses((status = 200, description = "Supported game versions", body = VersionsDto)),
    tag = "archive"
)]
pub async fn get_versions() -> Json<VersionsDto> {
    Json(VersionsDto::create(EVersions::labels()))
}

#[utoipa::path(
    get,
    path = "/api/archive/categories",
    responses((status = 200, description = "All categories", body = [ECategory])),
    tag = "archive"
)]
pub async fn get_categories() -> Json<[ECategory; 3]> {
    Json(ECategory::ALL)
}
