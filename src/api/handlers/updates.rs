use crate::AppState;
use crate::api::error::{RestError, RestErrorCode};
use crate::models::{CreateUpdateRequest, ErrorDto};
use axum::{
    body::Body,
    extract::{Multipart, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use utoipa::IntoParams;

/// Value of one cookie from the `Cookie` header, if present.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[utoipa::path(
    post,
    path = "/file/upload",
    request_body(content = String, description = "Multipart form: `file` (binary) + `data` (JSON CreateUpdateRequest)", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Update stored"),
        (status = 400, description = "Missing part or malformed descriptor", body = ErrorDto),
        (status = 403, description = "Cookie token lacks upload permission", body = ErrorDto),
        (status = 404, description = "Target resource unknown", body = ErrorDto)
    ),
    tag = "file"
)]
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<StatusCode, RestError> {
    let token = cookie_value(&headers, "user-cookie")
        .ok_or_else(RestError::not_authorized)?
        .to_string();

    let mut file: Option<(String, Bytes)> = None;
    let mut data: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RestError::malformed_body(e))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let real_name = field.file_name().unwrap_or("unnamed").to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| RestError::malformed_body(e))?;
                file = Some((real_name, content));
            }
            "data" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| RestError::malformed_body(e))?;
                data = Some(text);
            }
            _ => {}
        }
    }

    let (real_name, content) = file.ok_or_else(|| {
        RestError::new(RestErrorCode::MissingPart, "Multipart part 'file' missing")
    })?;
    let data = data.ok_or_else(|| {
        RestError::new(RestErrorCode::MissingPart, "Multipart part 'data' missing")
    })?;
    let request: CreateUpdateRequest =
        serde_json::from_str(&data).map_err(RestError::malformed_body)?;

    state
        .updates
        .create_update(&token, &real_name, content, request)
        .await?;
    Ok(StatusCode::OK)
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub update_id: i32,
}

#[utoipa::path(
    get,
    path = "/file/download",
    params(DownloadQuery),
    responses(
        (status = 200, description = "Raw artifact bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Unknown update", body = ErrorDto)
    ),
    tag = "file"
)]
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, RestError> {
    let file = state.updates.get_download(query.update_id).await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (header::CONTENT_LENGTH, file.size.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", sanitize_filename(&file.real_name)),
        ),
    ];

    let body = Body::from_stream(ReaderStream::new(file.content));
    Ok((headers, body).into_response())
}

/// Keeps uploader-supplied filenames safe to embed in a quoted
/// Content-Disposition value.
fn sanitize_filename(name: &str) -> String {
    name.replace(['"', '\\', '\r', '\n'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; user-cookie=tok-123; lang=en"),
        );
        assert_eq!(cookie_value(&headers, "user-cookie"), Some("tok-123"));
        assert_eq!(cookie_value(&headers, "theme"), Some("dark"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_cookie_value_without_header() {
        let headers = HeaderMap::new();
        assert_eq!(cookie_value(&headers, "user-cookie"), None);
    }

    #[test]
    fn test_filename_quotes_and_control_chars_neutralized() {
        assert_eq!(sanitize_filename("plain.jar"), "plain.jar");
        assert_eq!(
            sanitize_filename("we\"ird\\name\r\n.jar"),
            "we_ird_name__.jar"
        );
    }
}
