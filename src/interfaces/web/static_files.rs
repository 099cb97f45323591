use axum::{
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{error, warn};

use super::AppState;
use super::context::RequestContext;

const INDEX_FILE: &str = "index.html";

#[derive(Debug, thiserror::Error)]
pub(crate) enum StaticError {
    #[error("path escapes the static root")]
    Forbidden,
    #[error("file not found")]
    NotFound,
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Maps a URL path onto a file under `root` without touching the filesystem.
///
/// `None` means the path tried to climb out of `root`.
pub(crate) fn resolve_under_root(root: &Path, url_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(url_path).ok()?;
    let mut relative = PathBuf::new();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !relative.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if relative.as_os_str().is_empty() {
        relative.push(INDEX_FILE);
    }
    Some(root.join(relative))
}

async fn load(root: &Path, url_path: &str) -> Result<(PathBuf, Vec<u8>), StaticError> {
    let mut target = resolve_under_root(root, url_path).ok_or(StaticError::Forbidden)?;

    let canonical_root = tokio::fs::canonicalize(root).await.map_err(not_found_or_io)?;
    if tokio::fs::metadata(&target)
        .await
        .map_err(not_found_or_io)?
        .is_dir()
    {
        target.push(INDEX_FILE);
    }

    // Symlinks inside the root may still point outside of it.
    let canonical = tokio::fs::canonicalize(&target)
        .await
        .map_err(not_found_or_io)?;
    if !canonical.starts_with(&canonical_root) {
        return Err(StaticError::Forbidden);
    }

    let bytes = tokio::fs::read(&canonical).await.map_err(not_found_or_io)?;
    Ok((target, bytes))
}

fn not_found_or_io(e: std::io::Error) -> StaticError {
    match e.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory | ErrorKind::InvalidInput => {
            StaticError::NotFound
        }
        _ => StaticError::Io(e),
    }
}

pub(crate) async fn static_file_handler(State(state): State<AppState>, uri: Uri) -> Response {
    match load(&state.static_root, uri.path()).await {
        Ok((path, bytes)) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], bytes).into_response()
        }
        Err(StaticError::Forbidden) => {
            warn!(
                request_id = %RequestContext::current_id(),
                path = %uri.path(),
                "rejected path traversal attempt"
            );
            (StatusCode::FORBIDDEN, "403 Forbidden").into_response()
        }
        Err(StaticError::NotFound) => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
        Err(e) => {
            error!(
                request_id = %RequestContext::current_id(),
                path = %uri.path(),
                error = %e,
                "static file read failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error").into_response()
        }
    }
}
