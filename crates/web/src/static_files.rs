//! File serving for `/reports/*` and `/static/*`

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Resolve `request_path` under `root`; `None` unless every component is a
/// plain name
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path);
    if request_path.is_empty() || request_path.contains('\\') {
        return None;
    }
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

/// Serve a file below `root`, content type from the extension
pub async fn serve(root: &Path, request_path: &str) -> Response {
    let Some(full_path) = resolve(root, request_path) else {
        warn!("Rejected file request: {}", request_path);
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    };

    match tokio::fs::read(&full_path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&full_path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            debug!("File {} not served: {}", full_path.display(), e);
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_rejects_escapes() {
        let root = Path::new("/srv/reports");
        assert_eq!(resolve(root, "a.html"), Some(root.join("a.html")));
        assert_eq!(resolve(root, "screens/b.png"), Some(root.join("screens/b.png")));
        assert_eq!(resolve(root, "../secret"), None);
        assert_eq!(resolve(root, "logs/../../secret"), None);
        assert_eq!(resolve(root, "/etc/passwd"), None);
        assert_eq!(resolve(root, "..\\secret"), None);
        assert_eq!(resolve(root, ""), None);
    }

    #[tokio::test]
    async fn test_content_types() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("r.html"), "<html></html>").unwrap();
        std::fs::write(dir.path().join("blob.zzqx"), [0u8, 1, 2]).unwrap();

        let html = serve(dir.path(), "r.html").await;
        assert_eq!(html.status(), StatusCode::OK);
        assert_eq!(html.headers()[header::CONTENT_TYPE], "text/html");

        let blob = serve(dir.path(), "blob.zzqx").await;
        assert_eq!(blob.headers()[header::CONTENT_TYPE], "application/octet-stream");

        assert_eq!(serve(dir.path(), "missing.css").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(serve(dir.path(), "../r.html").await.status(), StatusCode::FORBIDDEN);
    }
}
