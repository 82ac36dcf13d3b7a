//! Multipart upload bodies

use crate::error::{Error, Result};
use crate::http::FormPart;
use std::path::Path;
use tracing::debug;

/// Form field that carries the uploaded file
pub const ATTACHMENT_FIELD: &str = "attachment";

/// Endpoint for SIS imports
pub const SIS_IMPORT_ENDPOINT: &str = "accounts/1/sis_import";

/// Build the parts of an upload: text fields first, the file last
///
/// Fails with [`Error::FileNotFound`] when `path` is not a readable file.
pub(crate) async fn build_form<I, K, V>(path: &Path, fields: I) -> Result<Vec<FormPart>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(Error::file_not_found(path.display().to_string()));
    }

    let data = read_file(path).await?;
    let file_name = path
        .file_name()
        .map_or_else(|| ATTACHMENT_FIELD.to_string(), |n| n.to_string_lossy().into_owned());

    let mut parts: Vec<FormPart> = fields
        .into_iter()
        .map(|(k, v)| FormPart::text(k, v))
        .collect();
    parts.push(FormPart::file(
        ATTACHMENT_FIELD,
        file_name,
        content_type(path),
        data,
    ));
    Ok(parts)
}

/// Read the whole file; any failure (permissions, a directory, a file
/// removed after the check) is reported as [`Error::FileNotFound`]
async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        debug!("Cannot read upload file {}: {e}", path.display());
        Error::file_not_found(path.display().to_string())
    })
}

fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => "text/csv",
        Some("zip") => "application/zip",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
