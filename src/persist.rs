//! Persistence unit: transcode a record and write it to disk

use crate::codec;
use crate::context::PipelineContext;
use crate::error::{Error, Result};
use crate::fetch::fetch_image;
use crate::format::ImageFormat;
use crate::types::ImageRecord;
use std::path::{Path, PathBuf};

/// Output path for an image: `<dir>/<base_name>.<ext>`
///
/// Leading separators in `base_name` are dropped so the file always lands
/// inside `dir`.
pub fn output_path(dir: &Path, base_name: &str, format: ImageFormat) -> PathBuf {
    let stem = base_name.trim_start_matches('/');
    dir.join(format!("{}.{}", stem, format.extension()))
}

/// Create `dir` and any missing parents
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io(dir, e))
}

/// Write `bytes` to `path`, replacing any existing file
pub async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| Error::io(path, e))
}

/// Save `record` into `dir`, fetching it first if needed
///
/// With `target == None` the image is written in its detected format;
/// otherwise it is re-encoded into `target`. Returns the written path.
///
/// # Errors
///
/// - the fetch error, if the record was unfetched and the fetch failed
/// - [`Error::UnsupportedFormat`] if no target is given and the detected
///   format is not png, jpeg, gif or bmp
/// - [`Error::CorruptData`] / [`Error::Encode`] from the codec
/// - [`Error::Io`] if the directory or file cannot be written
pub async fn save_record(
    ctx: &PipelineContext,
    record: &mut ImageRecord,
    dir: &Path,
    target: Option<ImageFormat>,
) -> Result<PathBuf> {
    let image = match record.fetched().cloned() {
        Some(image) => image,
        None => {
            let image = fetch_image(ctx.transport.as_ref(), record.location()).await?;
            record.mark_fetched(image.clone());
            image
        }
    };

    let format = match target {
        Some(format) => format,
        None => ImageFormat::parse(&image.detected_format)?,
    };
    let path = output_path(dir, &image.base_name, format);

    // Decode + encode are CPU-bound; keep them off the async worker threads
    let options = ctx.encode_options;
    let encoded = tokio::task::spawn_blocking(move || {
        let decoded = codec::decode(&image.bytes, &image.detected_format)?;
        codec::encode(&decoded, format, &options)
    })
    .await
    .map_err(|e| Error::Encode {
        format: format.to_string(),
        message: format!("transcode task panicked: {e}"),
    })??;

    ensure_dir(dir).await?;
    write_file(&path, &encoded).await?;

    tracing::debug!(
        location = %record.location(),
        path = %path.display(),
        format = %format,
        bytes = encoded.len(),
        "Saved image"
    );
    Ok(path)
}
