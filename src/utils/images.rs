use crate::error::Result;
use crate::utils::files::{is_present, write_creating_dirs};
use crate::utils::http::Fetch;
use std::path::{Path, PathBuf};

/// How a download URL is recognised as a WEBP export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebpDetection {
    /// URL ends with `.webp`
    Suffix,
    /// URL ends with `.webp` or contains a `/card.webp` segment
    SuffixOrCardSegment,
}

/// Outcome of making sure an image is on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    /// A non-empty file was already there; nothing was requested
    Cached,
    /// The image was downloaded and written
    Downloaded,
}

/// Absolute references are used as-is, anything else is appended to the API base.
pub fn resolve_image_url(base: &str, reference: &str) -> String {
    if reference.starts_with("http") {
        reference.to_string()
    } else {
        format!("{}{}", base, reference)
    }
}

pub fn image_extension(url: &str, detection: WebpDetection) -> &'static str {
    let webp = match detection {
        WebpDetection::Suffix => url.ends_with(".webp"),
        WebpDetection::SuffixOrCardSegment => {
            url.ends_with(".webp") || url.contains("/card.webp")
        }
    };
    if webp {
        "webp"
    } else {
        "jpg"
    }
}

/// Download `url` into `target` unless a non-empty file already exists there.
///
/// The bytes are written in place; an interrupted write can leave a partial
/// file behind, which is re-fetched on the next run only if it is empty.
pub async fn materialize_image<F: Fetch>(
    fetcher: &F,
    url: &str,
    target: &Path,
) -> Result<Materialized> {
    if is_present(target) {
        return Ok(Materialized::Cached);
    }

    let bytes = fetcher.get_bytes(url).await?;
    write_creating_dirs(target, &bytes)?;
    Ok(Materialized::Downloaded)
}

/// A directory of card images under the front-end's `public/` tree.
#[derive(Debug, Clone)]
pub struct ImageStore {
    public_dir: PathBuf,
    relative_dir: &'static str,
    detection: WebpDetection,
}

/// A card image that is on disk after [`ImageStore::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Path relative to `public/`, as the front-end references it
    pub relative: String,
    pub outcome: Materialized,
}

impl ImageStore {
    pub fn new(public_dir: PathBuf, relative_dir: &'static str, detection: WebpDetection) -> Self {
        Self {
            public_dir,
            relative_dir,
            detection,
        }
    }

    pub fn local_path(&self, file_name: &str) -> PathBuf {
        self.public_dir.join(self.relative_dir).join(file_name)
    }

    /// Store the artwork for card `guid` referenced by `reference`.
    ///
    /// `guid` must already be validated, it becomes the file name.
    pub async fn store<F: Fetch>(
        &self,
        fetcher: &F,
        base: &str,
        guid: &str,
        reference: &str,
    ) -> Result<StoredImage> {
        let url = resolve_image_url(base, reference);
        let file_name = format!("{}.{}", guid, image_extension(&url, self.detection));
        let outcome = materialize_image(fetcher, &url, &self.local_path(&file_name)).await?;

        Ok(StoredImage {
            relative: format!("{}/{}", self.relative_dir, file_name),
            outcome,
        })
    }
}
