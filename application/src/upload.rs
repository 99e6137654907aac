//! Storage of uploaded files.

use std::{
    io,
    path::{Path, PathBuf},
};

use tracerr::Traced;
use uuid::Uuid;

/// Storage of uploaded files in a local directory.
#[derive(Clone, Debug)]
pub struct Uploads {
    /// Base directory the files are stored in.
    dir: PathBuf,
}

impl Uploads {
    /// Subdirectory of announcement images.
    const ANNOUNCEMENTS: &'static str = "announcements";

    /// Creates new [`Uploads`] storing files in the provided directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stores an image of an announcement under a freshly generated name,
    /// keeping the extension of its `original_name`.
    ///
    /// Returns the name the file is stored under.
    ///
    /// # Errors
    ///
    /// If the file cannot be written.
    pub async fn store_announcement_image(
        &self,
        original_name: Option<&str>,
        content: &[u8],
    ) -> Result<String, Traced<io::Error>> {
        let dir = self.dir.join(Self::ANNOUNCEMENTS);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(tracerr::wrap!())?;

        let name = file_name(Uuid::new_v4(), original_name);
        tokio::fs::write(dir.join(&name), content)
            .await
            .map_err(tracerr::wrap!())?;

        tracing::info!(file = %name, size = content.len(), "file uploaded");

        Ok(name)
    }
}

/// Generates a name of a stored file out of the provided `id` and the
/// extension of the `original_name`.
fn file_name(id: Uuid, original_name: Option<&str>) -> String {
    match original_name
        .map(Path::new)
        .and_then(Path::extension)
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}
