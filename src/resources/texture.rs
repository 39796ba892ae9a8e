use std::path::{Component, Path, PathBuf};

use anyhow::{Context, bail};
use fs_extra::file::CopyOptions;

use crate::{config::ExportConfig, error::ExportError};

/// Destination for texture images referenced by exported materials.
pub trait ImageStore {
    /// Copies the image at `source` into the store under `texture_name` and returns
    /// the stored file name (not the full path).
    fn store(&mut self, source: &Path, texture_name: &str) -> anyhow::Result<String>;
}

/// Copies images into a directory as `<texture name>.<extension>`.
pub struct FsImageStore {
    dir: PathBuf,
}

impl FsImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ImageStore for FsImageStore {
    fn store(&mut self, source: &Path, texture_name: &str) -> anyhow::Result<String> {
        if !source.is_file() {
            return Err(ExportError::MissingImageFile(source.to_path_buf()).into());
        }
        let extension = match source.extension().and_then(|e| e.to_str()) {
            Some(extension) => extension.to_string(),
            None => guess_extension(source)?,
        };
        let file_name = format!("{}.{}", texture_name, extension);
        let target = self.dir.join(&file_name);
        let mut options = CopyOptions::new();
        options.overwrite = true;
        fs_extra::file::copy(source, &target, &options)
            .with_context(|| format!("Failed to copy {} to {}", source.display(), target.display()))?;
        log::debug!("Copied {} to {}", source.display(), target.display());
        Ok(file_name)
    }
}

/// Sniffs the image format from the file's content.
fn guess_extension(path: &Path) -> anyhow::Result<String> {
    let format = image::ImageReader::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .with_guessed_format()?
        .format();
    match format.and_then(|format| format.extensions_str().first().copied()) {
        Some(extension) => Ok(extension.to_string()),
        None => bail!("Unknown image format of {}", path.display()),
    }
}

/// Makes sure the mesh, material and image directories exist.
pub fn prepare_directories(config: &ExportConfig) -> anyhow::Result<()> {
    for dir in [&config.mesh_dir, &config.material_dir, &config.image_dir] {
        if !dir.is_dir() {
            log::warn!("Creating directory {}", dir.display());
            fs_extra::dir::create_all(dir, false)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
    }
    Ok(())
}

/// `/`-separated path leading from directory `from` to `to`. Relative inputs are
/// taken relative to the working directory. Returns `.` when both are the same.
pub fn relative_path(from: &Path, to: &Path) -> anyhow::Result<String> {
    let from = absolute(from)?;
    let to = absolute(to)?;
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(from[common..].iter().map(|_| "..".to_string()));
    parts.extend(to[common..].iter().cloned());
    if parts.is_empty() {
        return Ok(".".to_string());
    }
    Ok(parts.join("/"))
}

/// Lexically normalized components of `path` made absolute.
fn absolute(path: &Path) -> anyhow::Result<Vec<String>> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::Prefix(prefix) => parts.push(prefix.as_os_str().to_string_lossy().into_owned()),
            Component::RootDir | Component::CurDir => {}
        }
    }
    Ok(parts)
}
