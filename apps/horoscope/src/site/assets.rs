//! Asset publishing: copies the asset directory and picks the entrance image.

use std::path::Path;

use tracing::{debug, info};

const IMAGE_EXTENSIONS: &[&str] = &["webp", "png", "jpg", "jpeg"];
const ENTRANCE_IMAGE: &str = "entrance";
const SECONDARY_IMAGE: &str = "logo";

/// Copies every file under `src` into `dst`, recursively, overwriting what is
/// there. Returns the number of files copied; a missing `src` copies nothing.
pub fn copy_assets(src: &Path, dst: &Path) -> std::io::Result<usize> {
    if !src.is_dir() {
        info!("Asset directory {} not found; no images copied", src.display());
        return Ok(0);
    }
    copy_dir(src, dst)
}

fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<usize> {
    std::fs::create_dir_all(dst)?;
    let mut copied = 0;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn find_named(dir: &Path, stem: &str) -> Option<String> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| format!("{stem}.{ext}"))
        .find(|name| dir.join(name).is_file())
}

/// Chooses the home page hero image: `entrance.*`, else `logo.*`, else the
/// first image file by name. `None` when the directory holds no image.
pub fn find_entrance_image(dir: &Path) -> Option<String> {
    if let Some(name) = find_named(dir, ENTRANCE_IMAGE) {
        return Some(name);
    }
    if let Some(name) = find_named(dir, SECONDARY_IMAGE) {
        debug!("No entrance image; using {}", name);
        return Some(name);
    }

    let mut images: Vec<String> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image(path))
        .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
        .collect();
    images.sort();

    let first = images.into_iter().next();
    if let Some(name) = &first {
        debug!("No entrance or logo image; using {}", name);
    }
    first
}
