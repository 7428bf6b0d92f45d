//! Locating yt-dlp's output and placing it in the destination folder

use crate::extractor::MediaKind;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Upper bound on " (n)" suffixes tried before giving up
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// Extensions accepted as a finished download, in priority order
pub fn expected_extensions(kind: MediaKind) -> &'static [&'static str] {
    match kind {
        MediaKind::Audio => &["mp3", "m4a", "webm", "opus"],
        MediaKind::Video => &["mp4", "webm", "mkv", "avi", "mov"],
    }
}

/// First file in `dir` whose extension matches, trying extensions in
/// priority order. Part files and other leftovers never match.
pub async fn find_output_file(dir: &Path, kind: MediaKind) -> std::io::Result<Option<PathBuf>> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        match fs::metadata(&path).await {
            Ok(meta) => debug!("  {} ({:.2} MB)", path.display(), meta.len() as f64 / 1_048_576.0),
            Err(_) => debug!("  {}", path.display()),
        }
        names.push(path);
    }
    names.sort();

    for ext in expected_extensions(kind) {
        let suffix = format!(".{}", ext);
        if let Some(found) = names.iter().find(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_lowercase().ends_with(&suffix))
                .unwrap_or(false)
        }) {
            return Ok(Some(found.clone()));
        }
    }

    Ok(None)
}

/// Candidate name for attempt `n`: `name.ext`, `name (1).ext`, `name (2).ext`, ...
pub fn numbered_name(file_name: &str, n: u32) -> String {
    if n == 0 {
        return file_name.to_string();
    }
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    }
}

/// Atomically claim a free name in `folder` by creating an empty file there.
///
/// `create_new` fails if the name exists, so two writers can never be
/// handed the same path.
pub async fn reserve_destination(folder: &Path, file_name: &str) -> std::io::Result<PathBuf> {
    for n in 0..MAX_NAME_ATTEMPTS {
        let candidate = folder.join(numbered_name(file_name, n));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free name for {} in {}", file_name, folder.display()),
    ))
}

/// Move `src` onto `dst`, falling back to copy + delete when a rename
/// isn't possible (e.g. across filesystems).
pub async fn move_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!("rename failed ({}), copying instead", e);
            fs::copy(src, dst).await?;
            if let Err(e) = fs::remove_file(src).await {
                warn!("Failed to remove {} after copy: {}", src.display(), e);
            }
            Ok(())
        }
    }
}

/// Move `src` into `folder` under its own name, or the first free
/// numbered variant of it. Returns the final path.
pub async fn place_file(src: &Path, folder: &Path) -> std::io::Result<PathBuf> {
    let file_name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "source has no file name"))?;

    let target = reserve_destination(folder, &file_name).await?;
    if let Err(e) = move_file(src, &target).await {
        // Release the placeholder so a failed move leaves nothing behind
        let _ = fs::remove_file(&target).await;
        return Err(e);
    }

    Ok(target)
}
