// src/app/cache.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};
use std::time::{Duration, SystemTime};

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::config::{load_config, resolve_relative_path, DEFAULT_CACHE_DIR};

// Chosen once on first call
static CACHE_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_PRUNE_ONCE: Once = Once::new();

pub const POSTER_MAX_W: u32 = 240;
pub const POSTER_QUALITY: u8 = 85;
const POSTER_RETENTION_DAYS: u64 = 30;
const POSTER_RETENTION: Duration = Duration::from_secs(POSTER_RETENTION_DAYS * 24 * 60 * 60);
const IMAGE_EXTS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

pub fn cache_dir() -> PathBuf {
    CACHE_DIR_ONCE
        .get_or_init(|| {
            let cfg = load_config();
            let mut path = cfg
                .cache_dir
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map_or_else(|| resolve_relative_path(DEFAULT_CACHE_DIR), resolve_relative_path);

            if let Err(e) = fs::create_dir_all(&path) {
                warn!("failed to create cache dir {}: {e}", path.display());
                // Fall back to local folder if creation failed
                path = PathBuf::from(DEFAULT_CACHE_DIR);
                let _ = fs::create_dir_all(&path);
            }
            path
        })
        .clone()
}

pub fn poster_cache_dir() -> PathBuf {
    let dir = POSTER_DIR_ONCE.get_or_init(|| {
        let mut path = cache_dir().join("posters");
        if let Err(e) = fs::create_dir_all(&path) {
            warn!("failed to create poster cache dir {}: {e}", path.display());
            path = cache_dir();
        }
        path
    });

    POSTER_PRUNE_ONCE.call_once({
        let path = dir.clone();
        move || match prune_dir(&path, POSTER_RETENTION) {
            Ok(n) if n > 0 => debug!("pruned {n} stale posters"),
            Ok(_) => {}
            Err(err) => warn!("poster cache prune failed: {err}"),
        }
    });

    dir.clone()
}

fn is_image_ext(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| IMAGE_EXTS.contains(&e.as_str()))
}

/// Remove cached images in `dir` older than `max_age`. Returns the count removed.
pub fn prune_dir(dir: &Path, max_age: Duration) -> std::io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(max_age)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if !is_image_ext(&path) {
            continue;
        }
        let modified = entry
            .metadata()?
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if modified < cutoff {
            let _ = fs::remove_file(&path);
            removed += 1;
        }
    }
    Ok(removed)
}

/// Drop leftovers from interrupted downloads: `.part` files and empty images.
pub fn clean_partials(dir: &Path) -> std::io::Result<usize> {
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let partial = path.extension().and_then(|e| e.to_str()) == Some("part");
        let empty = is_image_ext(&path) && entry.metadata()?.len() == 0;
        if partial || empty {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn refresh_poster_cache_light() -> std::io::Result<usize> {
    let dir = poster_cache_dir();
    Ok(clean_partials(&dir)? + prune_dir(&dir, POSTER_RETENTION)?)
}

pub fn url_to_cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

pub fn find_in_dir(dir: &Path, key: &str) -> Option<PathBuf> {
    IMAGE_EXTS
        .iter()
        .map(|ext| dir.join(format!("{key}.{ext}")))
        .find(|p| p.exists())
}

pub fn find_any_by_key(key: &str) -> Option<PathBuf> {
    find_in_dir(&poster_cache_dir(), key)
}

/// Decode a cached file into (width, height, RGBA8 bytes).
pub fn load_rgba(path: &Path) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::ImageReader::open(path)
        .map_err(|e| format!("open image {}: {e}", path.display()))?
        .with_guessed_format()
        .map_err(|e| format!("guess format {}: {e}", path.display()))?
        .decode()
        .map_err(|e| format!("decode {}: {e}", path.display()))?;
    let (w, h) = img.dimensions();
    Ok((w, h, img.to_rgba8().into_raw()))
}

/// Shrink to `max_width` keeping aspect; smaller images pass through.
pub fn resize_to_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w <= max_width {
        return img;
    }
    let new_h = ((h as f32) * (max_width as f32 / w as f32))
        .round()
        .max(1.0) as u32;
    img.resize_exact(max_width, new_h, FilterType::CatmullRom)
}

pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, String> {
    let mut out: Vec<u8> = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    // JPEG has no alpha channel
    encoder
        .encode_image(&DynamicImage::ImageRgb8(img.to_rgb8()))
        .map_err(|e| format!("jpeg encode: {e}"))?;
    Ok(out)
}

/// Write `bytes` to `dest` through a `.part` file so readers never see a half file.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = dest.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let tmp = dest.with_extension("jpg.part");
    {
        let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
        f.write_all(bytes).map_err(|e| format!("write: {e}"))?;
    }
    fs::rename(&tmp, dest).map_err(|e| format!("rename: {e}"))
}

/// Download a poster, resize it and store it as `<poster_cache_dir>/<key>.jpg`.
/// Reuses the caller's client for connection pooling.
pub fn download_and_store_resized_with_client(
    client: &Client,
    url: &str,
    key: &str,
    max_width: u32,
    quality: u8,
) -> Result<PathBuf, String> {
    let dest = poster_cache_dir().join(format!("{key}.jpg"));
    if dest.exists() {
        return Ok(dest);
    }

    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download {url}: {e}"))?;

    let img = image::load_from_memory(&bytes).map_err(|e| format!("decode {url}: {e}"))?;
    let jpeg = encode_jpeg(&resize_to_width(img, max_width), quality)?;
    write_atomic(&dest, &jpeg)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn poster(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([200, 40, 40, 255])))
    }

    #[test]
    fn cache_key_is_stable_md5_hex() {
        let a = url_to_cache_key("https://images.justwatch.com/poster/1/s332/moana.jpg");
        let b = url_to_cache_key("https://images.justwatch.com/poster/1/s332/moana.jpg");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, url_to_cache_key("https://images.justwatch.com/poster/2/s332/up.jpg"));
    }

    #[test]
    fn resize_keeps_aspect_and_skips_small_images() {
        let big = resize_to_width(poster(600, 900), 240);
        assert_eq!(big.dimensions(), (240, 360));
        let small = resize_to_width(poster(100, 150), 240);
        assert_eq!(small.dimensions(), (100, 150));
    }

    #[test]
    fn jpeg_written_atomically_and_found_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("abc.jpg");
        let bytes = encode_jpeg(&poster(60, 90), POSTER_QUALITY).unwrap();
        write_atomic(&dest, &bytes).unwrap();

        assert_eq!(find_in_dir(dir.path(), "abc"), Some(dest.clone()));
        assert_eq!(find_in_dir(dir.path(), "missing"), None);
        assert!(!dir.path().join("abc.jpg.part").exists());

        let (w, h, rgba) = load_rgba(&dest).unwrap();
        assert_eq!((w, h), (60, 90));
        assert_eq!(rgba.len(), (60 * 90 * 4) as usize);
    }

    #[test]
    fn prune_keeps_fresh_files_and_ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fresh.jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        assert_eq!(prune_dir(dir.path(), POSTER_RETENTION).unwrap(), 0);
        assert!(dir.path().join("fresh.jpg").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn partials_and_empty_images_are_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg.part"), b"half").unwrap();
        fs::write(dir.path().join("b.jpg"), b"").unwrap();
        fs::write(dir.path().join("c.jpg"), b"ok").unwrap();
        assert_eq!(clean_partials(dir.path()).unwrap(), 2);
        assert!(dir.path().join("c.jpg").exists());
    }
}
