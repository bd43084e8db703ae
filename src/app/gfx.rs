// src/app/gfx.rs
use std::path::Path;

use eframe::egui::{self as eg, ColorImage, TextureHandle};
use tracing::debug;

use super::PosterState;

/// Upload an RGBA image to a GPU texture. (UI thread only)
pub fn upload_rgba(ctx: &eg::Context, w: u32, h: u32, bytes: &[u8], name: &str) -> TextureHandle {
    let img = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], bytes);
    ctx.load_texture(name.to_string(), img, eg::TextureOptions::LINEAR)
}

/// Load a texture from a cached file; rejects images that are clearly not
/// portrait posters. (UI thread only)
pub fn load_texture_from_path(
    ctx: &eg::Context,
    path: &Path,
    cache_name: &str,
) -> Result<TextureHandle, String> {
    let (w, h, bytes) = crate::app::cache::load_rgba(path)?;
    if h == 0 {
        return Err(format!("empty image {}", path.display()));
    }
    let ar = (w as f32) / (h as f32);
    if !(0.5..=0.85).contains(&ar) {
        return Err(format!("non-poster aspect {w}x{h} ar={ar:.2}"));
    }
    Ok(upload_rgba(ctx, w, h, &bytes, cache_name))
}

impl crate::app::TripApp {
    /// Upload the poster for `url` if its file is cached but not yet on the
    /// GPU. Returns true when an upload happened.
    pub(crate) fn try_lazy_upload(&mut self, ctx: &eg::Context, url: &str) -> bool {
        let Some(slot) = self.posters.get_mut(url) else {
            return false;
        };
        if slot.state != PosterState::Cached {
            return false;
        }
        let Some(path) = slot.path.clone() else {
            slot.state = PosterState::Failed;
            return false;
        };
        match load_texture_from_path(ctx, &path, &slot.key) {
            Ok(tex) => {
                slot.tex = Some(tex);
                slot.state = PosterState::Ready;
                true
            }
            Err(e) => {
                debug!("poster upload failed for {url}: {e}");
                slot.state = PosterState::Failed;
                false
            }
        }
    }

    pub(crate) fn poster_texture(&self, url: Option<&str>) -> Option<&TextureHandle> {
        self.posters.get(url?)?.tex.as_ref()
    }
}
