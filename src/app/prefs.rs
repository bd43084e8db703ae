// src/app/prefs.rs
//! `ui_prefs.txt`: a small key=value file for layout choices. Filter
//! criteria are not stored here; they reset with every launch.
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use std::{fs, io};

use super::View;

pub const POSTER_W_RANGE: std::ops::RangeInclusive<f32> = 110.0..=220.0;
pub const DETAIL_W_RANGE: std::ops::RangeInclusive<f32> = 260.0..=560.0;

/// Parsed prefs; unknown keys and bad values are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiPrefs {
    pub view: Option<View>,
    pub poster_w: Option<f32>,
    pub detail_w: Option<f32>,
}

impl UiPrefs {
    pub fn parse(txt: &str) -> Self {
        let mut out = Self::default();
        for line in txt.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((k, v)) = line.split_once('=') else {
                continue;
            };
            let v = v.trim();
            match k.trim() {
                "view" => out.view = View::from_str(v),
                "poster_w" => {
                    out.poster_w = v
                        .parse::<f32>()
                        .ok()
                        .map(|n| n.clamp(*POSTER_W_RANGE.start(), *POSTER_W_RANGE.end()));
                }
                "detail_w" => {
                    out.detail_w = v
                        .parse::<f32>()
                        .ok()
                        .map(|n| n.clamp(*DETAIL_W_RANGE.start(), *DETAIL_W_RANGE.end()));
                }
                _ => {}
            }
        }
        out
    }

    pub fn render(view: View, poster_w: f32, detail_w: f32) -> String {
        format!(
            "# tripboard ui prefs\n\
             view={}\n\
             poster_w={:.1}\n\
             detail_w={:.1}\n",
            view.as_str(),
            poster_w,
            detail_w,
        )
    }
}

impl crate::app::TripApp {
    // ---- tiny flags ----
    pub(crate) fn mark_dirty(&mut self) {
        self.prefs_dirty = true;
    }

    pub(crate) fn maybe_save_prefs(&mut self) {
        // debounce a bit to avoid writing every frame
        if self.prefs_dirty && self.prefs_last_write.elapsed() >= Duration::from_millis(300) {
            self.save_prefs();
            self.prefs_dirty = false;
            self.prefs_last_write = Instant::now();
        }
    }

    // ---- load/save prefs ----
    pub(crate) fn load_prefs(&mut self) {
        let Ok(txt) = fs::read_to_string(prefs_path()) else {
            return;
        };
        let prefs = UiPrefs::parse(&txt);
        if let Some(v) = prefs.view {
            self.view = v;
        }
        if let Some(w) = prefs.poster_w {
            self.poster_width_ui = w;
        }
        if let Some(w) = prefs.detail_w {
            self.detail_panel_width = w;
        }
    }

    pub(crate) fn save_prefs(&self) {
        let path = prefs_path();
        let _ = fs::create_dir_all(path.parent().unwrap_or_else(|| Path::new(".")));
        let txt = UiPrefs::render(self.view, self.poster_width_ui, self.detail_panel_width);
        if let Err(e) = fs::write(&path, txt) {
            tracing::warn!("failed to write {}: {e}", path.display());
        }
    }
}

pub fn prefs_path() -> PathBuf {
    crate::app::cache::cache_dir().join("ui_prefs.txt")
}

pub fn backup_ui_prefs() -> io::Result<PathBuf> {
    backup_prefs_file(&prefs_path())
}

pub fn restore_latest_ui_prefs_backup() -> io::Result<Option<PathBuf>> {
    restore_latest_backup(&prefs_path())
}

fn backup_prefs_file(src: &Path) -> io::Result<PathBuf> {
    if !src.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "ui_prefs.txt not found",
        ));
    }
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let dest = src
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("ui_prefs_backup_{stamp}.txt"));
    fs::copy(src, &dest)?;
    Ok(dest)
}

fn restore_latest_backup(target: &Path) -> io::Result<Option<PathBuf>> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut backups: Vec<(std::time::SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_backup = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.starts_with("ui_prefs_backup_") && name.ends_with(".txt"));
        if is_backup && entry.file_type()?.is_file() {
            let modified = entry
                .metadata()?
                .modified()
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            backups.push((modified, path));
        }
    }

    // newest mtime wins; name breaks ties since the stamp sorts chronologically
    let Some((_, latest)) = backups.into_iter().max() else {
        return Ok(None);
    };
    fs::copy(&latest, target)?;
    Ok(Some(latest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_known_keys_and_clamps() {
        let prefs = UiPrefs::parse(
            "# comment\nview=parks\nposter_w=999\ndetail_w=300\nsearch=ignored\nnot a pair\n",
        );
        assert_eq!(prefs.view, Some(View::Parks));
        assert_eq!(prefs.poster_w, Some(*POSTER_W_RANGE.end()));
        assert_eq!(prefs.detail_w, Some(300.0));
    }

    #[test]
    fn bad_values_are_skipped() {
        let prefs = UiPrefs::parse("view=cinema\nposter_w=wide\n");
        assert_eq!(prefs, UiPrefs::default());
    }

    #[test]
    fn rendered_prefs_parse_back() {
        let txt = UiPrefs::render(View::Agenda, 180.0, 400.0);
        let prefs = UiPrefs::parse(&txt);
        assert_eq!(prefs.view, Some(View::Agenda));
        assert_eq!(prefs.poster_w, Some(180.0));
    }

    #[test]
    fn backup_then_restore() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("ui_prefs.txt");
        assert!(backup_prefs_file(&target).is_err());
        assert_eq!(restore_latest_backup(&target).unwrap(), None);

        fs::write(&target, "view=trip\n").unwrap();
        let backup = backup_prefs_file(&target).unwrap();
        fs::write(&target, "view=notes\n").unwrap();

        assert_eq!(restore_latest_backup(&target).unwrap(), Some(backup));
        assert_eq!(fs::read_to_string(&target).unwrap(), "view=trip\n");
    }
}
