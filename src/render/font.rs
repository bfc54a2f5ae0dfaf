use std::path::{Path, PathBuf};
use std::sync::Mutex;

use plotters::style::{register_font, FontStyle};

use super::RenderError;

/// Family name every text element in the chart asks for.
pub const FAMILY: &str = "sans-serif";

/// Searched in order when no font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Font currently registered under [`FAMILY`]. Registration is process-wide
/// and leaks the font bytes, so each path is registered at most once.
static ACTIVE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Make sure [`FAMILY`] resolves to a real font, searching the usual system
/// locations when none is configured.
pub fn ensure_font(preferred: Option<&Path>) -> Result<(), RenderError> {
    match preferred {
        Some(path) => {
            let mut active = ACTIVE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if active.as_deref() != Some(path) {
                register(path)?;
                *active = Some(path.to_path_buf());
            }
            Ok(())
        }
        None => {
            let candidates: Vec<&Path> = SYSTEM_FONTS.iter().map(Path::new).collect();
            ensure_font_in(&candidates)
        }
    }
}

/// Register the first usable font among `candidates`, or fail with
/// [`RenderError::NoFont`].
fn ensure_font_in(candidates: &[&Path]) -> Result<(), RenderError> {
    let mut active = ACTIVE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    for &candidate in candidates {
        if active.as_deref() == Some(candidate) {
            return Ok(());
        }
        if !candidate.is_file() {
            continue;
        }
        match register(candidate) {
            Ok(()) => {
                log::debug!("using font {}", candidate.display());
                *active = Some(candidate.to_path_buf());
                return Ok(());
            }
            Err(e) => log::debug!("skipping font: {e}"),
        }
    }
    Err(RenderError::NoFont)
}

fn register(path: &Path) -> Result<(), RenderError> {
    let font_err = |reason: String| RenderError::Font {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| font_err(e.to_string()))?;
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| font_err("not a valid TrueType/OpenType font".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_font_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_font(Some(&dir.path().join("missing.ttf"))).unwrap_err();
        assert!(matches!(err, RenderError::Font { .. }));
    }

    #[test]
    fn garbage_font_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        assert!(matches!(ensure_font(Some(&path)), Err(RenderError::Font { .. })));
    }

    #[test]
    fn no_usable_candidate_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ttf");
        let garbage = dir.path().join("garbage.ttf");
        std::fs::write(&garbage, b"not a font either").unwrap();

        assert!(matches!(ensure_font_in(&[]), Err(RenderError::NoFont)));
        assert!(matches!(
            ensure_font_in(&[missing.as_path(), garbage.as_path()]),
            Err(RenderError::NoFont)
        ));
    }
}
