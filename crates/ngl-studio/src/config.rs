use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Fonts tried when neither the command line nor `NGL_FONT` names one.
const FALLBACK_FONTS: [&str; 5] = [
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
];

/// Studio window and font settings.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub font_path: PathBuf,
    pub pixel_size: u32,
    pub lines: Vec<String>,
}

impl StudioConfig {
    /// Reads `ngl-studio [FONT] [PIXEL_SIZE]`, falling back to `NGL_FONT`
    /// and then to a handful of common system font locations.
    pub fn from_env() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let env_font = std::env::var_os("NGL_FONT").map(PathBuf::from);
        Self::from_args(&args, env_font, |p| p.is_file())
    }

    fn from_args(
        args: &[String],
        env_font: Option<PathBuf>,
        exists: impl Fn(&PathBuf) -> bool,
    ) -> Result<Self> {
        if args.len() > 2 {
            bail!("usage: ngl-studio [FONT] [PIXEL_SIZE]");
        }

        let font_path = match args.first() {
            Some(path) => PathBuf::from(path),
            None => env_font
                .or_else(|| FALLBACK_FONTS.iter().map(PathBuf::from).find(|p| exists(p)))
                .context("no font found; pass a .ttf path or set NGL_FONT")?,
        };

        let pixel_size = match args.get(1) {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("invalid pixel size '{raw}'"))?,
            None => 24,
        };

        Ok(Self { font_path, pixel_size, ..Self::default() })
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            title: "ngl studio".to_string(),
            width: 1024,
            height: 720,
            font_path: PathBuf::new(),
            pixel_size: 24,
            lines: vec![
                "The quick brown fox jumps over the lazy dog".to_string(),
                "0123456789 !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~".to_string(),
                "Esc to quit".to_string(),
            ],
        }
    }
}
