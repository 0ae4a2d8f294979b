use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::layout::{default_geometry, Geometry, Rgb};

/// Application configuration loaded from environment variables.
///
/// Asset paths default to locations under `APP_ROOT`; each can be overridden
/// individually. Missing asset files are not a startup error, they surface as
/// typed errors on the request that needs them.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub catalog_path: PathBuf,
    pub cover_template_path: PathBuf,
    pub terms_path: PathBuf,
    pub font_bold_path: PathBuf,
    pub font_regular_path: PathBuf,
    /// Directory for intermediate and output PDFs. Defaults to the system temp dir.
    pub work_dir: PathBuf,
    pub postprocess_timeout: Duration,
    /// Explicit Ghostscript executable; searched on `PATH` when unset.
    pub ghostscript_path: Option<PathBuf>,
    pub geometry: Geometry,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let app_root = PathBuf::from(env_or("APP_ROOT", "."));
        let assets = app_root.join("assets");

        let mut geometry = default_geometry();
        if let Some(x) = optional_env::<f32>("PAGE_NUMBER_MARGIN_LEFT")? {
            geometry.page_number.margin_left = x;
        }
        if let Ok(raw) = std::env::var("PAGE_NUMBER_COLOR") {
            geometry.page_number.color = parse_color("PAGE_NUMBER_COLOR", &raw)?;
        }
        if let Some(y) = optional_env::<f32>("SIGNATURE_LINE_Y")? {
            geometry.signature.separator_y = y;
        }
        if let Some(x) = optional_env::<f32>("SIGNATURE_RIGHT_X")? {
            geometry.signature.right_x = x;
        }

        Ok(Config {
            port: optional_env::<u16>("PORT")?.unwrap_or(8080),
            rust_log: env_or("RUST_LOG", "info"),
            catalog_path: path_env("CATALOG_PATH", app_root.join("data").join("services.csv")),
            cover_template_path: path_env(
                "COVER_TEMPLATE_PATH",
                assets.join("Proposal_Cover.pdf"),
            ),
            terms_path: path_env("TERMS_PATH", assets.join("Terms_and_Conditions.pdf")),
            font_bold_path: path_env(
                "FONT_BOLD_PATH",
                assets.join("fonts").join("HKGrotesk-Bold.otf"),
            ),
            font_regular_path: path_env(
                "FONT_REGULAR_PATH",
                assets.join("fonts").join("HKGrotesk-Regular.otf"),
            ),
            work_dir: path_env("WORK_DIR", std::env::temp_dir()),
            postprocess_timeout: Duration::from_secs(
                optional_env::<u64>("POSTPROCESS_TIMEOUT_SECS")?.unwrap_or(120),
            ),
            ghostscript_path: std::env::var("GHOSTSCRIPT_PATH").ok().map(PathBuf::from),
            geometry,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn path_env(key: &str, default: PathBuf) -> PathBuf {
    std::env::var(key).map(PathBuf::from).unwrap_or(default)
}

/// Reads and parses an optional variable. Present-but-unparseable is an error.
fn optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(None),
    }
}

/// `#rrggbb` into an `Rgb`.
fn parse_color(key: &str, raw: &str) -> Result<Rgb> {
    Rgb::from_hex(raw.trim())
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}
