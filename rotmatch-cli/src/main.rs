use clap::Parser;
use rotmatch::io::{load_gray_image, save_gray_image};
use rotmatch::{draw_match, EdgeConfig, EdgeMode, MatchConfig, MatchReport, Matcher, Template};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "RotMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output of the per-stage results.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EdgeModeJson {
    Strength,
    Binary,
}

impl From<EdgeMode> for EdgeModeJson {
    fn from(value: EdgeMode) -> Self {
        match value {
            EdgeMode::Strength => Self::Strength,
            EdgeMode::Binary => Self::Binary,
        }
    }
}

impl From<EdgeModeJson> for EdgeMode {
    fn from(value: EdgeModeJson) -> Self {
        match value {
            EdgeModeJson::Strength => Self::Strength,
            EdgeModeJson::Binary => Self::Binary,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct EdgeConfigJson {
    mode: EdgeModeJson,
    low_threshold: f32,
    high_threshold: f32,
    blur_width: usize,
    cutoff: u8,
    max_value: u8,
}

impl Default for EdgeConfigJson {
    fn default() -> Self {
        let cfg = EdgeConfig::default();
        Self {
            mode: cfg.mode.into(),
            low_threshold: cfg.low_threshold,
            high_threshold: cfg.high_threshold,
            blur_width: cfg.blur_width,
            cutoff: cfg.cutoff,
            max_value: cfg.max_value,
        }
    }
}

impl From<EdgeConfigJson> for EdgeConfig {
    fn from(value: EdgeConfigJson) -> Self {
        Self {
            mode: value.mode.into(),
            low_threshold: value.low_threshold,
            high_threshold: value.high_threshold,
            blur_width: value.blur_width,
            cutoff: value.cutoff,
            max_value: value.max_value,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    min_pyramid_len: usize,
    coarse_step_deg: f64,
    fine_range_factor: f64,
    fine_step_factor: f64,
    roi_expand: f64,
    edge: EdgeConfigJson,
    min_var_i: f32,
    parallel: bool,
    interpolate_coarse_peaks: bool,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            min_pyramid_len: cfg.min_pyramid_len,
            coarse_step_deg: cfg.coarse_step_deg,
            fine_range_factor: cfg.fine_range_factor,
            fine_step_factor: cfg.fine_step_factor,
            roi_expand: cfg.roi_expand,
            edge: EdgeConfigJson::default(),
            min_var_i: cfg.min_var_i,
            parallel: cfg.parallel,
            interpolate_coarse_peaks: cfg.interpolate_coarse_peaks,
        }
    }
}

impl From<MatchConfigJson> for MatchConfig {
    fn from(value: MatchConfigJson) -> Self {
        Self {
            min_pyramid_len: value.min_pyramid_len,
            coarse_step_deg: value.coarse_step_deg,
            fine_range_factor: value.fine_range_factor,
            fine_step_factor: value.fine_step_factor,
            roi_expand: value.roi_expand,
            edge: value.edge.into(),
            min_var_i: value.min_var_i,
            parallel: value.parallel,
            interpolate_coarse_peaks: value.interpolate_coarse_peaks,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    template_path: String,
    max_angle_deg: f64,
    /// `None` accepts any score.
    score_threshold: Option<f32>,
    output_path: Option<String>,
    overlay_path: Option<String>,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            template_path: String::new(),
            max_angle_deg: 10.0,
            score_threshold: None,
            output_path: None,
            overlay_path: None,
            match_cfg: MatchConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ShiftRecord {
    x: f64,
    y: f64,
    angle_deg: f64,
}

impl From<rotmatch::ShiftValue> for ShiftRecord {
    fn from(value: rotmatch::ShiftValue) -> Self {
        Self {
            x: value.x,
            y: value.y,
            angle_deg: value.angle_deg,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    result: ShiftRecord,
    coarse: ShiftRecord,
    fine: ShiftRecord,
    pyramid_depth: usize,
    coarse_score: f32,
    fine_score: f32,
    window: [usize; 4],
    warnings: Vec<String>,
}

impl From<MatchReport> for Output {
    fn from(report: MatchReport) -> Self {
        Self {
            result: report.result.into(),
            coarse: report.coarse.into(),
            fine: report.fine.into(),
            pyramid_depth: report.depth,
            coarse_score: report.coarse_score,
            fine_score: report.fine_score,
            window: [
                report.window.x,
                report.window.y,
                report.window.width,
                report.window.height,
            ],
            warnings: report
                .warnings
                .iter()
                .map(|warning| format!("{warning:?}"))
                .collect(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("rotmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() || config.template_path.is_empty() {
        return Err("image_path and template_path must be set in the config".into());
    }

    let image = load_gray_image(&config.image_path)?;
    let template_img = load_gray_image(&config.template_path)?;
    let template = Template::from_view(template_img.view())?;

    let matcher = Matcher::new(config.match_cfg.into())?;
    let report = matcher.match_template_report(
        template.view(),
        image.view(),
        config.max_angle_deg,
        config.score_threshold.unwrap_or(f32::NEG_INFINITY),
    )?;

    if let Some(path) = &config.overlay_path {
        let mut overlay = image.clone();
        draw_match(&mut overlay, template.size(), report.result, 255)?;
        save_gray_image(path, overlay.view())?;
    }

    let json = serde_json::to_string_pretty(&Output::from(report))?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
