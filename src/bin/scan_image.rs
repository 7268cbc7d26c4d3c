use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use window_detector::image::io::{load_grayscale_image, write_json_file};
use window_detector::scorer::{TemplateScorer, WindowScorer};
use window_detector::{GroupingMode, MultiscaleDetector, Parallelism, ScanParams, Size};

#[derive(Debug, Deserialize)]
pub struct ScanToolConfig {
    pub input: PathBuf,
    pub scorer: ScorerConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    pub output: ScanOutputConfig,
}

/// Scorer selection by kind tag; each variant carries its own model inputs.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScorerConfig {
    /// Normalized cross-correlation against a grayscale template image; the
    /// template dimensions become the base window.
    Template {
        template: PathBuf,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
}

fn default_threshold() -> f64 {
    0.6
}

fn build_scorer(config: &ScorerConfig) -> Result<(Box<dyn WindowScorer>, Size), String> {
    match config {
        ScorerConfig::Template {
            template,
            threshold,
        } => {
            let img = load_grayscale_image(template)?;
            let base_window = Size::new(img.width() as i32, img.height() as i32);
            Ok((Box::new(TemplateScorer::new(img, *threshold)), base_window))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub win_stride: [i32; 2],
    pub scale_factor: f64,
    pub min_window: [i32; 2],
    pub max_window: [i32; 2],
    pub grouping: GroupingConfig,
    pub group_threshold: usize,
    pub group_eps: f64,
    pub detect_threshold: f64,
    pub find_biggest: bool,
    pub edge_prune: bool,
    /// Worker threads for the scan; omit for the default policy.
    pub workers: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let defaults = ScanParams::default();
        Self {
            win_stride: [defaults.win_stride.width, defaults.win_stride.height],
            scale_factor: defaults.scale_factor,
            min_window: [0, 0],
            max_window: [0, 0],
            grouping: GroupingConfig::Rectangles,
            group_threshold: 3,
            group_eps: 0.2,
            detect_threshold: 1.5,
            find_biggest: false,
            edge_prune: false,
            workers: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingConfig {
    None,
    Rectangles,
    MeanShift,
}

#[derive(Debug, Deserialize)]
pub struct ScanOutputConfig {
    #[serde(rename = "report_json")]
    pub report_json: PathBuf,
}

pub fn load_config(path: &Path) -> Result<ScanToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let gray = load_grayscale_image(&config.input)?;
    let (scorer, base_window) = build_scorer(&config.scorer)?;

    let scan = &config.scan;
    let params = ScanParams {
        base_window,
        win_stride: Size::new(scan.win_stride[0], scan.win_stride[1]),
        scale_factor: scan.scale_factor,
        min_window: Size::new(scan.min_window[0], scan.min_window[1]),
        max_window: Size::new(scan.max_window[0], scan.max_window[1]),
        grouping: match scan.grouping {
            GroupingConfig::None => GroupingMode::None,
            GroupingConfig::Rectangles => GroupingMode::Rectangles {
                group_threshold: scan.group_threshold,
                eps: scan.group_eps,
            },
            GroupingConfig::MeanShift => GroupingMode::MeanShift {
                detect_threshold: scan.detect_threshold,
            },
        },
        find_biggest: scan.find_biggest,
        edge_prune: scan.edge_prune,
    };

    let detector = match scan.workers {
        Some(n) => MultiscaleDetector::with_parallelism(scorer, Parallelism::Fixed(n))
            .map_err(|e| format!("Worker setup failed: {e}"))?,
        None => MultiscaleDetector::new(scorer),
    };

    let report = detector
        .detect(&gray.as_view(), &params)
        .map_err(|e| format!("Detection failed: {e}"))?;

    write_json_file(&config.output.report_json, &report)?;

    println!(
        "Scanned {}: {} detections from {} windows over {} levels in {:.1} ms",
        config.input.display(),
        report.detections.len(),
        report.stats.windows_evaluated,
        report.stats.levels_scanned,
        report.stats.timing.total_ms
    );
    println!("Saved report to {}", config.output.report_json.display());

    Ok(())
}

fn usage() -> String {
    "Usage: scan_image <config.json>".to_string()
}
