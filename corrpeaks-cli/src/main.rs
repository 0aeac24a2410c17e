mod render;

use clap::Parser;
use corrpeaks::io::{load_gray_image, save_heatmap};
use corrpeaks::{Candidate, MatchConfig, MatchOutcome, Matcher, Method, Roi};
use render::{annotate, load_font, DrawMode, DrawStyle};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Locate a template in a scene and report distinct matches")]
struct Cli {
    /// Scene image to search.
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
    /// Template image to locate.
    #[arg(short, long, value_name = "FILE")]
    template: PathBuf,
    /// Scoring method: ccoeff_normed, ccorr_normed or sqdiff_normed.
    #[arg(long, default_value = "ccoeff_normed")]
    method: Method,
    /// Minimum confidence in [0, 1] for a match to be reported.
    #[arg(long, default_value_t = 0.80)]
    min_score: f32,
    /// Maximum number of matches to report.
    #[arg(long, default_value_t = 5)]
    max_results: usize,
    /// IoU threshold in [0, 1] for suppressing overlapping matches.
    #[arg(long, default_value_t = 0.30)]
    nms: f32,
    /// Restrict the search to `x,y,w,h` in scene coordinates.
    #[arg(long, value_name = "X,Y,W,H")]
    roi: Option<Roi>,
    /// Annotated copy of the scene.
    #[arg(short, long, value_name = "FILE")]
    out: PathBuf,
    /// What to draw for each match.
    #[arg(long, value_enum, default_value_t = DrawMode::BboxLabelScore)]
    draw: DrawMode,
    /// Box line thickness in pixels.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=64))]
    thickness: u32,
    /// Label size relative to a 24 px glyph.
    #[arg(long, default_value_t = 0.5, value_parser = parse_font_scale)]
    font_scale: f32,
    /// TrueType font for labels; without one only boxes are drawn.
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,
    /// Write a JSON report to this path.
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
    /// Write the score surface as a jet-colored heatmap to this path.
    #[arg(long, value_name = "FILE")]
    heatmap: Option<PathBuf>,
    /// Score rows in parallel.
    #[arg(long)]
    parallel: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

fn parse_font_scale(s: &str) -> Result<f32, String> {
    let scale: f32 = s.parse().map_err(|err| format!("{err}"))?;
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(format!("font scale must be positive, got {s}"))
    }
}

fn path_or_none(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "none".to_owned())
}

#[derive(Debug, Serialize)]
struct Size {
    w: usize,
    h: usize,
}

#[derive(Debug, Serialize)]
struct RoiRecord {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

impl From<Roi> for RoiRecord {
    fn from(roi: Roi) -> Self {
        Self {
            x: roi.x,
            y: roi.y,
            w: roi.width,
            h: roi.height,
        }
    }
}

/// A missing ROI is written as an empty object.
fn roi_or_empty<S: Serializer>(roi: &Option<RoiRecord>, s: S) -> Result<S::Ok, S::Error> {
    match roi {
        Some(roi) => roi.serialize(s),
        None => s.serialize_map(Some(0))?.end(),
    }
}

#[derive(Debug, Serialize)]
struct Params {
    method: String,
    max_results: usize,
    min_score: f32,
    nms: f32,
    #[serde(serialize_with = "roi_or_empty")]
    roi: Option<RoiRecord>,
    draw: DrawMode,
    thickness: u32,
    font_scale: f32,
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    id: usize,
    bbox: RoiRecord,
    raw_score: f32,
    confidence: f32,
}

impl MatchRecord {
    fn new(id: usize, c: &Candidate) -> Self {
        Self {
            id,
            bbox: RoiRecord {
                x: c.bbox.x,
                y: c.bbox.y,
                w: c.bbox.width,
                h: c.bbox.height,
            },
            raw_score: c.raw_score,
            confidence: c.confidence,
        }
    }
}

#[derive(Debug, Serialize)]
struct Stats {
    found: usize,
}

#[derive(Debug, Serialize)]
struct Report {
    command: &'static str,
    input: String,
    template: String,
    output: String,
    params: Params,
    template_size: Size,
    scene_size: Size,
    matches: Vec<MatchRecord>,
    stats: Stats,
}

fn build_report(cli: &Cli, scene_size: Size, outcome: &MatchOutcome) -> Report {
    Report {
        command: "match",
        input: cli.input.display().to_string(),
        template: cli.template.display().to_string(),
        output: cli.out.display().to_string(),
        params: Params {
            method: cli.method.name().to_owned(),
            max_results: cli.max_results,
            min_score: cli.min_score,
            nms: cli.nms,
            roi: cli.roi.map(RoiRecord::from),
            draw: cli.draw,
            thickness: cli.thickness,
            font_scale: cli.font_scale,
        },
        template_size: Size {
            w: outcome.template.width,
            h: outcome.template.height,
        },
        scene_size,
        matches: outcome
            .matches
            .iter()
            .enumerate()
            .map(|(id, c)| MatchRecord::new(id, c))
            .collect(),
        stats: Stats {
            found: outcome.matches.len(),
        },
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("corrpeaks=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    let scene = load_gray_image(&cli.input)?;
    let template = load_gray_image(&cli.template)?;

    println!("command: match");
    println!("in: {}", cli.input.display());
    println!("templ: {}", cli.template.display());
    println!("out: {}", cli.out.display());
    println!("method: {}", cli.method);
    println!("templ_size: {}x{}", template.width(), template.height());
    println!("scene_size: {}x{}", scene.width(), scene.height());
    println!(
        "params: max_results={} min_score={:.2} nms={:.2} draw={} thickness={} font_scale={:.2} roi={} json={} heatmap={}",
        cli.max_results,
        cli.min_score,
        cli.nms,
        cli.draw.name(),
        cli.thickness,
        cli.font_scale,
        cli.roi
            .map(|r| format!("{},{},{},{}", r.x, r.y, r.width, r.height))
            .unwrap_or_else(|| "none".to_owned()),
        path_or_none(cli.json.as_deref()),
        path_or_none(cli.heatmap.as_deref()),
    );

    let matcher = Matcher::new(cli.method).with_config(MatchConfig {
        max_results: cli.max_results,
        min_confidence: cli.min_score,
        iou_threshold: cli.nms,
        parallel: cli.parallel,
        ..MatchConfig::default()
    });
    let outcome = matcher.match_image(scene.view(), template.view(), cli.roi)?;

    let font = cli.font.as_deref().map(load_font).transpose()?;
    if font.is_none() && cli.draw != DrawMode::Bbox {
        tracing::warn!(draw = cli.draw.name(), "no --font given, labels are skipped");
    }
    let mut vis = image::open(&cli.input)?.to_rgb8();
    let style = DrawStyle {
        mode: cli.draw,
        thickness: cli.thickness,
        font_scale: cli.font_scale,
    };
    annotate(&mut vis, &outcome.matches, &style, font.as_ref());
    vis.save(&cli.out)?;

    if let Some(path) = &cli.heatmap {
        save_heatmap(&outcome.field, cli.method, path)?;
    }
    if let Some(path) = &cli.json {
        let scene_size = Size {
            w: scene.width(),
            h: scene.height(),
        };
        let report = build_report(&cli, scene_size, &outcome);
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }

    println!("status: ok");
    println!("found: {}", outcome.matches.len());
    if let Some(best) = outcome.best() {
        println!(
            "best: conf={:.2} raw={:.4} at x={} y={}",
            best.confidence, best.raw_score, best.bbox.x, best.bbox.y
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corrpeaks::{BBox, ScoreField, TemplateSize};
    use serde_json::{json, Value};

    fn outcome(roi: Option<Roi>) -> MatchOutcome {
        MatchOutcome {
            matches: vec![Candidate {
                bbox: BBox::new(26, 19, 8, 6),
                raw_score: 0.97,
                confidence: 0.985,
            }],
            field: ScoreField::filled(33, 25, 0.0).unwrap(),
            template: TemplateSize {
                width: 8,
                height: 6,
            },
            roi,
        }
    }

    fn report(args: &[&str]) -> Value {
        let cli = Cli::try_parse_from(
            ["corrpeaks-cli", "-i", "scene.png", "-t", "tpl.png", "-o", "vis.png"]
                .iter()
                .chain(args),
        )
        .unwrap();
        let scene = Size { w: 40, h: 30 };
        serde_json::to_value(build_report(&cli, scene, &outcome(cli.roi))).unwrap()
    }

    #[test]
    fn report_carries_every_documented_key() {
        let v = report(&[]);
        assert_eq!(v["command"], "match");
        assert_eq!(v["input"], "scene.png");
        assert_eq!(v["template"], "tpl.png");
        assert_eq!(v["output"], "vis.png");

        let params = &v["params"];
        assert_eq!(params["method"], "ccoeff_normed");
        assert_eq!(params["max_results"], 5);
        assert!((params["min_score"].as_f64().unwrap() - 0.8).abs() < 1e-6);
        assert!((params["nms"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(params["draw"], "bbox+label+score");
        assert_eq!(params["thickness"], 2);
        assert!((params["font_scale"].as_f64().unwrap() - 0.5).abs() < 1e-6);

        assert_eq!(v["template_size"], json!({ "w": 8, "h": 6 }));
        assert_eq!(v["scene_size"], json!({ "w": 40, "h": 30 }));
        assert_eq!(v["stats"], json!({ "found": 1 }));

        let m = &v["matches"][0];
        assert_eq!(m["id"], 0);
        assert_eq!(m["bbox"], json!({ "x": 26, "y": 19, "w": 8, "h": 6 }));
        assert!((m["raw_score"].as_f64().unwrap() - 0.97).abs() < 1e-6);
        assert!((m["confidence"].as_f64().unwrap() - 0.985).abs() < 1e-6);
    }

    #[test]
    fn absent_roi_is_an_empty_object() {
        let v = report(&[]);
        assert_eq!(v["params"]["roi"], json!({}));
    }

    #[test]
    fn given_roi_is_recorded_as_xywh() {
        let v = report(&["--roi", "20,15,20,15", "--draw", "bbox", "--thickness", "3"]);
        assert_eq!(v["params"]["roi"], json!({ "x": 20, "y": 15, "w": 20, "h": 15 }));
        assert_eq!(v["params"]["draw"], "bbox");
        assert_eq!(v["params"]["thickness"], 3);
    }

    #[test]
    fn rejects_bad_drawing_options() {
        let base = ["corrpeaks-cli", "-i", "a.png", "-t", "b.png", "-o", "c.png"];
        for extra in [
            &["--thickness", "0"][..],
            &["--font-scale", "0"][..],
            &["--font-scale", "-1.5"][..],
            &["--draw", "label"][..],
        ] {
            let args = base.iter().chain(extra);
            assert!(Cli::try_parse_from(args).is_err(), "{extra:?}");
        }
        let missing_out = ["corrpeaks-cli", "-i", "a.png", "-t", "b.png"];
        assert!(Cli::try_parse_from(missing_out).is_err());
    }
}
