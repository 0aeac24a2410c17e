//! Annotating the scene with the reported matches.

use ab_glyph::{FontVec, PxScale};
use clap::ValueEnum;
use corrpeaks::Candidate;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use serde::Serialize;
use std::path::Path;

const MATCH_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// Glyph height in pixels at `font_scale == 1.0`.
const BASE_TEXT_PX: f32 = 24.0;
const LABEL_GAP: f32 = 5.0;

/// What to draw for every reported match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
pub enum DrawMode {
    #[value(name = "bbox")]
    #[serde(rename = "bbox")]
    Bbox,
    #[value(name = "bbox+label")]
    #[serde(rename = "bbox+label")]
    BboxLabel,
    #[value(name = "bbox+label+score")]
    #[serde(rename = "bbox+label+score")]
    BboxLabelScore,
}

impl DrawMode {
    pub fn name(self) -> &'static str {
        match self {
            DrawMode::Bbox => "bbox",
            DrawMode::BboxLabel => "bbox+label",
            DrawMode::BboxLabelScore => "bbox+label+score",
        }
    }

    /// Label text for the match with the given rank, if the mode draws one.
    pub fn label(self, id: usize, candidate: &Candidate) -> Option<String> {
        match self {
            DrawMode::Bbox => None,
            DrawMode::BboxLabel => Some(format!("#{id}")),
            DrawMode::BboxLabelScore => Some(format!("#{id} conf:{:.2}", candidate.confidence)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DrawStyle {
    pub mode: DrawMode,
    pub thickness: u32,
    pub font_scale: f32,
}

pub fn load_font(path: &Path) -> Result<FontVec, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    FontVec::try_from_vec(bytes)
        .map_err(|_| format!("{} is not a usable TrueType font", path.display()).into())
}

/// Draws a box per match, grown outwards and inwards around the exact
/// footprint to reach `thickness`, plus the label above it when a font is given.
pub fn annotate(
    scene: &mut RgbImage,
    matches: &[Candidate],
    style: &DrawStyle,
    font: Option<&FontVec>,
) {
    let half = (style.thickness / 2) as i32;
    for (id, candidate) in matches.iter().enumerate() {
        let bbox = candidate.bbox;
        for ring in 0..style.thickness as i32 {
            let inset = ring - half;
            let width = bbox.width as i64 - 2 * inset as i64;
            let height = bbox.height as i64 - 2 * inset as i64;
            if width <= 0 || height <= 0 {
                continue;
            }
            let rect = Rect::at(bbox.x as i32 + inset, bbox.y as i32 + inset)
                .of_size(width as u32, height as u32);
            draw_hollow_rect_mut(scene, rect, MATCH_COLOR);
        }

        let (Some(text), Some(font)) = (style.mode.label(id, candidate), font) else {
            continue;
        };
        let scale = PxScale::from(BASE_TEXT_PX * style.font_scale);
        let y = (bbox.y as f32 - scale.y - LABEL_GAP).max(0.0) as i32;
        draw_text_mut(scene, MATCH_COLOR, bbox.x as i32, y, scale, font, &text);
    }
}
