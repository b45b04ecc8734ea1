//! Rendering backend interface.
//!
//! A backend implements the capability set below; the dispatcher drives it
//! sequentially, one document at a time. Every coordinate that reaches a
//! backend is already in points – millimetre conversion happens at the
//! dispatch boundary – and colors arrive parsed. Backends own font metrics
//! and glyph rendering; they never re-measure or re-wrap what the dispatcher
//! already positioned.

use std::path::Path;

use serde::Serialize;

use crate::error::ImageError;

/// An sRGB color with components in 0–1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parse `#rgb`, `#rrggbb`, or a small set of named colors. `None` means
    /// "do not paint this channel" – never an error.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return match hex.len() {
                3 => {
                    let mut chans = hex.chars().map(|c| c.to_digit(16));
                    let r = chans.next()??;
                    let g = chans.next()??;
                    let b = chans.next()??;
                    Some(Color {
                        r: (r * 17) as f64 / 255.0,
                        g: (g * 17) as f64 / 255.0,
                        b: (b * 17) as f64 / 255.0,
                    })
                }
                6 => {
                    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                    Some(Color {
                        r: r as f64 / 255.0,
                        g: g as f64 / 255.0,
                        b: b as f64 / 255.0,
                    })
                }
                _ => None,
            };
        }
        match s.to_ascii_lowercase().as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color {
                r: 1.0,
                g: 1.0,
                b: 1.0,
            }),
            "red" => Some(Color {
                r: 1.0,
                g: 0.0,
                b: 0.0,
            }),
            "green" => Some(Color {
                r: 0.0,
                g: 0.5,
                b: 0.0,
            }),
            "blue" => Some(Color {
                r: 0.0,
                g: 0.0,
                b: 1.0,
            }),
            "gray" | "grey" => Some(Color {
                r: 0.5,
                g: 0.5,
                b: 0.5,
            }),
            _ => None,
        }
    }
}

/// Stroke/fill for rectangles; `None` disables that channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectPaint {
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePaint {
    pub color: Option<Color>,
    pub width: f64,
    pub arrow_start: bool,
    pub arrow_end: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPaint {
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePaint {
    pub font_size: f64,
    pub stroke: Option<Color>,
    /// Fill for the first row when header highlighting is on.
    pub header_fill: Option<Color>,
}

/// The capability set every rendering backend implements.
///
/// Calls arrive in paint order; a backend instance must not be shared between
/// concurrent renders into the same target.
pub trait Renderer {
    /// Page dimensions in points, set before [`Renderer::begin_document`].
    fn set_page_size(&mut self, width: f64, height: f64);
    fn begin_document(&mut self);
    fn start_page(&mut self);
    fn end_page(&mut self);
    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &RectPaint);
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, paint: &LinePaint);
    /// May fail when the asset cannot be opened; the dispatcher recovers with
    /// a fallback rectangle, so implementations should not panic.
    fn draw_image(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        path: &str,
    ) -> Result<(), ImageError>;
    /// One pre-positioned line of text; `y` is the baseline.
    fn draw_text(&mut self, x: f64, y: f64, text: &str, paint: &TextPaint);
    /// Column widths and row heights are fully resolved and sum to the box.
    /// Cell text is clipped to its cell, not wrapped.
    #[allow(clippy::too_many_arguments)]
    fn draw_table(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        cells: &[Vec<String>],
        col_widths: &[f64],
        row_heights: &[f64],
        paint: &TablePaint,
    );
    fn finish(&mut self);
}

// ---------------------------------------------------------------------------
// Recording backend
// ---------------------------------------------------------------------------

/// One recorded drawing call. Serializes with an `op` tag so a dump reads as
/// a flat op stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    SetPageSize {
        width: f64,
        height: f64,
    },
    BeginDocument,
    StartPage,
    EndPage,
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: RectPaint,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        paint: LinePaint,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        path: String,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        paint: TextPaint,
    },
    Table {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        cells: Vec<Vec<String>>,
        col_widths: Vec<f64>,
        row_heights: Vec<f64>,
        paint: TablePaint,
    },
    Finish,
}

/// A backend that records every call instead of drawing. Backs the `stencil`
/// CLI's op dump and the test suite.
///
/// `draw_image` fails for paths that do not exist on disk, mirroring how a
/// real backend discovers missing assets (it never decodes anything).
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty JSON dump of the recorded op stream.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.commands)
    }
}

impl Renderer for RecordingRenderer {
    fn set_page_size(&mut self, width: f64, height: f64) {
        self.commands.push(DrawCommand::SetPageSize { width, height });
    }

    fn begin_document(&mut self) {
        self.commands.push(DrawCommand::BeginDocument);
    }

    fn start_page(&mut self) {
        self.commands.push(DrawCommand::StartPage);
    }

    fn end_page(&mut self) {
        self.commands.push(DrawCommand::EndPage);
    }

    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &RectPaint) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            paint: paint.clone(),
        });
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, paint: &LinePaint) {
        self.commands.push(DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            paint: paint.clone(),
        });
    }

    fn draw_image(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        path: &str,
    ) -> Result<(), ImageError> {
        if path.is_empty() {
            return Err(ImageError {
                path: path.to_string(),
                reason: "empty image path".to_string(),
            });
        }
        if !Path::new(path).is_file() {
            return Err(ImageError {
                path: path.to_string(),
                reason: "file not found".to_string(),
            });
        }
        self.commands.push(DrawCommand::Image {
            x,
            y,
            width,
            height,
            path: path.to_string(),
        });
        Ok(())
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, paint: &TextPaint) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            paint: paint.clone(),
        });
    }

    fn draw_table(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        cells: &[Vec<String>],
        col_widths: &[f64],
        row_heights: &[f64],
        paint: &TablePaint,
    ) {
        self.commands.push(DrawCommand::Table {
            x,
            y,
            width,
            height,
            cells: cells.to_vec(),
            col_widths: col_widths.to_vec(),
            row_heights: row_heights.to_vec(),
            paint: paint.clone(),
        });
    }

    fn finish(&mut self) {
        self.commands.push(DrawCommand::Finish);
    }
}
