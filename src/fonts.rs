//! Font loading and text measurement using `ttf-parser`.
//!
//! The dispatcher needs deterministic text metrics for auto-fit, wrapping,
//! and the key/value auto split. When a real TTF/OTF face is loaded its glyph
//! advances are summed; otherwise a proportional-font heuristic keeps the
//! output reproducible without any font files on disk.

use std::collections::HashMap;

/// Line height as a multiple of font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Auto-fit never shrinks text below this size (points).
pub const MIN_AUTO_FIT_SIZE: f64 = 4.0;

/// Safety margin applied by the closed-form auto-fit scale.
const AUTO_FIT_SLACK: f64 = 0.98;

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API).
    bytes: Vec<u8>,
    units_per_em: f64,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FontKey {
    family: String,
    bold: bool,
    italic: bool,
}

/// Manages loaded fonts and answers measurement queries.
#[derive(Default)]
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TTF/OTF face for the given family/style.
    pub fn load_font(
        &mut self,
        family: &str,
        bold: bool,
        italic: bool,
        bytes: Vec<u8>,
    ) -> Result<(), String> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| format!("Failed to parse font: {e}"))?;
        let data = FontData {
            units_per_em: face.units_per_em() as f64,
            bytes,
        };
        self.fonts.insert(
            FontKey {
                family: family.to_string(),
                bold,
                italic,
            },
            data,
        );
        Ok(())
    }

    /// Measure the width of a single line at `font_size` points.
    ///
    /// With a loaded face, glyph advances are summed; without one, an average
    /// character width heuristic is used (0.5 × size, 0.55 × size for bold).
    pub fn measure_text_width(
        &self,
        text: &str,
        family: &str,
        font_size: f64,
        bold: bool,
        italic: bool,
    ) -> f64 {
        let key = FontKey {
            family: family.to_string(),
            bold,
            italic,
        };
        let Some(data) = self.fonts.get(&key) else {
            let avg = if bold { 0.55 } else { 0.5 };
            return text.chars().count() as f64 * font_size * avg;
        };

        if let Ok(face) = ttf_parser::Face::parse(&data.bytes, 0) {
            let scale = font_size / data.units_per_em;
            let mut width = 0.0f64;
            for ch in text.chars() {
                if let Some(gid) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                    width += advance as f64 * scale;
                } else {
                    width += font_size * 0.5;
                }
            }
            width
        } else {
            text.chars().count() as f64 * font_size * 0.5
        }
    }

    /// Line advance in points.
    pub fn line_height(&self, font_size: f64) -> f64 {
        font_size * LINE_HEIGHT_FACTOR
    }

    /// Largest size ≤ `font_size` at which `text` fits `max_width` on one
    /// line, using the closed-form scale `size × max_width / measured`,
    /// floored at [`MIN_AUTO_FIT_SIZE`].
    pub fn fit_font_size(
        &self,
        text: &str,
        family: &str,
        font_size: f64,
        bold: bool,
        italic: bool,
        max_width: f64,
    ) -> f64 {
        if text.is_empty() || max_width <= 0.0 {
            return font_size;
        }
        let measured = self.measure_text_width(text, family, font_size, bold, italic);
        if measured <= max_width {
            return font_size;
        }
        let scaled = font_size * (max_width / measured) * AUTO_FIT_SLACK;
        scaled.max(MIN_AUTO_FIT_SIZE).min(font_size)
    }

    /// Greedy word wrap to `max_width` points. Existing newlines are
    /// respected; a word longer than the width gets its own line rather than
    /// being broken mid-word.
    pub fn wrap_text(
        &self,
        text: &str,
        family: &str,
        font_size: f64,
        bold: bool,
        italic: bool,
        max_width: f64,
    ) -> Vec<String> {
        if max_width <= 0.0 || text.is_empty() {
            return vec![text.to_string()];
        }

        let mut lines: Vec<String> = Vec::new();
        for paragraph in text.split('\n') {
            let words: Vec<&str> = paragraph.split_whitespace().collect();
            if words.is_empty() {
                lines.push(String::new());
                continue;
            }

            let mut current = String::new();
            for word in &words {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{} {}", current, word)
                };
                let w = self.measure_text_width(&candidate, family, font_size, bold, italic);
                if w > max_width && !current.is_empty() {
                    lines.push(current);
                    current = word.to_string();
                } else {
                    current = candidate;
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }

        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }
}
