//! Render dispatcher – walks the compiled element list in paint order and
//! maps each element onto backend drawing calls.
//!
//! This is where document millimetres become backend points, where color
//! strings are parsed, and where the text auto-fit/wrap, key/value split, and
//! table span algorithms run. Content-level problems (missing image,
//! unparseable color) degrade to a visible fallback instead of failing the
//! render.

use std::cmp::Ordering;

use crate::backend::{Color, LinePaint, RectPaint, Renderer, TablePaint, TextPaint};
use crate::error::UnresolvedBlockError;
use crate::fonts::FontManager;
use crate::geometry::mm_to_pt;
use crate::layout::LayoutEngine;
use crate::model::{
    BgMode, BlockCatalog, DataMap, Element, ElementKind, KvBoxProps, SplitMode, TableProps,
    TextAlign, TextProps, Template,
};

/// Receipt paper widths whose page height is derived from content.
const THERMAL_PAPER_WIDTHS_MM: [f64; 2] = [58.0, 80.0];
const THERMAL_BOTTOM_MARGIN_MM: f64 = 10.0;

/// Key/value box paddings, in millimetres.
const KV_BOX_PADDING_MM: f64 = 1.5;
const KV_BOX_TEXT_PADDING_MM: f64 = 0.5;

/// Baseline offset from a line's top edge, as a fraction of font size.
const ASCENT_FACTOR: f64 = 0.8;

/// Fill for the rectangle substituted when an image asset is missing.
const IMAGE_FALLBACK_COLOR: Color = Color {
    r: 1.0,
    g: 0.0,
    b: 0.0,
};

/// Row count assumed when a table does not record its design-time rows.
const DEFAULT_DESIGN_ROWS: usize = 3;

/// Bridge between the layout compiler and a rendering backend.
pub struct Exporter<'a> {
    engine: LayoutEngine<'a>,
    fonts: FontManager,
}

impl<'a> Exporter<'a> {
    pub fn new(blocks: &'a BlockCatalog) -> Self {
        Self::with_fonts(blocks, FontManager::new())
    }

    /// Use a caller-prepared [`FontManager`] (e.g. with real faces loaded)
    /// for text measurement.
    pub fn with_fonts(blocks: &'a BlockCatalog, fonts: FontManager) -> Self {
        Self {
            engine: LayoutEngine::new(blocks),
            fonts,
        }
    }

    /// Compile `template` with `data` and drive `renderer` through a full
    /// single-page document.
    pub fn export(
        &self,
        template: &Template,
        data: &DataMap,
        renderer: &mut dyn Renderer,
    ) -> Result<(), UnresolvedBlockError> {
        let mut elements = self.engine.compile(template, data)?;
        adjust_dynamic_heights(&mut elements);

        let page_width = template.page_size.width;
        let mut page_height = template.page_size.height;
        if THERMAL_PAPER_WIDTHS_MM.contains(&page_width) {
            let max_y = elements
                .iter()
                .map(|e| e.y + e.height)
                .fold(0.0, f64::max);
            page_height = max_y + THERMAL_BOTTOM_MARGIN_MM;
        }

        renderer.set_page_size(mm_to_pt(page_width), mm_to_pt(page_height));
        renderer.begin_document();
        renderer.start_page();
        for element in &elements {
            self.dispatch(element, renderer);
        }
        renderer.end_page();
        renderer.finish();
        Ok(())
    }

    fn dispatch(&self, element: &Element, renderer: &mut dyn Renderer) {
        let x = mm_to_pt(element.x);
        let y = mm_to_pt(element.y);
        let width = mm_to_pt(element.width);
        let height = mm_to_pt(element.height);

        match &element.kind {
            ElementKind::Rect(props) => {
                let paint = RectPaint {
                    stroke: props
                        .show_outline
                        .then(|| parse_paint(&props.stroke_color, &element.id, "stroke"))
                        .flatten(),
                    fill: (props.bg_type == BgMode::Solid)
                        .then(|| parse_paint(&props.fill_color, &element.id, "fill"))
                        .flatten(),
                    stroke_width: props.stroke_width,
                };
                renderer.draw_rect(x, y, width, height, &paint);
            }
            ElementKind::Line(props) => {
                let paint = LinePaint {
                    color: parse_paint(&props.stroke_color, &element.id, "stroke"),
                    width: props.stroke_width,
                    arrow_start: props.arrow_start,
                    arrow_end: props.arrow_end,
                };
                renderer.draw_line(x, y, mm_to_pt(props.x2), mm_to_pt(props.y2), &paint);
            }
            ElementKind::Image(props) => {
                if let Err(err) = renderer.draw_image(x, y, width, height, &props.image_path) {
                    log::warn!("element {:?}: {err}; drawing fallback", element.id);
                    let fallback = RectPaint {
                        stroke: None,
                        fill: Some(IMAGE_FALLBACK_COLOR),
                        stroke_width: 1.0,
                    };
                    renderer.draw_rect(x, y, width, height, &fallback);
                }
            }
            ElementKind::Text(props) => {
                self.dispatch_text(element, props, x, y, width, renderer)
            }
            ElementKind::KvBox(props) => {
                self.dispatch_kv_box(element, props, x, y, width, height, renderer)
            }
            // Containers are eliminated by the compiler; nothing reaches here.
            ElementKind::Container(_) => {}
            ElementKind::Table(props) => {
                self.dispatch_table(element, props, x, y, width, height, renderer)
            }
        }
    }

    fn dispatch_text(
        &self,
        element: &Element,
        props: &TextProps,
        x: f64,
        y: f64,
        width: f64,
        renderer: &mut dyn Renderer,
    ) {
        self.draw_text_block(
            renderer,
            x,
            y,
            width,
            &props.text,
            &props.font_family,
            props.font_size,
            props.font_bold,
            props.font_italic,
            parse_paint(&props.color, &element.id, "text"),
            props.text_align,
            props.wrap,
        );
    }

    /// Key/value box: outer rect, divider, and two text columns split by one
    /// of three policies.
    #[allow(clippy::too_many_arguments)]
    fn dispatch_kv_box(
        &self,
        element: &Element,
        props: &KvBoxProps,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        renderer: &mut dyn Renderer,
    ) {
        let split = match props.split_type {
            SplitMode::Fixed => mm_to_pt(props.split_fixed),
            SplitMode::Auto => {
                self.fonts.measure_text_width(
                    &props.key_text,
                    &props.font_family,
                    props.font_size,
                    props.font_bold,
                    props.font_italic,
                ) + mm_to_pt(KV_BOX_PADDING_MM)
            }
            SplitMode::Ratio => width * props.split_ratio,
        };

        if props.show_outline {
            let border = RectPaint {
                stroke: parse_paint(&props.border_color, &element.id, "border"),
                fill: None,
                stroke_width: props.stroke_width,
            };
            renderer.draw_rect(x, y, width, height, &border);
            let divider = LinePaint {
                color: parse_paint(&props.divider_color, &element.id, "divider"),
                width: props.stroke_width,
                arrow_start: false,
                arrow_end: false,
            };
            renderer.draw_line(x + split, y, x + split, y + height, &divider);
        }

        let pad = mm_to_pt(KV_BOX_TEXT_PADDING_MM);
        let v_offset = (height - props.font_size) / 2.0;
        let color = parse_paint(&props.color, &element.id, "text");

        // Both columns auto-fit instead of wrapping.
        self.draw_text_block(
            renderer,
            x + pad,
            y + v_offset,
            split - pad,
            &props.key_text,
            &props.font_family,
            props.font_size,
            props.font_bold,
            props.font_italic,
            color,
            TextAlign::Left,
            false,
        );
        self.draw_text_block(
            renderer,
            x + split + pad,
            y + v_offset,
            width - split - pad,
            &props.text,
            &props.font_family,
            props.font_size,
            props.font_bold,
            props.font_italic,
            color,
            TextAlign::Left,
            false,
        );
    }

    fn dispatch_table(
        &self,
        element: &Element,
        props: &TableProps,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        renderer: &mut dyn Renderer,
    ) {
        let rows = props.data.len();
        let cols = props.data.iter().map(Vec::len).max().unwrap_or(0);
        if rows == 0 || cols == 0 {
            return;
        }

        let explicit_cols: Option<Vec<f64>> = props
            .col_widths
            .as_ref()
            .map(|w| w.iter().map(|&mm| mm_to_pt(mm)).collect());
        let explicit_rows: Option<Vec<f64>> = props
            .row_heights
            .as_ref()
            .map(|h| h.iter().map(|&mm| mm_to_pt(mm)).collect());
        let col_widths = resolve_spans(width, cols, explicit_cols.as_deref());
        let row_heights = resolve_spans(height, rows, explicit_rows.as_deref());

        let paint = TablePaint {
            font_size: props.font_size,
            stroke: parse_paint(&props.stroke_color, &element.id, "stroke"),
            header_fill: props
                .show_header
                .then(|| parse_paint(&props.header_bg_color, &element.id, "header fill"))
                .flatten(),
        };
        renderer.draw_table(
            x,
            y,
            width,
            height,
            &props.data,
            &col_widths,
            &row_heights,
            &paint,
        );
    }

    /// Shared text pipeline: auto-fit or wrap, then emit one positioned
    /// baseline per line. Horizontal fit takes precedence over vertical fit –
    /// wrapped content may overflow the box bottom.
    #[allow(clippy::too_many_arguments)]
    fn draw_text_block(
        &self,
        renderer: &mut dyn Renderer,
        x: f64,
        y: f64,
        width: f64,
        text: &str,
        family: &str,
        font_size: f64,
        bold: bool,
        italic: bool,
        color: Option<Color>,
        align: TextAlign,
        wrap: bool,
    ) {
        if text.is_empty() {
            return;
        }

        let size = if wrap {
            font_size
        } else {
            self.fonts
                .fit_font_size(text, family, font_size, bold, italic, width)
        };
        let lines = if wrap {
            self.fonts
                .wrap_text(text, family, size, bold, italic, width)
        } else {
            vec![text.to_string()]
        };

        let paint = TextPaint {
            family: family.to_string(),
            size,
            bold,
            italic,
            color,
        };
        let line_height = self.fonts.line_height(size);
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_width = self
                .fonts
                .measure_text_width(line, family, size, bold, italic);
            let line_x = match align {
                TextAlign::Left => x,
                TextAlign::Center => x + (width - line_width) / 2.0,
                TextAlign::Right => x + width - line_width,
            };
            let baseline = y + i as f64 * line_height + size * ASCENT_FACTOR;
            renderer.draw_text(line_x, baseline, line, &paint);
        }
    }
}

/// One-shot convenience: compile and render a template against a catalog.
pub fn render_document(
    template: &Template,
    blocks: &BlockCatalog,
    data: &DataMap,
    renderer: &mut dyn Renderer,
) -> Result<(), UnresolvedBlockError> {
    Exporter::new(blocks).export(template, data, renderer)
}

/// Distribute `total` over `count` spans. Explicit leading spans are kept;
/// the remaining spans share the leftover evenly. No explicit spans means an
/// even split.
pub fn resolve_spans(total: f64, count: usize, explicit: Option<&[f64]>) -> Vec<f64> {
    let given = explicit.unwrap_or_default();
    let mut spans: Vec<f64> = given.iter().take(count).copied().collect();
    if spans.len() < count {
        let used: f64 = spans.iter().sum();
        let leftover = (total - used).max(0.0);
        let share = leftover / (count - spans.len()) as f64;
        spans.resize(count, share);
    }
    spans
}

/// Grow tables whose bound data outnumbers their design-time rows, shifting
/// everything below them down by the accumulated delta. Processes elements
/// top-to-bottom by y without disturbing paint order.
fn adjust_dynamic_heights(elements: &mut [Element]) {
    let mut order: Vec<usize> = (0..elements.len()).collect();
    order.sort_by(|&a, &b| {
        elements[a]
            .y
            .partial_cmp(&elements[b].y)
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut offset = 0.0;
    for idx in order {
        let element = &mut elements[idx];
        element.y += offset;
        if let ElementKind::Table(props) = &element.kind {
            if props.data.is_empty() {
                continue;
            }
            let design_rows = props.num_rows_editor.unwrap_or(DEFAULT_DESIGN_ROWS).max(1);
            let row_height = element.height / design_rows as f64;
            let new_height = row_height * props.data.len() as f64;
            offset += new_height - element.height;
            element.height = new_height;
        }
    }
}

fn parse_paint(spec: &str, element_id: &str, channel: &str) -> Option<Color> {
    let color = Color::parse(spec);
    if color.is_none() && !spec.is_empty() {
        log::warn!("element {element_id:?}: unparseable {channel} color {spec:?}, not painting");
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DrawCommand, RecordingRenderer};
    use crate::model::{ImageProps, PageSize, RectProps, TemplateItem};

    fn template_with(items: Vec<TemplateItem>) -> Template {
        Template {
            id: "tpl".to_string(),
            name: "test".to_string(),
            version: crate::model::CURRENT_VERSION.to_string(),
            page_size: PageSize {
                width: 210.0,
                height: 297.0,
            },
            items,
        }
    }

    fn export(template: &Template) -> Vec<DrawCommand> {
        let blocks = BlockCatalog::new();
        let mut backend = RecordingRenderer::new();
        Exporter::new(&blocks)
            .export(template, &DataMap::new(), &mut backend)
            .unwrap();
        backend.commands
    }

    #[test]
    fn export_brackets_content_with_document_ops() {
        let commands = export(&template_with(Vec::new()));
        assert!(matches!(commands[0], DrawCommand::SetPageSize { .. }));
        assert_eq!(commands[1], DrawCommand::BeginDocument);
        assert_eq!(commands[2], DrawCommand::StartPage);
        assert_eq!(commands[3], DrawCommand::EndPage);
        assert_eq!(commands[4], DrawCommand::Finish);
    }

    #[test]
    fn rect_channels_resolve_independently() {
        let mut rect = Element::new(
            "r",
            ElementKind::Rect(RectProps {
                bg_type: BgMode::Solid,
                fill_color: "#336699".to_string(),
                show_outline: true,
                stroke_color: "not a color".to_string(),
                ..RectProps::default()
            }),
        );
        rect.width = 10.0;
        rect.height = 10.0;
        let commands = export(&template_with(vec![TemplateItem::Element(rect)]));
        let Some(DrawCommand::Rect { paint, .. }) = commands
            .iter()
            .find(|c| matches!(c, DrawCommand::Rect { .. }))
        else {
            panic!("no rect drawn");
        };
        assert!(paint.fill.is_some());
        assert!(paint.stroke.is_none(), "bad color must drop the channel");
    }

    #[test]
    fn missing_image_substitutes_fallback_rect() {
        let mut image = Element::new(
            "img",
            ElementKind::Image(ImageProps {
                image_path: "/definitely/not/here.png".to_string(),
            }),
        );
        image.x = 10.0;
        image.y = 20.0;
        image.width = 30.0;
        image.height = 15.0;
        let commands = export(&template_with(vec![TemplateItem::Element(image)]));
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::Image { .. })));
        let Some(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            paint,
        }) = commands
            .iter()
            .find(|c| matches!(c, DrawCommand::Rect { .. }))
        else {
            panic!("fallback rect missing");
        };
        assert_eq!(paint.fill, Some(IMAGE_FALLBACK_COLOR));
        assert!((x - mm_to_pt(10.0)).abs() < 1e-9);
        assert!((y - mm_to_pt(20.0)).abs() < 1e-9);
        assert!((width - mm_to_pt(30.0)).abs() < 1e-9);
        assert!((height - mm_to_pt(15.0)).abs() < 1e-9);
    }

    #[test]
    fn spans_split_leftover_evenly() {
        let spans = resolve_spans(100.0, 4, Some(&[40.0]));
        assert_eq!(spans, vec![40.0, 20.0, 20.0, 20.0]);

        let even = resolve_spans(90.0, 3, None);
        assert_eq!(even, vec![30.0, 30.0, 30.0]);
    }

    #[test]
    fn table_resolves_column_and_row_spans() {
        let mut table = Element::new(
            "tbl",
            ElementKind::Table(TableProps {
                data: vec![
                    vec!["A".to_string(), "B".to_string()],
                    vec!["1".to_string(), "2".to_string()],
                ],
                num_rows_editor: Some(2),
                ..TableProps::default()
            }),
        );
        table.width = 100.0;
        table.height = 20.0;
        let commands = export(&template_with(vec![TemplateItem::Element(table)]));
        let Some(DrawCommand::Table {
            col_widths,
            row_heights,
            paint,
            ..
        }) = commands
            .iter()
            .find(|c| matches!(c, DrawCommand::Table { .. }))
        else {
            panic!("no table drawn");
        };
        assert_eq!(col_widths.len(), 2);
        assert!((col_widths[0] - mm_to_pt(50.0)).abs() < 1e-9);
        assert_eq!(row_heights.len(), 2);
        assert!((row_heights[0] - mm_to_pt(10.0)).abs() < 1e-9);
        assert!(paint.header_fill.is_some());
    }

    #[test]
    fn wrapped_text_emits_one_call_per_line() {
        let mut text = Element::new(
            "t",
            ElementKind::Text(TextProps {
                text: "several words that cannot fit on one line".to_string(),
                font_size: 12.0,
                ..TextProps::default()
            }),
        );
        text.width = 20.0;
        text.height = 40.0;
        let commands = export(&template_with(vec![TemplateItem::Element(text)]));
        let lines: Vec<_> = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { .. }))
            .collect();
        assert!(lines.len() > 1, "expected wrapping, got {lines:?}");
    }

    #[test]
    fn unwrapped_text_shrinks_to_fit() {
        let mut text = Element::new(
            "t",
            ElementKind::Text(TextProps {
                text: "a very long line that will never fit".to_string(),
                font_size: 12.0,
                wrap: false,
                ..TextProps::default()
            }),
        );
        text.width = 20.0;
        text.height = 10.0;
        let commands = export(&template_with(vec![TemplateItem::Element(text)]));
        let Some(DrawCommand::Text { paint, .. }) = commands
            .iter()
            .find(|c| matches!(c, DrawCommand::Text { .. }))
        else {
            panic!("no text drawn");
        };
        assert_eq!(
            commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::Text { .. }))
                .count(),
            1
        );
        assert!(paint.size < 12.0);
    }

    #[test]
    fn kv_box_draws_border_divider_and_columns() {
        let mut kv = Element::new(
            "kv",
            ElementKind::KvBox(KvBoxProps {
                key_text: "Invoice:".to_string(),
                text: "0042".to_string(),
                split_ratio: 0.5,
                ..KvBoxProps::default()
            }),
        );
        kv.width = 60.0;
        kv.height = 8.0;
        let commands = export(&template_with(vec![TemplateItem::Element(kv)]));

        let rects = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }))
            .count();
        let dividers: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { x1, x2, .. } => Some((*x1, *x2)),
                _ => None,
            })
            .collect();
        let texts = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text { .. }))
            .count();
        assert_eq!(rects, 1);
        assert_eq!(dividers.len(), 1);
        // Divider is vertical at the ratio split.
        assert_eq!(dividers[0].0, dividers[0].1);
        assert!((dividers[0].0 - mm_to_pt(30.0)).abs() < 1e-9);
        assert_eq!(texts, 2);
    }

    #[test]
    fn thermal_width_derives_page_height_from_content() {
        let mut rect = Element::new("r", ElementKind::Rect(RectProps::default()));
        rect.y = 40.0;
        rect.height = 30.0;
        let mut template = template_with(vec![TemplateItem::Element(rect)]);
        template.page_size = PageSize {
            width: 80.0,
            height: 297.0,
        };
        let commands = export(&template);
        let DrawCommand::SetPageSize { width, height } = &commands[0] else {
            panic!("first op must set the page size");
        };
        assert!((width - mm_to_pt(80.0)).abs() < 1e-9);
        // 40 + 30 + 10 mm bottom margin
        assert!((height - mm_to_pt(80.0)).abs() < 1e-9);
    }

    #[test]
    fn growing_table_shifts_elements_below() {
        let mut table = Element::new(
            "tbl",
            ElementKind::Table(TableProps {
                data: (0..6)
                    .map(|i| vec![format!("row {i}")])
                    .collect(),
                num_rows_editor: Some(3),
                ..TableProps::default()
            }),
        );
        table.y = 10.0;
        table.width = 50.0;
        table.height = 30.0;
        let mut below = Element::new("r", ElementKind::Rect(RectProps::default()));
        below.y = 50.0;
        below.width = 10.0;
        below.height = 10.0;

        let mut elements = vec![table, below];
        adjust_dynamic_heights(&mut elements);
        // 6 rows × 10mm design row height
        assert_eq!(elements[0].height, 60.0);
        // The rect moved down by the 30mm delta.
        assert_eq!(elements[1].y, 80.0);
    }
}
