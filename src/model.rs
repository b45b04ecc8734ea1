//! Document model – templates, reusable blocks, and the closed set of visual
//! element types.
//!
//! The persisted JSON shape is preserved exactly: an element record carries
//! `type` and `props` side by side (`ElementKind` is adjacently tagged), a
//! template item is either an element record or a block-instance record
//! (distinguished by the presence of `type` vs `block_id`).
//!
//! All geometry is stored in document millimetres; conversion to backend
//! points happens in the render dispatcher, never here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;
use crate::geometry::BoundingBox;

/// Schema version written by the current build.
pub const CURRENT_VERSION: &str = "0.0.2";

/// Version assumed for documents that predate version stamping.
pub(crate) const OLDEST_VERSION: &str = "0.0.0";

/// Caller-supplied mapping from block identifier to block definition. The
/// compiler treats it as read-only.
pub type BlockCatalog = HashMap<String, Block>;

/// Data supplied to a compilation: variable name → scalar, string, or (for
/// table `data` targets) a two-dimensional array.
pub type DataMap = HashMap<String, Value>;

/// Mapping between a data variable and an element property, applied after
/// flattening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub variable_name: String,
    pub target_property: String,
}

// ---------------------------------------------------------------------------
// Shared property enums
// ---------------------------------------------------------------------------

/// Background fill mode for rects and containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BgMode {
    #[default]
    Transparent,
    Solid,
    Image,
}

/// Horizontal text alignment inside an element's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// How a key/value box splits its width into key and value columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Key column = `split_ratio` × total width.
    #[default]
    Ratio,
    /// Key column = `split_fixed` millimetres.
    Fixed,
    /// Key column sized to the measured key text.
    Auto,
}

// ---------------------------------------------------------------------------
// Per-variant property schemas
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}
fn default_fill() -> String {
    "#ffffff".to_string()
}
fn default_stroke() -> String {
    "#000000".to_string()
}
fn default_stroke_width() -> f64 {
    1.0
}
fn default_opacity() -> f64 {
    255.0
}
fn default_font_family() -> String {
    "Helvetica".to_string()
}
fn default_text_size() -> f64 {
    12.0
}
fn default_small_size() -> f64 {
    10.0
}
fn default_key_text() -> String {
    "Label:".to_string()
}
fn default_split_ratio() -> f64 {
    0.4
}
fn default_split_fixed() -> f64 {
    20.0
}
fn default_kv_stroke_width() -> f64 {
    0.5
}
fn default_header_fill() -> String {
    "#f0f0f0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectProps {
    #[serde(default)]
    pub bg_type: BgMode,
    #[serde(default = "default_fill")]
    pub fill_color: String,
    /// Editor-side alpha hint (0–255); advisory, not consumed by the
    /// dispatcher.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub show_outline: bool,
    #[serde(default = "default_stroke")]
    pub stroke_color: String,
    /// Stroke width in points.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl Default for RectProps {
    fn default() -> Self {
        Self {
            bg_type: BgMode::Transparent,
            fill_color: default_fill(),
            opacity: default_opacity(),
            show_outline: false,
            stroke_color: default_stroke(),
            stroke_width: default_stroke_width(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProps {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Font size in points.
    #[serde(default = "default_text_size")]
    pub font_size: f64,
    #[serde(default)]
    pub font_bold: bool,
    #[serde(default)]
    pub font_italic: bool,
    #[serde(default = "default_stroke")]
    pub color: String,
    #[serde(default)]
    pub text_align: TextAlign,
    /// When false, oversized text shrinks to fit the box width instead of
    /// wrapping.
    #[serde(default = "default_true")]
    pub wrap: bool,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: default_font_family(),
            font_size: default_text_size(),
            font_bold: false,
            font_italic: false,
            color: default_stroke(),
            text_align: TextAlign::Left,
            wrap: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineProps {
    /// Endpoint, in the same coordinate frame as the element's `x`/`y`.
    #[serde(default)]
    pub x2: f64,
    #[serde(default)]
    pub y2: f64,
    #[serde(default = "default_stroke")]
    pub stroke_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub arrow_start: bool,
    #[serde(default)]
    pub arrow_end: bool,
}

impl Default for LineProps {
    fn default() -> Self {
        Self {
            x2: 0.0,
            y2: 0.0,
            stroke_color: default_stroke(),
            stroke_width: default_stroke_width(),
            arrow_start: false,
            arrow_end: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageProps {
    #[serde(default)]
    pub image_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvBoxProps {
    #[serde(default = "default_key_text")]
    pub key_text: String,
    /// The value column content.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub split_type: SplitMode,
    #[serde(default = "default_split_ratio")]
    pub split_ratio: f64,
    /// Fixed key-column width in millimetres.
    #[serde(default = "default_split_fixed")]
    pub split_fixed: f64,
    #[serde(default = "default_true")]
    pub show_outline: bool,
    #[serde(default = "default_kv_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "default_stroke")]
    pub border_color: String,
    #[serde(default = "default_stroke")]
    pub divider_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_small_size")]
    pub font_size: f64,
    #[serde(default)]
    pub font_bold: bool,
    #[serde(default)]
    pub font_italic: bool,
    #[serde(default = "default_stroke")]
    pub color: String,
}

impl Default for KvBoxProps {
    fn default() -> Self {
        Self {
            key_text: default_key_text(),
            text: String::new(),
            split_type: SplitMode::Ratio,
            split_ratio: default_split_ratio(),
            split_fixed: default_split_fixed(),
            show_outline: true,
            stroke_width: default_kv_stroke_width(),
            border_color: default_stroke(),
            divider_color: default_stroke(),
            font_family: default_font_family(),
            font_size: default_small_size(),
            font_bold: false,
            font_italic: false,
            color: default_stroke(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerProps {
    #[serde(default)]
    pub bg_type: BgMode,
    #[serde(default = "default_fill")]
    pub fill_color: String,
    #[serde(default)]
    pub show_outline: bool,
    #[serde(default = "default_stroke")]
    pub stroke_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl Default for ContainerProps {
    fn default() -> Self {
        Self {
            bg_type: BgMode::Transparent,
            fill_color: default_fill(),
            show_outline: false,
            stroke_color: default_stroke(),
            stroke_width: default_stroke_width(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProps {
    /// Rows of cell strings; the first row is the header when `show_header`.
    #[serde(default)]
    pub data: Vec<Vec<String>>,
    /// Explicit column widths in millimetres. Columns beyond this list share
    /// the leftover width evenly.
    #[serde(default)]
    pub col_widths: Option<Vec<f64>>,
    /// Explicit row heights in millimetres; same leftover rule as columns.
    #[serde(default)]
    pub row_heights: Option<Vec<f64>>,
    #[serde(default = "default_small_size")]
    pub font_size: f64,
    #[serde(default = "default_true")]
    pub show_header: bool,
    #[serde(default = "default_header_fill")]
    pub header_bg_color: String,
    #[serde(default = "default_stroke")]
    pub stroke_color: String,
    /// Row count the element height was designed for; drives dynamic height
    /// when the bound data has more rows.
    #[serde(default)]
    pub num_rows_editor: Option<usize>,
}

impl Default for TableProps {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            col_widths: None,
            row_heights: None,
            font_size: default_small_size(),
            show_header: true,
            header_bg_color: default_header_fill(),
            stroke_color: default_stroke(),
            num_rows_editor: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// The closed set of element types, each with its own property schema.
/// Serializes as the persisted `"type"` / `"props"` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "props", rename_all = "snake_case")]
pub enum ElementKind {
    Rect(RectProps),
    Text(TextProps),
    Line(LineProps),
    Image(ImageProps),
    KvBox(KvBoxProps),
    Container(ContainerProps),
    Table(TableProps),
}

impl ElementKind {
    /// The persisted type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Rect(_) => "rect",
            ElementKind::Text(_) => "text",
            ElementKind::Line(_) => "line",
            ElementKind::Image(_) => "image",
            ElementKind::KvBox(_) => "kv_box",
            ElementKind::Container(_) => "container",
            ElementKind::Table(_) => "table",
        }
    }

    /// Only containers own children.
    pub fn allows_children(&self) -> bool {
        matches!(self, ElementKind::Container(_))
    }

    /// Property keys a [`Binding`] may target on this element type.
    pub fn bindable_properties(&self) -> &'static [&'static str] {
        match self {
            ElementKind::Rect(_) => &[
                "fill_color",
                "stroke_color",
                "stroke_width",
                "opacity",
                "show_outline",
            ],
            ElementKind::Text(_) => &[
                "text",
                "font_family",
                "font_size",
                "color",
                "font_bold",
                "font_italic",
                "text_align",
            ],
            ElementKind::Line(_) => &["stroke_color", "stroke_width"],
            ElementKind::Image(_) => &["image_path"],
            ElementKind::KvBox(_) => &[
                "key_text",
                "text",
                "font_family",
                "font_size",
                "color",
                "font_bold",
                "font_italic",
                "border_color",
                "divider_color",
            ],
            ElementKind::Container(_) => &[
                "fill_color",
                "stroke_color",
                "stroke_width",
                "show_outline",
            ],
            ElementKind::Table(_) => &[
                "data",
                "font_size",
                "header_bg_color",
                "stroke_color",
            ],
        }
    }

    /// Overwrite the property at `target` with the (coerced) data value.
    ///
    /// Returns false when the key is not a property of this type. A value
    /// that cannot be coerced to the property's shape leaves the property
    /// untouched; type coercion is best-effort, never an error.
    pub fn apply_binding(&mut self, target: &str, value: &Value) -> bool {
        match self {
            ElementKind::Rect(p) => match target {
                "fill_color" => p.fill_color = display_string(value),
                "stroke_color" => p.stroke_color = display_string(value),
                "stroke_width" => set_f64(&mut p.stroke_width, value),
                "opacity" => set_f64(&mut p.opacity, value),
                "show_outline" => set_bool(&mut p.show_outline, value),
                _ => return false,
            },
            ElementKind::Text(p) => match target {
                "text" => p.text = display_string(value),
                "font_family" => p.font_family = display_string(value),
                "font_size" => set_f64(&mut p.font_size, value),
                "color" => p.color = display_string(value),
                "font_bold" => set_bool(&mut p.font_bold, value),
                "font_italic" => set_bool(&mut p.font_italic, value),
                "text_align" => set_align(&mut p.text_align, value),
                _ => return false,
            },
            ElementKind::Line(p) => match target {
                "stroke_color" => p.stroke_color = display_string(value),
                "stroke_width" => set_f64(&mut p.stroke_width, value),
                _ => return false,
            },
            ElementKind::Image(p) => match target {
                "image_path" => p.image_path = display_string(value),
                _ => return false,
            },
            ElementKind::KvBox(p) => match target {
                "key_text" => p.key_text = display_string(value),
                "text" => p.text = display_string(value),
                "font_family" => p.font_family = display_string(value),
                "font_size" => set_f64(&mut p.font_size, value),
                "color" => p.color = display_string(value),
                "font_bold" => set_bool(&mut p.font_bold, value),
                "font_italic" => set_bool(&mut p.font_italic, value),
                "border_color" => p.border_color = display_string(value),
                "divider_color" => p.divider_color = display_string(value),
                _ => return false,
            },
            ElementKind::Container(p) => match target {
                "fill_color" => p.fill_color = display_string(value),
                "stroke_color" => p.stroke_color = display_string(value),
                "stroke_width" => set_f64(&mut p.stroke_width, value),
                "show_outline" => set_bool(&mut p.show_outline, value),
                _ => return false,
            },
            ElementKind::Table(p) => match target {
                "data" => {
                    if let Some(rows) = coerce_table(value) {
                        p.data = rows;
                    }
                }
                "font_size" => set_f64(&mut p.font_size, value),
                "header_bg_color" => p.header_bg_color = display_string(value),
                "stroke_color" => p.stroke_color = display_string(value),
                _ => return false,
            },
        }
        true
    }

    /// Mutable references to the text-bearing properties, the targets of
    /// `{{ placeholder }}` substitution during block resolution.
    pub fn text_fields_mut(&mut self) -> Vec<&mut String> {
        match self {
            ElementKind::Text(p) => vec![&mut p.text],
            ElementKind::KvBox(p) => vec![&mut p.key_text, &mut p.text],
            _ => Vec::new(),
        }
    }
}

/// A node in the document tree. `x`/`y` are relative to the nearest enclosing
/// container, or the page for top-level elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub bindings: Vec<Binding>,
    #[serde(default)]
    pub children: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    // Advisory editor locks; the compiler and renderer ignore them.
    #[serde(default)]
    pub lock_children: bool,
    #[serde(default)]
    pub lock_position: bool,
    #[serde(default)]
    pub lock_geometry: bool,
    #[serde(default)]
    pub lock_selection: bool,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            bindings: Vec::new(),
            children: Vec::new(),
            name: None,
            lock_children: false,
            lock_position: false,
            lock_geometry: false,
            lock_selection: false,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Blocks and templates
// ---------------------------------------------------------------------------

/// A named, reusable sub-document, addressable through the block catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A placement of a block inside a template. Never nests other instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    pub id: String,
    pub block_id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Placeholder substitution values for this placement.
    #[serde(default)]
    pub data: DataMap,
}

/// Page dimensions in millimetres; both must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// One top-level entry of a template. Element records carry a `type` key,
/// block-instance records a `block_id` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateItem {
    Element(Element),
    Block(BlockInstance),
}

/// A document template: page size plus an ordered list of elements and block
/// instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default = "current_version")]
    pub version: String,
    pub page_size: PageSize,
    #[serde(default)]
    pub items: Vec<TemplateItem>,
}

fn current_version() -> String {
    CURRENT_VERSION.to_string()
}

impl Template {
    /// Serialize for persistence. The version is stamped with the current
    /// schema version regardless of what the instance carries.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut copy = self.clone();
        copy.version = CURRENT_VERSION.to_string();
        serde_json::to_string_pretty(&copy)
    }

    /// Check the model invariants: children only under containers, finite
    /// non-negative geometry, positive page size, recognized binding targets.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.page_size.width <= 0.0 || self.page_size.height <= 0.0 {
            return Err(SchemaError::InvalidPageSize {
                document_id: self.id.clone(),
            });
        }
        for item in &self.items {
            if let TemplateItem::Element(element) = item {
                validate_element(element)?;
            }
        }
        Ok(())
    }
}

impl Block {
    pub fn validate(&self) -> Result<(), SchemaError> {
        for element in &self.elements {
            validate_element(element)?;
        }
        Ok(())
    }
}

fn validate_element(element: &Element) -> Result<(), SchemaError> {
    for (field, value) in [
        ("x", element.x),
        ("y", element.y),
        ("width", element.width),
        ("height", element.height),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(SchemaError::MalformedNumber {
                element_id: element.id.clone(),
                field: field.to_string(),
            });
        }
    }
    if !element.children.is_empty() && !element.kind.allows_children() {
        return Err(SchemaError::IllegalChildren {
            element_id: element.id.clone(),
            kind: element.kind.type_name().to_string(),
        });
    }
    for binding in &element.bindings {
        if !element
            .kind
            .bindable_properties()
            .contains(&binding.target_property.as_str())
        {
            return Err(SchemaError::UnknownBindingTarget {
                element_id: element.id.clone(),
                kind: element.kind.type_name().to_string(),
                target: binding.target_property.clone(),
            });
        }
    }
    for child in &element.children {
        validate_element(child)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Value coercion
// ---------------------------------------------------------------------------

/// Render a data value as its display string. Nulls become empty; compound
/// values fall back to compact JSON.
pub(crate) fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn set_f64(slot: &mut f64, value: &Value) {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    if let Some(v) = parsed.filter(|v| v.is_finite()) {
        *slot = v;
    }
}

fn set_bool(slot: &mut bool, value: &Value) {
    match value {
        Value::Bool(b) => *slot = *b,
        Value::String(s) => match s.as_str() {
            "true" => *slot = true,
            "false" => *slot = false,
            _ => {}
        },
        _ => {}
    }
}

fn set_align(slot: &mut TextAlign, value: &Value) {
    if let Value::String(s) = value {
        match s.as_str() {
            "left" => *slot = TextAlign::Left,
            "center" => *slot = TextAlign::Center,
            "right" => *slot = TextAlign::Right,
            _ => {}
        }
    }
}

fn coerce_table(value: &Value) -> Option<Vec<Vec<String>>> {
    let rows = value.as_array()?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let cells = row.as_array()?;
        out.push(cells.iter().map(display_string).collect());
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn element_record_round_trip() {
        let json = json!({
            "id": "t1",
            "type": "text",
            "x": 10.0,
            "y": 20.0,
            "width": 50.0,
            "height": 8.0,
            "props": { "text": "Hello", "font_size": 14.0 },
            "bindings": [
                { "variable_name": "title", "target_property": "text" }
            ]
        });
        let element: Element = serde_json::from_value(json).unwrap();
        assert_eq!(element.id, "t1");
        match &element.kind {
            ElementKind::Text(p) => {
                assert_eq!(p.text, "Hello");
                assert_eq!(p.font_size, 14.0);
                assert_eq!(p.font_family, "Helvetica");
                assert!(p.wrap);
            }
            other => panic!("Expected text element, got {}", other.type_name()),
        }

        let back = serde_json::to_value(&element).unwrap();
        assert_eq!(back["type"], "text");
        assert_eq!(back["props"]["text"], "Hello");
    }

    #[test]
    fn template_items_distinguish_elements_from_instances() {
        let json = json!({
            "id": "tpl",
            "name": "Invoice",
            "version": "0.0.2",
            "page_size": { "width": 210.0, "height": 297.0 },
            "items": [
                { "id": "r1", "type": "rect", "props": {}, "width": 10.0, "height": 10.0 },
                { "id": "i1", "block_id": "header", "x": 5.0, "y": 5.0, "data": {} }
            ]
        });
        let template: Template = serde_json::from_value(json).unwrap();
        assert!(matches!(template.items[0], TemplateItem::Element(_)));
        assert!(matches!(template.items[1], TemplateItem::Block(_)));
    }

    #[test]
    fn binding_coercion_rules() {
        let mut kind = ElementKind::Text(TextProps::default());
        assert!(kind.apply_binding("text", &json!(42)));
        assert!(kind.apply_binding("font_size", &json!(18.5)));
        // Malformed number leaves the previous value in place.
        assert!(kind.apply_binding("font_size", &json!("not a number")));
        assert!(!kind.apply_binding("no_such_prop", &json!(1)));
        match kind {
            ElementKind::Text(p) => {
                assert_eq!(p.text, "42");
                assert_eq!(p.font_size, 18.5);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn table_data_binding_accepts_2d_arrays() {
        let mut kind = ElementKind::Table(TableProps::default());
        assert!(kind.apply_binding(
            "data",
            &json!([["Name", "Qty"], ["Bolt", 12], ["Nut", 40]])
        ));
        match kind {
            ElementKind::Table(p) => {
                assert_eq!(p.data.len(), 3);
                assert_eq!(p.data[1], vec!["Bolt", "12"]);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn validate_rejects_children_on_leaf_types() {
        let mut rect = Element::new("r", ElementKind::Rect(RectProps::default()));
        rect.children
            .push(Element::new("c", ElementKind::Text(TextProps::default())));
        let template = Template {
            id: "tpl".to_string(),
            name: "bad".to_string(),
            version: CURRENT_VERSION.to_string(),
            page_size: PageSize {
                width: 210.0,
                height: 297.0,
            },
            items: vec![TemplateItem::Element(rect)],
        };
        assert!(matches!(
            template.validate(),
            Err(SchemaError::IllegalChildren { .. })
        ));
    }

    #[test]
    fn validate_rejects_unknown_binding_target() {
        let mut line = Element::new("l", ElementKind::Line(LineProps::default()));
        line.bindings.push(Binding {
            variable_name: "v".to_string(),
            target_property: "text".to_string(),
        });
        let template = Template {
            id: "tpl".to_string(),
            name: "bad".to_string(),
            version: CURRENT_VERSION.to_string(),
            page_size: PageSize {
                width: 210.0,
                height: 297.0,
            },
            items: vec![TemplateItem::Element(line)],
        };
        assert!(matches!(
            template.validate(),
            Err(SchemaError::UnknownBindingTarget { .. })
        ));
    }
}
