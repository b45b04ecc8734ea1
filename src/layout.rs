//! Layout compiler – turns a template plus block catalog into a flat list of
//! leaf elements with page-absolute coordinates.
//!
//! The stage order matters: block instances are resolved (deep copy, instance
//! offset, `{{ placeholder }}` substitution), trees are flattened with
//! accumulated offsets, and only then are data bindings applied – so a
//! binding always wins over a placeholder that targeted the same property.
//! Containers never survive into the output; a paintable container leaves a
//! synthesized rect behind, emitted before its children to preserve paint
//! order. Inputs are never mutated.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::UnresolvedBlockError;
use crate::model::{
    display_string, BgMode, BlockCatalog, BlockInstance, ContainerProps, DataMap, Element,
    ElementKind, RectProps, Template, TemplateItem,
};

/// `{{ name }}` – whitespace inside the braces is ignored, names are `\w+`
/// and case-sensitive.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder pattern"));

/// Compiles templates against a read-only block catalog.
pub struct LayoutEngine<'a> {
    blocks: &'a BlockCatalog,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(blocks: &'a BlockCatalog) -> Self {
        Self { blocks }
    }

    /// Flatten `template` into leaf elements in paint order, with `data`
    /// applied through each element's bindings.
    ///
    /// Fails only when a block instance references a block absent from the
    /// catalog; every content-level inconsistency is tolerated.
    pub fn compile(
        &self,
        template: &Template,
        data: &DataMap,
    ) -> Result<Vec<Element>, UnresolvedBlockError> {
        let mut out = Vec::new();
        for item in &template.items {
            match item {
                TemplateItem::Element(element) => flatten_tree(element, 0.0, 0.0, &mut out),
                TemplateItem::Block(instance) => self.resolve_block(instance, &mut out)?,
            }
        }
        for element in &mut out {
            apply_bindings(element, data);
        }
        Ok(out)
    }

    /// Resolve one block placement: look up the definition, flatten its
    /// elements with the instance offset, then substitute placeholders from
    /// the instance data.
    fn resolve_block(
        &self,
        instance: &BlockInstance,
        out: &mut Vec<Element>,
    ) -> Result<(), UnresolvedBlockError> {
        let block = self
            .blocks
            .get(&instance.block_id)
            .ok_or_else(|| UnresolvedBlockError {
                instance_id: instance.id.clone(),
                block_id: instance.block_id.clone(),
            })?;

        let start = out.len();
        for element in &block.elements {
            flatten_tree(element, instance.x, instance.y, out);
        }
        for element in &mut out[start..] {
            for field in element.kind.text_fields_mut() {
                *field = substitute_placeholders(field, &instance.data);
            }
        }
        Ok(())
    }
}

/// Recursively flatten `element` into `out`, translating by the accumulated
/// parent offset. Each emitted element is a fresh copy with absolute
/// coordinates and no children.
fn flatten_tree(element: &Element, offset_x: f64, offset_y: f64, out: &mut Vec<Element>) {
    let abs_x = offset_x + element.x;
    let abs_y = offset_y + element.y;

    if let ElementKind::Container(props) = &element.kind {
        if container_paints(props) {
            out.push(container_backdrop(element, props, abs_x, abs_y));
        }
        for child in &element.children {
            flatten_tree(child, abs_x, abs_y, out);
        }
        return;
    }

    let mut flat = element.clone();
    flat.x = abs_x;
    flat.y = abs_y;
    flat.children = Vec::new();
    // Line endpoints live in the same frame as the origin and must move with
    // it.
    if let ElementKind::Line(line) = &mut flat.kind {
        line.x2 += offset_x;
        line.y2 += offset_y;
    }
    out.push(flat);
}

fn container_paints(props: &ContainerProps) -> bool {
    props.bg_type == BgMode::Solid || props.show_outline
}

/// The rect-equivalent primitive a paintable container leaves behind. Carries
/// the container's bindings – its bindable properties map one-to-one onto the
/// rect's.
fn container_backdrop(element: &Element, props: &ContainerProps, x: f64, y: f64) -> Element {
    let mut backdrop = Element::new(
        element.id.clone(),
        ElementKind::Rect(RectProps {
            bg_type: props.bg_type,
            fill_color: props.fill_color.clone(),
            show_outline: props.show_outline,
            stroke_color: props.stroke_color.clone(),
            stroke_width: props.stroke_width,
            ..RectProps::default()
        }),
    );
    backdrop.x = x;
    backdrop.y = y;
    backdrop.width = element.width;
    backdrop.height = element.height;
    backdrop.name = element.name.clone();
    backdrop.bindings = element.bindings.clone();
    backdrop
}

/// Overwrite bound properties with values from `data`. Missing variables
/// leave the property untouched.
fn apply_bindings(element: &mut Element, data: &DataMap) {
    let Element {
        id,
        bindings,
        kind,
        ..
    } = element;
    for binding in bindings.iter() {
        if let Some(value) = data.get(&binding.variable_name) {
            if !kind.apply_binding(&binding.target_property, value) {
                log::warn!(
                    "element {id:?}: binding target `{}` is not a property of `{}`",
                    binding.target_property,
                    kind.type_name()
                );
            }
        }
    }
}

/// Replace `{{ name }}` placeholders from `data`; unmatched placeholders stay
/// verbatim.
fn substitute_placeholders(text: &str, data: &DataMap) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| match data.get(&caps[1]) {
            Some(value) => display_string(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Binding, Block, LineProps, PageSize, TextProps};
    use serde_json::json;

    fn text_element(id: &str, content: &str) -> Element {
        let mut element = Element::new(
            id,
            ElementKind::Text(TextProps {
                text: content.to_string(),
                ..TextProps::default()
            }),
        );
        element.width = 50.0;
        element.height = 10.0;
        element
    }

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

    #[test]
    fn substitution_tolerates_whitespace_and_keeps_misses() {
        let mut data = DataMap::new();
        data.insert("name".to_string(), json!("Ada"));
        assert_eq!(substitute_placeholders("{{name}}", &data), "Ada");
        assert_eq!(substitute_placeholders("{{ name }}", &data), "Ada");
        assert_eq!(
            substitute_placeholders("Hi {{ missing }}!", &data),
            "Hi {{ missing }}!"
        );
    }

    #[test]
    fn flattening_accumulates_offsets() {
        let mut inner = text_element("leaf", "deep");
        inner.x = 5.0;
        inner.y = 6.0;
        let mut mid = Element::new("mid", ElementKind::Container(ContainerProps::default()));
        mid.x = 10.0;
        mid.y = 20.0;
        mid.children.push(inner);
        let mut outer = Element::new("outer", ElementKind::Container(ContainerProps::default()));
        outer.x = 100.0;
        outer.y = 50.0;
        outer.children.push(mid);

        let mut out = Vec::new();
        flatten_tree(&outer, 0.0, 0.0, &mut out);
        // Transparent containers vanish; only the leaf survives.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].x, 115.0);
        assert_eq!(out[0].y, 76.0);
        assert!(out[0].children.is_empty());
    }

    #[test]
    fn paintable_container_emits_backdrop_before_children() {
        let mut container = Element::new(
            "box",
            ElementKind::Container(ContainerProps {
                bg_type: BgMode::Solid,
                ..ContainerProps::default()
            }),
        );
        container.x = 10.0;
        container.y = 10.0;
        container.width = 80.0;
        container.height = 40.0;
        container.children.push(text_element("label", "inside"));

        let mut out = Vec::new();
        flatten_tree(&container, 0.0, 0.0, &mut out);
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0].kind, ElementKind::Rect(_)));
        assert_eq!(out[0].id, "box");
        assert_eq!(out[0].width, 80.0);
        assert_eq!(out[1].id, "label");
    }

    #[test]
    fn line_endpoints_translate_with_origin() {
        let mut line = Element::new(
            "l",
            ElementKind::Line(LineProps {
                x2: 30.0,
                y2: 5.0,
                ..LineProps::default()
            }),
        );
        line.x = 10.0;
        line.y = 5.0;
        let mut container = Element::new("c", ElementKind::Container(ContainerProps::default()));
        container.x = 100.0;
        container.y = 100.0;
        container.children.push(line);

        let mut out = Vec::new();
        flatten_tree(&container, 0.0, 0.0, &mut out);
        let ElementKind::Line(props) = &out[0].kind else {
            panic!("expected line");
        };
        assert_eq!(out[0].x, 110.0);
        assert_eq!(props.x2, 130.0);
        assert_eq!(props.y2, 105.0);
    }

    #[test]
    fn unresolved_block_aborts_compilation() {
        let template = template_with(vec![TemplateItem::Block(BlockInstance {
            id: "inst".to_string(),
            block_id: "ghost".to_string(),
            x: 0.0,
            y: 0.0,
            data: DataMap::new(),
        })]);
        let blocks = BlockCatalog::new();
        let engine = LayoutEngine::new(&blocks);
        let err = engine.compile(&template, &DataMap::new()).unwrap_err();
        assert_eq!(err.block_id, "ghost");
        assert_eq!(err.instance_id, "inst");
    }

    #[test]
    fn block_resolution_offsets_and_substitutes() {
        let mut blocks = BlockCatalog::new();
        let mut greeting = text_element("greet", "Hello {{who}}");
        greeting.x = 2.0;
        greeting.y = 3.0;
        blocks.insert(
            "header".to_string(),
            Block {
                id: "header".to_string(),
                name: "Header".to_string(),
                width: 100.0,
                height: 20.0,
                elements: vec![greeting],
            },
        );

        let mut instance_data = DataMap::new();
        instance_data.insert("who".to_string(), json!("World"));
        let template = template_with(vec![TemplateItem::Block(BlockInstance {
            id: "inst".to_string(),
            block_id: "header".to_string(),
            x: 50.0,
            y: 60.0,
            data: instance_data,
        })]);

        let engine = LayoutEngine::new(&blocks);
        let out = engine.compile(&template, &DataMap::new()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].x, 52.0);
        assert_eq!(out[0].y, 63.0);
        let ElementKind::Text(props) = &out[0].kind else {
            panic!("expected text");
        };
        assert_eq!(props.text, "Hello World");
    }

    #[test]
    fn bindings_apply_after_placeholders() {
        let mut blocks = BlockCatalog::new();
        let mut greeting = text_element("greet", "{{who}}");
        greeting.bindings.push(Binding {
            variable_name: "who".to_string(),
            target_property: "text".to_string(),
        });
        blocks.insert(
            "b".to_string(),
            Block {
                id: "b".to_string(),
                name: "B".to_string(),
                width: 100.0,
                height: 20.0,
                elements: vec![greeting],
            },
        );

        let mut instance_data = DataMap::new();
        instance_data.insert("who".to_string(), json!("placeholder value"));
        let template = template_with(vec![TemplateItem::Block(BlockInstance {
            id: "inst".to_string(),
            block_id: "b".to_string(),
            x: 0.0,
            y: 0.0,
            data: instance_data,
        })]);

        let mut data = DataMap::new();
        data.insert("who".to_string(), json!("binding value"));
        let engine = LayoutEngine::new(&blocks);
        let out = engine.compile(&template, &data).unwrap();
        let ElementKind::Text(props) = &out[0].kind else {
            panic!("expected text");
        };
        assert_eq!(props.text, "binding value");
    }

    #[test]
    fn compile_never_mutates_inputs() {
        let mut container = Element::new(
            "c",
            ElementKind::Container(ContainerProps {
                bg_type: BgMode::Solid,
                ..ContainerProps::default()
            }),
        );
        container.x = 10.0;
        container.children.push(text_element("t", "{{v}}"));
        let template = template_with(vec![TemplateItem::Element(container)]);
        let snapshot = template.clone();

        let blocks = BlockCatalog::new();
        let mut data = DataMap::new();
        data.insert("v".to_string(), json!("x"));
        let engine = LayoutEngine::new(&blocks);
        let first = engine.compile(&template, &data).unwrap();
        let second = engine.compile(&template, &data).unwrap();
        assert_eq!(template, snapshot);
        assert_eq!(first, second);
    }
}
