//! Schema migrator – upgrades persisted documents from any recognized older
//! version to [`CURRENT_VERSION`], operating on the raw JSON tree before any
//! typed deserialization.
//!
//! The interesting step is the flat-to-hierarchical upgrade: legacy documents
//! (`0.0.0`, `0.0.1`) store every element as a page-level sibling with
//! absolute coordinates. Containment is inferred from geometry with the
//! tightest-fit rule – each element is assigned to the smallest container
//! whose bounding box fully encloses it – and child coordinates are rewritten
//! relative to the chosen parent.

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::geometry::BoundingBox;
use crate::model::{Block, Template, CURRENT_VERSION, OLDEST_VERSION};

/// Upgrade a raw document to the current schema version.
///
/// Idempotent: a document already at [`CURRENT_VERSION`] is returned
/// unchanged. A missing version field is treated as the oldest recognized
/// version (pre-versioning documents never wrote one); an unrecognized
/// version is an error.
pub fn migrate(mut raw: Value) -> Result<Value, SchemaError> {
    let doc = raw.as_object_mut().ok_or(SchemaError::NotAnObject)?;

    let document_id = doc
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let version = doc
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or(OLDEST_VERSION)
        .to_string();

    match version.as_str() {
        "0.0.0" | "0.0.1" => {
            require_field(doc, &document_id, "page_size")?;
            require_field(doc, &document_id, "items")?;
            nest_flat_items(doc, &document_id)?;
            doc.insert(
                "version".to_string(),
                Value::String(CURRENT_VERSION.to_string()),
            );
        }
        CURRENT_VERSION => {}
        _ => {
            return Err(SchemaError::UnknownVersion {
                document_id,
                version,
            });
        }
    }

    Ok(raw)
}

/// Migrate a raw document, deserialize it into the typed model, and check the
/// model invariants. The only supported path from persisted bytes to a
/// [`Template`].
pub fn upgrade_template(raw: Value) -> Result<Template, SchemaError> {
    let migrated = migrate(raw)?;
    let template: Template = serde_json::from_value(migrated)?;
    template.validate()?;
    Ok(template)
}

/// Parse and migrate a template from its JSON text.
pub fn parse_template(json: &str) -> Result<Template, SchemaError> {
    let raw: Value = serde_json::from_str(json)?;
    upgrade_template(raw)
}

/// Parse a block definition. Blocks are unversioned; only the model
/// invariants are checked.
pub fn parse_block(json: &str) -> Result<Block, SchemaError> {
    let block: Block = serde_json::from_str(json)?;
    block.validate()?;
    Ok(block)
}

fn require_field(
    doc: &Map<String, Value>,
    document_id: &str,
    field: &str,
) -> Result<(), SchemaError> {
    if doc.contains_key(field) {
        Ok(())
    } else {
        Err(SchemaError::MissingField {
            document_id: document_id.to_string(),
            field: field.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Flat-to-hierarchical upgrade
// ---------------------------------------------------------------------------

/// A top-level entry of the legacy items array, in input order.
enum Entry {
    /// Index into the extracted element table.
    Element(usize),
    /// Block instances and anything unrecognized pass through untouched.
    Other(Value),
}

fn nest_flat_items(doc: &mut Map<String, Value>, document_id: &str) -> Result<(), SchemaError> {
    let items = match doc.get_mut("items") {
        Some(Value::Array(items)) => std::mem::take(items),
        _ => {
            return Err(SchemaError::MissingField {
                document_id: document_id.to_string(),
                field: "items".to_string(),
            });
        }
    };

    // Split the flat list into element records (geometry extracted) and
    // passthrough entries, preserving input order.
    let mut entries = Vec::with_capacity(items.len());
    let mut elements: Vec<Map<String, Value>> = Vec::new();
    let mut boxes: Vec<BoundingBox> = Vec::new();
    for item in items {
        match item {
            Value::Object(map) if map.get("type").is_some() => {
                boxes.push(element_bounds(&map)?);
                entries.push(Entry::Element(elements.len()));
                elements.push(map);
            }
            other => entries.push(Entry::Other(other)),
        }
    }

    let n = elements.len();
    let is_container: Vec<bool> = elements
        .iter()
        .map(|e| e.get("type").and_then(Value::as_str) == Some("container"))
        .collect();

    // Evaluate smaller elements first; an assignment is never revisited, so
    // container-in-container chains collapse bottom-up.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        boxes[a]
            .area()
            .partial_cmp(&boxes[b].area())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut parent: Vec<Option<usize>> = vec![None; n];
    for &i in &order {
        let mut best: Option<usize> = None;
        for j in 0..n {
            if j == i || !is_container[j] || !boxes[j].contains(&boxes[i]) {
                continue;
            }
            // Equal-area mutual containment must not cycle: an equal-area
            // parent is only eligible when it comes later in input order.
            let larger = boxes[j].area() > boxes[i].area()
                || (boxes[j].area() == boxes[i].area() && j > i);
            if !larger {
                continue;
            }
            // Tightest fit wins; scanning in input order makes the earliest
            // candidate win area ties.
            if best.map_or(true, |b| boxes[j].area() < boxes[b].area()) {
                best = Some(j);
            }
        }
        parent[i] = best;
    }

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 0..n {
        if let Some(p) = parent[i] {
            children_of[p].push(i);
        }
    }

    let nested = parent.iter().filter(|p| p.is_some()).count();
    if nested > 0 {
        log::debug!(
            "schema upgrade: nested {nested} of {n} elements into containers"
        );
    }

    // Rebuild the item list: assigned elements move under their parents with
    // parent-relative coordinates, everything else keeps its slot.
    let mut slots: Vec<Option<Map<String, Value>>> = elements.into_iter().map(Some).collect();
    let mut new_items = Vec::new();
    for entry in entries {
        match entry {
            Entry::Element(i) if parent[i].is_none() => {
                new_items.push(materialize(i, &mut slots, &children_of, &boxes, &parent));
            }
            Entry::Element(_) => {}
            Entry::Other(value) => new_items.push(value),
        }
    }

    doc.insert("items".to_string(), Value::Array(new_items));
    Ok(())
}

/// Move element `i` out of the slot table, attach its migrated children, and
/// rewrite child coordinates from page-absolute to parent-relative.
fn materialize(
    i: usize,
    slots: &mut Vec<Option<Map<String, Value>>>,
    children_of: &[Vec<usize>],
    boxes: &[BoundingBox],
    parent: &[Option<usize>],
) -> Value {
    let mut map = slots[i].take().expect("element consumed twice");

    if let Some(p) = parent[i] {
        set_number(&mut map, "x", boxes[i].x - boxes[p].x);
        set_number(&mut map, "y", boxes[i].y - boxes[p].y);
    }

    // Legacy records routinely omit the props object; the typed model
    // requires it.
    map.entry("props".to_string())
        .or_insert_with(|| Value::Object(Map::new()));

    if !children_of[i].is_empty() {
        let mut children = match map.remove("children") {
            Some(Value::Array(existing)) => existing,
            _ => Vec::new(),
        };
        for &c in &children_of[i] {
            children.push(materialize(c, slots, children_of, boxes, parent));
        }
        map.insert("children".to_string(), Value::Array(children));
    }

    Value::Object(map)
}

fn set_number(map: &mut Map<String, Value>, key: &str, value: f64) {
    let number = serde_json::Number::from_f64(value).unwrap_or_else(|| 0.into());
    map.insert(key.to_string(), Value::Number(number));
}

/// Read an element's bounding box, failing on non-numeric geometry. Absent
/// fields default to zero, matching the model defaults.
fn element_bounds(map: &Map<String, Value>) -> Result<BoundingBox, SchemaError> {
    let element_id = map
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let mut read = |field: &str| -> Result<f64, SchemaError> {
        match map.get(field) {
            None | Some(Value::Null) => Ok(0.0),
            Some(value) => value
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SchemaError::MalformedNumber {
                    element_id: element_id.clone(),
                    field: field.to_string(),
                }),
        }
    };
    Ok(BoundingBox::new(
        read("x")?,
        read("y")?,
        read("width")?,
        read("height")?,
    ))
}
