//! Sample template documents for testing and demonstration.
//!
//! Each sample is the persisted JSON form, exactly as the visual editor would
//! write it, so they double as format documentation.

/// Invoice-style template: header block instance, address text, item table,
/// and a key/value total box.
pub fn invoice_template() -> &'static str {
    r##"{
  "id": "tpl-invoice",
  "name": "Invoice",
  "version": "0.0.2",
  "page_size": { "width": 210.0, "height": 297.0 },
  "items": [
    {
      "id": "header-instance",
      "block_id": "letterhead",
      "x": 10.0,
      "y": 10.0,
      "data": { "company": "Acme Corp" }
    },
    {
      "id": "recipient",
      "type": "text",
      "x": 10.0,
      "y": 45.0,
      "width": 90.0,
      "height": 20.0,
      "props": { "text": "Client Inc\n456 Client Ave", "font_size": 11.0 },
      "bindings": [
        { "variable_name": "recipient", "target_property": "text" }
      ]
    },
    {
      "id": "items-table",
      "type": "table",
      "x": 10.0,
      "y": 80.0,
      "width": 190.0,
      "height": 30.0,
      "props": {
        "data": [
          ["Item", "Qty", "Price"],
          ["Web Development", "40", "$6,000.00"],
          ["Design Services", "20", "$2,500.00"]
        ],
        "col_widths": [100.0],
        "num_rows_editor": 3
      },
      "bindings": [
        { "variable_name": "line_items", "target_property": "data" }
      ]
    },
    {
      "id": "total-box",
      "type": "kv_box",
      "x": 120.0,
      "y": 120.0,
      "width": 80.0,
      "height": 10.0,
      "props": { "key_text": "Total:", "text": "$9,000.00", "split_type": "ratio" },
      "bindings": [
        { "variable_name": "total", "target_property": "text" }
      ]
    }
  ]
}"##
}

/// Block catalog for [`invoice_template`]: a letterhead with a logo image,
/// a placeholder-driven title, and a rule line.
pub fn invoice_blocks() -> &'static str {
    r##"[
  {
    "id": "letterhead",
    "name": "Letterhead",
    "width": 190.0,
    "height": 30.0,
    "elements": [
      {
        "id": "logo",
        "type": "image",
        "x": 0.0,
        "y": 0.0,
        "width": 25.0,
        "height": 25.0,
        "props": { "image_path": "assets/logo.png" }
      },
      {
        "id": "company-name",
        "type": "text",
        "x": 30.0,
        "y": 5.0,
        "width": 120.0,
        "height": 10.0,
        "props": { "text": "{{ company }}", "font_size": 18.0, "font_bold": true }
      },
      {
        "id": "rule",
        "type": "line",
        "x": 0.0,
        "y": 28.0,
        "width": 0.0,
        "height": 0.0,
        "props": { "x2": 190.0, "y2": 28.0, "stroke_width": 0.8 }
      }
    ]
  }
]"##
}

/// 80 mm receipt template; the page height is derived from content at
/// render time.
pub fn receipt_template() -> &'static str {
    r##"{
  "id": "tpl-receipt",
  "name": "Receipt",
  "version": "0.0.2",
  "page_size": { "width": 80.0, "height": 200.0 },
  "items": [
    {
      "id": "shop",
      "type": "text",
      "x": 5.0,
      "y": 5.0,
      "width": 70.0,
      "height": 8.0,
      "props": { "text": "CORNER BAKERY", "text_align": "center", "font_bold": true }
    },
    {
      "id": "purchases",
      "type": "table",
      "x": 5.0,
      "y": 18.0,
      "width": 70.0,
      "height": 24.0,
      "props": {
        "data": [["Item", "Price"], ["Sourdough", "4.50"], ["Espresso", "2.80"]],
        "show_header": false,
        "num_rows_editor": 3
      }
    },
    {
      "id": "footer",
      "type": "text",
      "x": 5.0,
      "y": 46.0,
      "width": 70.0,
      "height": 6.0,
      "props": { "text": "Thank you!", "text_align": "center", "font_size": 9.0 }
    }
  ]
}"##
}

/// A pre-versioning flat document: the container and its visual contents are
/// all page-level siblings with absolute coordinates.
pub fn legacy_flat_template() -> &'static str {
    r##"{
  "id": "tpl-legacy",
  "name": "Old badge",
  "page_size": { "width": 210.0, "height": 297.0 },
  "items": [
    {
      "id": "panel",
      "type": "container",
      "x": 20.0,
      "y": 20.0,
      "width": 100.0,
      "height": 60.0,
      "props": { "bg_type": "solid", "fill_color": "#eeeeee" }
    },
    {
      "id": "badge-name",
      "type": "text",
      "x": 30.0,
      "y": 30.0,
      "width": 60.0,
      "height": 10.0,
      "props": { "text": "Visitor" }
    },
    {
      "id": "floating",
      "type": "rect",
      "x": 150.0,
      "y": 150.0,
      "width": 30.0,
      "height": 30.0,
      "props": { "show_outline": true }
    }
  ]
}"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::parse_template;

    #[test]
    fn samples_parse_and_validate() {
        for (name, json) in [
            ("invoice", invoice_template()),
            ("receipt", receipt_template()),
            ("legacy", legacy_flat_template()),
        ] {
            parse_template(json).unwrap_or_else(|e| panic!("sample '{name}' invalid: {e}"));
        }
    }

    #[test]
    fn block_catalog_parses() {
        let blocks: Vec<crate::model::Block> =
            serde_json::from_str(invoice_blocks()).expect("block catalog JSON");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].elements.len(), 3);
    }
}
