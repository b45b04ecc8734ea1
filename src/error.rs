//! Error taxonomy.
//!
//! Structural failures (`SchemaError`, `UnresolvedBlockError`) abort the
//! operation that raised them. Content-level problems – missing images,
//! unparseable colors, absent binding variables – are never errors: they are
//! recovered locally with a visible fallback so a best-effort document is
//! always produced.

use thiserror::Error;

/// A persisted document could not be migrated to the current schema version.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document declares a version this build does not recognize.
    #[error("document {document_id:?}: unrecognized template version {version:?}")]
    UnknownVersion {
        document_id: String,
        version: String,
    },

    /// The persisted document is not a JSON object.
    #[error("document root must be a JSON object")]
    NotAnObject,

    /// A field required by the declared version is absent.
    #[error("document {document_id:?}: missing required field `{field}`")]
    MissingField {
        document_id: String,
        field: String,
    },

    /// A geometry field holds something that is not a finite number.
    #[error("element {element_id:?}: malformed numeric value for `{field}`")]
    MalformedNumber {
        element_id: String,
        field: String,
    },

    /// An element of a childless type carries children.
    #[error("element {element_id:?} of type `{kind}` cannot own children")]
    IllegalChildren { element_id: String, kind: String },

    /// A binding names a property its element type does not recognize.
    #[error("element {element_id:?}: binding target `{target}` is not a property of `{kind}`")]
    UnknownBindingTarget {
        element_id: String,
        kind: String,
        target: String,
    },

    /// The page size is not strictly positive.
    #[error("document {document_id:?}: page size must be positive")]
    InvalidPageSize { document_id: String },

    /// The migrated document does not deserialize into the typed model.
    #[error("document does not match the template schema: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// A [`BlockInstance`](crate::model::BlockInstance) references a block that is
/// absent from the catalog. Fatal: the whole compilation is aborted.
#[derive(Debug, Error)]
#[error("block instance {instance_id:?} references unknown block {block_id:?}")]
pub struct UnresolvedBlockError {
    pub instance_id: String,
    pub block_id: String,
}

/// Reported by a backend when an image asset cannot be opened. The dispatcher
/// recovers by painting a fallback rectangle; this type never crosses the
/// public API as a failure.
#[derive(Debug, Error)]
#[error("image {path:?}: {reason}")]
pub struct ImageError {
    pub path: String,
    pub reason: String,
}
