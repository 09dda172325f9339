use thiserror::Error;

/// Errors produced when validating type descriptors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("type {type_name}: field `{field}` has no declared kind")]
    UndeclaredField { type_name: String, field: String },

    #[error("type {type_name}: field `{field}` declares unsupported kind `{kind}`")]
    UnsupportedKind {
        type_name: String,
        field: String,
        kind: String,
    },

    #[error("type {type_name}: key field `{field}` has kind `{kind}`, which cannot form a key")]
    InvalidKeyKind {
        type_name: String,
        field: String,
        kind: String,
    },
}
