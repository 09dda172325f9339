use tagstore_tree::TreeError;
use tagstore_types::FieldKind;
use thiserror::Error;

/// Codec failures. Every variant is a configuration error: the record or its
/// descriptor disagrees with the supported type set, never a data problem.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The declared kind is outside the supported set.
    #[error("field `{field}`: unsupported field type `{kind}`")]
    UnsupportedFieldType { field: String, kind: String },

    /// The value stored in a field does not match its declared kind.
    #[error("field `{field}`: declared {declared}, but holds a {actual} value")]
    KindMismatch {
        field: String,
        declared: FieldKind,
        actual: &'static str,
    },

    /// A nested record names a type the registry does not know.
    #[error("no descriptor registered for record type `{0}`")]
    UnknownType(String),

    /// The descriptor lists a field without declaring its kind.
    #[error("type {type_name}: field `{field}` has no declared kind")]
    UndeclaredField { type_name: String, field: String },

    #[error("tag tree error: {0}")]
    Tree(#[from] TreeError),
}

pub type CodecResult<T> = Result<T, CodecError>;
