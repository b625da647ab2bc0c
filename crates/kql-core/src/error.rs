use crate::table::TableDefect;

/// Error while reading a grammar definition or a grammar table.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary decode error: {0}")]
    Binary(postcard::Error),

    /// Rule type the table builder cannot express (e.g. `ALIAS`).
    #[error("unsupported rule type `{kind}` in rule `{rule}`")]
    Unsupported { rule: String, kind: &'static str },

    /// Serialized table failed structural validation.
    #[error("malformed grammar table: {0}")]
    MalformedTable(#[from] TableDefect),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
