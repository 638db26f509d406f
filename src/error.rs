use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("date `{0}` is not part of any dated tree")]
    UnknownDate(String),
    #[error("no node with id `{0}` in the current tree")]
    UnknownNode(String),
    #[error("invalid group tree input: {0}")]
    Json(#[from] serde_json::Error),
}
