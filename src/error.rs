use thiserror::Error;

/// Rejections surfaced to the user inline. Returning one of these never
/// mutates application state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("hashtag cannot be empty")]
    EmptyHashtag,
    #[error("{0} is already in the hashtag list")]
    DuplicateHashtag(String),
    #[error("mention cannot be empty")]
    EmptyMention,
    #[error("mention group label cannot be empty")]
    EmptyGroupLabel,
    #[error("{0} is already in the mention list")]
    DuplicateMention(String),
    #[error("{0} is not an available hashtag or mention")]
    UnknownToken(String),
    #[error("message text cannot be empty")]
    EmptyText,
    #[error("message is {len} characters, the limit is {max}")]
    TextTooLong { len: usize, max: usize },
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("no message {id} in category {category}")]
    UnknownMessage { category: String, id: String },
}
