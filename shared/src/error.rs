use strum_macros::Display;
use thiserror::Error;

/// Broker mutation requested by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MutationOp {
    Create,
    Delete,
}

#[derive(Error, Debug)]
pub enum TopicError {
    #[error("invalid desired state: {0}")]
    InvalidDesiredState(String),
    #[error("{context}: {cause}")]
    Connection { context: String, cause: String },
    #[error("broker rejected request for topic {topic}: {code}")]
    BrokerRejected { topic: String, code: String },
    #[error("failed to {op} topic: {source}")]
    MutationFailure {
        op: MutationOp,
        #[source]
        source: Box<TopicError>,
    },
}

impl TopicError {
    pub fn connection(context: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        TopicError::Connection {
            context: context.into(),
            cause: cause.to_string(),
        }
    }

    pub fn mutation(op: MutationOp, cause: TopicError) -> Self {
        TopicError::MutationFailure {
            op,
            source: Box::new(cause),
        }
    }

    /// The failed operation, if this error wraps a broker mutation.
    pub fn op(&self) -> Option<MutationOp> {
        match self {
            TopicError::MutationFailure { op, .. } => Some(*op),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TopicError>;
