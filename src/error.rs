use thiserror::Error;

pub type Result<T> = std::result::Result<T, KpiError>;

#[derive(Error, Debug)]
pub enum KpiError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
}

impl KpiError {
    /// Serialization failures caused by the sink are reported as IO errors.
    pub fn from_json(err: serde_json::Error) -> Self {
        if err.is_io() {
            KpiError::Io(err.into())
        } else {
            KpiError::Serde(err)
        }
    }
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::object::find::existing::Error> for KpiError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        KpiError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for KpiError {
    fn from(err: gix::object::commit::Error) -> Self {
        KpiError::Commit(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for KpiError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        KpiError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for KpiError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        KpiError::HeadPeel(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for KpiError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        KpiError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for KpiError {
    fn from(err: gix::objs::decode::Error) -> Self {
        KpiError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::discover::Error> for KpiError {
    fn from(err: gix::discover::Error) -> Self {
        KpiError::GitDiscover(Box::new(err))
    }
}
