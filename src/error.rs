use failure::Fail;

/// Error type for apl
#[derive(Fail, Debug)]
pub enum AplError {
    /// A value outside of its fixed set of legal values was assigned
    #[fail(display = "{} must be one of {:?}, got '{}'", field, allowed, value)]
    InvalidValue {
        /// What was being set (e.g. "Effect")
        field: &'static str,
        /// The rejected value
        value: String,
        /// The legal values
        allowed: Vec<String>,
    },

    /// A document key lookup found nothing
    #[fail(display = "no document key matches '{}'", _0)]
    KeyNotFound(String),

    /// Every numeric statement id has already been handed out
    #[fail(display = "no statement id left to assign after {}", _0)]
    SidExhausted(u64),

    /// Serialization or deserialization error
    #[fail(display = "serde_json error: {}", _0)]
    Serde(#[cause] serde_json::Error),
}

impl AplError {
    pub(crate) fn invalid_value<V>(field: &'static str, value: V, allowed: &[&str]) -> AplError
    where
        V: Into<String>,
    {
        AplError::InvalidValue {
            field,
            value: value.into(),
            allowed: allowed.iter().map(|x| (*x).to_owned()).collect(),
        }
    }
}

impl From<serde_json::Error> for AplError {
    fn from(err: serde_json::Error) -> AplError {
        AplError::Serde(err)
    }
}

/// Result type for apl
pub type Result<T> = std::result::Result<T, AplError>;
