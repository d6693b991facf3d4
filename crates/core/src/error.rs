use thiserror::Error;

/// Errors raised by the fallible core operations (form marshalling, CDA conversion)
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    #[error("Bundle has no Patient entry")]
    MissingPatient,

    #[error("Expected a JSON object for the bundle")]
    ExpectedObject,

    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl CoreError {
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
