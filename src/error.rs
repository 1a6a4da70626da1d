use thiserror::Error;
use xmlshape_template::TemplateError;

/// The only way a transform can fail. Document problems degrade to `{}`
/// instead, and path problems to a neutral value for the affected field.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Invalid template: {0}")]
    Template(#[from] TemplateError),
}

/// Writer plumbing failures. A malformed document is not one of them.
#[derive(Error, Debug)]
pub enum PrettyPrintError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialized XML is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
