use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Purging itself never fails: symbols that cannot be handled are reported through
/// [`crate::metadata::diagnostics::Diagnostics`] instead. Errors only surface from the
/// configuration layer and from the weaving pipeline when a registered weaver fails.
///
/// # Error Categories
///
/// ## Configuration Errors
/// - [`Error::Malformed`] - The weaver configuration element is structurally broken
/// - [`Error::Configuration`] - A configuration value is unknown or invalid
/// - [`Error::Xml`] - The configuration could not be read as XML
///
/// ## Pipeline Errors
/// - [`Error::Weaver`] - A weaver aborted the pipeline
///
/// # Examples
///
/// ```rust
/// use cilpurge::{purge::PurgeConfig, Error};
///
/// match PurgeConfig::from_xml(r#"<CilPurge Unknown="1" />"#) {
///     Ok(_) => unreachable!(),
///     Err(Error::Configuration(message)) => println!("bad config: {}", message),
///     Err(e) => println!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration input is damaged and could not be interpreted.
    ///
    /// The error includes the source location where the malformation was detected
    /// for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A configuration value is unknown or has an invalid format.
    #[error("Invalid configuration - {0}")]
    Configuration(String),

    /// Error from the quick-xml crate while reading a weaver configuration element.
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    /// A weaver failed while processing a module.
    ///
    /// Raised by [`crate::weaver::WeavingPipeline`], which stops at the first failing weaver.
    #[error("Weaver '{name}' failed: {message}")]
    Weaver {
        /// Display name of the failing weaver
        name: String,
        /// Description of the failure
        message: String,
    },
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(quick_xml::Error::InvalidAttr(error))
    }
}
