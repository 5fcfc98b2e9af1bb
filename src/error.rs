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

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Lookups that simply find nothing are *not* errors: every lookup API returns
/// `Ok(None)` for a miss. The variants below describe broken catalog files, host
/// resolution failures, and misuse of the writer.
///
/// # Error Categories
///
/// ## Catalog File Errors
/// - [`Error::Malformed`] - Corrupted or inconsistent catalog structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the catalog boundaries
/// - [`Error::NotSupported`] - Unknown catalog format version
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::MissingDataSection`] - Variable-size table without a data section
/// - [`Error::StrategyMismatch`] - Catalog opened with the wrong payload strategy
///
/// ## Writer Errors
/// - [`Error::ReservedHash`] - A key hashes to the reserved empty-slot value
/// - [`Error::InvalidConfig`] - A configuration value is out of range
/// - [`Error::WriteMmapFailed`] / [`Error::WriteFinalizationFailed`] - Output file failures
///
/// ## Resolution Errors
/// - [`Error::Resolution`] - A host metadata source failed
/// - [`Error::Cancelled`] - An asynchronous resolution was cancelled
///
/// # Examples
///
/// ```rust,no_run
/// use pcmeta::{Error, catalog::ObjectCatalog};
///
/// match ObjectCatalog::load_from_file("objects.pcix") {
///     Ok(catalog) => println!("{} objects", catalog.len()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Broken catalog: {} ({}:{})", message, file, line);
///     }
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {}", io_err),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The catalog is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected
    /// for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the catalog.
    #[error("Out of Bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// This catalog format version is not supported.
    #[error("Catalog format version {0} is not supported")]
    NotSupported(u16),

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// A variable-size table was looked up, but the file carried no data section.
    ///
    /// The header promised variable-size payloads yet no trailing bytes followed the
    /// entry array. This indicates a truncated or broken installation and is never
    /// retried.
    #[error("Variable-size table has no data section")]
    MissingDataSection,

    /// The catalog was opened with a strategy whose storage kind disagrees with the header.
    #[error("Catalog stores {found} entries, but the strategy expects {expected} entries")]
    StrategyMismatch {
        /// Storage kind the strategy expects
        expected: &'static str,
        /// Storage kind recorded in the catalog header
        found: &'static str,
    },

    /// A key hashes to `0`, which is reserved as the empty-slot sentinel.
    #[error("Key '{0}' hashes to the reserved empty-slot value 0")]
    ReservedHash(String),

    /// A configuration value is outside of its accepted range.
    #[error("Invalid configuration - {0}")]
    InvalidConfig(String),

    /// A host metadata source failed to resolve a name.
    ///
    /// Raised by [`crate::resolver::MetadataSource`] implementations; the resolver
    /// propagates it unchanged and caches nothing.
    #[error("Resolution failed - {0}")]
    Resolution(String),

    /// An asynchronous resolution was cancelled before it completed.
    #[error("Resolution was cancelled")]
    Cancelled,

    /// Creating or mapping an output file failed.
    #[error("Failed to map output file - {message}")]
    WriteMmapFailed {
        /// Description of the failure
        message: String,
    },

    /// Flushing a finished output file failed.
    #[error("Failed to finalize output file - {message}")]
    WriteFinalizationFailed {
        /// Description of the failure
        message: String,
    },
}
