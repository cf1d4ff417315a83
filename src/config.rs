//! Engine configuration and option-string parsing
//!
//! Options can be built in code or parsed from a query-string style list:
//! `coerce_to_decimal=false&arraysize=1`.

use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_ARRAYSIZE;
use crate::error::{Error, Result};

/// How undecodable bytes in character data are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingErrors {
    /// Fail the fetch with a decode error
    #[default]
    Strict,
    /// Substitute U+FFFD for invalid sequences
    Replace,
}

impl EncodingErrors {
    /// Decode bytes according to this policy
    pub fn decode(&self, data: &[u8]) -> Result<String> {
        match self {
            EncodingErrors::Strict => String::from_utf8(data.to_vec())
                .map_err(|e| Error::Decode(format!("{}", e.utf8_error()))),
            EncodingErrors::Replace => Ok(String::from_utf8_lossy(data).into_owned()),
        }
    }
}

impl FromStr for EncodingErrors {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(EncodingErrors::Strict),
            "replace" => Ok(EncodingErrors::Replace),
            other => Err(Error::InvalidOption(format!(
                "unknown encoding error policy: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for EncodingErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingErrors::Strict => f.write_str("strict"),
            EncodingErrors::Replace => f.write_str("replace"),
        }
    }
}

/// Session-wide options consumed by the engine and dialect.
///
/// # Examples
///
/// ```rust
/// use oracle_dialect::EngineOptions;
///
/// let options = EngineOptions::default()
///     .coerce_to_decimal(false)
///     .arraysize(1);
/// assert!(!options.coerce_to_decimal);
/// ```
///
/// ## From an option string
///
/// ```rust
/// use oracle_dialect::{EncodingErrors, EngineOptions};
///
/// let options: EngineOptions = "auto_convert_lobs=false&encoding_errors=replace"
///     .parse()
///     .unwrap();
/// assert!(!options.auto_convert_lobs);
/// assert_eq!(options.encoding_errors, EncodingErrors::Replace);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Coerce NUMBER results of raw SQL to decimals when the scale says so
    pub coerce_to_decimal: bool,
    /// Decode character results to text rather than returning bytes
    pub coerce_to_unicode: bool,
    /// Route `Unicode`/`UnicodeText` through NVARCHAR2/NCLOB
    pub use_nchar_for_unicode: bool,
    /// Materialize LOB columns during fetch
    pub auto_convert_lobs: bool,
    /// Rows fetched from the driver per round trip
    pub arraysize: usize,
    /// Policy for undecodable character data
    pub encoding_errors: EncodingErrors,
    /// Statements run on every new connection, in order
    pub session_statements: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            coerce_to_decimal: true,
            coerce_to_unicode: true,
            use_nchar_for_unicode: false,
            auto_convert_lobs: true,
            arraysize: DEFAULT_ARRAYSIZE,
            encoding_errors: EncodingErrors::Strict,
            session_statements: Vec::new(),
        }
    }
}

impl EngineOptions {
    /// Set decimal coercion for raw SQL
    pub fn coerce_to_decimal(mut self, enabled: bool) -> Self {
        self.coerce_to_decimal = enabled;
        self
    }

    /// Set text decoding of character results
    pub fn coerce_to_unicode(mut self, enabled: bool) -> Self {
        self.coerce_to_unicode = enabled;
        self
    }

    /// Set the national character preference
    pub fn use_nchar_for_unicode(mut self, enabled: bool) -> Self {
        self.use_nchar_for_unicode = enabled;
        self
    }

    /// Set LOB materialization
    pub fn auto_convert_lobs(mut self, enabled: bool) -> Self {
        self.auto_convert_lobs = enabled;
        self
    }

    /// Set the fetch batch size
    pub fn arraysize(mut self, size: usize) -> Self {
        self.arraysize = size;
        self
    }

    /// Set the encoding error policy
    pub fn encoding_errors(mut self, policy: EncodingErrors) -> Self {
        self.encoding_errors = policy;
        self
    }

    /// Add a statement to run on every new connection
    pub fn session_statement(mut self, sql: impl Into<String>) -> Self {
        self.session_statements.push(sql.into());
        self
    }

    /// Check the options for values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.arraysize == 0 {
            return Err(Error::InvalidOption("arraysize must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidOption(format!(
            "{} expects a boolean, got {:?}",
            key, value
        ))),
    }
}

impl FromStr for EngineOptions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut options = EngineOptions::default();

        for pair in s.trim().trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                Error::InvalidOption(format!("expected key=value, got {:?}", pair))
            })?;
            let key = key.trim();
            let value = value.trim();

            match key {
                "coerce_to_decimal" => options.coerce_to_decimal = parse_bool(key, value)?,
                "coerce_to_unicode" => options.coerce_to_unicode = parse_bool(key, value)?,
                "use_nchar_for_unicode" => {
                    options.use_nchar_for_unicode = parse_bool(key, value)?
                }
                "auto_convert_lobs" => options.auto_convert_lobs = parse_bool(key, value)?,
                "arraysize" => {
                    options.arraysize = value.parse().map_err(|_| {
                        Error::InvalidOption(format!("invalid arraysize: {}", value))
                    })?
                }
                "encoding_errors" => options.encoding_errors = value.parse()?,
                _ => return Err(Error::InvalidOption(format!("unknown option: {}", key))),
            }
        }

        options.validate()?;
        Ok(options)
    }
}

impl fmt::Display for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "coerce_to_decimal={}&coerce_to_unicode={}&use_nchar_for_unicode={}\
             &auto_convert_lobs={}&arraysize={}&encoding_errors={}",
            self.coerce_to_decimal,
            self.coerce_to_unicode,
            self.use_nchar_for_unicode,
            self.auto_convert_lobs,
            self.arraysize,
            self.encoding_errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::default();
        assert!(options.coerce_to_decimal);
        assert!(options.coerce_to_unicode);
        assert!(!options.use_nchar_for_unicode);
        assert!(options.auto_convert_lobs);
        assert_eq!(options.arraysize, 100);
        assert_eq!(options.encoding_errors, EncodingErrors::Strict);
    }

    #[test]
    fn test_parse_option_string() {
        let options: EngineOptions = "coerce_to_decimal=false&arraysize=1".parse().unwrap();
        assert!(!options.coerce_to_decimal);
        assert_eq!(options.arraysize, 1);
        assert!(options.auto_convert_lobs);
    }

    #[test]
    fn test_display_roundtrip() {
        let options = EngineOptions::default()
            .use_nchar_for_unicode(true)
            .encoding_errors(EncodingErrors::Replace);
        let parsed: EngineOptions = options.to_string().parse().unwrap();
        assert_eq!(parsed, options);
    }

    #[test]
    fn test_invalid_options() {
        assert!("arraysize=0".parse::<EngineOptions>().is_err());
        assert!("arraysize=lots".parse::<EngineOptions>().is_err());
        assert!("coerce_to_decimal=maybe".parse::<EngineOptions>().is_err());
        assert!("bogus=1".parse::<EngineOptions>().is_err());
        assert!("novalue".parse::<EngineOptions>().is_err());
    }

    #[test]
    fn test_encoding_policy() {
        let bad = [b'H', 0xff, b'i'];
        assert!(EncodingErrors::Strict.decode(&bad).is_err());
        assert_eq!(EncodingErrors::Replace.decode(&bad).unwrap(), "H\u{fffd}i");
        assert_eq!(EncodingErrors::Strict.decode(b"Hello").unwrap(), "Hello");
    }
}
