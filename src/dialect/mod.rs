//! The Oracle dialect
//!
//! [`OracleDialect`] ties together the pieces that map abstract
//! [`SqlType`]s onto Oracle:
//!
//! - [`compiler`] renders types and tables as DDL
//! - [`impls`] adapts types to [`DialectImpl`]s with bind and result processing
//! - [`handlers`] chooses how each result column is fetched from the driver
//! - [`input_sizes`] computes bind type hints for the driver
//! - [`reflection`] maps data dictionary rows back to types

pub mod compiler;
pub mod handlers;
pub mod impls;
pub mod input_sizes;
pub mod reflection;

pub use compiler::TypeCompiler;
pub use handlers::{OutConverter, OutputVar};
pub use impls::{DialectImpl, NumericImpl};
pub use input_sizes::{InputSizes, InputSizesHook};

use tracing::debug;

use crate::config::{EncodingErrors, EngineOptions};
use crate::driver::{Driver, FetchAs, Params, ServerVersion};
use crate::error::Result;
use crate::row::Value;
use crate::schema::Table;
use crate::sqltypes::SqlType;

/// Name under which per-dialect type variants are registered
pub const DIALECT_NAME: &str = "oracle";

/// Oracle's conventional case for unquoted identifiers
fn is_case_insensitive(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '#')
}

/// Type mapping and coercion rules for Oracle
#[derive(Debug, Clone)]
pub struct OracleDialect {
    options: EngineOptions,
    server_version: Option<ServerVersion>,
    decimal_char: char,
}

impl OracleDialect {
    /// Create a dialect that has not yet seen a server
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            server_version: None,
            decimal_char: '.',
        }
    }

    /// Assume a given server version, as if detected on connect
    pub fn with_server_version(mut self, version: ServerVersion) -> Self {
        self.server_version = Some(version);
        self
    }

    /// The dialect name used by [`SqlType::with_variant`]
    pub fn name(&self) -> &'static str {
        DIALECT_NAME
    }

    /// Options this dialect was created with
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Server version detected on first connect
    pub fn server_version(&self) -> Option<ServerVersion> {
        self.server_version
    }

    /// Decimal character used by the session's number-to-text conversion
    pub fn decimal_char(&self) -> char {
        self.decimal_char
    }

    /// Whether the national character set is preferred for Unicode types
    pub fn use_nchar_for_unicode(&self) -> bool {
        self.options.use_nchar_for_unicode
    }

    /// Whether string lengths may carry the `CHAR` qualifier.
    /// Oracle 8 has no character-length semantics.
    pub fn supports_char_length(&self) -> bool {
        self.server_version.map_or(true, |v| v.major >= 9)
    }

    /// Detect server version and decimal character from a fresh connection
    pub async fn initialize(&mut self, driver: &mut dyn Driver) -> Result<()> {
        self.server_version = Some(driver.server_version());

        driver.execute("SELECT 1.1 FROM DUAL", &Params::new()).await?;
        driver.define(vec![FetchAs::Text(EncodingErrors::Strict)])?;
        let rows = driver.fetch(1).await?;
        driver.close_cursor();

        let text = rows
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_str)
            .unwrap_or("1.1");
        self.decimal_char = text.trim_start_matches('0').chars().nth(1).unwrap_or('.');

        debug!(
            server_version = ?self.server_version,
            decimal_char = %self.decimal_char,
            "initialized oracle dialect"
        );
        Ok(())
    }

    /// Resolve variants and decorators to the concrete type used on Oracle
    pub fn resolve_type(&self, ty: &SqlType) -> SqlType {
        match ty {
            SqlType::Variant { default, variants } => {
                let chosen = variants
                    .iter()
                    .find(|(name, _)| name == DIALECT_NAME)
                    .map(|(_, ty)| ty)
                    .unwrap_or(default);
                self.resolve_type(chosen)
            }
            SqlType::Decorated(decorator) => self.resolve_type(&decorator.0.load_dialect_impl(self)),
            other => other.clone(),
        }
    }

    /// Adapt an abstract type to its Oracle implementation
    pub fn dialect_impl(&self, ty: &SqlType) -> DialectImpl {
        DialectImpl::adapt(&self.resolve_type(ty), self.use_nchar_for_unicode())
    }

    /// Render a type as Oracle DDL
    pub fn compile_type(&self, ty: &SqlType) -> Result<String> {
        TypeCompiler::new(self).process(ty)
    }

    /// `CREATE TABLE` statement for a table
    pub fn create_table_ddl(&self, table: &Table) -> Result<String> {
        TypeCompiler::new(self).create_table(table)
    }

    /// `DROP TABLE` statement for a table
    pub fn drop_table_ddl(&self, table: &Table) -> String {
        format!("DROP TABLE {}", table.name())
    }

    /// Convert a name reported by Oracle to the application's convention:
    /// case-insensitive uppercase names become lowercase
    pub fn normalize_name(&self, name: &str) -> String {
        if is_case_insensitive(name) && name == name.to_uppercase() {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Inverse of [`normalize_name`](Self::normalize_name)
    pub fn denormalize_name(&self, name: &str) -> String {
        if is_case_insensitive(name) && name == name.to_lowercase() {
            name.to_uppercase()
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqltypes::TypeDecorator;

    #[derive(Debug)]
    struct NullUnlessOracle(SqlType);

    impl TypeDecorator for NullUnlessOracle {
        fn impl_type(&self) -> SqlType {
            SqlType::Null
        }

        fn load_dialect_impl(&self, dialect: &OracleDialect) -> SqlType {
            if dialect.name() == "oracle" {
                self.0.clone()
            } else {
                self.impl_type()
            }
        }
    }

    #[test]
    fn test_resolve_variant_and_decorator() {
        let dialect = OracleDialect::new(EngineOptions::default());
        let variant = SqlType::Null.with_variant(SqlType::binary_float(), "oracle");
        assert_eq!(dialect.resolve_type(&variant), SqlType::binary_float());

        let other = SqlType::Integer.with_variant(SqlType::Text, "postgresql");
        assert_eq!(dialect.resolve_type(&other), SqlType::Integer);

        let decorated = SqlType::decorated(NullUnlessOracle(SqlType::char(30)));
        assert_eq!(dialect.resolve_type(&decorated), SqlType::char(30));
    }

    #[test]
    fn test_name_normalization() {
        let dialect = OracleDialect::new(EngineOptions::default());
        assert_eq!(dialect.normalize_name("ADD_USER"), "add_user");
        assert_eq!(dialect.normalize_name("MixedCase"), "MixedCase");
        assert_eq!(dialect.denormalize_name("z_test"), "Z_TEST");
        assert_eq!(dialect.denormalize_name("Quoted"), "Quoted");
    }

    #[test]
    fn test_char_length_support() {
        let dialect = OracleDialect::new(EngineOptions::default());
        assert!(dialect.supports_char_length());
        let old = dialect.clone().with_server_version(ServerVersion::new(8, 0));
        assert!(!old.supports_char_length());
    }
}
