//! Input-size hints
//!
//! Before a compiled statement executes, each bind's implementation names
//! a driver type. Only types in [`INCLUDE_TYPES`] are passed on; the rest
//! are left for the driver to infer from the value. Registered hooks can
//! inspect and rewrite the map before the driver sees it.

use indexmap::IndexMap;

use crate::dialect::OracleDialect;
use crate::driver::{DbApiType, Params};
use crate::schema::BindParam;

/// Bind name to hinted driver type; `None` entries are not sent
pub type InputSizes = IndexMap<String, Option<DbApiType>>;

/// Driver types the dialect hints explicitly
pub const INCLUDE_TYPES: &[DbApiType] = &[
    DbApiType::DateTime,
    DbApiType::NClob,
    DbApiType::Clob,
    DbApiType::Lob,
    DbApiType::NChar,
    DbApiType::FixedNChar,
    DbApiType::Blob,
    DbApiType::FixedChar,
    DbApiType::Timestamp,
    DbApiType::Int,
    DbApiType::NativeFloat,
];

/// Observer of input sizes, called before they reach the driver
///
/// Closures with the matching signature implement this trait.
///
/// # Example
///
/// ```rust
/// use oracle_dialect::{DbApiType, InputSizes, Params};
///
/// let hook = |sizes: &mut InputSizes, _sql: &str, _params: &Params| {
///     sizes.retain(|_, ty| *ty != Some(DbApiType::NativeFloat));
/// };
/// # let _ = hook;
/// ```
pub trait InputSizesHook: Send + Sync {
    /// Inspect or modify the hints for one execution
    fn on_input_sizes(&self, sizes: &mut InputSizes, sql: &str, params: &Params);
}

impl<F> InputSizesHook for F
where
    F: Fn(&mut InputSizes, &str, &Params) + Send + Sync,
{
    fn on_input_sizes(&self, sizes: &mut InputSizes, sql: &str, params: &Params) {
        self(sizes, sql, params)
    }
}

/// Hints for the binds of a compiled statement
pub fn compute(dialect: &OracleDialect, binds: &[BindParam]) -> InputSizes {
    binds
        .iter()
        .map(|bind| {
            let hint = dialect
                .dialect_impl(&bind.sql_type)
                .dbapi_type()
                .filter(|ty| INCLUDE_TYPES.contains(ty));
            (bind.key.clone(), hint)
        })
        .collect()
}

/// The entries actually sent to the driver
pub fn to_driver(sizes: &InputSizes) -> IndexMap<String, DbApiType> {
    sizes
        .iter()
        .filter_map(|(key, ty)| ty.map(|ty| (key.clone(), ty)))
        .collect()
}
