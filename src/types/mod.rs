//! Oracle data type encoding and decoding
//!
//! This module provides the codecs between Rust values and Oracle's internal
//! storage formats, plus the value types the rest of the crate passes around.

mod number;
mod date;
mod binary;
mod interval;
mod rowid;
mod lob;
mod numeric;

pub use number::{decode_oracle_number, encode_f64_number, encode_oracle_number, OracleNumber};
pub use date::{
    decode_oracle_date, decode_oracle_timestamp, encode_oracle_date, encode_oracle_timestamp,
    OracleDate, OracleTimestamp,
};
pub use binary::{
    decode_binary_double, decode_binary_float, encode_binary_double, encode_binary_float,
};
pub use interval::{decode_interval_ds, encode_interval_ds, IntervalParts};
pub use rowid::{parse_rowid_string, RowId, MAX_ROWID_LENGTH};
pub use lob::{LobBuffer, LobData, LobLocator, LobValue};
pub use numeric::Numeric;
pub(crate) use numeric::place_point;
