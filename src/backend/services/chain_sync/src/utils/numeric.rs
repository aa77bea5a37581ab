use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::utils::errors::{Result, SyncError};

/// Parse an API decimal string such as `"1000.000000000000000000"`.
///
/// An empty string yields `default`; anything else must parse.
pub fn parse_decimal(
    entity: &'static str,
    field: &str,
    raw: &str,
    default: BigDecimal,
) -> Result<BigDecimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }

    BigDecimal::from_str(raw)
        .map_err(|e| SyncError::malformed(entity, format!("{field} = {raw:?}: {e}")))
}

/// Parse an API integer string; fractional values are rejected.
pub fn parse_integer(
    entity: &'static str,
    field: &str,
    raw: &str,
    default: BigDecimal,
) -> Result<BigDecimal> {
    let value = parse_decimal(entity, field, raw, default)?;
    if !value.is_integer() {
        return Err(SyncError::malformed(
            entity,
            format!("{field} = {raw:?} is not an integer"),
        ));
    }

    Ok(value)
}
