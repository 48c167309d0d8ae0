use crate::model::Side;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{field} of {owner} must not be negative (got {value})")]
    NegativeValue {
        field: &'static str,
        owner: String,
        value: f64,
    },
    #[error("{field} of {owner} must be finite (got {value})")]
    NonFiniteValue {
        field: &'static str,
        owner: String,
        value: f64,
    },
    #[error("duplicate node id on the {side} side: {id}")]
    DuplicateNode { side: Side, id: String },
    #[error("invalid layout config: {message}")]
    InvalidConfig { message: String },
    #[error("invalid clock time {hour:02}:{minute:02}")]
    InvalidClockTime { hour: u32, minute: u32 },
    #[error("{owner} is not a representable timestamp: {seconds}")]
    InvalidTimestamp { owner: String, seconds: i64 },
    #[error("flow records were given without a time window")]
    MissingWindow,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rejects negative and non-finite quantities at the engine boundary.
pub(crate) fn check_quantity(
    field: &'static str,
    owner: impl FnOnce() -> String,
    value: f64,
) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::NonFiniteValue {
            field,
            owner: owner(),
            value,
        });
    }
    if value < 0.0 {
        return Err(Error::NegativeValue {
            field,
            owner: owner(),
            value,
        });
    }
    Ok(())
}
