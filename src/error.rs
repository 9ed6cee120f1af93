use thiserror::Error;

/// Returned by [`OptionalValue::into_present`](crate::OptionalValue::into_present)
/// when the value was asked for but none is held.
///
/// Absence itself is an ordinary state; this only exists for callers that
/// have decided a missing value is a failure in their context.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
#[error("expected a present value, found absent")]
pub struct AbsentValue;
