//! # The optional container
//!
//! [`OptionalValue`] is either [`Absent`](OptionalValue::Absent) or
//! [`Present`](OptionalValue::Present). Every operation consumes the receiver
//! and builds a new value; nothing mutates in place.

use optional_value_derive::derive_functor;

use crate::error::AbsentValue;

/// A value that is either absent or holds exactly one `T`.
///
/// ## Ordering
///
/// `Absent` orders strictly before every `Present(_)`, whatever the payload.
/// Two `Present` values order by their payloads and two `Absent` values are
/// equal. This is a stated rule of the type: the derived comparison follows
/// variant declaration order, so `Absent` must stay the first variant.
///
/// Comparisons are only defined between two `OptionalValue<T>` of the same
/// `T`. There is no comparison against a bare `T` and no implicit wrapping
/// of one.
#[derive_functor(impl_try_map = true)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionalValue<T> {
    // declaration order is the ordering rule, keep Absent first.
    Absent,
    Present(T),
}

impl<T> OptionalValue<T> {
    /// The empty value.
    pub const fn absent() -> Self {
        OptionalValue::Absent
    }

    /// Wrap `value`.
    pub const fn present(value: T) -> Self {
        OptionalValue::Present(value)
    }

    /// Wrap `value`. Same as [`present`](Self::present), named for generic
    /// code that lifts values into a context.
    pub fn lift(value: T) -> Self {
        OptionalValue::Present(value)
    }

    /// Feed the held value to `f` and return its result as is.
    ///
    /// `f` is never called on an absent value, so a chain of `bind`s stops
    /// touching functions at the first absence.
    pub fn bind<U>(self, f: impl FnOnce(T) -> OptionalValue<U>) -> OptionalValue<U> {
        match self {
            OptionalValue::Absent => OptionalValue::Absent,
            OptionalValue::Present(value) => f(value),
        }
    }

    /// [`bind`](Self::bind) with a fallible `f`. An `Err` from `f` is
    /// returned untouched, it is never turned into `Absent`.
    pub fn try_bind<U, E>(
        self,
        f: impl FnOnce(T) -> Result<OptionalValue<U>, E>,
    ) -> Result<OptionalValue<U>, E> {
        match self {
            OptionalValue::Absent => Ok(OptionalValue::Absent),
            OptionalValue::Present(value) => f(value),
        }
    }

    pub const fn is_present(&self) -> bool {
        matches!(self, OptionalValue::Present(_))
    }

    pub const fn is_absent(&self) -> bool {
        matches!(self, OptionalValue::Absent)
    }

    /// Borrow the payload, if any.
    pub const fn as_ref(&self) -> OptionalValue<&T> {
        match self {
            OptionalValue::Absent => OptionalValue::Absent,
            OptionalValue::Present(value) => OptionalValue::Present(value),
        }
    }

    pub fn into_option(self) -> Option<T> {
        self.into()
    }

    /// Take the payload out, treating absence as a failure.
    pub fn into_present(self) -> Result<T, AbsentValue> {
        match self {
            OptionalValue::Absent => Err(AbsentValue),
            OptionalValue::Present(value) => Ok(value),
        }
    }

    pub fn present_or(self, default: T) -> T {
        match self {
            OptionalValue::Absent => default,
            OptionalValue::Present(value) => value,
        }
    }

    /// Like [`present_or`](Self::present_or), `default` only runs when absent.
    pub fn present_or_else(self, default: impl FnOnce() -> T) -> T {
        match self {
            OptionalValue::Absent => default(),
            OptionalValue::Present(value) => value,
        }
    }

    /// Pair two values, absent unless both are present.
    pub fn zip<U>(self, other: OptionalValue<U>) -> OptionalValue<(T, U)> {
        match (self, other) {
            (OptionalValue::Present(left), OptionalValue::Present(right)) => {
                OptionalValue::Present((left, right))
            }
            _ => OptionalValue::Absent,
        }
    }

    /// `self` if present, otherwise `other`.
    pub fn or(self, other: Self) -> Self {
        match self {
            OptionalValue::Absent => other,
            present => present,
        }
    }
}

impl<T> Default for OptionalValue<T> {
    fn default() -> Self {
        OptionalValue::Absent
    }
}

impl<T> From<Option<T>> for OptionalValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => OptionalValue::Present(value),
            None => OptionalValue::Absent,
        }
    }
}

impl<T> From<OptionalValue<T>> for Option<T> {
    fn from(value: OptionalValue<T>) -> Self {
        match value {
            OptionalValue::Present(value) => Some(value),
            OptionalValue::Absent => None,
        }
    }
}

/// Collects into `Present(collection)` when every item is present, stopping
/// at the first `Absent`.
impl<T, C: FromIterator<T>> FromIterator<OptionalValue<T>> for OptionalValue<C> {
    fn from_iter<I: IntoIterator<Item = OptionalValue<T>>>(iter: I) -> Self {
        iter.into_iter()
            .map(OptionalValue::into_option)
            .collect::<Option<C>>()
            .into()
    }
}
