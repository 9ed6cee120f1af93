//! # Composition helpers
//!
//! Free-function forms of the container operations, for code that would
//! rather pass the container and the function side by side than chain
//! methods, plus Kleisli composition of maybe-producing functions.

use crate::optional::OptionalValue;

/// Lift a bare value into a context.
///
/// Generic code can produce a present container through this trait without
/// knowing which container it is building.
pub trait Lift<T> {
    fn lift(value: T) -> Self;
}

impl<T> Lift<T> for OptionalValue<T> {
    fn lift(value: T) -> Self {
        OptionalValue::Present(value)
    }
}

impl<T> Lift<T> for Option<T> {
    fn lift(value: T) -> Self {
        Some(value)
    }
}

/// Wrap `value` as a present [`OptionalValue`].
pub fn lift<T>(value: T) -> OptionalValue<T> {
    OptionalValue::lift(value)
}

/// [`OptionalValue::map`] with both operands passed explicitly.
pub fn map<T, U>(value: OptionalValue<T>, f: impl FnOnce(T) -> U) -> OptionalValue<U> {
    value.map(f)
}

/// [`OptionalValue::bind`] with both operands passed explicitly.
pub fn bind<T, U>(
    value: OptionalValue<T>,
    f: impl FnOnce(T) -> OptionalValue<U>,
) -> OptionalValue<U> {
    value.bind(f)
}

/// Compose two maybe-producing functions, `f` then `g`.
///
/// `g` is only called when `f` produced a value.
pub fn kleisli<A, B, C>(
    f: impl Fn(A) -> OptionalValue<B>,
    g: impl Fn(B) -> OptionalValue<C>,
) -> impl Fn(A) -> OptionalValue<C> {
    move |a| f(a).bind(&g)
}
