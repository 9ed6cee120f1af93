//! # optional-value
//!
//! A two-state container for "no value" or "exactly one value", with the
//! composition operations that make chains of maybe-producing functions
//! readable:
//!
//! - [`OptionalValue::map`] applies a plain function to the held value.
//! - [`OptionalValue::bind`] applies a function that itself may produce no
//!   value, stopping at the first absence.
//! - [`OptionalValue::lift`] (and the [`Lift`] trait) wraps a bare value.
//!
//! `map` and `try_map` are generated by [`derive_functor`], which works for
//! any enum or struct with type parameters.
//!
//! ```
//! use optional_value::OptionalValue;
//!
//! let halve = |n: u32| {
//!     if n % 2 == 0 {
//!         OptionalValue::present(n / 2)
//!     } else {
//!         OptionalValue::absent()
//!     }
//! };
//!
//! assert_eq!(OptionalValue::lift(12).bind(halve).bind(halve), OptionalValue::present(3));
//! assert_eq!(OptionalValue::lift(12).bind(halve).bind(halve).bind(halve), OptionalValue::absent());
//! ```
//!
//! Wrapping is always explicit. There is no conversion from a bare `T` and an
//! optional value only compares against another optional value of the same
//! type:
//!
//! ```compile_fail
//! use optional_value::OptionalValue;
//!
//! let nothing: OptionalValue<i32> = OptionalValue::absent();
//! let _ = nothing < 5;
//! ```
//!
//! ```compile_fail
//! use optional_value::OptionalValue;
//!
//! let five: OptionalValue<i32> = 5.into();
//! ```

pub mod compose;
pub mod error;
pub mod optional;

pub use compose::{bind, kleisli, lift, map, Lift};
pub use error::AbsentValue;
pub use optional::OptionalValue;
pub use optional_value_derive::derive_functor;
