//! Functor and monad laws for `OptionalValue`, checked as properties.

use optional_value::{lift, OptionalValue};
use proptest::prelude::*;

fn optional_i32() -> impl Strategy<Value = OptionalValue<i32>> {
    prop_oneof![
        1 => Just(OptionalValue::absent()),
        4 => any::<i32>().prop_map(OptionalValue::present),
    ]
}

fn double(n: i32) -> i32 {
    n.wrapping_mul(2)
}

fn describe(n: i32) -> String {
    format!("<{n}>")
}

fn even_half(n: i32) -> OptionalValue<i32> {
    if n % 2 == 0 {
        OptionalValue::present(n / 2)
    } else {
        OptionalValue::absent()
    }
}

fn non_negative(n: i32) -> OptionalValue<u32> {
    u32::try_from(n).ok().into()
}

proptest! {
    #[test]
    fn prop_absent_map_is_absent(offset in any::<i32>()) {
        let mapped = OptionalValue::<i32>::absent().map(|x| x.wrapping_add(offset));
        prop_assert_eq!(mapped, OptionalValue::absent());
    }

    #[test]
    fn prop_present_map_applies(x in any::<i32>()) {
        prop_assert_eq!(OptionalValue::present(x).map(double), OptionalValue::present(double(x)));
    }

    // Functor identity: v.map(id) == v
    #[test]
    fn prop_functor_identity(v in optional_i32()) {
        prop_assert_eq!(v.map(|x| x), v);
    }

    // Functor composition: v.map(f).map(g) == v.map(g . f)
    #[test]
    fn prop_functor_composition(v in optional_i32()) {
        prop_assert_eq!(v.map(double).map(describe), v.map(|x| describe(double(x))));
    }

    // Left identity: lift(x).bind(f) == f(x)
    #[test]
    fn prop_monad_left_identity(x in any::<i32>()) {
        prop_assert_eq!(lift(x).bind(even_half), even_half(x));
    }

    // Right identity: v.bind(lift) == v
    #[test]
    fn prop_monad_right_identity(v in optional_i32()) {
        prop_assert_eq!(v.bind(lift), v);
    }

    // Associativity: v.bind(f).bind(g) == v.bind(|x| f(x).bind(g))
    #[test]
    fn prop_monad_associativity(v in optional_i32()) {
        prop_assert_eq!(
            v.bind(even_half).bind(non_negative),
            v.bind(|x| even_half(x).bind(non_negative))
        );
    }

    #[test]
    fn prop_absent_orders_first(x in any::<i32>()) {
        prop_assert!(OptionalValue::absent() < OptionalValue::present(x));
        prop_assert!(OptionalValue::present(x) > OptionalValue::absent());
    }

    #[test]
    fn prop_present_orders_by_payload(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(OptionalValue::present(a).cmp(&OptionalValue::present(b)), a.cmp(&b));
        prop_assert_eq!(OptionalValue::present(a) == OptionalValue::present(b), a == b);
    }
}
