//! Behaviour of `#[derive_functor]` on types other than `OptionalValue`.

use optional_value::{derive_functor, OptionalValue};

#[derive_functor(B = label)]
#[derive(Debug, PartialEq)]
struct Tagged<A, B> {
    value: A,
    label: B,
    note: String,
}

#[derive_functor(impl_try_map = true)]
#[derive(Debug, PartialEq)]
enum Extent<A> {
    Empty,
    Point(A),
    Segment { from: A, to: A },
}

#[derive_functor(impl_try_map = true)]
#[derive(Debug, PartialEq)]
struct Trail<A> {
    head: A,
    rest: OptionalValue<A>,
    #[map_with(map_vec, try_map_vec)]
    history: Vec<A>,
}

fn map_vec<A, A2>(items: Vec<A>, f: impl Fn(A) -> A2) -> Vec<A2> {
    items.into_iter().map(f).collect()
}

fn try_map_vec<A, A2, E>(items: Vec<A>, f: impl Fn(A) -> Result<A2, E>) -> Result<Vec<A2>, E> {
    items.into_iter().map(f).collect()
}

#[derive_functor(map_name = convert, try_map_name = try_convert, impl_try_map = true)]
#[derive(Debug, PartialEq)]
struct Wrapper<A>(A);

#[derive_functor(impl_try_map = true)]
#[derive(Debug, PartialEq)]
enum Outcome<T, E> {
    Done(T),
    Failed(E),
}

#[derive_functor]
#[derive(Debug, PartialEq)]
struct Marker;

// field names that match the generated closure names.
#[derive_functor(impl_try_map = true)]
#[derive(Debug, PartialEq)]
struct Labeled<T> {
    map_t: u8,
    try_map_t: u8,
    value: T,
}

#[derive_functor]
#[derive(Debug, PartialEq)]
enum Shelf<A> {
    Stocked { map_a: &'static str, item: A },
    Bare(u8, A),
}

#[test]
fn struct_maps_each_parameter_and_moves_the_rest() {
    let tagged = Tagged {
        value: 41,
        label: "acorn",
        note: "kept".to_string(),
    };
    let mapped = tagged.map(|x| x + 1, |label: &str| label.len());
    assert_eq!(
        mapped,
        Tagged {
            value: 42,
            label: 5,
            note: "kept".to_string(),
        }
    );
}

#[test]
fn enum_maps_every_field_of_the_held_variant() {
    assert_eq!(Extent::<i32>::Empty.map(|x| x * 10), Extent::Empty);
    assert_eq!(Extent::Point(2).map(|x| x * 10), Extent::Point(20));
    assert_eq!(
        Extent::Segment { from: 1, to: 3 }.map(|x| x * 10),
        Extent::Segment { from: 10, to: 30 }
    );
}

#[test]
fn enum_try_map_stops_on_error() {
    let parse = |s: &str| s.parse::<u8>();
    assert_eq!(
        Extent::Segment { from: "1", to: "2" }.try_map(parse),
        Ok(Extent::Segment { from: 1, to: 2 })
    );
    assert!(Extent::Segment { from: "1", to: "x" }.try_map(parse).is_err());
    assert_eq!(Extent::<&str>::Empty.try_map(parse), Ok(Extent::Empty));
}

#[test]
fn nested_fields_recurse_through_their_own_map() {
    let trail = Trail {
        head: 1,
        rest: OptionalValue::present(2),
        history: vec![3, 4],
    };
    assert_eq!(
        trail.map(|x| x * 2),
        Trail {
            head: 2,
            rest: OptionalValue::present(4),
            history: vec![6, 8],
        }
    );

    let trail = Trail {
        head: 1,
        rest: OptionalValue::absent(),
        history: vec![],
    };
    assert_eq!(
        trail.map(|x| x.to_string()),
        Trail {
            head: "1".to_string(),
            rest: OptionalValue::absent(),
            history: vec![],
        }
    );
}

#[test]
fn nested_try_map_returns_first_error() {
    let checked = |x: i32| u8::try_from(x).map_err(|_| x);

    let trail = Trail {
        head: 1,
        rest: OptionalValue::present(2),
        history: vec![3, -4, 300],
    };
    assert_eq!(trail.try_map(checked), Err(-4));

    let trail = Trail {
        head: 1,
        rest: OptionalValue::present(2),
        history: vec![3],
    };
    assert_eq!(
        trail.try_map(checked),
        Ok(Trail {
            head: 1u8,
            rest: OptionalValue::present(2),
            history: vec![3],
        })
    );
}

#[test]
fn renamed_methods() {
    assert_eq!(Wrapper(2).convert(|x| x + 1), Wrapper(3));
    assert_eq!(Wrapper("7").try_convert(|s| s.parse::<i32>()), Ok(Wrapper(7)));
}

#[test]
fn single_use_parameters_accept_fn_once() {
    let suffix = String::from(" nuts");
    let mapped = Wrapper(3).convert(move |n| format!("{n}{suffix}"));
    assert_eq!(mapped, Wrapper("3 nuts".to_string()));
}

#[test]
fn error_parameter_does_not_clash_with_type_parameters() {
    let done: Outcome<&str, &str> = Outcome::Done("5");
    assert_eq!(
        done.try_map(|s| s.parse::<i32>(), |e| Ok(e.len())),
        Ok(Outcome::Done(5))
    );

    let failed: Outcome<&str, &str> = Outcome::Failed("bad");
    assert_eq!(
        failed.map(|s| s.len(), |e| e.to_uppercase()),
        Outcome::Failed("BAD".to_string())
    );
}

#[test]
fn unit_struct_maps_to_itself() {
    assert_eq!(Marker.map(), Marker);
}

#[test]
fn fields_named_like_closures_are_moved_through() {
    let labeled = Labeled {
        map_t: 1,
        try_map_t: 2,
        value: 20,
    };
    assert_eq!(
        labeled.map(|x| x + 1),
        Labeled {
            map_t: 1,
            try_map_t: 2,
            value: 21,
        }
    );

    let labeled = Labeled {
        map_t: 1,
        try_map_t: 2,
        value: "9",
    };
    assert_eq!(
        labeled.try_map(|s| s.parse::<i32>()),
        Ok(Labeled {
            map_t: 1,
            try_map_t: 2,
            value: 9,
        })
    );

    assert_eq!(
        Shelf::Stocked { map_a: "acorns", item: 3 }.map(|x| x * 2),
        Shelf::Stocked { map_a: "acorns", item: 6 }
    );
    assert_eq!(Shelf::Bare(7, 3).map(|x| x * 2), Shelf::Bare(7, 6));
}
