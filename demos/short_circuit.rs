//! A `bind` chain stops calling functions at the first absent step.
//!
//! Each step logs when it runs, so the output shows which steps were skipped.

use optional_value::{kleisli, OptionalValue};
use tracing::info;

fn parse(input: &str) -> OptionalValue<i64> {
    info!(input, "parse");
    input.trim().parse::<i64>().ok().into()
}

fn non_negative(n: i64) -> OptionalValue<u64> {
    info!(n, "non_negative");
    u64::try_from(n).ok().into()
}

fn square_root(n: u64) -> OptionalValue<u64> {
    info!(n, "square_root");
    let root = (n as f64).sqrt() as u64;
    if root.checked_mul(root) == Some(n) {
        OptionalValue::present(root)
    } else {
        OptionalValue::absent()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    for input in ["49", "-49", "forty-nine", "50"] {
        let result = parse(input).bind(non_negative).bind(square_root);
        info!(input, ?result, "chain finished");
    }

    let checked_root = kleisli(non_negative, square_root);
    info!(result = ?checked_root(81), "composed before running");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_root_is_total() {
        assert_eq!(square_root(49), OptionalValue::present(7));
        assert_eq!(square_root(50), OptionalValue::absent());
        assert_eq!(square_root(0), OptionalValue::present(0));
        assert_eq!(square_root(u64::MAX), OptionalValue::absent());
        assert_eq!(square_root(u64::MAX - 1), OptionalValue::absent());
    }
}
