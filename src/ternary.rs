/// The ternary expression.  Rust's `if` is already an expression, but
/// `cargo fmt` spreads every one of them over five lines, and the
/// border cases of a finite difference read much better as a single
/// table of one-liners.
#[macro_export]
macro_rules! cq {
    ($condition: expr, $_true: expr, $_false: expr) => {
        if $condition {
            $_true
        } else {
            $_false
        }
    };
}
