/// Asserts that an expression matches a pattern, optionally with a guard.
///
/// Unlike `assert!(matches!(...))`, the value is printed on failure.
///
/// #### Example
/// ```rust
/// # use portfolio_utils::assert_matches;
/// let result: Result<u8, &str> = Err("nope");
/// assert_matches!(result, Err("nope"));
/// assert_matches!(Some(3), Some(x) if *x > 2);
/// ```
#[macro_export]
macro_rules! assert_matches {
    ($expr:expr, $pat:pat) => {
        match ($expr) {
            $pat => (),
            val => ::core::panic!(
                "Assertion failed: Value {val:?} did not match pattern {}",
                ::core::stringify!($pat)
            ),
        }
    };
    ($expr:expr, $pat:pat if $pred:expr) => {{
        let val = $expr;
        match (&val) {
            $pat if $pred => (),
            #[allow(unused_variables)]
            $pat => ::core::panic!(
                "Assertion failed: Value {val:?} does not match predicate {}",
                ::core::stringify!($pred)
            ),
            _ => ::core::panic!(
                "Assertion failed: Value {val:?} did not match pattern {}",
                ::core::stringify!($pat)
            ),
        }
    }};
}
