#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build an [`AppliedLink`](crate::AppliedLink): a named predicate attached
/// to a unit, checked against the fully resolved sequence.
///
/// The closure receives the linked unit and the candidate sequence. Name the
/// parameters even when unused (`_token`, not `_`).
#[macro_export]
macro_rules! link {
    (
        name: $name:expr,
        check: |$token:ident : &$token_ty:ty, $seq:ident : &[$seq_ty:ty]| -> $ret_ty:ty $body:block
        $(,)?
    ) => {{
        $crate::AppliedLink {
            name: $name,
            check: Box::new(move |$token: &$token_ty, $seq: &[$seq_ty]| {
                let passed: $ret_ty = $body;
                passed
            }),
        }
    }};
}

/// Build an [`OrderingRule`](crate::OrderingRule) for the grammar filter.
///
/// `scope` lists the classes the rule cares about (defaults to none, which
/// keeps the rule dormant); `strict: true` makes a failure poison the whole
/// candidate unless a later non-strict rule passes. The check receives the
/// current sequence and the insertable null variants, and returns a
/// [`RuleVerdict`](crate::RuleVerdict).
#[macro_export]
macro_rules! order {
    (
        name: $name:expr
        $(, scope: [ $($class:expr),* $(,)? ])?
        $(, strict: $strict:expr)?
        , check: |$seq:ident : &[$seq_ty:ty], $nulls:ident : &[$nulls_ty:ty]| -> $ret_ty:ty $body:block
        $(,)?
    ) => {{
        $crate::OrderingRule {
            name: $name,
            scope: vec![ $($(String::from($class)),*)? ],
            strict: { false $(|| $strict)? },
            check: Box::new(move |$seq: &[$seq_ty], $nulls: &[$nulls_ty]| {
                let verdict: $ret_ty = $body;
                verdict
            }),
        }
    }};
}
