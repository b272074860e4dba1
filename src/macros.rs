#[macro_export]
macro_rules! regex {
    ($pat:expr) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

#[macro_export]
macro_rules! rule {
    (
        name: $name:expr,
        kind: $kind:expr,
        pattern: $pat:expr
        $(, required_phrases: [ $($req_phrase:expr),* $(,)? ])?
        $(, optional_phrases: [ $($opt_phrase:expr),* $(,)? ])?
        $(, buckets: $buckets:expr)?
        $(, priority: $priority:expr)?
        , prod: |$groups_ident:ident : &Groups| $body_expr:block
        $(,)?
    ) => {{
        $crate::Rule {
            name: $name,
            kind: $kind,
            pattern: $pat,
            production: Box::new(move |$groups_ident: &$crate::Groups| -> Option<$crate::Token> { $body_expr }),
            required_phrases: &[ $($($req_phrase),*)? ],
            optional_phrases: &[ $($($opt_phrase),*)? ],
            buckets: { 0 $(| $buckets)? },
            priority: { 0 $(+ $priority)? },
        }
    }};
}
