/// Wrap a value in [`crate::pos::Sp`].
///
/// `sp!(span => value)` attaches the given span; `sp!(value)` attaches the
/// default (absent) span, which is mostly useful in tests.
#[macro_export]
macro_rules! sp {
    ($span:expr => $value:expr) => {
        $crate::pos::Sp { span: $span, value: $value }
    };
    ($value:expr) => {
        $crate::pos::Sp { span: $crate::pos::Span::default(), value: $value }
    };
}

/// Define an integer-backed id type.
macro_rules! newtype_id {
    (
        $(#[$attr:meta])*
        pub struct $Name:ident(pub $Raw:ty);
    ) => {
        $(#[$attr])*
        pub struct $Name(pub $Raw);

        impl ::std::fmt::Debug for $Name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!(stringify!($Name), "({})"), self.0)
            }
        }

        impl ::std::fmt::Display for $Name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// Define an enum whose `Display` and `FromStr` impls use the token spellings
/// given in `#[strum(serialize = "...")]` attributes.
macro_rules! string_enum {
    (
        $(#[$attr:meta])*
        pub enum $Name:ident { $($body:tt)* }
    ) => {
        $(#[$attr])*
        #[derive(strum::Display, strum::EnumString)]
        pub enum $Name { $($body)* }
    };
}
