//! Macros for defining validated text types.

/// Macro for defining a non-blank text newtype of a bounded length.
///
/// # Example
///
/// ```rust,ignore
/// define_text! {
///     #[doc = "Name of a company."]
///     struct Name(max = 255);
/// }
///
/// assert!(Name::new("Acme").is_some());
/// assert!(Name::new(" Acme").is_none());
/// ```
#[macro_export]
macro_rules! define_text {
    (
        #[doc = $doc:literal]
        struct $name:ident(max = $max:literal);
    ) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Eq, Hash, PartialEq)]
        pub struct $name(String);

        impl $name {
            /// Maximum length of this text in bytes.
            pub const MAX_LEN: usize = $max;

            /// Creates a new value without checking its format.
            ///
            /// # Safety
            ///
            /// The caller must ensure that the given `text` matches the
            /// format.
            #[expect(unsafe_code, reason = "bypass")]
            #[must_use]
            pub unsafe fn new_unchecked(text: impl Into<String>) -> Self {
                Self(text.into())
            }

            /// Creates a new value if the given `text` is valid.
            #[must_use]
            pub fn new(text: impl Into<String>) -> Option<Self> {
                let text = text.into();
                Self::check(&text).then_some(Self(text))
            }

            /// Checks whether the given `text` is non-blank, trimmed and
            /// doesn't exceed [`Self::MAX_LEN`].
            fn check(text: &str) -> bool {
                text.trim() == text && !text.is_empty() && text.len() <= $max
            }

            /// Consumes this value returning the inner [`String`].
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut ::core::fmt::Formatter<'_>,
            ) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(::core::concat!(
                    "invalid `",
                    ::core::stringify!($name),
                    "`",
                ))
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &'a [u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                <String as $crate::private::postgres_types::FromSql>::from_sql(
                    ty, raw,
                )
                .map(Self)
            }

            fn accepts(ty: &$crate::private::postgres_types::Type) -> bool {
                <String as $crate::private::postgres_types::FromSql>::accepts(
                    ty,
                )
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                <String as $crate::private::postgres_types::ToSql>::to_sql(
                    &self.0, ty, w,
                )
            }

            fn accepts(ty: &$crate::private::postgres_types::Type) -> bool {
                <String as $crate::private::postgres_types::ToSql>::accepts(ty)
            }
        }
    };
}
