/// A closed set of wire values accepted for an enumerated field.
pub trait Choice: Copy + Sized + Send + Sync + 'static {
    /// Every accepted wire value, in declaration order.
    const WIRE: &'static [&'static str];

    fn parse(raw: &str) -> Option<Self>;
    fn as_str(self) -> &'static str;
}

/// Declares an allow-list enum whose serde representation is its wire value.
macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $crate::model::choice::Choice for $name {
            const WIRE: &'static [&'static str] = &[$($wire),+];

            fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::model::choice::Choice::as_str(*self))
            }
        }
    };
}

pub(crate) use choice_enum;
