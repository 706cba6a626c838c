//! Common macros for entigen.

/// Declare a closed string enumeration used as a configuration value.
///
/// Generates the enum itself plus `ALL`, `as_str`, `options`, `validator`,
/// `Display`, `FromStr` and serde impls that go through the string tag.
///
/// # Example
///
/// ```rust
/// use entigen_core::config_enum;
///
/// config_enum! {
///     /// Heating mode.
///     pub enum Mode {
///         Heat => "heat",
///         Cool => "cool",
///     }
/// }
///
/// assert_eq!("cool".parse::<Mode>().unwrap(), Mode::Cool);
/// assert_eq!(Mode::Heat.to_string(), "heat");
/// assert!("dry".parse::<Mode>().is_err());
/// ```
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The configuration tag of this member.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }

            /// All configuration tags, in declaration order.
            pub fn options() -> Vec<String> {
                Self::ALL.iter().map(|v| v.as_str().to_string()).collect()
            }

            /// A validator accepting exactly the members of this enumeration.
            pub fn validator() -> $crate::schema::Validator {
                $crate::schema::Validator::OneOf(Self::options())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::validation::ValidationErrorKind;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    _ => Err($crate::validation::ValidationErrorKind::InvalidOption {
                        value: s.to_string(),
                        options: Self::options(),
                    }),
                }
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let s: ::std::string::String =
                    $crate::__serde::Deserialize::deserialize(deserializer)?;
                s.parse().map_err(<D::Error as $crate::__serde::de::Error>::custom)
            }
        }
    };
}
