//! Macros to reduce boilerplate in the codebase

/// Generate `Display` and case-insensitive `FromStr` for a fieldless enum.
///
/// The first string of each arm is the canonical spelling used by
/// `Display`; any further strings are accepted aliases when parsing.
///
/// ```rust,ignore
/// enum_display_fromstr!(
///     SortDirection,
///     |s| VitrineError::InvalidInput(format!("unknown sort direction '{s}'")),
///     {
///         Asc => "asc" | "ascending",
///         Desc => "desc" | "descending",
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $error:expr,
        { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }
    ) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($enum_name::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::VitrineError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str $(| $alias)* => Ok($enum_name::$variant),)+
                    _ => {
                        let make_error: fn(&str) -> $crate::error::VitrineError = $error;
                        Err(make_error(s))
                    }
                }
            }
        }
    };
}

#[cfg(test)]
mod test {
    use crate::error::VitrineError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shade {
        Light,
        Dark,
    }

    enum_display_fromstr!(
        Shade,
        |s| VitrineError::InvalidInput(format!("unknown shade '{s}'")),
        {
            Light => "light" | "l",
            Dark => "dark",
        }
    );

    #[test]
    fn test_display_uses_canonical_spelling() {
        assert_eq!(Shade::Light.to_string(), "light");
        assert_eq!(Shade::Dark.to_string(), "dark");
    }

    #[test]
    fn test_from_str_accepts_aliases_and_case() {
        assert_eq!("L".parse::<Shade>().unwrap(), Shade::Light);
        assert_eq!(" DARK ".parse::<Shade>().unwrap(), Shade::Dark);
        assert!("dim".parse::<Shade>().is_err());
    }
}
