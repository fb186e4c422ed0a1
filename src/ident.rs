use std::fmt;
use std::str::FromStr;

/// A name in the source language, or a compiler-generated name.
///
/// Invariant: holds either a valid user identifier (`[A-Za-z_][A-Za-z0-9_]*`)
/// or a generated name beginning with `@` (e.g. the `@tmp#3` temporaries
/// minted during lowering).  Generated names can never collide with user
/// names.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident {
    string: String,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseIdentError {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier cannot begin with a digit")]
    LeadingDigit,
    #[error("invalid character {0:?} in identifier")]
    InvalidChar(char),
}

impl Ident {
    /// Construct a compiler-generated name, bypassing user-identifier syntax.
    pub(crate) fn new_system(string: String) -> Ident {
        assert!(string.starts_with('@'), "(bug!) system ident without @ prefix: {}", string);
        Ident { string }
    }

    pub fn as_str(&self) -> &str {
        &self.string
    }
}

impl FromStr for Ident {
    type Err = ParseIdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let first = s.chars().next().ok_or(ParseIdentError::Empty)?;
        if first.is_ascii_digit() {
            return Err(ParseIdentError::LeadingDigit);
        }
        for c in s.chars() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                return Err(ParseIdentError::InvalidChar(c));
            }
        }
        Ok(Ident { string: s.to_owned() })
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.string
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.string, f)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.string, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert!("abc".parse::<Ident>().is_ok());
        assert!("_x9".parse::<Ident>().is_ok());
        assert_eq!("".parse::<Ident>(), Err(ParseIdentError::Empty));
        assert_eq!("9x".parse::<Ident>(), Err(ParseIdentError::LeadingDigit));
        assert_eq!("a-b".parse::<Ident>(), Err(ParseIdentError::InvalidChar('-')));
        // `@` is reserved for generated names
        assert_eq!("@tmp".parse::<Ident>(), Err(ParseIdentError::InvalidChar('@')));
    }

    #[test]
    fn system_idents_display_verbatim() {
        let tmp = Ident::new_system("@tmp#0".to_owned());
        assert_eq!(tmp.to_string(), "@tmp#0");
    }
}
