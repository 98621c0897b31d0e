use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A set of access scopes, parsed from the comma-separated wire form.
///
/// A `write_x` scope implies `read_x`, including the `unauthenticated_`
/// variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthScopes(BTreeSet<String>);

impl AuthScopes {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True when every scope in `required` is granted, directly or implied.
    pub fn has(&self, required: &AuthScopes) -> bool {
        required.iter().all(|s| self.grants(s))
    }

    fn grants(&self, scope: &str) -> bool {
        if self.0.contains(scope) {
            return true;
        }
        implied_by_write(scope).is_some_and(|w| self.0.contains(&w))
    }
}

fn implied_by_write(scope: &str) -> Option<String> {
    if let Some(rest) = scope.strip_prefix("unauthenticated_read_") {
        return Some(format!("unauthenticated_write_{rest}"));
    }
    scope.strip_prefix("read_").map(|rest| format!("write_{rest}"))
}

impl FromStr for AuthScopes {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(s: &str) -> AuthScopes {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_normalizes() {
        let s = scopes(" write_products, read_orders,,read_orders ");
        assert_eq!(s.to_string(), "read_orders,write_products");
        assert!(scopes("").is_empty());
    }

    #[test]
    fn write_implies_read() {
        let granted = scopes("write_products,unauthenticated_write_checkouts");
        assert!(granted.has(&scopes("read_products")));
        assert!(granted.has(&scopes("unauthenticated_read_checkouts")));
        assert!(!granted.has(&scopes("read_orders")));
        assert!(!scopes("read_products").has(&scopes("write_products")));
    }

    #[test]
    fn empty_requirement_is_always_met() {
        assert!(AuthScopes::default().has(&AuthScopes::default()));
    }
}
