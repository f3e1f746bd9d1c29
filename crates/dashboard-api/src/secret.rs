use std::collections::HashMap;
use std::fmt;

/// Expected shared secret per request path.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretMap {
    by_path: HashMap<String, String>,
}

impl SecretMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty secrets are never stored, so an unset variable can't turn into
    /// "any empty body passes".
    pub fn insert(&mut self, path: impl Into<String>, secret: impl Into<String>) {
        let secret = secret.into();
        if !secret.is_empty() {
            self.by_path.insert(path.into(), secret);
        }
    }

    pub fn is_configured(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Plain string equality against the secret configured for exactly
    /// `path`. Unconfigured paths deny everything.
    pub fn allows(&self, path: &str, supplied: &str) -> bool {
        self.by_path
            .get(path)
            .is_some_and(|expected| expected == supplied)
    }
}

impl<P: Into<String>, S: Into<String>> FromIterator<(P, S)> for SecretMap {
    fn from_iter<I: IntoIterator<Item = (P, S)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path, secret) in iter {
            map.insert(path, secret);
        }
        map
    }
}

impl fmt::Debug for SecretMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.by_path.keys().collect();
        paths.sort();
        f.debug_map()
            .entries(paths.into_iter().map(|p| (p, "<redacted>")))
            .finish()
    }
}
