//! # Format Registry
//!
//! Named string predicates consulted by the `format` keyword. A format name
//! that is not registered is treated as always valid: formats are advisory.
//!
//! [`FormatRegistry::global`] is the process-wide default, pre-populated
//! with the built-in formats. Callers that need isolation construct their
//! own registry and pass it through
//! [`ValidationOptions::formats`](crate::ValidationOptions::formats).
//!
//! The registry is guarded by a `parking_lot::RwLock`; registration is
//! expected to happen at startup, lookups happen on every `format` check.

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, NaiveDate};
use parking_lot::RwLock;

/// A format predicate.
pub type FormatFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Names of the formats every [`FormatRegistry::with_defaults`] carries.
pub const BUILTIN_FORMATS: [&str; 9] = [
    "date", "date-time", "email", "ipv4", "ipv6", "regex", "time", "uri", "uuid",
];

/// A set of named string formats.
pub struct FormatRegistry {
    formats: RwLock<BTreeMap<String, FormatFn>>,
}

impl FormatRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            formats: RwLock::new(BTreeMap::new()),
        }
    }

    /// A registry holding the built-in formats.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register("date", is_date);
        registry.register("date-time", is_date_time);
        registry.register("time", is_time);
        registry.register("email", is_email);
        registry.register("ipv4", |s| s.parse::<Ipv4Addr>().is_ok());
        registry.register("ipv6", |s| s.parse::<Ipv6Addr>().is_ok());
        registry.register("regex", |s| regex::Regex::new(s).is_ok());
        registry.register("uri", is_uri);
        registry.register("uuid", is_uuid);
        registry
    }

    /// The process-wide default registry.
    pub fn global() -> &'static FormatRegistry {
        static GLOBAL: OnceLock<FormatRegistry> = OnceLock::new();
        GLOBAL.get_or_init(FormatRegistry::with_defaults)
    }

    /// Register or replace a format.
    pub fn register<F>(&self, name: &str, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        tracing::debug!(format = name, "registering format");
        self.formats.write().insert(name.to_string(), Arc::new(predicate));
    }

    /// Remove a format. Returns whether it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        tracing::debug!(format = name, "unregistering format");
        self.formats.write().remove(name).is_some()
    }

    /// Registered format names, sorted.
    pub fn list(&self) -> Vec<String> {
        self.formats.read().keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formats.read().contains_key(name)
    }

    /// Check `value` against the named format. Unknown names pass.
    pub fn check(&self, name: &str, value: &str) -> bool {
        // Clone the predicate out so user code never runs under the lock.
        let predicate = self.formats.read().get(name).cloned();
        match predicate {
            Some(predicate) => predicate(value),
            None => {
                tracing::trace!(format = name, "unknown format treated as valid");
                true
            }
        }
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry").field("formats", &self.list()).finish()
    }
}

/// Register a format on the global registry.
pub fn register_format<F>(name: &str, predicate: F)
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    FormatRegistry::global().register(name, predicate);
}

/// Remove a format from the global registry.
pub fn unregister_format(name: &str) -> bool {
    FormatRegistry::global().unregister(name)
}

/// Format names on the global registry.
pub fn list_formats() -> Vec<String> {
    FormatRegistry::global().list()
}

fn is_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
        && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn is_date_time(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
}

fn is_time(s: &str) -> bool {
    DateTime::parse_from_rfc3339(&format!("1970-01-01T{s}")).is_ok()
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c == '@');
    clean(local)
        && clean(domain)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

fn is_uri(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.chars().any(char::is_whitespace)
}

fn is_uuid(s: &str) -> bool {
    s.len() == 36
        && s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}
