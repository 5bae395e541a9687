//! Helpers for the two textual forms an identifier takes in the store.
//!
//! Full IRIs (`http://open-model.eu/ontologies/ss3#AbaqusSimulation`) are
//! the primary keys. Descriptors written by hand often use the compacted
//! `prefix:Name` form instead (`ss3:AbaqusSimulation`), so every lookup
//! retries with [`compact_iri`] before giving up.

/// Local name of an IRI: the fragment after the first `#`, or the last path
/// segment when there is no fragment.
pub fn iri_suffix(iri: &str) -> &str {
    match iri.split_once('#') {
        Some((_, fragment)) => fragment,
        None => iri.rsplit('/').next().unwrap_or(iri),
    }
}

/// Compacted key form: the last path segment with `#` turned into `:`.
pub fn compact_iri(iri: &str) -> String {
    iri.rsplit('/').next().unwrap_or(iri).replace('#', ":")
}

/// Expand a `prefix:Name` key against a prefix table. Keys whose prefix is
/// unknown, and keys that already are full IRIs, come back unchanged.
pub fn expand_iri<'a, I>(key: &str, prefixes: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    if key.contains("://") {
        return key.to_string();
    }
    if let Some((prefix, name)) = key.split_once(':') {
        for (candidate, namespace) in prefixes {
            if candidate == prefix {
                return format!("{}{}", namespace, name);
            }
        }
    }
    key.to_string()
}
