//! Namespace set of an export and base URI handling.

use crate::consts::{
    DEFAULT_BASE_URI, DEFAULT_INSTANCE_NAMESPACE, DEFAULT_MAP_NAMESPACE, DEFAULT_VOCAB_NAMESPACE,
};
use crate::errors::{Result, TransformError};
use log::debug;
use oxiri::Iri;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSet {
    pub map_namespace: String,
    pub instance_namespace: String,
    pub vocabulary_namespace: String,
    pub base_uri: String,
}

impl NamespaceSet {
    /// Namespaces used when the mapping is generated from a live schema.
    pub fn generated(base_uri: impl Into<String>) -> Self {
        NamespaceSet {
            map_namespace: DEFAULT_MAP_NAMESPACE.to_string(),
            instance_namespace: DEFAULT_INSTANCE_NAMESPACE.to_string(),
            vocabulary_namespace: DEFAULT_VOCAB_NAMESPACE.to_string(),
            base_uri: base_uri.into(),
        }
    }
}

/// Picks the base URI: explicit value, then `file:<output>#`, then `http://localhost/`.
pub fn resolve_base_uri(explicit: Option<&str>, output_file: Option<&str>) -> String {
    if let Some(base) = explicit.filter(|b| !b.trim().is_empty()) {
        return base.trim().to_string();
    }
    if let Some(output) = output_file.filter(|o| !o.is_empty()) {
        return format!("file:{}#", encode_path(output));
    }
    DEFAULT_BASE_URI.to_string()
}

/// Percent-encodes the characters of a file path that cannot appear in an IRI path.
/// Relative paths stay relative.
fn encode_path(path: &str) -> String {
    let relative = !path.starts_with('/');
    let rooted = if relative {
        Path::new("/").join(path)
    } else {
        PathBuf::from(path)
    };
    match url::Url::from_file_path(&rooted) {
        Ok(url) if relative => url.path().trim_start_matches('/').to_string(),
        Ok(url) => url.path().to_string(),
        Err(_) => path.to_string(),
    }
}

/// Turns a possibly relative base URI into an absolute IRI. Relative references and
/// `file:` IRIs with relative paths are resolved against the current directory.
pub fn absolutize_uri(uri: &str) -> Result<String> {
    let (body, fragment) = match uri.find('#') {
        Some(idx) => (&uri[..idx], &uri[idx..]),
        None => (uri, ""),
    };
    if let Some(path) = body.strip_prefix("file:") {
        if path.starts_with('/') && Iri::parse(uri).is_ok() {
            return Ok(uri.to_string());
        }
        return Ok(format!("{}{}", file_url(Path::new(path))?, fragment));
    }
    if Iri::parse(uri.to_string()).is_ok() {
        return Ok(uri.to_string());
    }
    Ok(format!("{}{}", file_url(Path::new(body))?, fragment))
}

fn file_url(path: &Path) -> Result<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    url::Url::from_file_path(&absolute)
        .map(|u| u.to_string())
        .map_err(|_| {
            TransformError::invalid_parameter(
                "base_uri",
                format!("cannot build a file URL from {}", absolute.display()),
            )
        })
}

/// An absolute base IRI that relative terms are resolved against.
#[derive(Debug, Clone)]
pub struct BaseIri {
    /// The base as the caller gave it (written into `xml:base`).
    declared: String,
    iri: Iri<String>,
}

impl BaseIri {
    pub fn new(declared: &str) -> Result<Self> {
        let absolute = absolutize_uri(declared)?;
        debug!("Base URI {} resolves to {}", declared, absolute);
        let iri = Iri::parse(absolute).map_err(|e| {
            TransformError::invalid_parameter("base_uri", format!("{}: {}", declared, e))
        })?;
        Ok(BaseIri {
            declared: declared.to_string(),
            iri,
        })
    }

    pub fn declared(&self) -> &str {
        &self.declared
    }

    pub fn as_str(&self) -> &str {
        self.iri.as_str()
    }

    /// Resolves a (possibly relative) reference to an absolute IRI string.
    pub fn resolve(&self, reference: &str) -> Result<String> {
        self.iri
            .resolve(reference)
            .map(|iri| iri.into_inner())
            .map_err(|e| TransformError::InvalidMapping(format!("bad IRI '{}': {}", reference, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_uri_fallback_order() {
        assert_eq!(
            resolve_base_uri(Some("http://example.org/db/"), Some("/out.owl")),
            "http://example.org/db/"
        );
        assert_eq!(resolve_base_uri(None, Some("/out.owl")), "file:/out.owl#");
        assert_eq!(resolve_base_uri(Some("  "), None), "http://localhost/");
        assert_eq!(resolve_base_uri(None, Some("")), "http://localhost/");
    }

    #[test]
    fn test_output_path_with_space() {
        let base = resolve_base_uri(None, Some("/tmp/my dir/out.owl"));
        assert_eq!(base, "file:/tmp/my%20dir/out.owl#");
        assert_eq!(resolve_base_uri(None, Some("my out.owl")), "file:my%20out.owl#");
        let iri = BaseIri::new(&base).unwrap();
        assert_eq!(iri.resolve("Emp/10").unwrap(), "file:/tmp/my%20dir/Emp/10");
        // an unencoded absolute file IRI is encoded on the way in
        assert_eq!(absolutize_uri("file:/tmp/my dir/out.owl#").unwrap(), "file:///tmp/my%20dir/out.owl#");
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(absolutize_uri("http://localhost/").unwrap(), "http://localhost/");
        assert_eq!(absolutize_uri("file:/out.owl#").unwrap(), "file:/out.owl#");
        let relative = absolutize_uri("file:out.owl#").unwrap();
        assert!(relative.starts_with("file:///"));
        assert!(relative.ends_with("out.owl#"));
    }

    #[test]
    fn test_resolve_relative_terms() {
        let base = BaseIri::new("http://localhost/").unwrap();
        assert_eq!(base.resolve("Person/1").unwrap(), "http://localhost/Person/1");
        assert_eq!(
            base.resolve("http://other.org/x").unwrap(),
            "http://other.org/x"
        );
        assert_eq!(base.declared(), "http://localhost/");
    }
}
