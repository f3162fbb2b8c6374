//! Ontology format conversion: RDF bytes in, a rendered ontology file out.

use crate::errors::{Result, TransformError};
use crate::ontology::OntologyManager;
use crate::options::OutputFormat;
use crate::render::render;
use crate::util::write_bytes_to_file;
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;

/// Normalizes a configured output path.
///
/// Everything before the first directory separator is dropped (the later of the first `/`
/// and the first `\`), then backslashes become forward slashes. A path without any separator
/// is returned unchanged.
pub fn coerce_output_path(path: &str) -> String {
    let slash = path.find('/');
    let backslash = path.find('\\');
    let cut = match (slash, backslash) {
        (None, None) => return path.to_string(),
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
    };
    path[cut..].replace('\\', "/")
}

/// File written for a coerced output path. Absolute paths go through a `file:` IRI; relative
/// ones stay relative to the working directory.
pub fn destination_file(coerced: &str) -> Result<PathBuf> {
    if !coerced.starts_with('/') {
        return Ok(PathBuf::from(coerced));
    }
    let iri = Url::parse(&format!("file://{}", coerced))
        .map_err(|e| TransformError::invalid_parameter("output_path", e.to_string()))?;
    debug!("Output IRI: {}", iri);
    iri.to_file_path()
        .map_err(|_| TransformError::invalid_parameter("output_path", format!("{} is not a file path", iri)))
}

/// What a conversion wrote.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub bytes: usize,
    pub axioms: usize,
    /// blake3 hash of the written bytes, hex encoded.
    pub hash: String,
}

/// Loads `rdf_bytes` as an ontology and writes it to `destination` in the syntax named by
/// `code`. Unknown codes write RDF/XML.
pub fn convert(code: i32, rdf_bytes: &[u8], destination: &Path) -> Result<ConversionReport> {
    let format = OutputFormat::from_code(code);
    if format == OutputFormat::Unknown {
        debug!("Output format code {} is not a named format, writing RDF/XML", code);
    }
    let manager = OntologyManager::new();
    let loaded = manager.load_from_bytes(rdf_bytes)?;
    let (bytes, axioms) = loaded.with(|ontology| render(format, ontology).map(|b| (b, ontology.len())))??;
    write_bytes_to_file(destination, &bytes)?;
    let hash = blake3::hash(&bytes).to_hex().to_string();
    info!("Wrote {} as {} (blake3 {})", destination.display(), format.effective().name(), hash);
    Ok(ConversionReport {
        path: destination.to_path_buf(),
        format: format.effective(),
        bytes: bytes.len(),
        axioms,
        hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_output_path() {
        assert_eq!(coerce_output_path("myfolder/output.owl"), "/output.owl");
        assert_eq!(coerce_output_path("C:\\data\\output.owl"), "/data/output.owl");
        assert_eq!(coerce_output_path("/tmp/out/output.owl"), "/tmp/out/output.owl");
        assert_eq!(coerce_output_path("output.owl"), "output.owl");
        assert_eq!(coerce_output_path(""), "");
    }

    #[test]
    fn test_destination_file() {
        assert_eq!(destination_file("/tmp/a b.owl").unwrap(), PathBuf::from("/tmp/a b.owl"));
        assert_eq!(destination_file("out.owl").unwrap(), PathBuf::from("out.owl"));
    }

    #[test]
    fn test_convert_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let ttl = b"<http://x.org/A> a <http://www.w3.org/2002/07/owl#Class> .\n";
        let err = convert(3, ttl, &dir.path().join("missing").join("out.ttl")).unwrap_err();
        assert!(matches!(err, TransformError::Io(_)));
    }
}
