//! The transformer facade: `transform` (database to RDF bytes), `convert` (RDF bytes to an
//! ontology file) and `export`, which runs both.
//!
//! A [`DbTransformer`] only holds its [`ExportConfig`] and driver set. Every call builds its
//! own mapping, connection, graph and ontology registry.

use crate::convert::{self, coerce_output_path, destination_file, ConversionReport};
use crate::driver::DriverRegistry;
use crate::errors::{Result, TransformError};
use crate::mapping::{resolve_mapping, Mapping};
use crate::materialize::{materialize_with, MaterializeOptions};
use crate::namespaces::resolve_base_uri;
use crate::options::{OutputFormat, RdfSyntax};
use crate::params::ConnectionParameters;
use crate::serialize::serialize;
use crate::settings::Settings;
use derive_builder::Builder;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Initializes logging for the dbtransformer library.
///
/// If `DBTRANSFORMER_LOG` is set, `RUST_LOG` is set to its value, so it takes precedence.
/// The logger itself (e.g. `env_logger::init()`) must be initialized after this call.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("DBTRANSFORMER_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}

#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
#[builder(setter(into, strip_option), default)]
pub struct ExportConfig {
    /// Explicit D2RQ mapping document. When absent the mapping is generated from the schema.
    pub mapping_file: Option<PathBuf>,
    /// Output path after coercion, see [`coerce_output_path`].
    #[builder(setter(custom))]
    pub output_path: Option<String>,
    /// Base URI for relative terms. Falls back to `file:<output>#`, then `http://localhost/`.
    pub base_uri: Option<String>,
    pub format: OutputFormat,
    /// Syntax of the intermediate graph returned by `transform`.
    pub syntax: RdfSyntax,
    /// Emit the class and property declarations alongside the instance data.
    pub vocabulary: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            mapping_file: None,
            output_path: None,
            base_uri: None,
            format: OutputFormat::RdfXml,
            syntax: RdfSyntax::NTriples,
            vocabulary: true,
        }
    }
}

impl ExportConfigBuilder {
    /// Sets the output path, applying the output path coercion.
    pub fn output_path(&mut self, path: &str) -> &mut Self {
        self.output_path = Some(non_empty(path).map(coerce_output_path));
        self
    }
}

impl ExportConfig {
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }

    /// Export configuration from a settings document.
    pub fn from_settings(settings: &Settings) -> Self {
        ExportConfig {
            output_path: non_empty(&settings.output_path).map(coerce_output_path),
            base_uri: non_empty(&settings.base_uri).map(str::to_string),
            format: settings.output_format(),
            ..Default::default()
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

pub struct DbTransformer {
    config: ExportConfig,
    registry: DriverRegistry,
}

impl Default for DbTransformer {
    fn default() -> Self {
        DbTransformer::new(ExportConfig::default())
    }
}

impl DbTransformer {
    pub fn new(config: ExportConfig) -> Self {
        Self::with_registry(config, DriverRegistry::default())
    }

    pub fn with_registry(config: ExportConfig, registry: DriverRegistry) -> Self {
        DbTransformer { config, registry }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Sets the destination of `convert`. Everything before the first directory separator
    /// is dropped and backslashes become `/`.
    pub fn set_output(&mut self, path: &str) {
        self.config.output_path = non_empty(path).map(coerce_output_path);
        debug!("Output path set to {:?}", self.config.output_path);
    }

    pub fn output_path(&self) -> Option<&str> {
        self.config.output_path.as_deref()
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.config.format = format;
    }

    pub fn set_mapping_file(&mut self, path: Option<PathBuf>) {
        self.config.mapping_file = path;
    }

    /// The base URI an export with `explicit` would use.
    pub fn base_uri(&self, explicit: Option<&str>) -> String {
        let explicit = explicit.or(self.config.base_uri.as_deref());
        resolve_base_uri(explicit, self.config.output_path.as_deref())
    }

    /// Resolves the mapping for `params`: the configured mapping file, or one generated from
    /// the schema of the database.
    pub fn generate_mapping(&self, params: &ConnectionParameters, base_uri: Option<&str>) -> Result<Mapping> {
        let base = self.base_uri(base_uri);
        let mapping = resolve_mapping(
            Some(params),
            self.config.mapping_file.as_deref(),
            &base,
            &self.registry,
        )?;
        for warning in &mapping.warnings {
            debug!("Mapping warning: {}", warning);
        }
        Ok(mapping)
    }

    /// Dumps the database as an RDF graph serialized in the configured syntax.
    pub fn transform(&self, params: &ConnectionParameters, base_uri: Option<&str>) -> Result<Vec<u8>> {
        let base = self.base_uri(base_uri);
        info!("Transforming {:?} with base URI {}", params.connection_string(), base);
        let mapping = resolve_mapping(
            Some(params),
            self.config.mapping_file.as_deref(),
            &base,
            &self.registry,
        )?;
        if !mapping.warnings.is_empty() {
            warn!("Mapping built with {} warnings", mapping.warnings.len());
        }
        let options = MaterializeOptions {
            vocabulary: self.config.vocabulary,
            lift_result_limit: true,
        };
        let graph = materialize_with(&mapping, params, &base, &self.registry, options)?;
        info!("Materialized {} triples", graph.len());
        serialize(graph, Some(&base), self.config.syntax)
    }

    /// Writes `rdf_bytes` as an ontology in the format named by `code` to the configured
    /// output path.
    pub fn convert(&self, code: i32, rdf_bytes: &[u8]) -> Result<ConversionReport> {
        let output = self
            .config
            .output_path
            .as_deref()
            .ok_or_else(|| TransformError::invalid_parameter("output_path", "no output path set"))?;
        let destination = destination_file(output)?;
        convert::convert(code, rdf_bytes, &destination)
    }

    /// `transform` followed by `convert` with the configured format.
    pub fn export(&self, params: &ConnectionParameters) -> Result<ConversionReport> {
        if self.config.output_path.is_none() {
            return Err(TransformError::invalid_parameter("output_path", "no output path set"));
        }
        let bytes = self.transform(params, None)?;
        self.convert(self.config.format.code(), &bytes)
    }
}
