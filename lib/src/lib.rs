//! Export relational databases as RDF graphs and OWL ontologies.
//!
//! The pipeline resolves a D2RQ mapping (from a document or from the live schema),
//! materializes it into an RDF graph, serializes the graph and finally re-reads it as an
//! ontology that is written in one of thirteen output syntaxes.

pub mod api;
pub mod consts;
pub mod convert;
pub mod driver;
pub mod errors;
pub mod mapping;
pub mod materialize;
pub mod namespaces;
pub mod ontology;
pub mod options;
pub mod params;
pub mod rdfxml;
pub mod render;
pub mod serialize;
pub mod settings;
pub mod util;

pub use api::{init_logging, DbTransformer, ExportConfig};
pub use convert::ConversionReport;
pub use errors::{Result, TransformError};
pub use options::{OutputFormat, RdfSyntax};
pub use params::ConnectionParameters;
pub use settings::Settings;
