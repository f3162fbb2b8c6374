//! Closed option types used across the pipeline: the ontology output format,
//! the RDF syntax of the intermediate graph and the cursor fetch size.

use crate::errors::{Result, TransformError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target syntax of the final ontology file, identified by its numeric code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Code 0. Never produced for a named code; renders as RDF/XML.
    #[default]
    Unknown,
    RdfXml,
    OwlXml,
    Turtle,
    DlSyntax,
    OwlFunctional,
    DlSyntaxHtml,
    Krss,
    Krss2,
    Latex,
    LatexAxiomsList,
    Manchester,
    Obo,
    PrefixOwl,
}

impl OutputFormat {
    /// All named formats in code order.
    pub const NAMED: [OutputFormat; 13] = [
        OutputFormat::RdfXml,
        OutputFormat::OwlXml,
        OutputFormat::Turtle,
        OutputFormat::DlSyntax,
        OutputFormat::OwlFunctional,
        OutputFormat::DlSyntaxHtml,
        OutputFormat::Krss,
        OutputFormat::Krss2,
        OutputFormat::Latex,
        OutputFormat::LatexAxiomsList,
        OutputFormat::Manchester,
        OutputFormat::Obo,
        OutputFormat::PrefixOwl,
    ];

    pub fn from_code(code: i32) -> Self {
        match code {
            1 => OutputFormat::RdfXml,
            2 => OutputFormat::OwlXml,
            3 => OutputFormat::Turtle,
            4 => OutputFormat::DlSyntax,
            5 => OutputFormat::OwlFunctional,
            6 => OutputFormat::DlSyntaxHtml,
            7 => OutputFormat::Krss,
            8 => OutputFormat::Krss2,
            9 => OutputFormat::Latex,
            10 => OutputFormat::LatexAxiomsList,
            11 => OutputFormat::Manchester,
            12 => OutputFormat::Obo,
            13 => OutputFormat::PrefixOwl,
            _ => OutputFormat::Unknown,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            OutputFormat::Unknown => 0,
            OutputFormat::RdfXml => 1,
            OutputFormat::OwlXml => 2,
            OutputFormat::Turtle => 3,
            OutputFormat::DlSyntax => 4,
            OutputFormat::OwlFunctional => 5,
            OutputFormat::DlSyntaxHtml => 6,
            OutputFormat::Krss => 7,
            OutputFormat::Krss2 => 8,
            OutputFormat::Latex => 9,
            OutputFormat::LatexAxiomsList => 10,
            OutputFormat::Manchester => 11,
            OutputFormat::Obo => 12,
            OutputFormat::PrefixOwl => 13,
        }
    }

    /// The format a writer actually uses: `Unknown` falls back to RDF/XML.
    pub fn effective(self) -> Self {
        match self {
            OutputFormat::Unknown => OutputFormat::RdfXml,
            other => other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Unknown => "Unknown",
            OutputFormat::RdfXml => "RDF/XML",
            OutputFormat::OwlXml => "OWL/XML",
            OutputFormat::Turtle => "Turtle",
            OutputFormat::DlSyntax => "DL-Syntax",
            OutputFormat::OwlFunctional => "OWL-Functional",
            OutputFormat::DlSyntaxHtml => "DL-Syntax-HTML",
            OutputFormat::Krss => "KRSS",
            OutputFormat::Krss2 => "KRSS2",
            OutputFormat::Latex => "Latex",
            OutputFormat::LatexAxiomsList => "Latex-Axioms-List",
            OutputFormat::Manchester => "Manchester",
            OutputFormat::Obo => "OBO",
            OutputFormat::PrefixOwl => "Prefix-OWL",
        }
    }

    /// Conventional file extension for the rendered output.
    pub fn extension(self) -> &'static str {
        match self.effective() {
            OutputFormat::OwlXml => "owx",
            OutputFormat::Turtle => "ttl",
            OutputFormat::DlSyntax => "txt",
            OutputFormat::OwlFunctional | OutputFormat::PrefixOwl => "ofn",
            OutputFormat::DlSyntaxHtml => "html",
            OutputFormat::Krss | OutputFormat::Krss2 => "krss",
            OutputFormat::Latex | OutputFormat::LatexAxiomsList => "tex",
            OutputFormat::Manchester => "omn",
            OutputFormat::Obo => "obo",
            _ => "owl",
        }
    }
}

impl From<i32> for OutputFormat {
    fn from(code: i32) -> Self {
        OutputFormat::from_code(code)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = TransformError;

    /// Accepts a numeric code or a format name (case-insensitive, `-`, `_` and `/` ignored).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Ok(OutputFormat::from_code(code));
        }
        let wanted = normalize_name(s);
        OutputFormat::NAMED
            .iter()
            .copied()
            .find(|f| normalize_name(f.name()) == wanted)
            .ok_or_else(|| TransformError::invalid_parameter("format", format!("unknown format '{}'", s)))
    }
}

fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | '/' | ' '))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Concrete syntax of the intermediate RDF graph.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
pub enum RdfSyntax {
    RdfXml,
    RdfXmlAbbrev,
    #[default]
    NTriples,
    Turtle,
    N3,
}

impl RdfSyntax {
    pub fn name(self) -> &'static str {
        match self {
            RdfSyntax::RdfXml => "RDF/XML",
            RdfSyntax::RdfXmlAbbrev => "RDF/XML-ABBREV",
            RdfSyntax::NTriples => "N-TRIPLE",
            RdfSyntax::Turtle => "TURTLE",
            RdfSyntax::N3 => "N3",
        }
    }

    pub fn is_xml(self) -> bool {
        matches!(self, RdfSyntax::RdfXml | RdfSyntax::RdfXmlAbbrev)
    }
}

impl fmt::Display for RdfSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RdfSyntax {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RDF/XML" | "RDFXML" => Ok(RdfSyntax::RdfXml),
            "RDF/XML-ABBREV" => Ok(RdfSyntax::RdfXmlAbbrev),
            "N-TRIPLE" | "N-TRIPLES" | "NTRIPLES" | "NT" => Ok(RdfSyntax::NTriples),
            "TURTLE" | "TTL" => Ok(RdfSyntax::Turtle),
            "N3" => Ok(RdfSyntax::N3),
            other => Err(TransformError::Serialization(format!(
                "unsupported RDF syntax '{}'",
                other
            ))),
        }
    }
}

/// How many rows the driver buffers per round trip.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum FetchSize {
    Rows(u32),
    /// Row-at-a-time streaming; drivers that know this convention spell it `i32::MIN`.
    Streaming,
}

impl FetchSize {
    /// The value a JDBC-style driver would receive.
    pub fn as_driver_value(self) -> i32 {
        match self {
            FetchSize::Rows(n) => i32::try_from(n).unwrap_or(i32::MAX),
            FetchSize::Streaming => i32::MIN,
        }
    }

    /// Rows to buffer before handing them on; streaming hands over every row.
    pub fn batch_len(self) -> usize {
        match self {
            FetchSize::Rows(n) => n.max(1) as usize,
            FetchSize::Streaming => 1,
        }
    }

    pub fn is_streaming(self) -> bool {
        matches!(self, FetchSize::Streaming)
    }
}

impl From<i32> for FetchSize {
    fn from(value: i32) -> Self {
        if value == i32::MIN {
            FetchSize::Streaming
        } else {
            FetchSize::Rows(value.max(1) as u32)
        }
    }
}

impl fmt::Display for FetchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchSize::Rows(n) => write!(f, "{}", n),
            FetchSize::Streaming => write!(f, "streaming"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_codes() {
        for (i, format) in OutputFormat::NAMED.iter().enumerate() {
            assert_eq!(format.code(), i as i32 + 1);
            assert_eq!(OutputFormat::from_code(format.code()), *format);
            assert_ne!(*format, OutputFormat::Unknown);
        }
        assert_eq!(OutputFormat::from_code(0), OutputFormat::Unknown);
        assert_eq!(OutputFormat::from_code(14), OutputFormat::Unknown);
        assert_eq!(OutputFormat::from_code(-3), OutputFormat::Unknown);
        assert_eq!(OutputFormat::Unknown.effective(), OutputFormat::RdfXml);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("3".parse::<OutputFormat>().unwrap(), OutputFormat::Turtle);
        assert_eq!("owl/xml".parse::<OutputFormat>().unwrap(), OutputFormat::OwlXml);
        assert_eq!("latex_axioms_list".parse::<OutputFormat>().unwrap(), OutputFormat::LatexAxiomsList);
        assert_eq!("99".parse::<OutputFormat>().unwrap(), OutputFormat::Unknown);
        assert!("docx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_rdf_syntax() {
        assert_eq!(RdfSyntax::default(), RdfSyntax::NTriples);
        assert_eq!("ttl".parse::<RdfSyntax>().unwrap(), RdfSyntax::Turtle);
        assert!("RDF/XML-ABBREV".parse::<RdfSyntax>().unwrap().is_xml());
        assert!("JSON".parse::<RdfSyntax>().is_err());
    }

    #[test]
    fn test_fetch_size_sentinel() {
        assert_eq!(FetchSize::Streaming.as_driver_value(), i32::MIN);
        assert_eq!(FetchSize::from(i32::MIN), FetchSize::Streaming);
        assert_eq!(FetchSize::from(0), FetchSize::Rows(1));
        assert_eq!(FetchSize::Rows(500).batch_len(), 500);
        assert_eq!(FetchSize::Streaming.batch_len(), 1);
    }
}
