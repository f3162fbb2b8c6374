//! Defines constant NamedNodeRefs for the RDF terms the exporter reads and writes,
//! from the RDF, RDFS, OWL, XSD and D2RQ vocabularies.

use oxigraph::model::NamedNodeRef;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const D2RQ_NS: &str = "http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#";

// namespaces used by generated mappings
pub const DEFAULT_MAP_NAMESPACE: &str = "file:tmp#";
pub const DEFAULT_INSTANCE_NAMESPACE: &str = "";
pub const DEFAULT_VOCAB_NAMESPACE: &str = "http://localhost/vocab/";
pub const DEFAULT_BASE_URI: &str = "http://localhost/";

// rdf
pub const TYPE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
pub const RDF_FIRST: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#first");
pub const RDF_REST: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#rest");
pub const RDF_NIL: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#nil");
pub const RDF_PROPERTY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#Property");

// rdfs
pub const LABEL: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#label");
pub const COMMENT: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#comment");
pub const SEE_ALSO: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#seeAlso");
pub const DEFINED_BY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#isDefinedBy");
pub const SUB_CLASS_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#subClassOf");
pub const SUB_PROPERTY_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#subPropertyOf");
pub const DOMAIN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#domain");
pub const RANGE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#range");
pub const RDFS_CLASS: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Class");
pub const RDFS_LITERAL: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Literal");
pub const RDFS_DATATYPE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Datatype");

// owl
pub const ONTOLOGY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Ontology");
pub const OWL_CLASS: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
pub const OWL_THING: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Thing");
pub const OWL_NOTHING: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Nothing");
pub const OBJECT_PROPERTY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#ObjectProperty");
pub const DATATYPE_PROPERTY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#DatatypeProperty");
pub const ANNOTATION_PROPERTY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#AnnotationProperty");
pub const FUNCTIONAL_PROPERTY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#FunctionalProperty");
pub const NAMED_INDIVIDUAL: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#NamedIndividual");
pub const RESTRICTION: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Restriction");
pub const ON_PROPERTY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#onProperty");
pub const SOME_VALUES_FROM: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#someValuesFrom");
pub const ALL_VALUES_FROM: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#allValuesFrom");
pub const MIN_CARDINALITY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#minCardinality");
pub const MAX_CARDINALITY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#maxCardinality");
pub const CARDINALITY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#cardinality");
pub const INTERSECTION_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#intersectionOf");
pub const UNION_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#unionOf");
pub const COMPLEMENT_OF: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#complementOf");
pub const EQUIVALENT_CLASS: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#equivalentClass");
pub const DISJOINT_WITH: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#disjointWith");
pub const VERSION_INFO: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#versionInfo");

// xsd
pub const XSD_STRING: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#string");
pub const XSD_INTEGER: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#integer");
pub const XSD_DECIMAL: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#decimal");
pub const XSD_DOUBLE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#double");
pub const XSD_BOOLEAN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#boolean");
pub const XSD_DATE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#date");
pub const XSD_DATE_TIME: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#dateTime");
pub const XSD_NON_NEGATIVE_INTEGER: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.w3.org/2001/XMLSchema#nonNegativeInteger");

// d2rq mapping vocabulary
pub const D2RQ_DATABASE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#Database");
pub const D2RQ_CLASS_MAP: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#ClassMap");
pub const D2RQ_PROPERTY_BRIDGE: NamedNodeRef<'_> = NamedNodeRef::new_unchecked(
    "http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#PropertyBridge",
);
pub const D2RQ_JDBC_DSN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#jdbcDSN");
pub const D2RQ_JDBC_DRIVER: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#jdbcDriver");
pub const D2RQ_USERNAME: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#username");
pub const D2RQ_PASSWORD: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#password");
pub const D2RQ_FETCH_SIZE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#fetchSize");
pub const D2RQ_RESULT_SIZE_LIMIT: NamedNodeRef<'_> = NamedNodeRef::new_unchecked(
    "http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#resultSizeLimit",
);
pub const D2RQ_DATA_STORAGE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#dataStorage");
pub const D2RQ_URI_PATTERN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#uriPattern");
pub const D2RQ_URI_COLUMN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#uriColumn");
pub const D2RQ_CLASS: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#class");
pub const D2RQ_CLASS_DEFINITION_LABEL: NamedNodeRef<'_> = NamedNodeRef::new_unchecked(
    "http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#classDefinitionLabel",
);
pub const D2RQ_BELONGS_TO_CLASS_MAP: NamedNodeRef<'_> = NamedNodeRef::new_unchecked(
    "http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#belongsToClassMap",
);
pub const D2RQ_PROPERTY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#property");
pub const D2RQ_PROPERTY_DEFINITION_LABEL: NamedNodeRef<'_> = NamedNodeRef::new_unchecked(
    "http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#propertyDefinitionLabel",
);
pub const D2RQ_COLUMN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#column");
pub const D2RQ_PATTERN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#pattern");
pub const D2RQ_DATATYPE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#datatype");
pub const D2RQ_LANG: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#lang");
pub const D2RQ_REFERS_TO_CLASS_MAP: NamedNodeRef<'_> = NamedNodeRef::new_unchecked(
    "http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#refersToClassMap",
);
pub const D2RQ_JOIN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("http://www.wiwiss.fu-berlin.de/suhl/bizer/D2RQ/0.1#join");

/// Prefixes every writer knows about, in declaration order.
pub const WELL_KNOWN_PREFIXES: [(&str, &str); 4] = [
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("owl", OWL_NS),
    ("xsd", XSD_NS),
];
