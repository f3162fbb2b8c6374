//! OWL view of an RDF graph: entities, class expressions and axioms.
//!
//! Ontologies are read from RDF triples ([`rdf`]), OWL/XML ([`owlxml`]) or functional syntax
//! ([`functional`]) and are held by an [`OntologyManager`] while they are rendered.

pub mod functional;
pub mod manager;
pub mod owlxml;
pub mod rdf;

pub use manager::{LoadedOntology, OntologyManager, SourceSyntax};

use crate::consts::{OWL_NOTHING, OWL_THING};
use oxigraph::model::{Literal, Term};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Class,
    ObjectProperty,
    DataProperty,
    AnnotationProperty,
    NamedIndividual,
    Datatype,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Class,
        EntityKind::ObjectProperty,
        EntityKind::DataProperty,
        EntityKind::AnnotationProperty,
        EntityKind::NamedIndividual,
        EntityKind::Datatype,
    ];

    /// Name used by the functional and OWL/XML syntaxes.
    pub fn owl_name(self) -> &'static str {
        match self {
            EntityKind::Class => "Class",
            EntityKind::ObjectProperty => "ObjectProperty",
            EntityKind::DataProperty => "DataProperty",
            EntityKind::AnnotationProperty => "AnnotationProperty",
            EntityKind::NamedIndividual => "NamedIndividual",
            EntityKind::Datatype => "Datatype",
        }
    }

    pub fn from_owl_name(name: &str) -> Option<Self> {
        EntityKind::ALL.iter().copied().find(|k| k.owl_name() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.owl_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassExpression {
    Class(String),
    IntersectionOf(Vec<ClassExpression>),
    UnionOf(Vec<ClassExpression>),
    ComplementOf(Box<ClassExpression>),
    SomeValuesFrom {
        property: String,
        filler: Box<ClassExpression>,
    },
    AllValuesFrom {
        property: String,
        filler: Box<ClassExpression>,
    },
    MinCardinality { cardinality: u32, property: String },
    MaxCardinality { cardinality: u32, property: String },
    ExactCardinality { cardinality: u32, property: String },
}

impl ClassExpression {
    pub fn class(iri: impl Into<String>) -> Self {
        ClassExpression::Class(iri.into())
    }

    pub fn thing() -> Self {
        ClassExpression::Class(OWL_THING.as_str().to_string())
    }

    pub fn as_class(&self) -> Option<&str> {
        match self {
            ClassExpression::Class(iri) => Some(iri),
            _ => None,
        }
    }

    /// Named classes mentioned anywhere in the expression.
    pub fn named_classes<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ClassExpression::Class(iri) => out.push(iri),
            ClassExpression::IntersectionOf(ops) | ClassExpression::UnionOf(ops) => {
                ops.iter().for_each(|op| op.named_classes(out))
            }
            ClassExpression::ComplementOf(inner) => inner.named_classes(out),
            ClassExpression::SomeValuesFrom { filler, .. }
            | ClassExpression::AllValuesFrom { filler, .. } => filler.named_classes(out),
            _ => {}
        }
    }

    /// Object properties used in restrictions.
    pub fn properties<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ClassExpression::IntersectionOf(ops) | ClassExpression::UnionOf(ops) => {
                ops.iter().for_each(|op| op.properties(out))
            }
            ClassExpression::ComplementOf(inner) => inner.properties(out),
            ClassExpression::SomeValuesFrom { property, filler }
            | ClassExpression::AllValuesFrom { property, filler } => {
                out.push(property);
                filler.properties(out);
            }
            ClassExpression::MinCardinality { property, .. }
            | ClassExpression::MaxCardinality { property, .. }
            | ClassExpression::ExactCardinality { property, .. } => out.push(property),
            ClassExpression::Class(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Axiom {
    Declaration(EntityKind, String),
    SubClassOf(ClassExpression, ClassExpression),
    EquivalentClasses(Vec<ClassExpression>),
    DisjointClasses(Vec<ClassExpression>),
    SubObjectPropertyOf(String, String),
    SubDataPropertyOf(String, String),
    ObjectPropertyDomain(String, ClassExpression),
    ObjectPropertyRange(String, ClassExpression),
    DataPropertyDomain(String, ClassExpression),
    /// Property and datatype IRI.
    DataPropertyRange(String, String),
    FunctionalObjectProperty(String),
    FunctionalDataProperty(String),
    /// Class and individual.
    ClassAssertion(ClassExpression, String),
    ObjectPropertyAssertion {
        property: String,
        subject: String,
        object: String,
    },
    DataPropertyAssertion {
        property: String,
        subject: String,
        value: Literal,
    },
    AnnotationAssertion {
        property: String,
        subject: String,
        value: Term,
    },
}

impl Axiom {
    /// Functional-syntax name of the axiom type.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Axiom::Declaration(..) => "Declaration",
            Axiom::SubClassOf(..) => "SubClassOf",
            Axiom::EquivalentClasses(..) => "EquivalentClasses",
            Axiom::DisjointClasses(..) => "DisjointClasses",
            Axiom::SubObjectPropertyOf(..) => "SubObjectPropertyOf",
            Axiom::SubDataPropertyOf(..) => "SubDataPropertyOf",
            Axiom::ObjectPropertyDomain(..) => "ObjectPropertyDomain",
            Axiom::ObjectPropertyRange(..) => "ObjectPropertyRange",
            Axiom::DataPropertyDomain(..) => "DataPropertyDomain",
            Axiom::DataPropertyRange(..) => "DataPropertyRange",
            Axiom::FunctionalObjectProperty(..) => "FunctionalObjectProperty",
            Axiom::FunctionalDataProperty(..) => "FunctionalDataProperty",
            Axiom::ClassAssertion(..) => "ClassAssertion",
            Axiom::ObjectPropertyAssertion { .. } => "ObjectPropertyAssertion",
            Axiom::DataPropertyAssertion { .. } => "DataPropertyAssertion",
            Axiom::AnnotationAssertion { .. } => "AnnotationAssertion",
        }
    }

    pub fn is_logical(&self) -> bool {
        !matches!(self, Axiom::Declaration(..) | Axiom::AnnotationAssertion { .. })
    }
}

fn is_builtin_class(iri: &str) -> bool {
    iri == OWL_THING.as_str() || iri == OWL_NOTHING.as_str()
}

#[derive(Debug, Clone, Default)]
pub struct Ontology {
    pub iri: Option<String>,
    /// Annotations on the ontology itself.
    pub annotations: Vec<(String, Term)>,
    pub prefixes: Vec<(String, String)>,
    axioms: Vec<Axiom>,
    seen: HashSet<Axiom>,
    /// Input structures that could not be read into axioms.
    pub unparsed: usize,
}

impl Ontology {
    pub fn new(iri: Option<String>) -> Self {
        Ontology {
            iri,
            ..Default::default()
        }
    }

    /// Adds an axiom unless an equal one is already present.
    pub fn add(&mut self, axiom: Axiom) -> bool {
        if self.seen.contains(&axiom) {
            return false;
        }
        self.seen.insert(axiom.clone());
        self.axioms.push(axiom);
        true
    }

    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    pub fn axiom_set(&self) -> HashSet<&Axiom> {
        self.axioms.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    pub fn declares(&self, kind: EntityKind, iri: &str) -> bool {
        self.seen.contains(&Axiom::Declaration(kind, iri.to_string()))
    }

    /// Declared entities of one kind, sorted by IRI.
    pub fn entities(&self, kind: EntityKind) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .axioms
            .iter()
            .filter_map(|a| match a {
                Axiom::Declaration(k, iri) if *k == kind => Some(iri.as_str()),
                _ => None,
            })
            .collect();
        set.into_iter().collect()
    }

    /// Axioms that mention `iri` as their main subject, in insertion order.
    pub fn axioms_about<'a>(&'a self, iri: &'a str) -> impl Iterator<Item = &'a Axiom> + 'a {
        self.axioms.iter().filter(move |a| match a {
            Axiom::Declaration(_, e) => e == iri,
            Axiom::SubClassOf(sub, _) => sub.as_class() == Some(iri),
            Axiom::EquivalentClasses(ops) | Axiom::DisjointClasses(ops) => {
                ops.first().and_then(ClassExpression::as_class) == Some(iri)
            }
            Axiom::SubObjectPropertyOf(p, _)
            | Axiom::SubDataPropertyOf(p, _)
            | Axiom::ObjectPropertyDomain(p, _)
            | Axiom::ObjectPropertyRange(p, _)
            | Axiom::DataPropertyDomain(p, _)
            | Axiom::DataPropertyRange(p, _)
            | Axiom::FunctionalObjectProperty(p)
            | Axiom::FunctionalDataProperty(p) => p == iri,
            Axiom::ClassAssertion(_, i) => i == iri,
            Axiom::ObjectPropertyAssertion { subject, .. }
            | Axiom::DataPropertyAssertion { subject, .. }
            | Axiom::AnnotationAssertion { subject, .. } => subject == iri,
        })
    }

    /// Adds the declarations implied by the axioms but not stated.
    pub fn add_missing_declarations(&mut self) {
        let mut implied: Vec<(EntityKind, String)> = Vec::new();
        let push_classes = |ce: &ClassExpression, implied: &mut Vec<(EntityKind, String)>| {
            let mut classes = Vec::new();
            ce.named_classes(&mut classes);
            let mut properties = Vec::new();
            ce.properties(&mut properties);
            implied.extend(
                classes
                    .into_iter()
                    .filter(|c| !is_builtin_class(c))
                    .map(|c| (EntityKind::Class, c.to_string())),
            );
            implied.extend(
                properties
                    .into_iter()
                    .map(|p| (EntityKind::ObjectProperty, p.to_string())),
            );
        };
        for axiom in &self.axioms {
            match axiom {
                Axiom::Declaration(..) => {}
                Axiom::SubClassOf(a, b) => {
                    push_classes(a, &mut implied);
                    push_classes(b, &mut implied);
                }
                Axiom::EquivalentClasses(ops) | Axiom::DisjointClasses(ops) => {
                    ops.iter().for_each(|op| push_classes(op, &mut implied))
                }
                Axiom::SubObjectPropertyOf(a, b) => {
                    implied.push((EntityKind::ObjectProperty, a.clone()));
                    implied.push((EntityKind::ObjectProperty, b.clone()));
                }
                Axiom::SubDataPropertyOf(a, b) => {
                    implied.push((EntityKind::DataProperty, a.clone()));
                    implied.push((EntityKind::DataProperty, b.clone()));
                }
                Axiom::ObjectPropertyDomain(p, ce) | Axiom::ObjectPropertyRange(p, ce) => {
                    implied.push((EntityKind::ObjectProperty, p.clone()));
                    push_classes(ce, &mut implied);
                }
                Axiom::DataPropertyDomain(p, ce) => {
                    implied.push((EntityKind::DataProperty, p.clone()));
                    push_classes(ce, &mut implied);
                }
                Axiom::DataPropertyRange(p, _) | Axiom::FunctionalDataProperty(p) => {
                    implied.push((EntityKind::DataProperty, p.clone()))
                }
                Axiom::FunctionalObjectProperty(p) => {
                    implied.push((EntityKind::ObjectProperty, p.clone()))
                }
                Axiom::ClassAssertion(ce, i) => {
                    push_classes(ce, &mut implied);
                    implied.push((EntityKind::NamedIndividual, i.clone()));
                }
                Axiom::ObjectPropertyAssertion {
                    property,
                    subject,
                    object,
                } => {
                    implied.push((EntityKind::ObjectProperty, property.clone()));
                    implied.push((EntityKind::NamedIndividual, subject.clone()));
                    implied.push((EntityKind::NamedIndividual, object.clone()));
                }
                Axiom::DataPropertyAssertion {
                    property, subject, ..
                } => {
                    implied.push((EntityKind::DataProperty, property.clone()));
                    implied.push((EntityKind::NamedIndividual, subject.clone()));
                }
                Axiom::AnnotationAssertion { property, .. } => {
                    if !crate::ontology::rdf::is_builtin_annotation(property) {
                        implied.push((EntityKind::AnnotationProperty, property.clone()))
                    }
                }
            }
        }
        for (kind, iri) in implied {
            self.add(Axiom::Declaration(kind, iri));
        }
    }

    /// Axiom counts per axiom type, in first-seen order.
    pub fn metrics(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for axiom in &self.axioms {
            let name = axiom.kind_name();
            match counts.iter_mut().find(|(n, _)| *n == name) {
                Some((_, c)) => *c += 1,
                None => counts.push((name, 1)),
            }
        }
        counts
    }
}
