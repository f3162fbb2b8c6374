//! Reads an ontology out of RDF triples and writes it back as triples.
//!
//! Reading is lenient: triples that do not fit the axiom model are counted in
//! [`Ontology::unparsed`] and reported, never rejected.

use super::{Axiom, ClassExpression, EntityKind, Ontology};
use crate::consts::*;
use crate::errors::{Result, TransformError};
use log::{debug, warn};
use oxigraph::model::{
    BlankNode, Literal, NamedNode, NamedNodeRef, NamedOrBlankNode, Term, Triple,
};
use std::collections::{HashMap, HashSet};

const BUILTIN_ANNOTATIONS: [NamedNodeRef<'static>; 5] =
    [LABEL, COMMENT, SEE_ALSO, DEFINED_BY, VERSION_INFO];

/// Annotation properties every OWL tool knows without a declaration.
pub fn is_builtin_annotation(iri: &str) -> bool {
    BUILTIN_ANNOTATIONS.iter().any(|p| p.as_str() == iri)
}

fn is_reserved(iri: &str) -> bool {
    [RDF_NS, RDFS_NS, OWL_NS, XSD_NS]
        .iter()
        .any(|ns| iri.starts_with(ns))
}

fn is_datatype(iri: &str) -> bool {
    iri.starts_with(XSD_NS) || iri == RDFS_LITERAL.as_str()
}

fn declared_kind(class: NamedNodeRef<'_>) -> Option<EntityKind> {
    match class {
        c if c == OWL_CLASS || c == RDFS_CLASS => Some(EntityKind::Class),
        c if c == OBJECT_PROPERTY => Some(EntityKind::ObjectProperty),
        c if c == DATATYPE_PROPERTY => Some(EntityKind::DataProperty),
        c if c == ANNOTATION_PROPERTY => Some(EntityKind::AnnotationProperty),
        c if c == NAMED_INDIVIDUAL => Some(EntityKind::NamedIndividual),
        c if c == RDFS_DATATYPE => Some(EntityKind::Datatype),
        _ => None,
    }
}

struct GraphReader<'a> {
    blank_triples: HashMap<&'a BlankNode, Vec<&'a Triple>>,
    kinds: HashMap<&'a str, HashSet<EntityKind>>,
    used_blanks: HashSet<&'a BlankNode>,
}

impl<'a> GraphReader<'a> {
    fn new(triples: &'a [Triple]) -> Self {
        let mut blank_triples: HashMap<&BlankNode, Vec<&Triple>> = HashMap::new();
        let mut kinds: HashMap<&str, HashSet<EntityKind>> = HashMap::new();
        for t in triples {
            match &t.subject {
                NamedOrBlankNode::BlankNode(b) => blank_triples.entry(b).or_default().push(t),
                NamedOrBlankNode::NamedNode(s) => {
                    if t.predicate.as_ref() != TYPE {
                        continue;
                    }
                    if let Term::NamedNode(o) = &t.object {
                        if let Some(kind) = declared_kind(o.as_ref()) {
                            kinds.entry(s.as_str()).or_default().insert(kind);
                        }
                    }
                }
            }
        }
        GraphReader {
            blank_triples,
            kinds,
            used_blanks: HashSet::new(),
        }
    }

    fn is(&self, iri: &str, kind: EntityKind) -> bool {
        self.kinds.get(iri).is_some_and(|k| k.contains(&kind))
    }

    fn value(&self, node: &BlankNode, predicate: NamedNodeRef<'_>) -> Option<&'a Term> {
        self.blank_triples
            .get(node)?
            .iter()
            .copied()
            .find(|t| t.predicate.as_ref() == predicate)
            .map(|t| &t.object)
    }

    fn class_expression(&mut self, term: &'a Term) -> Option<ClassExpression> {
        let node = match term {
            Term::NamedNode(n) => return Some(ClassExpression::Class(n.as_str().to_string())),
            Term::BlankNode(b) => b,
            _ => return None,
        };
        self.used_blanks.insert(node);
        if let Some(list) = self.value(node, INTERSECTION_OF) {
            return self.list(list).map(ClassExpression::IntersectionOf);
        }
        if let Some(list) = self.value(node, UNION_OF) {
            return self.list(list).map(ClassExpression::UnionOf);
        }
        if let Some(inner) = self.value(node, COMPLEMENT_OF) {
            return self
                .class_expression(inner)
                .map(|ce| ClassExpression::ComplementOf(Box::new(ce)));
        }
        let property = match self.value(node, ON_PROPERTY)? {
            Term::NamedNode(p) => p.as_str().to_string(),
            _ => return None,
        };
        if let Some(filler) = self.value(node, SOME_VALUES_FROM) {
            let filler = Box::new(self.class_expression(filler)?);
            return Some(ClassExpression::SomeValuesFrom { property, filler });
        }
        if let Some(filler) = self.value(node, ALL_VALUES_FROM) {
            let filler = Box::new(self.class_expression(filler)?);
            return Some(ClassExpression::AllValuesFrom { property, filler });
        }
        let cardinality = |term: &Term| match term {
            Term::Literal(l) => l.value().trim().parse::<u32>().ok(),
            _ => None,
        };
        if let Some(n) = self.value(node, MIN_CARDINALITY) {
            let cardinality = cardinality(n)?;
            return Some(ClassExpression::MinCardinality { cardinality, property });
        }
        if let Some(n) = self.value(node, MAX_CARDINALITY) {
            let cardinality = cardinality(n)?;
            return Some(ClassExpression::MaxCardinality { cardinality, property });
        }
        if let Some(n) = self.value(node, CARDINALITY) {
            let cardinality = cardinality(n)?;
            return Some(ClassExpression::ExactCardinality { cardinality, property });
        }
        None
    }

    fn list(&mut self, head: &'a Term) -> Option<Vec<ClassExpression>> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut current = head;
        loop {
            let node = match current {
                Term::NamedNode(n) if n.as_ref() == RDF_NIL => return Some(items),
                Term::BlankNode(b) if seen.insert(b) => b,
                _ => return None,
            };
            self.used_blanks.insert(node);
            let first = self.value(node, RDF_FIRST)?;
            items.push(self.class_expression(first)?);
            current = self.value(node, RDF_REST)?;
        }
    }
}

/// Interprets `triples` as an OWL ontology.
pub fn from_triples(triples: &[Triple], prefixes: &[(String, String)]) -> Ontology {
    let mut reader = GraphReader::new(triples);
    let ontology_iri = triples.iter().find_map(|t| match (&t.subject, &t.object) {
        (NamedOrBlankNode::NamedNode(s), Term::NamedNode(o))
            if t.predicate.as_ref() == TYPE && o.as_ref() == ONTOLOGY =>
        {
            Some(s.as_str().to_string())
        }
        _ => None,
    });
    let mut ontology = Ontology::new(ontology_iri.clone());
    ontology.prefixes = prefixes.to_vec();
    let mut unparsed = 0usize;

    for t in triples {
        let subject = match &t.subject {
            NamedOrBlankNode::NamedNode(s) => s.as_str(),
            NamedOrBlankNode::BlankNode(_) => continue,
        };
        let predicate = t.predicate.as_ref();
        let is_ontology = ontology_iri.as_deref() == Some(subject);

        if predicate == TYPE {
            let axiom = match &t.object {
                Term::NamedNode(o) if o.as_ref() == ONTOLOGY && is_ontology => continue,
                Term::NamedNode(o) => match declared_kind(o.as_ref()) {
                    Some(kind) => Some(Axiom::Declaration(kind, subject.to_string())),
                    None if o.as_ref() == FUNCTIONAL_PROPERTY => {
                        Some(if reader.is(subject, EntityKind::DataProperty) {
                            Axiom::FunctionalDataProperty(subject.to_string())
                        } else {
                            Axiom::FunctionalObjectProperty(subject.to_string())
                        })
                    }
                    None if is_reserved(o.as_str()) => None,
                    None => Some(Axiom::ClassAssertion(
                        ClassExpression::Class(o.as_str().to_string()),
                        subject.to_string(),
                    )),
                },
                other => reader
                    .class_expression(other)
                    .map(|ce| Axiom::ClassAssertion(ce, subject.to_string())),
            };
            match axiom {
                Some(axiom) => {
                    ontology.add(axiom);
                }
                None => unparsed += 1,
            }
            continue;
        }

        if is_ontology && !matches!(t.object, Term::BlankNode(_)) {
            ontology
                .annotations
                .push((predicate.as_str().to_string(), t.object.clone()));
            continue;
        }

        let s = subject.to_string();
        let named_object = match &t.object {
            Term::NamedNode(o) => Some(o.as_str().to_string()),
            _ => None,
        };
        let axiom = if predicate == SUB_CLASS_OF {
            reader
                .class_expression(&t.object)
                .map(|o| Axiom::SubClassOf(ClassExpression::Class(s), o))
        } else if predicate == EQUIVALENT_CLASS {
            reader
                .class_expression(&t.object)
                .map(|o| Axiom::EquivalentClasses(vec![ClassExpression::Class(s), o]))
        } else if predicate == DISJOINT_WITH {
            reader
                .class_expression(&t.object)
                .map(|o| Axiom::DisjointClasses(vec![ClassExpression::Class(s), o]))
        } else if predicate == SUB_PROPERTY_OF {
            named_object.and_then(|o| {
                if reader.is(&s, EntityKind::AnnotationProperty) {
                    None
                } else if reader.is(&s, EntityKind::DataProperty) || reader.is(&o, EntityKind::DataProperty) {
                    Some(Axiom::SubDataPropertyOf(s, o))
                } else {
                    Some(Axiom::SubObjectPropertyOf(s, o))
                }
            })
        } else if predicate == DOMAIN {
            if reader.is(&s, EntityKind::AnnotationProperty) {
                None
            } else {
                let data = reader.is(&s, EntityKind::DataProperty);
                reader.class_expression(&t.object).map(|ce| {
                    if data {
                        Axiom::DataPropertyDomain(s, ce)
                    } else {
                        Axiom::ObjectPropertyDomain(s, ce)
                    }
                })
            }
        } else if predicate == RANGE {
            if reader.is(&s, EntityKind::AnnotationProperty) {
                None
            } else {
                match named_object {
                    Some(o)
                        if reader.is(&s, EntityKind::DataProperty)
                            || (!reader.is(&s, EntityKind::ObjectProperty) && is_datatype(&o)) =>
                    {
                        Some(Axiom::DataPropertyRange(s, o))
                    }
                    _ => reader
                        .class_expression(&t.object)
                        .map(|ce| Axiom::ObjectPropertyRange(s, ce)),
                }
            }
        } else if is_reserved(predicate.as_str()) && !is_builtin_annotation(predicate.as_str()) {
            None
        } else {
            let p = predicate.as_str();
            match &t.object {
                Term::NamedNode(o) if reader.is(p, EntityKind::ObjectProperty) => {
                    Some(Axiom::ObjectPropertyAssertion {
                        property: p.to_string(),
                        subject: s,
                        object: o.as_str().to_string(),
                    })
                }
                Term::Literal(l) if reader.is(p, EntityKind::DataProperty) => {
                    Some(Axiom::DataPropertyAssertion {
                        property: p.to_string(),
                        subject: s,
                        value: l.clone(),
                    })
                }
                Term::NamedNode(_) | Term::Literal(_) => Some(Axiom::AnnotationAssertion {
                    property: p.to_string(),
                    subject: s,
                    value: t.object.clone(),
                }),
                _ => None,
            }
        };
        match axiom {
            Some(axiom) => {
                ontology.add(axiom);
            }
            None => unparsed += 1,
        }
    }

    unparsed += reader
        .blank_triples
        .iter()
        .filter(|(b, _)| !reader.used_blanks.contains(*b))
        .map(|(_, ts)| ts.len())
        .sum::<usize>();
    ontology.add_missing_declarations();
    ontology.unparsed = unparsed;
    if unparsed > 0 {
        warn!(
            "{} triples could not be represented as OWL axioms and were dropped",
            unparsed
        );
    }
    debug!(
        "Read {} axioms from {} triples",
        ontology.len(),
        triples.len()
    );
    ontology
}

fn named(iri: &str) -> Result<NamedNode> {
    NamedNode::new(iri).map_err(|e| TransformError::OntologyStorage(format!("bad IRI '{}': {}", iri, e)))
}

struct TripleWriter {
    triples: Vec<Triple>,
    blanks: usize,
}

impl TripleWriter {
    fn blank(&mut self) -> BlankNode {
        self.blanks += 1;
        BlankNode::new_unchecked(format!("genid{}", self.blanks))
    }

    fn add(&mut self, subject: impl Into<NamedOrBlankNode>, predicate: NamedNodeRef<'_>, object: impl Into<Term>) {
        self.triples
            .push(Triple::new(subject, predicate.into_owned(), object));
    }

    fn add_iri(&mut self, subject: &str, predicate: NamedNodeRef<'_>, object: &str) -> Result<()> {
        let (s, o) = (named(subject)?, named(object)?);
        self.add(s, predicate, o);
        Ok(())
    }

    fn class_expression(&mut self, ce: &ClassExpression) -> Result<Term> {
        let node = match ce {
            ClassExpression::Class(iri) => return Ok(named(iri)?.into()),
            _ => self.blank(),
        };
        match ce {
            ClassExpression::Class(_) => {}
            ClassExpression::IntersectionOf(ops) | ClassExpression::UnionOf(ops) => {
                let predicate = if matches!(ce, ClassExpression::IntersectionOf(_)) {
                    INTERSECTION_OF
                } else {
                    UNION_OF
                };
                self.add(node.clone(), TYPE, OWL_CLASS.into_owned());
                let list = self.list(ops)?;
                self.add(node.clone(), predicate, list);
            }
            ClassExpression::ComplementOf(inner) => {
                self.add(node.clone(), TYPE, OWL_CLASS.into_owned());
                let inner = self.class_expression(inner)?;
                self.add(node.clone(), COMPLEMENT_OF, inner);
            }
            ClassExpression::SomeValuesFrom { property, filler }
            | ClassExpression::AllValuesFrom { property, filler } => {
                let predicate = if matches!(ce, ClassExpression::SomeValuesFrom { .. }) {
                    SOME_VALUES_FROM
                } else {
                    ALL_VALUES_FROM
                };
                self.add(node.clone(), TYPE, RESTRICTION.into_owned());
                self.add(node.clone(), ON_PROPERTY, named(property)?);
                let filler = self.class_expression(filler)?;
                self.add(node.clone(), predicate, filler);
            }
            ClassExpression::MinCardinality { cardinality, property }
            | ClassExpression::MaxCardinality { cardinality, property }
            | ClassExpression::ExactCardinality { cardinality, property } => {
                let predicate = match ce {
                    ClassExpression::MinCardinality { .. } => MIN_CARDINALITY,
                    ClassExpression::MaxCardinality { .. } => MAX_CARDINALITY,
                    _ => CARDINALITY,
                };
                self.add(node.clone(), TYPE, RESTRICTION.into_owned());
                self.add(node.clone(), ON_PROPERTY, named(property)?);
                self.add(
                    node.clone(),
                    predicate,
                    Literal::new_typed_literal(cardinality.to_string(), XSD_NON_NEGATIVE_INTEGER),
                );
            }
        }
        Ok(node.into())
    }

    fn list(&mut self, items: &[ClassExpression]) -> Result<Term> {
        let nodes: Vec<BlankNode> = items.iter().map(|_| self.blank()).collect();
        for (i, item) in items.iter().enumerate() {
            let value = self.class_expression(item)?;
            self.add(nodes[i].clone(), RDF_FIRST, value);
            let rest: Term = match nodes.get(i + 1) {
                Some(next) => next.clone().into(),
                None => RDF_NIL.into_owned().into(),
            };
            self.add(nodes[i].clone(), RDF_REST, rest);
        }
        Ok(match nodes.first() {
            Some(head) => head.clone().into(),
            None => RDF_NIL.into_owned().into(),
        })
    }

    /// Writes an n-ary class axiom as pairs with the first named operand.
    fn pairwise(&mut self, ops: &[ClassExpression], predicate: NamedNodeRef<'_>) -> Result<()> {
        let pivot = ops.iter().position(|op| op.as_class().is_some()).unwrap_or(0);
        let Some(ClassExpression::Class(subject)) = ops.get(pivot) else {
            return Err(TransformError::OntologyStorage(format!(
                "{} needs a named class operand in RDF",
                predicate
            )));
        };
        let subject = named(subject)?;
        for (i, op) in ops.iter().enumerate() {
            if i == pivot {
                continue;
            }
            let object = self.class_expression(op)?;
            self.add(subject.clone(), predicate, object);
        }
        Ok(())
    }
}

fn kind_class(kind: EntityKind) -> NamedNodeRef<'static> {
    match kind {
        EntityKind::Class => OWL_CLASS,
        EntityKind::ObjectProperty => OBJECT_PROPERTY,
        EntityKind::DataProperty => DATATYPE_PROPERTY,
        EntityKind::AnnotationProperty => ANNOTATION_PROPERTY,
        EntityKind::NamedIndividual => NAMED_INDIVIDUAL,
        EntityKind::Datatype => RDFS_DATATYPE,
    }
}

/// The RDF mapping of the ontology. Anonymous class expressions get the blank nodes
/// `genid1`, `genid2`, ... in axiom order.
pub fn to_triples(ontology: &Ontology) -> Result<Vec<Triple>> {
    let mut w = TripleWriter {
        triples: Vec::new(),
        blanks: 0,
    };
    match &ontology.iri {
        Some(iri) => {
            let header = named(iri)?;
            w.add(header.clone(), TYPE, ONTOLOGY.into_owned());
            for (property, value) in &ontology.annotations {
                w.add(header.clone(), named(property)?.as_ref(), value.clone());
            }
        }
        None if !ontology.annotations.is_empty() => {
            warn!("Ontology has no IRI, its annotations are not written");
        }
        None => {}
    }
    for axiom in ontology.axioms() {
        match axiom {
            Axiom::Declaration(kind, iri) => {
                let s = named(iri)?;
                w.add(s, TYPE, kind_class(*kind).into_owned());
            }
            Axiom::SubClassOf(sub, sup) => {
                let s = match w.class_expression(sub)? {
                    Term::NamedNode(n) => NamedOrBlankNode::from(n),
                    Term::BlankNode(b) => NamedOrBlankNode::from(b),
                    _ => continue,
                };
                let o = w.class_expression(sup)?;
                w.add(s, SUB_CLASS_OF, o);
            }
            Axiom::EquivalentClasses(ops) => w.pairwise(ops, EQUIVALENT_CLASS)?,
            Axiom::DisjointClasses(ops) => w.pairwise(ops, DISJOINT_WITH)?,
            Axiom::SubObjectPropertyOf(a, b) | Axiom::SubDataPropertyOf(a, b) => {
                w.add_iri(a, SUB_PROPERTY_OF, b)?
            }
            Axiom::ObjectPropertyDomain(p, ce) | Axiom::DataPropertyDomain(p, ce) => {
                let o = w.class_expression(ce)?;
                w.add(named(p)?, DOMAIN, o);
            }
            Axiom::ObjectPropertyRange(p, ce) => {
                let o = w.class_expression(ce)?;
                w.add(named(p)?, RANGE, o);
            }
            Axiom::DataPropertyRange(p, dt) => w.add_iri(p, RANGE, dt)?,
            Axiom::FunctionalObjectProperty(p) | Axiom::FunctionalDataProperty(p) => {
                w.add(named(p)?, TYPE, FUNCTIONAL_PROPERTY.into_owned())
            }
            Axiom::ClassAssertion(ce, individual) => {
                let o = w.class_expression(ce)?;
                w.add(named(individual)?, TYPE, o);
            }
            Axiom::ObjectPropertyAssertion {
                property,
                subject,
                object,
            } => {
                let (s, p, o) = (named(subject)?, named(property)?, named(object)?);
                w.add(s, p.as_ref(), o);
            }
            Axiom::DataPropertyAssertion {
                property,
                subject,
                value,
            } => {
                let (s, p) = (named(subject)?, named(property)?);
                w.add(s, p.as_ref(), value.clone());
            }
            Axiom::AnnotationAssertion {
                property,
                subject,
                value,
            } => {
                let (s, p) = (named(subject)?, named(property)?);
                w.add(s, p.as_ref(), value.clone());
            }
        }
    }
    Ok(w.triples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::parse_rdf;
    use oxigraph::io::RdfFormat;

    const TTL: &str = r#"
@prefix : <http://example.org/shop#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

<http://example.org/shop> a owl:Ontology ; rdfs:comment "shop" .
:Emp a owl:Class ; rdfs:label "Employee" ;
    rdfs:subClassOf [ a owl:Restriction ; owl:onProperty :dept ; owl:someValuesFrom :Dept ] .
:Dept a owl:Class .
:Manager rdfs:subClassOf [ owl:intersectionOf ( :Emp :Boss ) ] .
:dept a owl:ObjectProperty ; rdfs:domain :Emp ; rdfs:range :Dept .
:name a owl:DatatypeProperty , owl:FunctionalProperty ; rdfs:range xsd:string .
:e1 a :Emp ; :dept :d1 ; :name "Ann" ; :note "free text" .
:odd owl:propertyChainAxiom ( :dept :dept ) .
"#;

    fn ontology() -> Ontology {
        let triples = parse_rdf(TTL.as_bytes(), RdfFormat::Turtle, None).unwrap();
        from_triples(&triples, &[])
    }

    #[test]
    fn test_reads_axioms() {
        let o = ontology();
        assert_eq!(o.iri.as_deref(), Some("http://example.org/shop"));
        assert_eq!(o.annotations.len(), 1);
        let axioms = o.axiom_set();
        assert!(axioms.contains(&Axiom::SubClassOf(
            ClassExpression::class("http://example.org/shop#Emp"),
            ClassExpression::SomeValuesFrom {
                property: "http://example.org/shop#dept".into(),
                filler: Box::new(ClassExpression::class("http://example.org/shop#Dept")),
            }
        )));
        assert!(axioms.contains(&Axiom::SubClassOf(
            ClassExpression::class("http://example.org/shop#Manager"),
            ClassExpression::IntersectionOf(vec![
                ClassExpression::class("http://example.org/shop#Emp"),
                ClassExpression::class("http://example.org/shop#Boss"),
            ])
        )));
        assert!(axioms.contains(&Axiom::FunctionalDataProperty("http://example.org/shop#name".into())));
        assert!(axioms.contains(&Axiom::DataPropertyRange(
            "http://example.org/shop#name".into(),
            "http://www.w3.org/2001/XMLSchema#string".into()
        )));
        assert!(axioms.contains(&Axiom::ObjectPropertyAssertion {
            property: "http://example.org/shop#dept".into(),
            subject: "http://example.org/shop#e1".into(),
            object: "http://example.org/shop#d1".into(),
        }));
        assert!(axioms.contains(&Axiom::AnnotationAssertion {
            property: "http://example.org/shop#note".into(),
            subject: "http://example.org/shop#e1".into(),
            value: Literal::new_simple_literal("free text").into(),
        }));
        // implied declarations are added
        assert!(o.declares(EntityKind::Class, "http://example.org/shop#Boss"));
        assert!(o.declares(EntityKind::NamedIndividual, "http://example.org/shop#d1"));
        assert!(o.declares(EntityKind::AnnotationProperty, "http://example.org/shop#note"));
    }

    #[test]
    fn test_counts_unrepresentable_triples() {
        let o = ontology();
        // the property chain triple plus its two list cells
        assert_eq!(o.unparsed, 5);
    }

    #[test]
    fn test_triples_read_back() {
        let o = ontology();
        let triples = to_triples(&o).unwrap();
        let reread = from_triples(&triples, &[]);
        assert_eq!(reread.axiom_set(), o.axiom_set());
        assert_eq!(reread.iri, o.iri);
        assert_eq!(reread.unparsed, 0);
        assert!(triples
            .iter()
            .any(|t| t.subject.to_string() == "_:genid1"));
    }
}
