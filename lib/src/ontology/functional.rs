//! Reader for OWL 2 functional syntax documents, with or without prefixed names.
//!
//! The document is first parsed into a tree of [`Node`]s. The same tree shape is produced
//! by the OWL/XML reader, so both syntaxes share [`Interpreter`].

use super::{Axiom, ClassExpression, EntityKind, Ontology};
use crate::consts::{WELL_KNOWN_PREFIXES, XSD_STRING};
use crate::errors::{Result, TransformError};
use log::{debug, warn};
use oxigraph::model::{BlankNode, Literal, NamedNode, Term};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    /// `Name(args...)`, or an XML element with its children.
    Call(String, Vec<Node>),
    Iri(String),
    /// A prefixed name such as `owl:Thing` or `:Emp`, resolved by the interpreter.
    PName(String),
    Blank(String),
    Literal {
        value: String,
        lang: Option<String>,
        datatype: Option<Box<Node>>,
    },
    /// Bare words: numbers and keywords not followed by `(`.
    Word(String),
}

fn load_error(message: impl Into<String>) -> TransformError {
    TransformError::OntologyLoad(message.into())
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Iri(String),
    Word(String),
    Literal {
        value: String,
        lang: Option<String>,
        datatype: Option<Box<Token>>,
    },
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl Lexer<'_> {
    fn skip_space(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == '=' {
                self.chars.next();
            } else if c == '#' {
                while let Some(c) = self.chars.next() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '<' | '"' | '=' | '^') {
                break;
            }
            word.push(c);
            self.chars.next();
        }
        word
    }

    fn iri(&mut self) -> Result<String> {
        let mut iri = String::new();
        for c in self.chars.by_ref() {
            if c == '>' {
                return Ok(iri);
            }
            iri.push(c);
        }
        Err(load_error("unterminated IRI"))
    }

    fn string(&mut self) -> Result<String> {
        let mut value = String::new();
        while let Some(c) = self.chars.next() {
            match c {
                '"' => return Ok(value),
                '\\' => match self.chars.next() {
                    Some(escaped) => value.push(escaped),
                    None => break,
                },
                c => value.push(c),
            }
        }
        Err(load_error("unterminated string literal"))
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_space();
        let Some(&c) = self.chars.peek() else {
            return Ok(None);
        };
        let token = match c {
            '(' => {
                self.chars.next();
                Token::Open
            }
            ')' => {
                self.chars.next();
                Token::Close
            }
            '<' => {
                self.chars.next();
                Token::Iri(self.iri()?)
            }
            '"' => {
                self.chars.next();
                let value = self.string()?;
                let mut lang = None;
                let mut datatype = None;
                match self.chars.peek() {
                    Some('@') => {
                        self.chars.next();
                        lang = Some(self.word());
                    }
                    Some('^') => {
                        self.chars.next();
                        if self.chars.next() != Some('^') {
                            return Err(load_error("expected ^^ after literal"));
                        }
                        match self.next_token()? {
                            Some(t @ (Token::Iri(_) | Token::Word(_))) => datatype = Some(Box::new(t)),
                            _ => return Err(load_error("expected a datatype after ^^")),
                        }
                    }
                    _ => {}
                }
                Token::Literal { value, lang, datatype }
            }
            _ => {
                let word = self.word();
                if word.is_empty() {
                    return Err(load_error(format!("unexpected character '{}'", c)));
                }
                Token::Word(word)
            }
        };
        Ok(Some(token))
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer {
        chars: text.chars().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

fn atom(token: Token) -> Node {
    match token {
        Token::Iri(iri) => Node::Iri(iri),
        Token::Word(word) => match word.strip_prefix("_:") {
            Some(label) => Node::Blank(label.to_string()),
            None if word.contains(':') => Node::PName(word),
            None => Node::Word(word),
        },
        Token::Literal { value, lang, datatype } => Node::Literal {
            value,
            lang,
            datatype: datatype.map(|t| Box::new(atom(*t))),
        },
        Token::Open | Token::Close => Node::Word(String::new()),
    }
}

fn parse_nodes(tokens: Vec<Token>) -> Result<Vec<Node>> {
    // stack of open calls; the bottom frame collects top-level nodes
    let mut stack: Vec<(String, Vec<Node>)> = vec![(String::new(), Vec::new())];
    let mut tokens = tokens.into_iter().peekable();
    while let Some(token) = tokens.next() {
        match token {
            Token::Word(name) if tokens.peek() == Some(&Token::Open) => {
                tokens.next();
                stack.push((name, Vec::new()));
            }
            Token::Open => return Err(load_error("'(' without a function name")),
            Token::Close => {
                if stack.len() < 2 {
                    return Err(load_error("unbalanced ')'"));
                }
                if let Some((name, args)) = stack.pop() {
                    if let Some((_, parent)) = stack.last_mut() {
                        parent.push(Node::Call(name, args));
                    }
                }
            }
            other => {
                if let Some((_, current)) = stack.last_mut() {
                    current.push(atom(other));
                }
            }
        }
    }
    if stack.len() != 1 {
        return Err(load_error("unexpected end of document"));
    }
    Ok(stack.pop().map(|(_, nodes)| nodes).unwrap_or_default())
}

/// Turns the node tree of a functional-syntax or OWL/XML document into an [`Ontology`].
pub(crate) struct Interpreter {
    prefixes: HashMap<String, String>,
    declared_prefixes: Vec<(String, String)>,
    unparsed: usize,
}

impl Interpreter {
    pub(crate) fn new() -> Self {
        let prefixes = WELL_KNOWN_PREFIXES
            .iter()
            .map(|(name, iri)| (format!("{}:", name), iri.to_string()))
            .collect();
        Interpreter {
            prefixes,
            declared_prefixes: Vec::new(),
            unparsed: 0,
        }
    }

    /// Declares `name` (without the trailing colon) as an abbreviation of `iri`.
    pub(crate) fn add_prefix(&mut self, name: &str, iri: &str) {
        self.prefixes.insert(format!("{}:", name), iri.to_string());
        self.declared_prefixes.push((name.to_string(), iri.to_string()));
    }

    fn iri(&self, node: &Node) -> Option<String> {
        match node {
            Node::Iri(iri) => Some(iri.clone()),
            Node::PName(name) => {
                let split = name.find(':')? + 1;
                let namespace = self.prefixes.get(&name[..split])?;
                Some(format!("{}{}", namespace, &name[split..]))
            }
            _ => None,
        }
    }

    fn literal(&self, node: &Node) -> Option<Literal> {
        let Node::Literal { value, lang, datatype } = node else {
            return None;
        };
        if let Some(lang) = lang {
            return Literal::new_language_tagged_literal(value.clone(), lang.clone()).ok();
        }
        match datatype {
            Some(dt) => {
                let dt = self.iri(dt)?;
                if dt == XSD_STRING.as_str() {
                    return Some(Literal::new_simple_literal(value.clone()));
                }
                Some(Literal::new_typed_literal(value.clone(), NamedNode::new(dt).ok()?))
            }
            None => Some(Literal::new_simple_literal(value.clone())),
        }
    }

    fn term(&self, node: &Node) -> Option<Term> {
        match node {
            Node::Blank(label) => BlankNode::new(label.clone()).ok().map(Term::from),
            Node::Literal { .. } => self.literal(node).map(Term::from),
            _ => self.iri(node).and_then(|iri| NamedNode::new(iri).ok()).map(Term::from),
        }
    }

    fn class_expression(&self, node: &Node) -> Option<ClassExpression> {
        let Node::Call(name, args) = node else {
            return self.iri(node).map(ClassExpression::Class);
        };
        let operands = || -> Option<Vec<ClassExpression>> {
            args.iter().map(|a| self.class_expression(a)).collect()
        };
        let cardinality = || -> Option<(u32, String)> {
            match args.as_slice() {
                [Node::Word(n), property] => Some((n.parse().ok()?, self.iri(property)?)),
                _ => None,
            }
        };
        Some(match name.as_str() {
            "Class" => ClassExpression::Class(self.iri(args.first()?)?),
            "ObjectIntersectionOf" => ClassExpression::IntersectionOf(operands()?),
            "ObjectUnionOf" => ClassExpression::UnionOf(operands()?),
            "ObjectComplementOf" => {
                ClassExpression::ComplementOf(Box::new(self.class_expression(args.first()?)?))
            }
            "ObjectSomeValuesFrom" | "ObjectAllValuesFrom" => {
                let [property, filler] = args.as_slice() else {
                    return None;
                };
                let property = self.iri(property)?;
                let filler = Box::new(self.class_expression(filler)?);
                if name == "ObjectSomeValuesFrom" {
                    ClassExpression::SomeValuesFrom { property, filler }
                } else {
                    ClassExpression::AllValuesFrom { property, filler }
                }
            }
            "ObjectMinCardinality" => {
                let (cardinality, property) = cardinality()?;
                ClassExpression::MinCardinality { cardinality, property }
            }
            "ObjectMaxCardinality" => {
                let (cardinality, property) = cardinality()?;
                ClassExpression::MaxCardinality { cardinality, property }
            }
            "ObjectExactCardinality" => {
                let (cardinality, property) = cardinality()?;
                ClassExpression::ExactCardinality { cardinality, property }
            }
            _ => return None,
        })
    }

    fn axiom(&self, name: &str, args: &[Node]) -> Option<Axiom> {
        // axiom annotations are not modelled
        let args: Vec<&Node> = args
            .iter()
            .filter(|a| !matches!(a, Node::Call(n, _) if n == "Annotation"))
            .collect();
        let iri = |i: usize| args.get(i).and_then(|n| self.iri(n));
        let ce = |i: usize| args.get(i).and_then(|n| self.class_expression(n));
        let all_ce = || -> Option<Vec<ClassExpression>> {
            args.iter().map(|n| self.class_expression(n)).collect()
        };
        Some(match name {
            "Declaration" => {
                let Node::Call(kind, inner) = args.first()? else {
                    return None;
                };
                Axiom::Declaration(EntityKind::from_owl_name(kind)?, self.iri(inner.first()?)?)
            }
            "SubClassOf" => Axiom::SubClassOf(ce(0)?, ce(1)?),
            "EquivalentClasses" => Axiom::EquivalentClasses(all_ce()?),
            "DisjointClasses" => Axiom::DisjointClasses(all_ce()?),
            "SubObjectPropertyOf" => Axiom::SubObjectPropertyOf(iri(0)?, iri(1)?),
            "SubDataPropertyOf" => Axiom::SubDataPropertyOf(iri(0)?, iri(1)?),
            "ObjectPropertyDomain" => Axiom::ObjectPropertyDomain(iri(0)?, ce(1)?),
            "ObjectPropertyRange" => Axiom::ObjectPropertyRange(iri(0)?, ce(1)?),
            "DataPropertyDomain" => Axiom::DataPropertyDomain(iri(0)?, ce(1)?),
            "DataPropertyRange" => Axiom::DataPropertyRange(iri(0)?, iri(1)?),
            "FunctionalObjectProperty" => Axiom::FunctionalObjectProperty(iri(0)?),
            "FunctionalDataProperty" => Axiom::FunctionalDataProperty(iri(0)?),
            "ClassAssertion" => Axiom::ClassAssertion(ce(0)?, iri(1)?),
            "ObjectPropertyAssertion" => Axiom::ObjectPropertyAssertion {
                property: iri(0)?,
                subject: iri(1)?,
                object: iri(2)?,
            },
            "DataPropertyAssertion" => Axiom::DataPropertyAssertion {
                property: iri(0)?,
                subject: iri(1)?,
                value: self.literal(args.get(2)?)?,
            },
            "AnnotationAssertion" => Axiom::AnnotationAssertion {
                property: iri(0)?,
                subject: iri(1)?,
                value: self.term(args.get(2)?)?,
            },
            _ => return None,
        })
    }

    /// Reads the body of `Ontology(...)`: optional ontology and version IRIs, imports,
    /// annotations and axioms.
    pub(crate) fn ontology(mut self, args: &[Node]) -> Ontology {
        let mut iris = args.iter().take_while(|a| !matches!(a, Node::Call(..)));
        let iri = iris.next().and_then(|n| self.iri(n));
        let mut ontology = Ontology::new(iri);
        for arg in args {
            let Node::Call(name, inner) = arg else {
                continue;
            };
            match name.as_str() {
                "Import" => self.unparsed += 1,
                "Annotation" => match (inner.first().and_then(|n| self.iri(n)), inner.get(1).and_then(|n| self.term(n))) {
                    (Some(property), Some(value)) => ontology.annotations.push((property, value)),
                    _ => self.unparsed += 1,
                },
                _ => match self.axiom(name, inner) {
                    Some(axiom) => {
                        ontology.add(axiom);
                    }
                    None => self.unparsed += 1,
                },
            }
        }
        ontology.prefixes = std::mem::take(&mut self.declared_prefixes);
        ontology.add_missing_declarations();
        ontology.unparsed = self.unparsed;
        if self.unparsed > 0 {
            warn!("{} constructs could not be represented as axioms and were dropped", self.unparsed);
        }
        ontology
    }
}

/// Parses a functional-syntax document.
pub fn parse_functional(text: &str) -> Result<Ontology> {
    let nodes = parse_nodes(tokenize(text)?)?;
    let mut interpreter = Interpreter::new();
    let mut body = None;
    for node in &nodes {
        match node {
            Node::Call(name, args) if name == "Prefix" => match args.as_slice() {
                [Node::PName(prefix), Node::Iri(iri)] => {
                    interpreter.add_prefix(prefix.trim_end_matches(':'), iri)
                }
                _ => return Err(load_error("malformed Prefix declaration")),
            },
            Node::Call(name, args) if name == "Ontology" => body = Some(args),
            other => return Err(load_error(format!("unexpected top-level element {:?}", other))),
        }
    }
    let body = body.ok_or_else(|| load_error("no Ontology(...) element"))?;
    let ontology = interpreter.ontology(body);
    debug!("Read {} axioms from functional syntax", ontology.len());
    Ok(ontology)
}

/// True when the text starts (after comments) with a functional-syntax keyword.
pub fn looks_like_functional(text: &str) -> bool {
    let body = text
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .unwrap_or("");
    ["Prefix(", "Ontology("].iter().any(|k| body.starts_with(k))
}
