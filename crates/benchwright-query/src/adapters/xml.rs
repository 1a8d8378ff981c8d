use std::collections::BTreeMap;
use std::path::Path;

use benchwright_core::format_f64;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::adapters::text::read_file;
use crate::errors::QueryError;

/// Maximum element nesting accepted when building the tree.
const MAX_DEPTH: usize = 64;

/// One parsed XML element. Text is the concatenated character data of the
/// element itself, trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, QueryError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = BTreeMap::new();
        for attribute in start.attributes() {
            let attribute =
                attribute.map_err(|err| QueryError::Xml(format!("bad attribute: {err}")))?;
            attributes.insert(
                String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attribute.value).into_owned(),
            );
        }
        Ok(Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }
}

/// Parse a whole document into an element tree.
pub fn load(path: &Path) -> Result<XmlElement, QueryError> {
    let contents = read_file(path)?;
    let mut reader = Reader::from_str(&contents);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(QueryError::Xml(format!(
                        "element nesting exceeds {MAX_DEPTH} levels"
                    )));
                }
                stack.push(XmlElement::from_start(&start)?);
            }
            Ok(Event::Empty(start)) => {
                let element = XmlElement::from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(text)) => {
                if let Some(current) = stack.last_mut() {
                    let value = text
                        .unescape()
                        .map_err(|err| QueryError::Xml(format!("bad text node: {err}")))?;
                    current.text.push_str(value.trim());
                }
            }
            Ok(Event::End(_)) => {
                if let Some(element) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(QueryError::Xml(format!(
                    "parse error at position {}: {err}",
                    reader.buffer_position()
                )));
            }
        }
    }

    root.ok_or_else(|| {
        QueryError::Xml(format!("document {} has no root element", path.display()))
    })
}

/// One slash-path step: element name plus at most one predicate.
#[derive(Debug, Clone, PartialEq)]
struct Step {
    name: String,
    predicate: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    /// `[@attr='value']`
    Attribute(String, String),
    /// `[N]`, 1-indexed per XPath convention, applied per parent.
    Position(usize),
}

fn parse_steps(path: &str) -> Result<Vec<Step>, QueryError> {
    path.trim_matches('/')
        .split('/')
        .filter(|step| !step.is_empty())
        .map(parse_step)
        .collect()
}

fn parse_step(raw: &str) -> Result<Step, QueryError> {
    let Some(open) = raw.find('[') else {
        return Ok(Step {
            name: raw.to_string(),
            predicate: None,
        });
    };
    if !raw.ends_with(']') {
        return Err(QueryError::InvalidArgument(format!(
            "unclosed predicate in step '{raw}'"
        )));
    }

    let name = raw[..open].to_string();
    let inner = &raw[open + 1..raw.len() - 1];

    let predicate = if let Some(rest) = inner.strip_prefix('@') {
        let (attr, value) = rest.split_once('=').ok_or_else(|| {
            QueryError::InvalidArgument(format!("attribute predicate '[{inner}]' needs '='"))
        })?;
        let value = value.trim().trim_matches('\'').trim_matches('"');
        Predicate::Attribute(attr.trim().to_string(), value.to_string())
    } else {
        let position = inner.trim().parse::<usize>().map_err(|_| {
            QueryError::InvalidArgument(format!(
                "predicate '[{inner}]' is not an attribute test or position"
            ))
        })?;
        if position == 0 {
            return Err(QueryError::InvalidArgument(
                "position predicates are 1-indexed".to_string(),
            ));
        }
        Predicate::Position(position)
    };

    Ok(Step {
        name,
        predicate: Some(predicate),
    })
}

/// Find every element matched by a slash path.
///
/// Matching starts at the root's children; a leading step naming the root
/// element itself is accepted and consumed.
pub fn find_all<'a>(root: &'a XmlElement, path: &str) -> Result<Vec<&'a XmlElement>, QueryError> {
    let mut steps = parse_steps(path)?;
    let mut current: Vec<&XmlElement> = vec![root];

    let leading_root = steps
        .first()
        .is_some_and(|step| step.name == root.name && step.predicate.is_none());
    if leading_root {
        steps.remove(0);
    }

    for step in &steps {
        let mut next = Vec::new();
        for context in current {
            let matched: Vec<&XmlElement> = context
                .children
                .iter()
                .filter(|child| child.name == step.name)
                .collect();
            match &step.predicate {
                None => next.extend(matched),
                Some(Predicate::Attribute(attr, value)) => next.extend(
                    matched
                        .into_iter()
                        .filter(|child| child.attributes.get(attr) == Some(value)),
                ),
                Some(Predicate::Position(position)) => {
                    if let Some(child) = matched.get(position - 1) {
                        next.push(child);
                    }
                }
            }
        }
        current = next;
    }

    Ok(current)
}

/// `xpath_value:path:file` — text of the first match; no match is an error.
pub fn value(path: &Path, element_path: &str) -> Result<String, QueryError> {
    let root = load(path)?;
    let matches = find_all(&root, element_path)?;
    matches
        .first()
        .map(|element| element.text.clone())
        .ok_or_else(|| no_match(element_path, path))
}

/// `xpath_attr:path@attribute:file`.
pub fn attribute(path: &Path, spec: &str) -> Result<String, QueryError> {
    let (element_path, attribute) = spec.rsplit_once('@').ok_or_else(|| {
        QueryError::InvalidArgument(format!("'{spec}' is missing an @attribute suffix"))
    })?;
    let root = load(path)?;
    let matches = find_all(&root, element_path)?;
    let element = matches.first().ok_or_else(|| no_match(element_path, path))?;
    element
        .attributes
        .get(attribute)
        .cloned()
        .ok_or_else(|| {
            let available: Vec<&str> =
                element.attributes.keys().map(String::as_str).collect();
            QueryError::NotFound(format!(
                "attribute '{attribute}' not found on '{element_path}' (available: {})",
                available.join(", ")
            ))
        })
}

/// `xpath_count:path:file` — number of matches; a path matching nothing is
/// an error, unlike the aggregations below.
pub fn count(path: &Path, element_path: &str) -> Result<String, QueryError> {
    let root = load(path)?;
    let matches = find_all(&root, element_path)?;
    if matches.is_empty() {
        return Err(no_match(element_path, path));
    }
    Ok(matches.len().to_string())
}

/// `xpath_exists:path:file` — `"true"`/`"false"`, never an error.
pub fn exists(path: &Path, element_path: &str) -> Result<String, QueryError> {
    let root = load(path)?;
    let matches = find_all(&root, element_path)?;
    Ok((!matches.is_empty()).to_string())
}

/// `xpath_collect:path:file` — comma-joined match texts; empty on zero
/// matches.
pub fn collect(path: &Path, element_path: &str) -> Result<String, QueryError> {
    let root = load(path)?;
    let matches = find_all(&root, element_path)?;
    let texts: Vec<&str> = matches.iter().map(|element| element.text.as_str()).collect();
    Ok(texts.join(","))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlAggregate {
    Sum,
    Avg,
    Max,
    Min,
}

/// `xpath_sum|avg|max|min:path:file` — numeric aggregation over match
/// texts; non-numeric texts are dropped and zero matches yield `0`.
pub fn aggregate(
    path: &Path,
    element_path: &str,
    op: XmlAggregate,
) -> Result<String, QueryError> {
    let root = load(path)?;
    let matches = find_all(&root, element_path)?;
    let values: Vec<f64> = matches
        .iter()
        .filter_map(|element| element.text.trim().parse::<f64>().ok())
        .collect();

    let result = if values.is_empty() {
        0.0
    } else {
        match op {
            XmlAggregate::Sum => values.iter().sum(),
            XmlAggregate::Avg => values.iter().sum::<f64>() / values.len() as f64,
            XmlAggregate::Max => values.iter().copied().fold(f64::MIN, f64::max),
            XmlAggregate::Min => values.iter().copied().fold(f64::MAX, f64::min),
        }
    };
    Ok(format_f64(result))
}

fn no_match(element_path: &str, path: &Path) -> QueryError {
    QueryError::NotFound(format!(
        "no element matches '{element_path}' in {}",
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const FIXTURE: &str = r#"<?xml version="1.0"?>
<inventory>
    <item type="tool" sku="A1">
        <name>Wrench</name>
        <price>12.50</price>
    </item>
    <item type="tool" sku="A2">
        <name>Hammer</name>
        <price>9</price>
    </item>
    <item type="part" sku="B7">
        <name>Bolt</name>
        <price>0.35</price>
    </item>
</inventory>
"#;

    fn write_fixture(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bw_xml_{}_{name}", std::process::id()));
        std::fs::write(&path, FIXTURE).expect("write fixture");
        path
    }

    #[test]
    fn value_returns_first_match_text() {
        let path = write_fixture("value.xml");
        assert_eq!(value(&path, "item/name").expect("value"), "Wrench");
        // A leading root-name step is accepted too.
        assert_eq!(value(&path, "inventory/item/name").expect("value"), "Wrench");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn position_predicates_are_one_indexed() {
        let path = write_fixture("position.xml");
        assert_eq!(value(&path, "item[2]/name").expect("value"), "Hammer");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn attribute_predicates_filter_matches() {
        let path = write_fixture("attrpred.xml");
        assert_eq!(
            value(&path, "item[@sku='B7']/name").expect("value"),
            "Bolt"
        );
        assert_eq!(count(&path, "item[@type='tool']").expect("count"), "2");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn attribute_lookup_names_alternatives() {
        let path = write_fixture("attr.xml");
        assert_eq!(attribute(&path, "item[1]@sku").expect("attr"), "A1");
        let err = attribute(&path, "item[1]@color").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("color"));
        assert!(message.contains("sku"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn count_errors_on_nonexistent_path_but_exists_does_not() {
        let path = write_fixture("countexists.xml");
        assert!(count(&path, "warehouse/shelf").is_err());
        assert_eq!(exists(&path, "warehouse/shelf").expect("exists"), "false");
        assert_eq!(exists(&path, "item/price").expect("exists"), "true");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn aggregations_drop_non_numeric_and_degrade_to_zero() {
        let path = write_fixture("agg.xml");
        assert_eq!(aggregate(&path, "item/price", XmlAggregate::Sum).expect("sum"), "21.85");
        assert_eq!(aggregate(&path, "item/price", XmlAggregate::Max).expect("max"), "12.5");
        assert_eq!(
            aggregate(&path, "item/weight", XmlAggregate::Sum).expect("sum"),
            "0"
        );
        assert_eq!(collect(&path, "item/name").expect("collect"), "Wrench,Hammer,Bolt");
        assert_eq!(collect(&path, "item/weight").expect("collect"), "");
        let _ = std::fs::remove_file(&path);
    }
}
