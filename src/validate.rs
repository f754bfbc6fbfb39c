//! Structural checks for Thing Description files
//!
//! This is not a TD schema validation: it checks that the required top level fields are
//! present, that every required security scheme is defined and that the `@context` looks like a
//! WoT one. Any JSON "falsy" value (`null`, `false`, `0`, `""`) counts as missing.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::debug;

/// Fields every TD must carry
pub const REQUIRED_FIELDS: [&str; 5] = [
    "@context",
    "id",
    "title",
    "security",
    "securityDefinitions",
];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON format in TD file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation failed. Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error(
        "Validation failed. Security scheme '{0}' referenced in 'security' array is not defined \
         in 'securityDefinitions'."
    )]
    UndefinedSecurity(String),

    /// `security` is neither a scheme name nor a list of them
    #[error("Validation failed. 'security' must be a string or an array, found {0}.")]
    InvalidSecurity(&'static str),
}

/// What a valid TD contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub title: String,
    pub description: Option<String>,
    pub properties: usize,
    pub actions: usize,
    pub events: usize,
    pub security: Vec<String>,
    /// Whether `@context` references a W3C WoT context
    pub wot_context: bool,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📋 Summary:")?;
        writeln!(f, "   Title: {}", self.title)?;
        writeln!(
            f,
            "   Description: {}",
            self.description.as_deref().unwrap_or("N/A")
        )?;
        writeln!(f, "   Properties: {}", self.properties)?;
        writeln!(f, "   Actions: {}", self.actions)?;
        writeln!(f, "   Events: {}", self.events)?;
        write!(f, "   Security: {}", self.security.join(", "))
    }
}

/// Read and validate the TD stored at `path`
pub fn validate_file(path: &Path) -> Result<Summary, Error> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_owned()));
    }

    let content = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })?;
    let td: Value = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "parsed TD");

    validate_value(&td)
}

/// Validate an already parsed TD
pub fn validate_value(td: &Value) -> Result<Summary, Error> {
    let missing: Vec<_> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| !td.get(field).is_some_and(is_truthy))
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingFields(missing));
    }

    let security = references(&td["security"])?;
    let definitions = &td["securityDefinitions"];
    if let Some(undefined) = security
        .iter()
        .find(|name| !definitions.get(name.as_str()).is_some_and(is_truthy))
    {
        return Err(Error::UndefinedSecurity(undefined.clone()));
    }
    debug!(?security, "security references resolved");

    let wot_context = match &td["@context"] {
        Value::Array(entries) => entries.iter().any(is_wot_context),
        context => is_wot_context(context),
    };

    Ok(Summary {
        title: display(&td["title"]),
        description: td
            .get("description")
            .filter(|description| is_truthy(description))
            .map(display),
        properties: count(&td["properties"]),
        actions: count(&td["actions"]),
        events: count(&td["events"]),
        security,
        wot_context,
    })
}

/// JavaScript-like truthiness, used for the loose presence checks
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_wot_context(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|iri| iri.contains("w3.org") && iri.contains("wot"))
}

/// The security names required by the TD, a single string is a one element list
fn references(security: &Value) -> Result<Vec<String>, Error> {
    match security {
        Value::String(name) => Ok(vec![name.clone()]),
        Value::Array(names) => Ok(names.iter().map(display).collect()),
        Value::Object(_) => Err(Error::InvalidSecurity("an object")),
        Value::Number(_) => Err(Error::InvalidSecurity("a number")),
        Value::Bool(_) => Err(Error::InvalidSecurity("a boolean")),
        Value::Null => Err(Error::InvalidSecurity("null")),
    }
}

fn count(affordances: &Value) -> usize {
    match affordances {
        Value::Object(map) => map.len(),
        Value::Array(list) => list.len(),
        _ => 0,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn lamp() -> Value {
        json!({
            "@context": ["https://www.w3.org/2022/wot/td/v1.1", { "@language": "en" }],
            "id": "urn:dev:ops:lamp-1",
            "title": "Lamp",
            "description": "A lamp",
            "securityDefinitions": { "nosec_sc": { "scheme": "nosec" } },
            "security": ["nosec_sc"],
            "properties": {
                "on": { "type": "boolean", "forms": [{ "href": "/on" }] },
                "level": { "type": "integer", "forms": [{ "href": "/level" }] },
            },
            "actions": {
                "toggle": { "forms": [{ "href": "/toggle" }] },
            },
        })
    }

    #[test]
    fn valid_td() {
        assert_eq!(
            validate_value(&lamp()).unwrap(),
            Summary {
                title: "Lamp".to_string(),
                description: Some("A lamp".to_string()),
                properties: 2,
                actions: 1,
                events: 0,
                security: vec!["nosec_sc".to_string()],
                wot_context: true,
            }
        );
    }

    #[test]
    fn summary_output() {
        let mut td = lamp();
        td.as_object_mut().unwrap().remove("description");
        let summary = validate_value(&td).unwrap();

        assert_eq!(
            summary.to_string(),
            "📋 Summary:\n   \
             Title: Lamp\n   \
             Description: N/A\n   \
             Properties: 2\n   \
             Actions: 1\n   \
             Events: 0\n   \
             Security: nosec_sc"
        );
    }

    #[test]
    fn missing_fields() {
        let mut td = lamp();
        let object = td.as_object_mut().unwrap();
        object.remove("securityDefinitions");
        object.insert("title".to_string(), json!(""));
        object.insert("id".to_string(), json!(0));

        let err = validate_value(&td).unwrap_err();
        let expected = ["id", "title", "securityDefinitions"];
        assert!(matches!(&err, Error::MissingFields(fields) if *fields == expected));
        assert_eq!(
            err.to_string(),
            "Validation failed. Missing required fields: id, title, securityDefinitions"
        );
    }

    #[test]
    fn empty_containers_are_present() {
        let mut td = lamp();
        td["security"] = json!([]);
        td["securityDefinitions"] = json!({});

        let summary = validate_value(&td).unwrap();
        assert!(summary.security.is_empty());
    }

    #[test]
    fn not_an_object() {
        let err = validate_value(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, Error::MissingFields(fields) if fields == REQUIRED_FIELDS));
    }

    #[test]
    fn undefined_security() {
        let mut td = lamp();
        td["security"] = json!(["nosec_sc", "x_sc", "y_sc"]);

        let err = validate_value(&td).unwrap_err();
        assert!(matches!(&err, Error::UndefinedSecurity(name) if name == "x_sc"));
        assert!(err.to_string().contains("'x_sc'"));
    }

    #[test]
    fn single_string_security() {
        let mut td = lamp();
        td["security"] = json!("nosec_sc");
        assert_eq!(validate_value(&td).unwrap().security, ["nosec_sc"]);

        td["security"] = json!("basic_sc");
        assert!(matches!(
            validate_value(&td),
            Err(Error::UndefinedSecurity(name)) if name == "basic_sc"
        ));
    }

    #[test]
    fn security_must_be_a_list() {
        let mut td = lamp();
        td["security"] = json!({ "nosec_sc": true });

        let err = validate_value(&td).unwrap_err();
        assert!(matches!(err, Error::InvalidSecurity("an object")));
        assert_eq!(
            err.to_string(),
            "Validation failed. 'security' must be a string or an array, found an object."
        );

        td["security"] = json!(42);
        assert!(matches!(
            validate_value(&td),
            Err(Error::InvalidSecurity("a number"))
        ));
    }

    #[test]
    fn falsy_definition_is_undefined() {
        let mut td = lamp();
        td["securityDefinitions"]["nosec_sc"] = Value::Null;

        assert!(matches!(
            validate_value(&td),
            Err(Error::UndefinedSecurity(_))
        ));
    }

    #[test]
    fn context_detection() {
        let mut td = lamp();
        td["@context"] = json!("https://www.w3.org/2019/wot/td/v1");
        assert!(validate_value(&td).unwrap().wot_context);

        td["@context"] = json!(["https://schema.org/", { "wot": "https://www.w3.org/" }]);
        assert!(!validate_value(&td).unwrap().wot_context);

        td["@context"] = json!({ "@vocab": "https://www.w3.org/2019/wot/td#" });
        assert!(!validate_value(&td).unwrap().wot_context);
    }
}
