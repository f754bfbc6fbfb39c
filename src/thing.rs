//! Thing Description data structures
//!
//! A Thing Description, or `TD`, stores the semantic metadata and the interface descriptions of
//! a physical or virtual entity, called `Thing`.
//!
//! Use [ThingBuilder](crate::builder::ThingBuilder) to create a new `Thing`, [serde_json] to
//! serialize it.
//!
//! [Interaction Affordance]: https://www.w3.org/TR/wot-thing-description11/#interactionaffordance

use std::{collections::BTreeMap, fmt};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// The JSON-LD context for the version 1.1 of the [Thing
/// description](https://www.w3.org/TR/wot-thing-description11/)
pub const TD_CONTEXT_11: &str = "https://www.w3.org/2022/wot/td/v1.1";

/// Media type used by every generated form
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// An abstraction of a physical or a virtual entity
///
/// It contains metadata and a description of its interfaces.
///
/// The affordance maps are omitted from the serialized document when empty.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thing {
    /// A [JSON-LD @context](https://www.w3.org/TR/json-ld11/#the-context)
    #[serde(rename = "@context")]
    pub context: Vec<ContextEntry>,

    /// JSON-LD semantic keywords
    #[serde(rename = "@type")]
    pub attype: Vec<String>,

    /// A unique identifier
    pub id: String,

    /// Human-readable title to be displayed
    pub title: String,

    /// Machine-friendly name derived from the title
    pub name: String,

    /// Human-readable additional information
    pub description: String,

    /// Security definitions
    ///
    /// A Map of Security Schemes, the name keys are used in [Thing::security] to express all
    /// the security constraints that must be satisfied in order to access the resources.
    pub security_definitions: BTreeMap<String, SecurityScheme>,

    /// Thing-wide Security constraints
    ///
    /// It is a list of names matching the Security Schemes defined in
    /// [Thing::security_definitions].
    pub security: Vec<String>,

    /// Base URI to be used to resolve all the other relative URIs
    pub base: String,

    /// Property-based [Interaction Affordances]
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertyAffordance>,

    /// Action-based [Interaction Affordances]
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub actions: IndexMap<String, ActionAffordance>,

    /// Event-based [Interaction Affordances]
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub events: IndexMap<String, EventAffordance>,
}

/// A single `@context` item: either an IRI or a map of JSON-LD keywords
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ContextEntry {
    Iri(String),
    Object(BTreeMap<String, String>),
}

impl ContextEntry {
    #[inline]
    pub fn td_context_11() -> Self {
        Self::Iri(TD_CONTEXT_11.to_owned())
    }

    /// The `{"@language": <tag>}` entry
    pub fn language(tag: impl Into<String>) -> Self {
        Self::Object([("@language".to_owned(), tag.into())].into_iter().collect())
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAffordance {
    #[serde(rename = "type")]
    pub data_type: DataType,

    pub description: String,

    pub read_only: Option<bool>,

    pub write_only: Option<bool>,

    pub observable: Option<bool>,

    pub unit: Option<String>,

    pub forms: Vec<Form>,
}

/// The shared shape of actions and events: a description and the forms to reach them
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct InteractionAffordance {
    pub description: String,

    pub forms: Vec<Form>,
}

pub type ActionAffordance = InteractionAffordance;

pub type EventAffordance = InteractionAffordance;

/// The JSON Schema type of a property value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
}

impl DataType {
    pub const ALL: [Self; 6] = [
        Self::String,
        Self::Number,
        Self::Integer,
        Self::Boolean,
        Self::Object,
        Self::Array,
    ];
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        };

        f.write_str(s)
    }
}

/// A security scheme descriptor, tagged by its `scheme` name
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum SecurityScheme {
    NoSec,
    Basic(BasicSecurityScheme),
    Bearer(BearerSecurityScheme),
    ApiKey(ApiKeySecurityScheme),
    OAuth2(OAuth2SecurityScheme),
}

impl SecurityScheme {
    /// The value of the `scheme` field
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoSec => "nosec",
            Self::Basic(_) => "basic",
            Self::Bearer(_) => "bearer",
            Self::ApiKey(_) => "apikey",
            Self::OAuth2(_) => "oauth2",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct BasicSecurityScheme {
    #[serde(rename = "in")]
    pub location: SecurityAuthenticationLocation,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct BearerSecurityScheme {
    #[serde(rename = "in")]
    pub location: SecurityAuthenticationLocation,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ApiKeySecurityScheme {
    #[serde(rename = "in")]
    pub location: SecurityAuthenticationLocation,

    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct OAuth2SecurityScheme {
    pub flow: String,
}

impl OAuth2SecurityScheme {
    pub fn new(flow: impl Into<String>) -> Self {
        Self { flow: flow.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityAuthenticationLocation {
    Header,
    Query,
    Body,
    Cookie,
}

/// A hypermedia control binding an affordance to an address and its operations
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    // FIXME: use AnyURI
    pub href: String,

    pub op: Operations,

    pub content_type: String,
}

impl Form {
    /// A JSON form pointing at `/<name>`
    pub fn json(name: &str, op: impl Into<Operations>) -> Self {
        Self {
            href: format!("/{name}"),
            op: op.into(),
            content_type: CONTENT_TYPE_JSON.to_owned(),
        }
    }
}

/// The `op` field of a form
///
/// Property forms always carry a list, action and event forms a single operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Operations {
    Single(FormOperation),
    Multiple(Vec<FormOperation>),
}

impl From<FormOperation> for Operations {
    fn from(op: FormOperation) -> Self {
        Self::Single(op)
    }
}

impl From<Vec<FormOperation>> for Operations {
    fn from(ops: Vec<FormOperation>) -> Self {
        Self::Multiple(ops)
    }
}

impl Operations {
    pub fn contains(&self, op: FormOperation) -> bool {
        match self {
            Self::Single(single) => *single == op,
            Self::Multiple(ops) => ops.contains(&op),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormOperation {
    ReadProperty,
    WriteProperty,
    ObserveProperty,
    InvokeAction,
    SubscribeEvent,
}

impl fmt::Display for FormOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ReadProperty => "readproperty",
            Self::WriteProperty => "writeproperty",
            Self::ObserveProperty => "observeproperty",
            Self::InvokeAction => "invokeaction",
            Self::SubscribeEvent => "subscribeevent",
        };

        f.write_str(s)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn security_schemes() {
        let schemes = [
            SecurityScheme::NoSec,
            SecurityScheme::Basic(BasicSecurityScheme {
                location: SecurityAuthenticationLocation::Header,
            }),
            SecurityScheme::Bearer(BearerSecurityScheme {
                location: SecurityAuthenticationLocation::Header,
            }),
            SecurityScheme::ApiKey(ApiKeySecurityScheme {
                location: SecurityAuthenticationLocation::Header,
                name: "X-API-Key".to_string(),
            }),
            SecurityScheme::OAuth2(OAuth2SecurityScheme::new("client_credentials")),
        ];

        assert_eq!(
            serde_json::to_value(schemes).unwrap(),
            json!([
                { "scheme": "nosec" },
                { "scheme": "basic", "in": "header" },
                { "scheme": "bearer", "in": "header" },
                { "scheme": "apikey", "in": "header", "name": "X-API-Key" },
                { "scheme": "oauth2", "flow": "client_credentials" },
            ])
        );
    }

    #[test]
    fn form_operations() {
        let property = Form::json(
            "temperature",
            vec![FormOperation::ReadProperty, FormOperation::ObserveProperty],
        );
        let action = Form::json("reset", FormOperation::InvokeAction);

        assert_eq!(
            serde_json::to_value(&property).unwrap(),
            json!({
                "href": "/temperature",
                "op": ["readproperty", "observeproperty"],
                "contentType": "application/json",
            })
        );
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "href": "/reset",
                "op": "invokeaction",
                "contentType": "application/json",
            })
        );
        assert!(property.op.contains(FormOperation::ObserveProperty));
        assert!(!action.op.contains(FormOperation::SubscribeEvent));
    }

    #[test]
    fn property_skips_absent_fields() {
        let property = PropertyAffordance {
            data_type: DataType::Number,
            description: "Current temperature".to_string(),
            read_only: Some(true),
            write_only: None,
            observable: None,
            unit: None,
            forms: vec![Form::json("temperature", vec![FormOperation::ReadProperty])],
        };

        assert_eq!(
            serde_json::to_value(property).unwrap(),
            json!({
                "type": "number",
                "description": "Current temperature",
                "readOnly": true,
                "forms": [{
                    "href": "/temperature",
                    "op": ["readproperty"],
                    "contentType": "application/json",
                }],
            })
        );
    }

    #[test]
    fn empty_affordances_are_omitted() {
        let thing = Thing {
            context: vec![ContextEntry::td_context_11(), ContextEntry::language("en")],
            attype: vec!["Thing".to_string()],
            id: "urn:dev:ops:lamp-1".to_string(),
            title: "Lamp".to_string(),
            name: "lamp".to_string(),
            description: "A lamp".to_string(),
            security_definitions: [("nosec_sc".to_string(), SecurityScheme::NoSec)]
                .into_iter()
                .collect(),
            security: vec!["nosec_sc".to_string()],
            base: "http://localhost:8080".to_string(),
            properties: IndexMap::new(),
            actions: IndexMap::new(),
            events: IndexMap::new(),
        };

        let value = serde_json::to_value(&thing).unwrap();
        assert_eq!(
            value,
            json!({
                "@context": [TD_CONTEXT_11, { "@language": "en" }],
                "@type": ["Thing"],
                "id": "urn:dev:ops:lamp-1",
                "title": "Lamp",
                "name": "lamp",
                "description": "A lamp",
                "securityDefinitions": { "nosec_sc": { "scheme": "nosec" } },
                "security": ["nosec_sc"],
                "base": "http://localhost:8080",
            })
        );

        let parsed: Thing = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, thing);
    }
}
