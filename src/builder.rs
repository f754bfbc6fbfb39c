//! Thing Description builder
//!
//! The main entry point is [ThingBuilder], usually fed through [Answers::into_thing] with the
//! answers gathered by the [collect](crate::collect) questionnaire.

use std::{collections::BTreeMap, fmt};

use indexmap::IndexMap;
use time::OffsetDateTime;
use tracing::debug;

use crate::thing::{
    ActionAffordance, ApiKeySecurityScheme, BasicSecurityScheme, BearerSecurityScheme,
    ContextEntry, DataType, EventAffordance, Form, FormOperation, OAuth2SecurityScheme,
    PropertyAffordance, SecurityAuthenticationLocation, SecurityScheme, Thing,
};

/// Builder errors
///
/// The answers are mapped so that a valid TD is produced by construction; the builder still
/// checks the security cross references before handing out a [Thing].
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// The security field must refer to existing security definitions.
    #[error("Security \"{0}\" is not specified in Thing security definitions")]
    UndefinedSecurity(String),

    /// At least one security requirement must be present
    #[error("No security scheme has been selected")]
    EmptySecurity,
}

/// Device categories offered to the operator, mapped onto `@type` tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Sensor,
    Actuator,
    SmartLight,
    Thermostat,
    Camera,
    Lock,
    Custom,
}

impl DeviceType {
    pub const ALL: [Self; 7] = [
        Self::Sensor,
        Self::Actuator,
        Self::SmartLight,
        Self::Thermostat,
        Self::Camera,
        Self::Lock,
        Self::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sensor => "Sensor",
            Self::Actuator => "Actuator",
            Self::SmartLight => "Smart Light",
            Self::Thermostat => "Thermostat",
            Self::Camera => "Camera",
            Self::Lock => "Lock",
            Self::Custom => "Other/Custom",
        }
    }

    /// The additional `@type` tag, none for custom devices
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Self::Sensor => Some("sensor"),
            Self::Actuator => Some("actuator"),
            Self::SmartLight => Some("smartLight"),
            Self::Thermostat => Some("thermostat"),
            Self::Camera => Some("camera"),
            Self::Lock => Some("lock"),
            Self::Custom => None,
        }
    }
}

/// Transport used to reach the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Https,
    Coap,
    Mqtt,
    WebSocket,
    ModbusTcp,
}

impl Protocol {
    pub const ALL: [Self; 6] = [
        Self::Http,
        Self::Https,
        Self::Coap,
        Self::Mqtt,
        Self::WebSocket,
        Self::ModbusTcp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
            Self::Coap => "CoAP",
            Self::Mqtt => "MQTT",
            Self::WebSocket => "WebSocket",
            Self::ModbusTcp => "Modbus TCP",
        }
    }

    /// The URI scheme token
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Coap => "coap",
            Self::Mqtt => "mqtt",
            Self::WebSocket => "ws",
            Self::ModbusTcp => "modbus+tcp",
        }
    }
}

/// The single security scheme required by the generated Thing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityChoice {
    NoSec,
    Basic,
    Bearer,
    ApiKey,
    OAuth2,
}

impl SecurityChoice {
    pub const ALL: [Self; 5] = [
        Self::NoSec,
        Self::Basic,
        Self::Bearer,
        Self::ApiKey,
        Self::OAuth2,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NoSec => "No Security",
            Self::Basic => "Basic Authentication",
            Self::Bearer => "Bearer Token",
            Self::ApiKey => "API Key",
            Self::OAuth2 => "OAuth2",
        }
    }

    /// The name of the security definition, e.g. `nosec_sc`
    pub fn key(self) -> String {
        format!("{}_sc", self.scheme().name())
    }

    pub fn scheme(self) -> SecurityScheme {
        use SecurityAuthenticationLocation::Header;

        match self {
            Self::NoSec => SecurityScheme::NoSec,
            Self::Basic => SecurityScheme::Basic(BasicSecurityScheme { location: Header }),
            Self::Bearer => SecurityScheme::Bearer(BearerSecurityScheme { location: Header }),
            Self::ApiKey => SecurityScheme::ApiKey(ApiKeySecurityScheme {
                location: Header,
                name: "X-API-Key".to_owned(),
            }),
            Self::OAuth2 => {
                SecurityScheme::OAuth2(OAuth2SecurityScheme::new("client_credentials"))
            }
        }
    }
}

/// Basic information about the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub title: String,
    pub description: String,
    pub device_type: DeviceType,
}

/// Where the device can be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
}

impl Network {
    /// `scheme://host:port`, the host is used verbatim
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol.scheme(), self.host, self.port)
    }
}

/// The operations allowed on a property
///
/// A property is always at least readable or writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    /// Returns `None` when neither capability is requested
    pub fn from_flags(readable: bool, writable: bool) -> Option<Self> {
        match (readable, writable) {
            (true, false) => Some(Self::ReadOnly),
            (false, true) => Some(Self::WriteOnly),
            (true, true) => Some(Self::ReadWrite),
            (false, false) => None,
        }
    }

    pub fn readable(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    pub fn writable(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    pub name: String,
    pub description: String,
    pub data_type: DataType,
    pub access: Access,
    pub observable: bool,
    pub unit: String,
}

impl PropertyEntry {
    fn operations(&self) -> Vec<FormOperation> {
        [
            (self.access.readable(), FormOperation::ReadProperty),
            (self.access.writable(), FormOperation::WriteProperty),
            (self.observable, FormOperation::ObserveProperty),
        ]
        .into_iter()
        .filter_map(|(enabled, op)| enabled.then_some(op))
        .collect()
    }

    fn into_affordance(self) -> (String, PropertyAffordance) {
        let forms = vec![Form::json(&self.name, self.operations())];
        let unit = self.unit.trim();
        let affordance = PropertyAffordance {
            data_type: self.data_type,
            description: self.description,
            read_only: (self.access == Access::ReadOnly).then_some(true),
            write_only: (self.access == Access::WriteOnly).then_some(true),
            observable: self.observable.then_some(true),
            unit: (!unit.is_empty()).then(|| unit.to_owned()),
            forms,
        };

        (self.name, affordance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntry {
    pub name: String,
    pub description: String,
}

/// Everything the operator answered in one `create` session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub device: DeviceInfo,
    pub network: Network,
    pub security: SecurityChoice,
    pub properties: Vec<PropertyEntry>,
    pub actions: Vec<ActionEntry>,
    pub events: Vec<EventEntry>,
}

impl Answers {
    /// Fold the answers into a Thing Description
    pub fn into_thing(self, id: ThingId) -> Result<Thing, Error> {
        let Self {
            device,
            network,
            security,
            properties,
            actions,
            events,
        } = self;

        ThingBuilder::new(device.title)
            .description(device.description)
            .device_type(device.device_type)
            .id(id)
            .base(network.base_url())
            .security(security)
            .properties(properties)
            .actions(actions)
            .events(events)
            .build()
    }
}

/// Lowercase `title` and collapse every run of characters outside `[a-z0-9]` into a single
/// hyphen, trimming hyphens at both ends
pub fn slugify(title: &str) -> String {
    replace_runs(&title.to_lowercase(), |c| {
        !(c.is_ascii_lowercase() || c.is_ascii_digit())
    })
    .trim_matches('-')
    .to_owned()
}

/// The filename suggested for a title: `my-iot-device-td.json`
pub fn default_filename(title: &str) -> String {
    format!(
        "{}-td.json",
        replace_runs(&title.to_lowercase(), char::is_whitespace)
    )
}

fn replace_runs(s: &str, mut matches: impl FnMut(char) -> bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if matches(c) {
            if !in_run {
                out.push('-');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// A `urn:dev:ops` identifier made of the title slug, a millisecond timestamp and a random
/// suffix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThingId {
    slug: String,
    millis: i128,
    nonce: u32,
}

impl ThingId {
    pub fn new(title: &str, at: OffsetDateTime, nonce: u32) -> Self {
        let slug = match slugify(title) {
            slug if slug.is_empty() => "thing".to_owned(),
            slug => slug,
        };

        Self {
            slug,
            millis: at.unix_timestamp_nanos() / 1_000_000,
            nonce,
        }
    }

    /// Identifier for `title` stamped with the current time
    pub fn generate(title: &str) -> Self {
        let nonce = uuid::Uuid::new_v4().as_fields().0;
        Self::new(title, OffsetDateTime::now_utc(), nonce)
    }
}

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "urn:dev:ops:{}-{}-{:08x}",
            self.slug, self.millis, self.nonce
        )
    }
}

/// A builder for a [Thing]
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThingBuilder {
    context: Vec<ContextEntry>,
    attype: Vec<String>,
    id: Option<String>,
    title: String,
    description: String,
    base: String,
    security: Vec<String>,
    security_definitions: BTreeMap<String, SecurityScheme>,
    properties: IndexMap<String, PropertyAffordance>,
    actions: IndexMap<String, ActionAffordance>,
    events: IndexMap<String, EventAffordance>,
}

impl ThingBuilder {
    /// Create a new default builder with a specified title
    ///
    /// The `@context` defaults to the TD 1.1 context with English as language and `@type`
    /// starts with `Thing`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            context: vec![ContextEntry::td_context_11(), ContextEntry::language("en")],
            attype: vec!["Thing".to_owned()],
            id: None,
            title: title.into(),
            description: String::new(),
            base: String::new(),
            security: Vec::new(),
            security_definitions: BTreeMap::new(),
            properties: IndexMap::new(),
            actions: IndexMap::new(),
            events: IndexMap::new(),
        }
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = value.into();
        self
    }

    pub fn base(mut self, value: impl Into<String>) -> Self {
        self.base = value.into();
        self
    }

    /// Set an explicit identifier, otherwise one is generated from the title on build
    pub fn id(mut self, value: impl ToString) -> Self {
        self.id = Some(value.to_string());
        self
    }

    /// Add a JSON-LD @type to the thing
    pub fn attype(mut self, value: impl Into<String>) -> Self {
        self.attype.push(value.into());
        self
    }

    pub fn device_type(self, device_type: DeviceType) -> Self {
        match device_type.tag() {
            Some(tag) => self.attype(tag),
            None => self,
        }
    }

    /// Add a security definition and require it
    pub fn security(mut self, choice: SecurityChoice) -> Self {
        let key = choice.key();
        self.security_definitions.insert(key.clone(), choice.scheme());
        if !self.security.contains(&key) {
            self.security.push(key);
        }
        self
    }

    /// Add a property, replacing any previous property with the same name
    pub fn property(mut self, entry: PropertyEntry) -> Self {
        let (name, affordance) = entry.into_affordance();
        debug!(%name, "adding property");
        self.properties.insert(name, affordance);
        self
    }

    pub fn properties(self, entries: impl IntoIterator<Item = PropertyEntry>) -> Self {
        entries.into_iter().fold(self, Self::property)
    }

    /// Add an action, replacing any previous action with the same name
    pub fn action(mut self, entry: ActionEntry) -> Self {
        debug!(name = %entry.name, "adding action");
        let affordance = ActionAffordance {
            forms: vec![Form::json(&entry.name, FormOperation::InvokeAction)],
            description: entry.description,
        };
        self.actions.insert(entry.name, affordance);
        self
    }

    pub fn actions(self, entries: impl IntoIterator<Item = ActionEntry>) -> Self {
        entries.into_iter().fold(self, Self::action)
    }

    /// Add an event, replacing any previous event with the same name
    pub fn event(mut self, entry: EventEntry) -> Self {
        debug!(name = %entry.name, "adding event");
        let affordance = EventAffordance {
            forms: vec![Form::json(&entry.name, FormOperation::SubscribeEvent)],
            description: entry.description,
        };
        self.events.insert(entry.name, affordance);
        self
    }

    pub fn events(self, entries: impl IntoIterator<Item = EventEntry>) -> Self {
        entries.into_iter().fold(self, Self::event)
    }

    /// Consume the builder to produce the configured Thing
    ///
    /// This step will perform the final validation of the builder state.
    pub fn build(self) -> Result<Thing, Error> {
        let Self {
            context,
            attype,
            id,
            title,
            description,
            base,
            security,
            security_definitions,
            properties,
            actions,
            events,
        } = self;

        if security.is_empty() {
            return Err(Error::EmptySecurity);
        }
        security.iter().try_for_each(|name| {
            security_definitions
                .contains_key(name)
                .then_some(())
                .ok_or_else(|| Error::UndefinedSecurity(name.clone()))
        })?;

        let id = id.unwrap_or_else(|| ThingId::generate(&title).to_string());
        let name = slugify(&title);

        Ok(Thing {
            context,
            attype,
            id,
            title,
            name,
            description,
            security_definitions,
            security,
            base,
            properties,
            actions,
            events,
        })
    }
}
