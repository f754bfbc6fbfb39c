//! Web of Things Thing Description generator
//!
//! Interactively collect the metadata of a device and emit a
//! [Thing Description](https://www.w3.org/TR/wot-thing-description11/):
//! > A Thing Description describes the metadata and interfaces of Things,
//! > where a Thing is an abstraction of a physical or virtual entity that
//! > provides interactions to and participates in the Web of Things.
//!
//! The questions are asked through a [Prompter](prompt::Prompter), folded into a [Thing] by the
//! [builder](builder::ThingBuilder) and serialized with [serde](https://docs.rs/serde). The
//! [validate] module performs a shallow structural check of existing TD files.
//!
//! # Basic usage
//!
//! ```
//! use td_generator::{
//!     builder::{Access, PropertyEntry, SecurityChoice, ThingBuilder},
//!     thing::DataType,
//!     validate::validate_value,
//! };
//!
//! let thing = ThingBuilder::new("My lamp")
//!     .id("urn:dev:ops:my-lamp-1234")
//!     .attype("Light")
//!     .description("A web connected lamp")
//!     .base("http://192.168.1.20:8080")
//!     .security(SecurityChoice::NoSec)
//!     .property(PropertyEntry {
//!         name: "on".to_string(),
//!         description: "Whether the lamp is turned on".to_string(),
//!         data_type: DataType::Boolean,
//!         access: Access::ReadWrite,
//!         observable: false,
//!         unit: String::new(),
//!     })
//!     .build()?;
//!
//! let summary = validate_value(&serde_json::to_value(&thing)?)?;
//! assert_eq!(summary.properties, 1);
//! assert_eq!(summary.security, ["nosec_sc"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod cli;
pub mod collect;
pub mod prompt;
pub mod thing;
pub mod validate;

pub use thing::Thing;
