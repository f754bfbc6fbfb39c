//! The `create` questionnaire
//!
//! Questions are asked in a fixed order: basic information, network, security, then the
//! optional properties, actions and events. The repeated affordance questions are exposed as
//! lazy [Entries] iterators, so the collected entries can be folded by the
//! [builder](crate::builder) independently of how they were obtained.

use tracing::info;

use crate::{
    builder::{
        default_filename, ActionEntry, Access, Answers, DeviceInfo, DeviceType, EventEntry,
        Network, PropertyEntry, Protocol, SecurityChoice,
    },
    prompt::{required, ConfirmQuestion, Error, Prompter, SelectQuestion, TextQuestion},
    thing::DataType,
};

/// Run the whole questionnaire, except the output filename
pub fn questionnaire<P: Prompter>(prompter: &mut P) -> Result<Answers, Error> {
    let device = device_info(prompter)?;
    let network = network(prompter)?;
    let security = security(prompter)?;
    let properties: Vec<_> = Entries::new(prompter, EntryKind::Property, property_entry)
        .collect::<Result<_, _>>()?;
    let actions: Vec<_> =
        Entries::new(prompter, EntryKind::Action, action_entry).collect::<Result<_, _>>()?;
    let events: Vec<_> =
        Entries::new(prompter, EntryKind::Event, event_entry).collect::<Result<_, _>>()?;

    Ok(Answers {
        device,
        network,
        security,
        properties,
        actions,
        events,
    })
}

pub fn device_info<P: Prompter>(prompter: &mut P) -> Result<DeviceInfo, Error> {
    let title = prompter.text(
        &TextQuestion::new("What is the title of your device?")
            .default("My IoT Device")
            .validate(|answer| required(answer, "Title is required")),
    )?;
    let description = prompter.text(
        &TextQuestion::new("Provide a brief description:").default("A Web of Things device"),
    )?;
    let device_type = DeviceType::ALL[prompter.select(&SelectQuestion::new(
        "Select the device type:",
        DeviceType::ALL.map(DeviceType::label),
    ))?];

    Ok(DeviceInfo {
        title,
        description,
        device_type,
    })
}

pub fn network<P: Prompter>(prompter: &mut P) -> Result<Network, Error> {
    let host = prompter.text(
        &TextQuestion::new("Enter the IP address or hostname:")
            .default("localhost")
            .validate(|answer| required(answer, "IP address/hostname is required")),
    )?;
    let port = prompter.parse(
        &TextQuestion::new("Enter the port number:").default("8080"),
        parse_port,
    )?;
    let protocol = Protocol::ALL[prompter.select(&SelectQuestion::new(
        "Select the protocol:",
        Protocol::ALL.map(Protocol::label),
    ))?];

    Ok(Network {
        host,
        port,
        protocol,
    })
}

fn parse_port(answer: &str) -> Result<u16, String> {
    answer
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|&port| port > 0)
        .ok_or_else(|| "Port must be between 1 and 65535".to_owned())
}

pub fn security<P: Prompter>(prompter: &mut P) -> Result<SecurityChoice, Error> {
    let index = prompter.select(&SelectQuestion::new(
        "Select security scheme:",
        SecurityChoice::ALL.map(SecurityChoice::label),
    ))?;

    Ok(SecurityChoice::ALL[index])
}

pub fn property_entry<P: Prompter>(prompter: &mut P) -> Result<PropertyEntry, Error> {
    let name = prompter.text(
        &TextQuestion::new("Property name:")
            .validate(|answer| required(answer, "Property name is required")),
    )?;
    let description = prompter.text(&TextQuestion::new("Property description:").default(""))?;
    let data_type = DataType::ALL[prompter.select(&SelectQuestion::new(
        "Property type:",
        DataType::ALL.map(|ty| ty.to_string()),
    ))?];
    let readable = prompter.confirm(&ConfirmQuestion::new("Is this property readable?", true))?;
    let writable = prompter.confirm(&ConfirmQuestion::new("Is this property writable?", false))?;
    let observable = prompter.confirm(&ConfirmQuestion::new(
        "Is this property observable (supports subscriptions)?",
        false,
    ))?;
    let unit = prompter.text(
        &TextQuestion::new("Unit of measurement (leave empty if none):").default(""),
    )?;

    let access = match Access::from_flags(readable, writable) {
        Some(access) => access,
        None => {
            info!(%name, "property neither readable nor writable, forcing readable");
            prompter.say(
                "⚠️  Warning: A property must be either readable or writable. Setting as readable.",
            )?;
            Access::ReadOnly
        }
    };

    Ok(PropertyEntry {
        name,
        description,
        data_type,
        access,
        observable,
        unit,
    })
}

pub fn action_entry<P: Prompter>(prompter: &mut P) -> Result<ActionEntry, Error> {
    let name = prompter.text(
        &TextQuestion::new("Action name:")
            .validate(|answer| required(answer, "Action name is required")),
    )?;
    let description = prompter.text(&TextQuestion::new("Action description:").default(""))?;

    Ok(ActionEntry { name, description })
}

pub fn event_entry<P: Prompter>(prompter: &mut P) -> Result<EventEntry, Error> {
    let name = prompter.text(
        &TextQuestion::new("Event name:")
            .validate(|answer| required(answer, "Event name is required")),
    )?;
    let description = prompter.text(&TextQuestion::new("Event description:").default(""))?;

    Ok(EventEntry { name, description })
}

/// Ask where to save the TD, suggesting a name derived from `title`
pub fn filename<P: Prompter>(prompter: &mut P, title: &str) -> Result<String, Error> {
    prompter.text(
        &TextQuestion::new("Enter the filename for the TD:")
            .default(default_filename(title))
            .validate(|answer| required(answer, "Filename is required")),
    )
}

/// The category of a repeated entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Property,
    Action,
    Event,
}

impl EntryKind {
    /// The question opening the loop
    pub fn gate(self) -> ConfirmQuestion {
        match self {
            Self::Property => ConfirmQuestion::new(
                "Do you want to add properties (readable/writable state)?",
                true,
            ),
            Self::Action => ConfirmQuestion::new(
                "Do you want to add actions (operations the device can perform)?",
                true,
            ),
            Self::Event => ConfirmQuestion::new(
                "Do you want to add events (notifications from the device)?",
                false,
            ),
        }
    }

    pub fn another(self) -> ConfirmQuestion {
        let noun = match self {
            Self::Property => "property",
            Self::Action => "action",
            Self::Event => "event",
        };
        ConfirmQuestion::new(format!("Add another {noun}?"), false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Gate,
    Entry,
    Another,
    Done,
}

/// Entries of one [EntryKind], asked lazily
///
/// The gate question is asked on the first call to `next`, then one entry is collected per
/// call, each followed by the "add another" question. The iterator ends when the operator
/// declines or after the first error.
pub struct Entries<'p, P, T> {
    prompter: &'p mut P,
    kind: EntryKind,
    ask: fn(&mut P) -> Result<T, Error>,
    state: State,
}

impl<'p, P: Prompter, T> Entries<'p, P, T> {
    pub fn new(
        prompter: &'p mut P,
        kind: EntryKind,
        ask: fn(&mut P) -> Result<T, Error>,
    ) -> Self {
        Self {
            prompter,
            kind,
            ask,
            state: State::Gate,
        }
    }

    fn proceed(&mut self, question: ConfirmQuestion) -> Result<(), Error> {
        self.state = State::Done;
        if self.prompter.confirm(&question)? {
            self.state = State::Entry;
        }
        Ok(())
    }
}

impl<P: Prompter, T> Iterator for Entries<'_, P, T> {
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = match self.state {
                State::Done => return None,
                State::Gate => self.proceed(self.kind.gate()),
                State::Another => self.proceed(self.kind.another()),
                State::Entry => {
                    let entry = (self.ask)(self.prompter);
                    self.state = if entry.is_ok() {
                        info!(kind = ?self.kind, "entry collected");
                        State::Another
                    } else {
                        State::Done
                    };
                    return Some(entry);
                }
            };

            if let Err(err) = step {
                return Some(Err(err));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use crate::prompt::TerminalPrompter;

    use super::*;

    type Scripted = TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>>;

    fn prompter(lines: &[&str]) -> Scripted {
        let mut input = lines.join("\n");
        input.push('\n');
        TerminalPrompter::new(Cursor::new(input.into_bytes()), Vec::new())
    }

    fn output(prompter: Scripted) -> String {
        String::from_utf8(prompter.into_output()).unwrap()
    }

    #[test]
    fn all_defaults() {
        let mut p = prompter(&[
            "", "", "7", // title, description, device type
            "", "", "", // host, port, protocol
            "", // security
            "n", "n", "", // properties, actions, events
        ]);

        let answers = questionnaire(&mut p).unwrap();
        assert_eq!(
            answers,
            Answers {
                device: DeviceInfo {
                    title: "My IoT Device".to_string(),
                    description: "A Web of Things device".to_string(),
                    device_type: DeviceType::Custom,
                },
                network: Network {
                    host: "localhost".to_string(),
                    port: 8080,
                    protocol: Protocol::Http,
                },
                security: SecurityChoice::NoSec,
                properties: vec![],
                actions: vec![],
                events: vec![],
            }
        );
    }

    #[test]
    fn invalid_port_is_asked_again() {
        let mut p = prompter(&["sensor.local", "0", "70000", "abc", " 5683 ", "CoAP"]);

        let network = network(&mut p).unwrap();
        assert_eq!(
            network,
            Network {
                host: "sensor.local".to_string(),
                port: 5683,
                protocol: Protocol::Coap,
            }
        );
        assert_eq!(
            output(p)
                .matches(">> Port must be between 1 and 65535")
                .count(),
            3
        );
    }

    #[test]
    fn property_loop() {
        let mut p = prompter(&[
            "y", // add properties
            "temperature", "Current temperature", "2", "y", "n", "y", "celsius",
            "y", // another
            "on", "", "4", "y", "y", "n", "",
            "n", // no more
        ]);

        let entries = Entries::new(&mut p, EntryKind::Property, property_entry)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(
            entries,
            [
                PropertyEntry {
                    name: "temperature".to_string(),
                    description: "Current temperature".to_string(),
                    data_type: DataType::Number,
                    access: Access::ReadOnly,
                    observable: true,
                    unit: "celsius".to_string(),
                },
                PropertyEntry {
                    name: "on".to_string(),
                    description: String::new(),
                    data_type: DataType::Boolean,
                    access: Access::ReadWrite,
                    observable: false,
                    unit: String::new(),
                },
            ]
        );
    }

    #[test]
    fn property_without_capabilities_becomes_readable() {
        let mut p = prompter(&["status", "", "1", "n", "n", "n", ""]);

        let entry = property_entry(&mut p).unwrap();
        assert_eq!(entry.access, Access::ReadOnly);
        assert!(output(p).contains("Setting as readable."));
    }

    #[test]
    fn declined_gate_asks_nothing_else() {
        let mut p = prompter(&["n"]);

        let mut entries = Entries::new(&mut p, EntryKind::Action, action_entry);
        assert!(entries.next().is_none());
        assert!(entries.next().is_none());
        assert_eq!(
            output(p),
            "? Do you want to add actions (operations the device can perform)? (Y/n) "
        );
    }

    #[test]
    fn closed_input_stops_the_loop() {
        let mut p = prompter(&["y", "reset"]);

        let mut entries = Entries::new(&mut p, EntryKind::Action, action_entry);
        assert!(matches!(entries.next(), Some(Err(Error::Closed))));
        assert!(entries.next().is_none());
    }

    #[test]
    fn filename_default() {
        let mut p = prompter(&[""]);
        assert_eq!(
            filename(&mut p, "Kitchen Lamp").unwrap(),
            "kitchen-lamp-td.json"
        );
    }
}
