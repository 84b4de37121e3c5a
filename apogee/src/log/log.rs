use std::{
    fmt,
    fmt::Display,
    mem,
};

use itertools::Itertools;

/// A value that can be attached to an [`Event`].
///
/// A plain string is a flag. A `(key, value)` pair is a property.
pub trait EventLoggable {
    fn log(&self, event: &mut Event);
}

impl EventLoggable for &str {
    fn log(&self, event: &mut Event) {
        event.add_flag(*self);
    }
}

impl EventLoggable for String {
    fn log(&self, event: &mut Event) {
        event.add_flag(self.as_str());
    }
}

impl<K, V> EventLoggable for (K, V)
where
    K: Display,
    V: Display,
{
    fn log(&self, event: &mut Event) {
        event.set(self.0.to_string(), self.1.to_string());
    }
}

/// A single entry in the battle log.
///
/// Rendered as `title|key:value|flag|...`, in insertion order. Build with the
/// [`log_event`][`crate::log_event`] macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    title: String,
    entries: Vec<(String, Option<String>)>,
}

impl Event {
    /// Creates a new event with no properties.
    pub fn new<S>(title: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Adds a flag, which has no value.
    pub fn add_flag<S>(&mut self, flag: S)
    where
        S: Into<String>,
    {
        self.entries.push((flag.into(), None));
    }

    /// Sets a property, overwriting any existing value for the key.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, value)| *existing == key && value.is_some())
        {
            Some((_, existing)) => *existing = Some(value),
            None => self.entries.push((key, Some(value))),
        }
    }

    /// Extends the event with another loggable value.
    pub fn extend<L>(&mut self, value: &L)
    where
        L: EventLoggable + ?Sized,
    {
        value.log(self);
    }

    /// Looks up a property by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .and_then(|(_, value)| value.as_deref())
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for (key, value) in &self.entries {
            match value {
                Some(value) => write!(f, "|{key}:{value}")?,
                None => write!(f, "|{key}")?,
            }
        }
        Ok(())
    }
}

/// Constructs an [`Event`] for the battle log.
///
/// The first argument is the event title. Each following argument is a flag (`"silent"`) or a
/// property (`("mon", details)`).
#[macro_export]
macro_rules! log_event {
    ($title:expr $(, $arg:expr)* $(,)?) => {{
        #[allow(unused_mut)]
        let mut event = $crate::log::Event::new($title);
        $(event.extend(&$arg);)*
        event
    }};
}

/// The battle log.
///
/// Tracks how far it has been read so that callers can poll for new entries.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    logs: Vec<String>,
    last_read: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Are there entries that have not been read out?
    pub fn has_new_messages(&self) -> bool {
        self.last_read < self.logs.len()
    }

    pub fn push(&mut self, event: Event) {
        self.logs.push(event.to_string());
    }

    pub fn push_extend<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = Event>,
    {
        self.logs
            .extend(events.into_iter().map(|event| event.to_string()));
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// All entries.
    pub fn logs(&self) -> impl Iterator<Item = &str> {
        self.logs.iter().map(|log| log.as_str())
    }

    /// Entries added since the last read out, marking them as read.
    pub fn read_out(&mut self) -> impl Iterator<Item = &str> {
        let i = mem::replace(&mut self.last_read, self.logs.len());
        self.logs[i..].iter().map(|log| log.as_str())
    }

    /// Joins all entries into a single newline-separated string.
    pub fn to_text(&self) -> String {
        self.logs.iter().join("\n")
    }
}
