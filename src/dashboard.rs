//! Key/value telemetry shown to the drive team, plus the autonomous chooser.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::cell::RefCell;

use hashbrown::HashMap;
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    String(String),
    StringArray(Vec<String>),
}

robot_local! {
    static ENTRIES: RefCell<HashMap<String, Value>> = RefCell::new(HashMap::new());
}

fn put(key: &str, value: Value) {
    ENTRIES.with(|entries| {
        let mut entries = entries.borrow_mut();
        if entries.get(key) != Some(&value) {
            debug!("{key} = {value:?}");
            entries.insert(key.to_string(), value);
        }
    });
}

fn get(key: &str) -> Option<Value> {
    ENTRIES.with(|entries| entries.borrow().get(key).cloned())
}

pub fn put_number(key: &str, value: f64) {
    put(key, Value::Number(value));
}

pub fn put_bool(key: &str, value: bool) {
    put(key, Value::Bool(value));
}

pub fn put_string(key: &str, value: impl Into<String>) {
    put(key, Value::String(value.into()));
}

pub fn put_string_array(key: &str, value: Vec<String>) {
    put(key, Value::StringArray(value));
}

pub fn get_number(key: &str) -> Option<f64> {
    match get(key)? {
        Value::Number(value) => Some(value),
        _ => None,
    }
}

pub fn get_bool(key: &str) -> Option<bool> {
    match get(key)? {
        Value::Bool(value) => Some(value),
        _ => None,
    }
}

pub fn get_string(key: &str) -> Option<String> {
    match get(key)? {
        Value::String(value) => Some(value),
        _ => None,
    }
}

pub fn get_string_array(key: &str) -> Option<Vec<String>> {
    match get(key)? {
        Value::StringArray(value) => Some(value),
        _ => None,
    }
}

/// A named set of options, one of which the drive team picks from the dashboard.
#[derive(Debug, Clone)]
pub struct SendableChooser<T> {
    options: Vec<(String, T)>,
    default: Option<String>,
    key: Option<String>,
}

impl<T: Clone> Default for SendableChooser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SendableChooser<T> {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            default: None,
            key: None,
        }
    }

    /// Adds an option, replacing any with the same name.
    pub fn add_option(&mut self, name: &str, value: T) {
        match self.options.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.options.push((name.to_string(), value)),
        }
        self.republish();
    }

    pub fn set_default_option(&mut self, name: &str, value: T) {
        self.default = Some(name.to_string());
        self.add_option(name, value);
    }

    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|(name, _)| name.as_str())
    }

    /// Publishes the option names under `"<key>/options"` and the default under `"<key>/default"`.
    pub fn publish(&mut self, key: &str) {
        self.key = Some(key.to_string());
        self.republish();
    }

    fn republish(&self) {
        let Some(key) = &self.key else {
            return;
        };
        put_string_array(
            &alloc::format!("{key}/options"),
            self.options().map(ToString::to_string).collect(),
        );
        if let Some(default) = &self.default {
            put_string(&alloc::format!("{key}/default"), default.as_str());
        }
    }

    /// The option picked on the dashboard, or the default if nothing valid was picked.
    pub fn selected_name(&self) -> Option<String> {
        let picked = self
            .key
            .as_ref()
            .and_then(|key| get_string(&alloc::format!("{key}/selected")))
            .filter(|name| self.options().any(|option| option == name.as_str()));
        picked.or_else(|| self.default.clone())
    }

    pub fn selected(&self) -> Option<T> {
        let name = self.selected_name()?;
        self.options
            .iter()
            .find(|(option, _)| *option == name)
            .map(|(_, value)| value.clone())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn values_are_typed() {
        put_number("Heading", -30.0);
        put_bool("Upper Limit Tripped?", false);

        assert_eq!(get_number("Heading"), Some(-30.0));
        assert_eq!(get_bool("Upper Limit Tripped?"), Some(false));
        assert_eq!(get_bool("Heading"), None);
        assert_eq!(get_string("missing"), None);
    }

    #[test]
    fn chooser_falls_back_to_default() {
        let mut chooser = SendableChooser::new();
        chooser.set_default_option("Competition", 1);
        chooser.add_option("Timed Auto", 2);
        chooser.publish("Autonomous");

        assert_eq!(
            get_string_array("Autonomous/options"),
            Some(vec!["Competition".to_string(), "Timed Auto".to_string()])
        );
        assert_eq!(get_string("Autonomous/default").as_deref(), Some("Competition"));
        assert_eq!(chooser.selected(), Some(1));

        put_string("Autonomous/selected", "Timed Auto");
        assert_eq!(chooser.selected(), Some(2));

        put_string("Autonomous/selected", "Not An Option");
        assert_eq!(chooser.selected(), Some(1));
    }

    #[test]
    fn empty_chooser_selects_nothing() {
        let chooser = SendableChooser::<u8>::new();
        assert_eq!(chooser.selected(), None);
    }
}
