//! Command definitions
//!
//! Builds the single text line sent to the server for a command.

use std::collections::HashMap;

use crate::error::{CgpError, Result};
use super::codec::Serializer;
use super::WireValue;

/// A type-specific command builder
pub type BuilderFn = Box<dyn Fn(&[WireValue]) -> Result<String> + Send>;

/// Registry of type-specific builders, keyed by capitalized command name
#[derive(Default)]
pub struct CommandBuilders {
    builders: HashMap<String, BuilderFn>,
}

impl CommandBuilders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder for `name`, replacing any earlier one
    pub fn register<F>(&mut self, name: &str, builder: F)
    where
        F: Fn(&[WireValue]) -> Result<String> + Send + 'static,
    {
        self.builders.insert(builder_key(name), Box::new(builder));
    }

    pub fn get(&self, name: &str) -> Option<&BuilderFn> {
        self.builders.get(&builder_key(name))
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl std::fmt::Debug for CommandBuilders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.builders.keys()).finish()
    }
}

/// `deleteaccount` and `DELETEACCOUNT` both map to `Deleteaccount`
pub fn builder_key(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the command line for `name` and `parameters`
///
/// A registered builder for the name wins. Otherwise scalar parameters are
/// appended as-is, non-empty lists and dictionaries are appended in
/// dictionary format, and empty ones are skipped.
pub fn build_command(
    name: &str,
    parameters: &[WireValue],
    builders: &CommandBuilders,
    serializer: &dyn Serializer,
) -> Result<String> {
    if name.is_empty() {
        return Err(CgpError::InvalidCommand("No valid command provided".to_string()));
    }

    if let Some(builder) = builders.get(name) {
        return builder(parameters);
    }

    let mut command = name.to_string();
    for parameter in parameters {
        match parameter {
            WireValue::Scalar(text) => {
                command.push(' ');
                command.push_str(text);
            }
            structured if !structured.is_empty() => {
                command.push(' ');
                command.push_str(&serializer.serialize(Some(structured)));
            }
            _ => {}
        }
    }

    Ok(command)
}
