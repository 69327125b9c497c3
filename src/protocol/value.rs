//! Wire values
//!
//! The structured values carried by the dictionary format.

/// A value in dictionary format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    /// Bare token or quoted string, escapes already decoded
    Scalar(String),

    /// `( v1 , v2 , ... )`
    List(Vec<WireValue>),

    /// `{ k1=v1 ; k2=v2 ; ... }`
    ///
    /// Entries keep insertion order and keys may repeat.
    Dict(Vec<(String, WireValue)>),
}

impl WireValue {
    /// Empty dictionary
    pub fn dict() -> Self {
        WireValue::Dict(Vec::new())
    }

    /// Empty list
    pub fn list() -> Self {
        WireValue::List(Vec::new())
    }

    /// Append an entry to a dictionary, builder style.
    /// Has no effect on lists and scalars.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<WireValue>) -> Self {
        if let WireValue::Dict(entries) = &mut self {
            entries.push((key.into(), value.into()));
        }
        self
    }

    /// Append an element to a list, builder style.
    /// Has no effect on dictionaries and scalars.
    pub fn push(mut self, value: impl Into<WireValue>) -> Self {
        if let WireValue::List(items) = &mut self {
            items.push(value.into());
        }
        self
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[WireValue]> {
        match self {
            WireValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(String, WireValue)]> {
        match self {
            WireValue::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// First value stored under `key` in a dictionary
    pub fn get(&self, key: &str) -> Option<&WireValue> {
        self.as_dict()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, WireValue::Scalar(_))
    }

    /// True for an empty scalar, list or dictionary
    pub fn is_empty(&self) -> bool {
        match self {
            WireValue::Scalar(s) => s.is_empty(),
            WireValue::List(items) => items.is_empty(),
            WireValue::Dict(entries) => entries.is_empty(),
        }
    }
}

impl From<&str> for WireValue {
    fn from(s: &str) -> Self {
        WireValue::Scalar(s.to_string())
    }
}

impl From<String> for WireValue {
    fn from(s: String) -> Self {
        WireValue::Scalar(s)
    }
}

impl From<Vec<WireValue>> for WireValue {
    fn from(items: Vec<WireValue>) -> Self {
        WireValue::List(items)
    }
}

impl From<Vec<(String, WireValue)>> for WireValue {
    fn from(entries: Vec<(String, WireValue)>) -> Self {
        WireValue::Dict(entries)
    }
}
