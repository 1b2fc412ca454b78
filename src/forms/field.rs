use std::collections::HashMap;
use std::fmt;

/// Category of a form control, parsed from its raw `type` tag
///
/// Matching is exact: `"Password"` is not `Password`, it lands in
/// [`FieldKind::Other`] with the tag preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Radio,
    Checkbox,
    Email,
    Color,
    Number,
    Range,
    Password,
    Tel,
    /// Any other tag, including `text`, `date` and the empty tag
    Other(String),
}

impl FieldKind {
    /// Parses a raw `type` attribute value
    pub fn parse(tag: &str) -> Self {
        match tag {
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            "email" => Self::Email,
            "color" => Self::Color,
            "number" => Self::Number,
            "range" => Self::Range,
            "password" => Self::Password,
            "tel" => Self::Tel,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the raw tag this kind was parsed from
    pub fn as_str(&self) -> &str {
        match self {
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Email => "email",
            Self::Color => "color",
            Self::Number => "number",
            Self::Range => "range",
            Self::Password => "password",
            Self::Tel => "tel",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for FieldKind {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One form control, as seen by the fill engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Control category
    pub kind: FieldKind,

    /// The `name` attribute (empty if absent)
    pub name: String,

    /// Explicit value carried by the markup (empty means absent)
    pub value: String,

    /// Every attribute on the element, keys as given
    pub attributes: HashMap<String, String>,
}

impl FieldDescriptor {
    /// Creates a descriptor with no attributes
    pub fn new(kind: impl Into<FieldKind>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            value: value.into(),
            attributes: HashMap::new(),
        }
    }

    /// Adds a raw attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
