//! Metadata of user-defined PeopleCode types.

use strum::{Display, EnumString};

use crate::catalog::types::{FunctionInfo, PropertyInfo};

/// What a qualified name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum MetadataKind {
    /// An application class
    Class,
    /// An application class interface
    Interface,
    /// A record field program exposing functions via `Declare Function`
    FunctionLibrary,
}

/// Members and relations of one user-defined type.
///
/// Produced by a [`crate::resolver::MetadataSource`] and shared read-only through the
/// resolver cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    /// Fully qualified name, e.g. `PKG:Sub:Widget`
    pub qualified_name: String,
    /// Kind of type
    pub kind: MetadataKind,
    /// Qualified name of the extended class
    pub base_type: Option<String>,
    /// Qualified names of implemented interfaces
    pub interfaces: Vec<String>,
    /// Declared methods
    pub methods: Vec<FunctionInfo>,
    /// Declared properties and instance variables
    pub properties: Vec<PropertyInfo>,
    /// Constructor signature, if declared
    pub constructor: Option<FunctionInfo>,
}

impl TypeMetadata {
    /// Creates metadata without members.
    pub fn new(qualified_name: impl Into<String>, kind: MetadataKind) -> Self {
        TypeMetadata {
            qualified_name: qualified_name.into(),
            kind,
            base_type: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            constructor: None,
        }
    }

    /// Sets the extended class.
    #[must_use]
    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    /// Adds an implemented interface.
    #[must_use]
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Adds a method.
    #[must_use]
    pub fn with_method(mut self, method: FunctionInfo) -> Self {
        self.methods.push(method);
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn with_property(mut self, property: PropertyInfo) -> Self {
        self.properties.push(property);
        self
    }

    /// Sets the constructor.
    #[must_use]
    pub fn with_constructor(mut self, constructor: FunctionInfo) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Finds a method by name, ignoring case.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&FunctionInfo> {
        self.methods.iter().find(|method| same_name(&method.name, name))
    }

    /// Finds a property by name, ignoring case.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties
            .iter()
            .find(|property| same_name(&property.name, name))
    }

    /// Last segment of the qualified name: `Widget` for `PKG:Sub:Widget`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.qualified_name
            .rsplit_once(':')
            .map_or(self.qualified_name.as_str(), |(_, name)| name)
    }

    /// Package path of the qualified name: `PKG:Sub` for `PKG:Sub:Widget`.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.qualified_name
            .rsplit_once(':')
            .map(|(package, _)| package)
    }
}

fn same_name(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        a.eq_ignore_ascii_case(b)
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}
