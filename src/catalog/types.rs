//! Payload types stored in catalog images.
//!
//! These are the values handed out by catalog lookups: the signature of a built-in
//! method, the type of a property or system variable, and the coarse classification of
//! a built-in object. They are plain data; encoding lives in [`crate::catalog::codec`].

use std::fmt;

use bitflags::bitflags;
use strum::{Display, EnumIter, EnumString, FromRepr};

/// Scalar PeopleCode types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, FromRepr,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PrimitiveType {
    /// `boolean`
    Boolean = 1,
    /// `integer`
    Integer = 2,
    /// `number`
    Number = 3,
    /// `float`
    Float = 4,
    /// `decimal`
    Decimal = 5,
    /// `string`
    String = 6,
    /// `date`
    Date = 7,
    /// `datetime`
    DateTime = 8,
    /// `time`
    Time = 9,
}

/// Discriminant of an encoded [`TypeInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum TypeTag {
    /// [`TypeInfo::Any`]
    Any = 0,
    /// [`TypeInfo::Unknown`]
    Unknown = 1,
    /// [`TypeInfo::Void`]
    Void = 2,
    /// [`TypeInfo::Primitive`]
    Primitive = 3,
    /// [`TypeInfo::Object`]
    Object = 4,
    /// [`TypeInfo::AppClass`]
    AppClass = 5,
    /// [`TypeInfo::Array`]
    Array = 6,
}

/// A PeopleCode type as seen by the semantic layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeInfo {
    /// Type could not be determined
    #[default]
    Unknown,
    /// Accepts any value
    Any,
    /// No value (method return type only)
    Void,
    /// A scalar type
    Primitive(PrimitiveType),
    /// A built-in object type such as `Rowset` or `Field`
    Object(String),
    /// An application class, by qualified name
    AppClass(String),
    /// `array of ... of element` with `dimensions` levels
    Array {
        /// Non-array element type
        element: Box<TypeInfo>,
        /// Nesting depth, at least 1
        dimensions: u8,
    },
}

impl TypeInfo {
    /// Builds an array type, folding nested arrays into a single dimension count.
    #[must_use]
    pub fn array_of(element: TypeInfo, dimensions: u8) -> TypeInfo {
        match element {
            TypeInfo::Array {
                element,
                dimensions: inner,
            } => TypeInfo::Array {
                element,
                dimensions: inner.saturating_add(dimensions),
            },
            element => TypeInfo::Array {
                element: Box::new(element),
                dimensions: dimensions.max(1),
            },
        }
    }

    /// Encoding tag of this type.
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        match self {
            TypeInfo::Unknown => TypeTag::Unknown,
            TypeInfo::Any => TypeTag::Any,
            TypeInfo::Void => TypeTag::Void,
            TypeInfo::Primitive(_) => TypeTag::Primitive,
            TypeInfo::Object(_) => TypeTag::Object,
            TypeInfo::AppClass(_) => TypeTag::AppClass,
            TypeInfo::Array { .. } => TypeTag::Array,
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::Unknown => f.write_str("<unknown>"),
            TypeInfo::Any => f.write_str("any"),
            TypeInfo::Void => f.write_str("void"),
            TypeInfo::Primitive(primitive) => write!(f, "{primitive}"),
            TypeInfo::Object(name) | TypeInfo::AppClass(name) => f.write_str(name),
            TypeInfo::Array {
                element,
                dimensions,
            } => {
                for _ in 0..*dimensions {
                    f.write_str("array of ")?;
                }
                write!(f, "{element}")
            }
        }
    }
}

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
    /// Parameter modifiers of a built-in method
    pub struct ParameterFlags: u8 {
        /// The argument may be omitted
        const OPTIONAL = 0x01;
        /// The parameter accepts any number of trailing arguments
        const VARIADIC = 0x02;
        /// The argument is passed by reference
        const BY_REF = 0x04;
    }
}

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
    /// Property modifiers of a built-in object
    pub struct PropertyFlags: u8 {
        /// The property cannot be assigned
        const READ_ONLY = 0x01;
        /// The property takes an index, e.g. `&rs.GetRow(1)`
        const INDEXED = 0x02;
    }
}

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
    /// Modifiers of a system variable
    pub struct SystemVariableFlags: u8 {
        /// The variable cannot be assigned
        const READ_ONLY = 0x01;
        /// Kept for compatibility, should not be used in new code
        const DEPRECATED = 0x02;
    }
}

/// A parameter of a built-in method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: TypeInfo,
    /// Modifiers
    pub flags: ParameterFlags,
}

impl ParameterInfo {
    /// Creates a required parameter.
    pub fn new(name: impl Into<String>, ty: TypeInfo) -> Self {
        ParameterInfo {
            name: name.into(),
            ty,
            flags: ParameterFlags::empty(),
        }
    }

    /// Returns the parameter with additional flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ParameterFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// Signature of a built-in method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    /// Method name as declared
    pub name: String,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterInfo>,
    /// Return type, [`TypeInfo::Void`] for none
    pub return_type: TypeInfo,
}

impl FunctionInfo {
    /// Creates a method signature.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ParameterInfo>,
        return_type: TypeInfo,
    ) -> Self {
        FunctionInfo {
            name: name.into(),
            parameters,
            return_type,
        }
    }

    /// Minimum number of arguments a call must pass.
    #[must_use]
    pub fn min_args(&self) -> usize {
        self.parameters
            .iter()
            .filter(|p| !p.flags.intersects(ParameterFlags::OPTIONAL | ParameterFlags::VARIADIC))
            .count()
    }

    /// Maximum number of arguments, `None` if the method is variadic.
    #[must_use]
    pub fn max_args(&self) -> Option<usize> {
        if self
            .parameters
            .iter()
            .any(|p| p.flags.contains(ParameterFlags::VARIADIC))
        {
            None
        } else {
            Some(self.parameters.len())
        }
    }

    /// Returns `true` if a call with `count` arguments matches the arity.
    #[must_use]
    pub fn accepts_arg_count(&self, count: usize) -> bool {
        count >= self.min_args() && self.max_args().map_or(true, |max| count <= max)
    }
}

/// A property of a built-in object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    /// Property name as declared
    pub name: String,
    /// Property type
    pub ty: TypeInfo,
    /// Modifiers
    pub flags: PropertyFlags,
}

impl PropertyInfo {
    /// Creates a read-write property.
    pub fn new(name: impl Into<String>, ty: TypeInfo) -> Self {
        PropertyInfo {
            name: name.into(),
            ty,
            flags: PropertyFlags::empty(),
        }
    }

    /// Creates a read-only property.
    pub fn read_only(name: impl Into<String>, ty: TypeInfo) -> Self {
        PropertyInfo {
            flags: PropertyFlags::READ_ONLY,
            ..Self::new(name, ty)
        }
    }

    /// Returns `true` if the property cannot be assigned.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(PropertyFlags::READ_ONLY)
    }
}

/// Coarse classification of a built-in object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, FromRepr)]
#[repr(u8)]
pub enum ObjectKind {
    /// Component buffer access: `Rowset`, `Row`, `Record`, `Field`
    DataBuffer = 1,
    /// Page and user interface objects: `Grid`, `Chart`
    Ui = 2,
    /// Integration APIs: `Message`, `SQL`, `File`
    Api = 3,
    /// Generic containers: `Array`
    Collection = 4,
    /// Everything else
    Utility = 5,
}

/// System variable as written into a [`crate::catalog::SystemVariableTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemVariableDefinition {
    /// Variable name including the leading `%`
    pub name: String,
    /// Value type; must be [`TypeInfo::Any`] or a [`TypeInfo::Primitive`]
    pub ty: TypeInfo,
    /// Modifiers
    pub flags: SystemVariableFlags,
}

impl SystemVariableDefinition {
    /// Creates a read-only system variable.
    pub fn new(name: impl Into<String>, ty: TypeInfo) -> Self {
        SystemVariableDefinition {
            name: name.into(),
            ty,
            flags: SystemVariableFlags::READ_ONLY,
        }
    }

    /// Returns the definition with different flags.
    #[must_use]
    pub fn with_flags(mut self, flags: SystemVariableFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// System variable as returned by a [`crate::catalog::SystemVariableTable`] lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemVariableInfo {
    /// Value type
    pub ty: TypeInfo,
    /// Modifiers
    pub flags: SystemVariableFlags,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn primitive_names() {
        assert_eq!(PrimitiveType::DateTime.to_string(), "datetime");
        assert_eq!("INTEGER".parse::<PrimitiveType>().unwrap(), PrimitiveType::Integer);
        for primitive in PrimitiveType::iter() {
            assert_eq!(PrimitiveType::from_repr(primitive as u8), Some(primitive));
        }
        assert_eq!(PrimitiveType::from_repr(0), None);
    }

    #[test]
    fn array_display_and_folding() {
        let inner = TypeInfo::array_of(TypeInfo::Primitive(PrimitiveType::String), 1);
        let outer = TypeInfo::array_of(inner, 1);
        assert_eq!(
            outer,
            TypeInfo::Array {
                element: Box::new(TypeInfo::Primitive(PrimitiveType::String)),
                dimensions: 2
            }
        );
        assert_eq!(outer.to_string(), "array of array of string");
        assert_eq!(TypeInfo::Object("Rowset".into()).to_string(), "Rowset");
    }

    #[test]
    fn arity() {
        let get_row = FunctionInfo::new(
            "GetRow",
            vec![ParameterInfo::new("n", TypeInfo::Primitive(PrimitiveType::Integer))],
            TypeInfo::Object("Row".into()),
        );
        assert_eq!(get_row.min_args(), 1);
        assert_eq!(get_row.max_args(), Some(1));
        assert!(get_row.accepts_arg_count(1));
        assert!(!get_row.accepts_arg_count(0));

        let fill = FunctionInfo::new(
            "Fill",
            vec![
                ParameterInfo::new("where", TypeInfo::Primitive(PrimitiveType::String))
                    .with_flags(ParameterFlags::OPTIONAL),
                ParameterInfo::new("binds", TypeInfo::Any).with_flags(ParameterFlags::VARIADIC),
            ],
            TypeInfo::Primitive(PrimitiveType::Integer),
        );
        assert_eq!(fill.min_args(), 0);
        assert_eq!(fill.max_args(), None);
        assert!(fill.accepts_arg_count(7));
    }

    #[test]
    fn object_kind_repr() {
        assert_eq!(ObjectKind::from_repr(1), Some(ObjectKind::DataBuffer));
        assert_eq!(ObjectKind::from_repr(0), None);
        assert_eq!(ObjectKind::Api.to_string(), "Api");
    }
}
