//! Payload codecs for catalog tables.
//!
//! Each codec pairs an encoder (writer item to bytes) with a decoder (bytes to reader
//! item) and plugs into a strategy of [`crate::index::strategy`]:
//!
//! | Codec | Strategy | Writes | Reads |
//! |-------|----------|--------|-------|
//! | [`FunctionCodec`] | variable | [`FunctionInfo`] | [`FunctionInfo`] |
//! | [`PropertyCodec`] | variable | [`PropertyInfo`] | [`PropertyInfo`] |
//! | [`ObjectRecordCodec`] | variable | [`ObjectRecord`] | `Arc<BuiltinObject>` |
//! | [`SystemVariableCodec`] | fixed, 4 bytes | [`SystemVariableDefinition`] | [`SystemVariableInfo`] |
//!
//! # Type Encoding
//!
//! ```text
//! tag u8 (TypeTag)
//!   Primitive  -> primitive u8
//!   Object     -> name (7-bit length-prefixed UTF-8)
//!   AppClass   -> name
//!   Array      -> dimensions u8, element type (never itself an array)
//! ```

use std::sync::Arc;

use crate::{
    catalog::{
        object::BuiltinObject,
        types::{
            FunctionInfo, ObjectKind, ParameterFlags, ParameterInfo, PrimitiveType,
            PropertyFlags, PropertyInfo, SystemVariableDefinition, SystemVariableFlags,
            SystemVariableInfo, TypeInfo, TypeTag,
        },
    },
    file::buffer::ByteBuffer,
    index::strategy::{FixedPayload, PayloadDecoder, PayloadEncoder},
    Error, Parser, Result,
};

/// Appends the encoding of `ty`.
///
/// # Errors
/// Returns [`crate::Error::Error`] for an array without dimensions, an array whose
/// element is itself an array, or names too long for the format.
pub fn write_type(buffer: &mut ByteBuffer, ty: &TypeInfo) -> Result<()> {
    buffer.write_le(ty.tag() as u8);
    match ty {
        TypeInfo::Unknown | TypeInfo::Any | TypeInfo::Void => Ok(()),
        TypeInfo::Primitive(primitive) => {
            buffer.write_le(*primitive as u8);
            Ok(())
        }
        TypeInfo::Object(name) | TypeInfo::AppClass(name) => {
            buffer.write_prefixed_string_utf8(name)
        }
        TypeInfo::Array {
            element,
            dimensions,
        } => {
            if *dimensions == 0 {
                return Err(Error::Error(format!(
                    "Array type of '{element}' must have at least one dimension"
                )));
            }
            if matches!(**element, TypeInfo::Array { .. }) {
                return Err(Error::Error(format!(
                    "Array element of '{ty}' must not be an array, use TypeInfo::array_of"
                )));
            }
            buffer.write_le(*dimensions);
            write_type(buffer, element)
        }
    }
}

/// Reads a type written by [`write_type`].
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for unknown tags or primitives and nested arrays.
pub fn read_type(parser: &mut Parser<'_>) -> Result<TypeInfo> {
    read_type_inner(parser, true)
}

fn read_type_inner(parser: &mut Parser<'_>, allow_array: bool) -> Result<TypeInfo> {
    let raw_tag = parser.read_le::<u8>()?;
    let Some(tag) = TypeTag::from_repr(raw_tag) else {
        return Err(malformed_error!("Unknown type tag - {}", raw_tag));
    };

    Ok(match tag {
        TypeTag::Any => TypeInfo::Any,
        TypeTag::Unknown => TypeInfo::Unknown,
        TypeTag::Void => TypeInfo::Void,
        TypeTag::Primitive => TypeInfo::Primitive(read_primitive(parser.read_le::<u8>()?)?),
        TypeTag::Object => TypeInfo::Object(parser.read_prefixed_string_utf8()?),
        TypeTag::AppClass => TypeInfo::AppClass(parser.read_prefixed_string_utf8()?),
        TypeTag::Array => {
            if !allow_array {
                return Err(malformed_error!("Nested array element type"));
            }
            let dimensions = parser.read_le::<u8>()?;
            if dimensions == 0 {
                return Err(malformed_error!("Array type without dimensions"));
            }
            TypeInfo::Array {
                element: Box::new(read_type_inner(parser, false)?),
                dimensions,
            }
        }
    })
}

fn read_primitive(raw: u8) -> Result<PrimitiveType> {
    PrimitiveType::from_repr(raw).ok_or_else(|| malformed_error!("Unknown primitive type - {}", raw))
}

fn write_count(buffer: &mut ByteBuffer, count: usize) -> Result<()> {
    let count = u32::try_from(count)
        .map_err(|_| Error::Error(format!("Element count {count} exceeds u32")))?;
    buffer.write_7bit_encoded_int(count);
    Ok(())
}

/// Codec for method signatures.
pub struct FunctionCodec;

impl PayloadEncoder for FunctionCodec {
    type Item = FunctionInfo;

    fn key(item: &FunctionInfo) -> &str {
        &item.name
    }

    fn encode(item: &FunctionInfo, buffer: &mut ByteBuffer) -> Result<()> {
        buffer.write_prefixed_string_utf8(&item.name)?;
        write_type(buffer, &item.return_type)?;
        write_count(buffer, item.parameters.len())?;
        for parameter in &item.parameters {
            buffer.write_prefixed_string_utf8(&parameter.name)?;
            write_type(buffer, &parameter.ty)?;
            buffer.write_le(parameter.flags.bits());
        }
        Ok(())
    }
}

impl PayloadDecoder for FunctionCodec {
    type Item = FunctionInfo;

    fn decode(parser: &mut Parser<'_>) -> Result<FunctionInfo> {
        let name = parser.read_prefixed_string_utf8()?;
        let return_type = read_type(parser)?;

        let count = parser.read_7bit_encoded_int()? as usize;
        // name prefix, type tag and flags: at least three bytes per parameter
        parser.ensure_remaining(count.saturating_mul(3))?;

        let mut parameters = Vec::with_capacity(count);
        for _ in 0..count {
            let name = parser.read_prefixed_string_utf8()?;
            let ty = read_type(parser)?;
            let raw_flags = parser.read_le::<u8>()?;
            let Some(flags) = ParameterFlags::from_bits(raw_flags) else {
                return Err(malformed_error!("Unknown parameter flags - 0x{:02X}", raw_flags));
            };
            parameters.push(ParameterInfo { name, ty, flags });
        }

        Ok(FunctionInfo {
            name,
            parameters,
            return_type,
        })
    }
}

/// Codec for object properties.
pub struct PropertyCodec;

impl PayloadEncoder for PropertyCodec {
    type Item = PropertyInfo;

    fn key(item: &PropertyInfo) -> &str {
        &item.name
    }

    fn encode(item: &PropertyInfo, buffer: &mut ByteBuffer) -> Result<()> {
        buffer.write_prefixed_string_utf8(&item.name)?;
        write_type(buffer, &item.ty)?;
        buffer.write_le(item.flags.bits());
        Ok(())
    }
}

impl PayloadDecoder for PropertyCodec {
    type Item = PropertyInfo;

    fn decode(parser: &mut Parser<'_>) -> Result<PropertyInfo> {
        let name = parser.read_prefixed_string_utf8()?;
        let ty = read_type(parser)?;
        let raw_flags = parser.read_le::<u8>()?;
        let Some(flags) = PropertyFlags::from_bits(raw_flags) else {
            return Err(malformed_error!("Unknown property flags - 0x{:02X}", raw_flags));
        };

        Ok(PropertyInfo { name, ty, flags })
    }
}

/// An object record ready to be written: name, kind and its encoded member tables.
///
/// Produced by [`crate::catalog::CatalogBuilder`]; the member tables are complete index
/// images written with [`FunctionCodec`] and [`PropertyCodec`].
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    /// Object name as declared
    pub name: String,
    /// Classification
    pub kind: ObjectKind,
    /// Method table image
    pub methods: Vec<u8>,
    /// Property table image
    pub properties: Vec<u8>,
}

/// Codec for the object records of an [`crate::catalog::ObjectCatalog`].
///
/// ```text
/// name        7-bit length-prefixed UTF-8
/// kind        u8 (ObjectKind)
/// methods     u32 length + method table image
/// properties  u32 length + property table image
/// ```
pub struct ObjectRecordCodec;

impl PayloadEncoder for ObjectRecordCodec {
    type Item = ObjectRecord;

    fn key(item: &ObjectRecord) -> &str {
        &item.name
    }

    fn encode(item: &ObjectRecord, buffer: &mut ByteBuffer) -> Result<()> {
        buffer.write_prefixed_string_utf8(&item.name)?;
        buffer.write_le(item.kind as u8);
        for table in [&item.methods, &item.properties] {
            let length = u32::try_from(table.len()).map_err(|_| {
                Error::Error(format!("Member table of '{}' exceeds u32", item.name))
            })?;
            buffer.write_le(length);
            buffer.write_bytes(table);
        }
        Ok(())
    }
}

impl PayloadDecoder for ObjectRecordCodec {
    type Item = Arc<BuiltinObject>;

    fn decode(parser: &mut Parser<'_>) -> Result<Arc<BuiltinObject>> {
        let name = parser.read_prefixed_string_utf8()?;

        let raw_kind = parser.read_le::<u8>()?;
        let Some(kind) = ObjectKind::from_repr(raw_kind) else {
            return Err(malformed_error!("Unknown object kind {} for '{}'", raw_kind, name));
        };

        let methods_len = parser.read_le::<u32>()? as usize;
        let methods = parser.read_bytes(methods_len)?;
        let properties_len = parser.read_le::<u32>()? as usize;
        let properties = parser.read_bytes(properties_len)?;

        Ok(Arc::new(BuiltinObject::from_tables(
            name, kind, methods, properties,
        )?))
    }
}

/// Codec for system variables: `[type u8][flags u8][reserved u16]`.
///
/// The type byte is `0` for [`TypeInfo::Any`] and the primitive discriminant otherwise.
pub struct SystemVariableCodec;

impl FixedPayload for SystemVariableCodec {
    const SIZE: usize = 4;
}

impl PayloadEncoder for SystemVariableCodec {
    type Item = SystemVariableDefinition;

    fn key(item: &SystemVariableDefinition) -> &str {
        &item.name
    }

    fn encode(item: &SystemVariableDefinition, buffer: &mut ByteBuffer) -> Result<()> {
        let ty = match &item.ty {
            TypeInfo::Any => 0,
            TypeInfo::Primitive(primitive) => *primitive as u8,
            other => {
                return Err(Error::Error(format!(
                    "System variable '{}' has non-primitive type '{other}'",
                    item.name
                )))
            }
        };

        buffer.write_le(ty);
        buffer.write_le(item.flags.bits());
        buffer.write_le(0u16);
        Ok(())
    }
}

impl PayloadDecoder for SystemVariableCodec {
    type Item = SystemVariableInfo;

    fn decode(parser: &mut Parser<'_>) -> Result<SystemVariableInfo> {
        let ty = match parser.read_le::<u8>()? {
            0 => TypeInfo::Any,
            raw => TypeInfo::Primitive(read_primitive(raw)?),
        };

        let raw_flags = parser.read_le::<u8>()?;
        let Some(flags) = SystemVariableFlags::from_bits(raw_flags) else {
            return Err(malformed_error!("Unknown system variable flags - 0x{:02X}", raw_flags));
        };
        let _reserved = parser.read_le::<u16>()?;

        Ok(SystemVariableInfo { ty, flags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip_type(ty: &TypeInfo) -> TypeInfo {
        let mut buffer = ByteBuffer::new();
        write_type(&mut buffer, ty).unwrap();
        let bytes = buffer.into_inner();
        let mut parser = Parser::new(&bytes);
        let decoded = read_type(&mut parser).unwrap();
        assert!(!parser.has_more_data());
        decoded
    }

    #[test]
    fn type_encodings() {
        let ty = TypeInfo::array_of(TypeInfo::AppClass("PKG:Sub:Widget".into()), 2);
        assert_eq!(roundtrip_type(&ty), ty);
        assert_eq!(roundtrip_type(&TypeInfo::Void), TypeInfo::Void);

        let mut buffer = ByteBuffer::new();
        write_type(&mut buffer, &TypeInfo::Primitive(PrimitiveType::Integer)).unwrap();
        assert_eq!(buffer.as_slice(), &[TypeTag::Primitive as u8, 2]);
    }

    #[test]
    fn nested_array_rejected() {
        let nested = TypeInfo::Array {
            element: Box::new(TypeInfo::Array {
                element: Box::new(TypeInfo::Any),
                dimensions: 1,
            }),
            dimensions: 1,
        };
        let mut buffer = ByteBuffer::new();
        assert!(write_type(&mut buffer, &nested).is_err());

        let bytes = [6, 1, 6, 1, 0];
        assert!(matches!(
            read_type(&mut Parser::new(&bytes)),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn dimensionless_array_rejected() {
        let array = TypeInfo::Array {
            element: Box::new(TypeInfo::Primitive(PrimitiveType::Integer)),
            dimensions: 0,
        };
        let mut buffer = ByteBuffer::new();
        assert!(matches!(write_type(&mut buffer, &array), Err(Error::Error(_))));

        let function = FunctionInfo::new("GetRows", Vec::new(), array);
        assert!(FunctionCodec::encode(&function, &mut ByteBuffer::new()).is_err());
    }

    #[test]
    fn bad_tags() {
        assert!(read_type(&mut Parser::new(&[42])).is_err());
        assert!(read_type(&mut Parser::new(&[3, 0])).is_err());
        assert!(read_type(&mut Parser::new(&[6, 0, 0])).is_err());
    }

    #[test]
    fn function_codec() {
        let function = FunctionInfo::new(
            "Select",
            vec![
                ParameterInfo::new("record", TypeInfo::Object("Record".into())),
                ParameterInfo::new("where", TypeInfo::Primitive(PrimitiveType::String))
                    .with_flags(ParameterFlags::OPTIONAL | ParameterFlags::BY_REF),
            ],
            TypeInfo::Primitive(PrimitiveType::Integer),
        );

        let mut buffer = ByteBuffer::new();
        FunctionCodec::encode(&function, &mut buffer).unwrap();
        let bytes = buffer.into_inner();
        assert_eq!(FunctionCodec::decode(&mut Parser::new(&bytes)).unwrap(), function);
    }

    #[test]
    fn property_codec_rejects_unknown_flags() {
        let property = PropertyInfo::read_only("Name", TypeInfo::Primitive(PrimitiveType::String));
        let mut buffer = ByteBuffer::new();
        PropertyCodec::encode(&property, &mut buffer).unwrap();
        let mut bytes = buffer.into_inner();
        assert_eq!(PropertyCodec::decode(&mut Parser::new(&bytes)).unwrap(), property);

        let last = bytes.len() - 1;
        bytes[last] = 0x80;
        assert!(PropertyCodec::decode(&mut Parser::new(&bytes)).is_err());
    }

    #[test]
    fn system_variable_codec() {
        let definition = SystemVariableDefinition::new(
            "%Date",
            TypeInfo::Primitive(PrimitiveType::Date),
        );
        let mut buffer = ByteBuffer::new();
        SystemVariableCodec::encode(&definition, &mut buffer).unwrap();
        assert_eq!(buffer.as_slice(), &[7, 1, 0, 0]);

        let bytes = buffer.into_inner();
        let info = SystemVariableCodec::decode(&mut Parser::new(&bytes)).unwrap();
        assert_eq!(info.ty, definition.ty);
        assert_eq!(info.flags, SystemVariableFlags::READ_ONLY);

        let object = SystemVariableDefinition::new("%Session", TypeInfo::Object("Session".into()));
        assert!(SystemVariableCodec::encode(&object, &mut ByteBuffer::new()).is_err());
    }
}
