//! Fixtures shared by the unit tests: small codecs for exercising the index engine and a
//! realistic slice of the PeopleCode built-in object model.

use crate::{
    catalog::{
        types::{
            FunctionInfo, ObjectKind, ParameterFlags, ParameterInfo, PrimitiveType, PropertyInfo,
            SystemVariableDefinition, SystemVariableFlags, TypeInfo,
        },
        CatalogBuilder, ObjectCatalog, ObjectDefinition,
    },
    file::buffer::ByteBuffer,
    index::strategy::{FixedPayload, PayloadDecoder, PayloadEncoder},
    Parser, Result,
};

/// Fixed-size codec: key/value pairs in, `u32` values out.
pub struct U32Codec;

impl FixedPayload for U32Codec {
    const SIZE: usize = 4;
}

impl PayloadEncoder for U32Codec {
    type Item = (String, u32);

    fn key(item: &(String, u32)) -> &str {
        &item.0
    }

    fn encode(item: &(String, u32), buffer: &mut ByteBuffer) -> Result<()> {
        buffer.write_le(item.1);
        Ok(())
    }
}

impl PayloadDecoder for U32Codec {
    type Item = u32;

    fn decode(parser: &mut Parser<'_>) -> Result<u32> {
        parser.read_le()
    }
}

/// Variable-size codec: key/text pairs in, text out.
pub struct WordCodec;

impl PayloadEncoder for WordCodec {
    type Item = (String, String);

    fn key(item: &(String, String)) -> &str {
        &item.0
    }

    fn encode(item: &(String, String), buffer: &mut ByteBuffer) -> Result<()> {
        buffer.write_prefixed_string_utf8(&item.1)
    }
}

impl PayloadDecoder for WordCodec {
    type Item = String;

    fn decode(parser: &mut Parser<'_>) -> Result<String> {
        parser.read_prefixed_string_utf8()
    }
}

fn primitive(primitive: PrimitiveType) -> TypeInfo {
    TypeInfo::Primitive(primitive)
}

fn object(name: &str) -> TypeInfo {
    TypeInfo::Object(name.to_string())
}

fn method(name: &str, parameters: Vec<ParameterInfo>, return_type: TypeInfo) -> FunctionInfo {
    FunctionInfo::new(name, parameters, return_type)
}

fn param(name: &str, ty: TypeInfo) -> ParameterInfo {
    ParameterInfo::new(name, ty)
}

fn variadic(name: &str) -> ParameterInfo {
    ParameterInfo::new(name, TypeInfo::Any).with_flags(ParameterFlags::VARIADIC)
}

/// Component buffer objects plus a few API and collection objects.
pub fn builtin_objects() -> Vec<ObjectDefinition> {
    use PrimitiveType::{Boolean, Integer, String};

    vec![
        ObjectDefinition::new("Rowset", ObjectKind::DataBuffer)
            .with_method(method(
                "GetRow",
                vec![param("n", primitive(Integer))],
                object("Row"),
            ))
            .with_method(method(
                "Fill",
                vec![
                    param("where", primitive(String)).with_flags(ParameterFlags::OPTIONAL),
                    variadic("bindvars"),
                ],
                primitive(Integer),
            ))
            .with_method(method("Flush", Vec::new(), TypeInfo::Void))
            .with_method(method(
                "InsertRow",
                vec![param("n", primitive(Integer))],
                primitive(Boolean),
            ))
            .with_method(method(
                "DeleteRow",
                vec![param("n", primitive(Integer))],
                primitive(Boolean),
            ))
            .with_method(method("Sort", vec![variadic("fields")], TypeInfo::Void))
            .with_property(PropertyInfo::read_only("ActiveRowCount", primitive(Integer)))
            .with_property(PropertyInfo::read_only("DBRecordName", primitive(String)))
            .with_property(PropertyInfo::read_only("ParentRow", object("Row")))
            .with_property(PropertyInfo::read_only("Name", primitive(String))),
        ObjectDefinition::new("Row", ObjectKind::DataBuffer)
            .with_method(method(
                "GetRecord",
                vec![param("record", TypeInfo::Any)],
                object("Record"),
            ))
            .with_method(method(
                "GetRowset",
                vec![param("scroll", TypeInfo::Any)],
                object("Rowset"),
            ))
            .with_property(PropertyInfo::read_only("RowNumber", primitive(Integer)))
            .with_property(PropertyInfo::new("Selected", primitive(Boolean)))
            .with_property(PropertyInfo::new("Visible", primitive(Boolean)))
            .with_property(PropertyInfo::read_only("IsChanged", primitive(Boolean))),
        ObjectDefinition::new("Record", ObjectKind::DataBuffer)
            .with_method(method(
                "GetField",
                vec![param("field", TypeInfo::Any)],
                object("Field"),
            ))
            .with_method(method("Insert", Vec::new(), primitive(Boolean)))
            .with_method(method("Update", Vec::new(), primitive(Boolean)))
            .with_method(method("Delete", Vec::new(), primitive(Boolean)))
            .with_method(method("SelectByKey", Vec::new(), primitive(Boolean)))
            .with_property(PropertyInfo::read_only("Name", primitive(String)))
            .with_property(PropertyInfo::read_only("IsChanged", primitive(Boolean))),
        ObjectDefinition::new("Field", ObjectKind::DataBuffer)
            .with_method(method("SetDefault", Vec::new(), TypeInfo::Void))
            .with_property(PropertyInfo::new("Value", TypeInfo::Any))
            .with_property(PropertyInfo::new("Enabled", primitive(Boolean)))
            .with_property(PropertyInfo::new("Visible", primitive(Boolean)))
            .with_property(PropertyInfo::read_only("Name", primitive(String)))
            .with_property(PropertyInfo::read_only("Type", primitive(String))),
        ObjectDefinition::new("SQL", ObjectKind::Api)
            .with_method(method("Execute", vec![variadic("bindvars")], primitive(Boolean)))
            .with_method(method(
                "Fetch",
                vec![ParameterInfo::new("outputs", TypeInfo::Any)
                    .with_flags(ParameterFlags::VARIADIC | ParameterFlags::BY_REF)],
                primitive(Boolean),
            ))
            .with_method(method("Close", Vec::new(), primitive(Boolean)))
            .with_property(PropertyInfo::read_only("IsOpen", primitive(Boolean)))
            .with_property(PropertyInfo::read_only("RowsAffected", primitive(Integer))),
        ObjectDefinition::new("Array", ObjectKind::Collection)
            .with_method(method("Push", vec![variadic("values")], TypeInfo::Void))
            .with_method(method("Pop", Vec::new(), TypeInfo::Any))
            .with_method(method(
                "Find",
                vec![param("value", TypeInfo::Any)],
                primitive(Integer),
            ))
            .with_property(PropertyInfo::new("Len", primitive(Integer))),
    ]
}

/// A catalog built from [`builtin_objects`].
pub fn builtin_catalog() -> ObjectCatalog {
    let mut builder = CatalogBuilder::new();
    for object in builtin_objects() {
        builder.add(object);
    }
    builder.build_catalog().unwrap()
}

/// Common system variables.
pub fn system_variables() -> Vec<SystemVariableDefinition> {
    use PrimitiveType::{Boolean, Date, DateTime, String, Time};

    vec![
        SystemVariableDefinition::new("%Date", primitive(Date)),
        SystemVariableDefinition::new("%DateTime", primitive(DateTime)),
        SystemVariableDefinition::new("%Time", primitive(Time)),
        SystemVariableDefinition::new("%UserId", primitive(String)),
        SystemVariableDefinition::new("%OperatorId", primitive(String))
            .with_flags(SystemVariableFlags::READ_ONLY | SystemVariableFlags::DEPRECATED),
        SystemVariableDefinition::new("%Mode", primitive(String)),
        SystemVariableDefinition::new("%Component", primitive(String)),
        SystemVariableDefinition::new("%Page", primitive(String)),
        SystemVariableDefinition::new("%Menu", primitive(String)),
        SystemVariableDefinition::new("%Language", primitive(String)),
        SystemVariableDefinition::new("%IsMultiLanguageEnabled", primitive(Boolean)),
        SystemVariableDefinition::new("%Response", TypeInfo::Any),
    ]
}
