//! Integration tests for building, storing and querying built-in object catalogs.

use pcmeta::{
    catalog::codec::ObjectRecordCodec,
    index::{strategy::VariableSizeStrategy, HashTableReader, FORMAT_MAGIC},
    prelude::*,
};

const OBJECT_NAMES: &str = "Rowset Row Record Field SQL Array Message File Grid GridColumn \
    Chart ApiObject Session Component Page Exception JavaObject XmlDoc XmlNode Request \
    Response Cookie BIDocs AnalyticModel Rowsetcache Tree TreeNode Image Scroll \
    ProcessRequest Query QueryField QueryList PortalRegistry ContentRef Folder Node \
    IntBroker Interlink";

fn rowset() -> ObjectDefinition {
    ObjectDefinition::new("Rowset", ObjectKind::DataBuffer)
        .with_method(FunctionInfo::new(
            "GetRow",
            vec![ParameterInfo::new(
                "n",
                TypeInfo::Primitive(PrimitiveType::Integer),
            )],
            TypeInfo::Object("Row".into()),
        ))
        .with_method(FunctionInfo::new(
            "Fill",
            vec![
                ParameterInfo::new("where", TypeInfo::Primitive(PrimitiveType::String))
                    .with_flags(ParameterFlags::OPTIONAL),
                ParameterInfo::new("bindvars", TypeInfo::Any).with_flags(ParameterFlags::VARIADIC),
            ],
            TypeInfo::Primitive(PrimitiveType::Integer),
        ))
        .with_property(PropertyInfo::read_only(
            "ActiveRowCount",
            TypeInfo::Primitive(PrimitiveType::Integer),
        ))
        .with_property(PropertyInfo::read_only(
            "DBRecordName",
            TypeInfo::Primitive(PrimitiveType::String),
        ))
}

fn full_builder(config: WriterConfig) -> Result<CatalogBuilder> {
    let mut builder = CatalogBuilder::with_config(config)?;
    builder.add(rowset());
    for name in OBJECT_NAMES.split_whitespace().skip(1) {
        builder.add(ObjectDefinition::new(name, ObjectKind::Utility));
    }
    Ok(builder)
}

/// The canonical lookup: `&rs.ActiveRowCount` against a catalog on disk.
#[test]
fn test_rowset_active_row_count_from_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("objects.pcix");
    full_builder(WriterConfig::default())?.write_to_file(&path)?;

    let catalog = ObjectCatalog::load_from_file(&path)?;
    assert_eq!(catalog.format(), TableLayout::Versioned);

    let rowset = catalog.lookup_object("Rowset")?.expect("Rowset is present");
    assert_eq!(rowset.name(), "Rowset");
    assert_eq!(rowset.kind(), ObjectKind::DataBuffer);
    assert_eq!(rowset.method_count(), 2);
    assert_eq!(rowset.property_count(), 2);

    let property = rowset
        .lookup_property("ActiveRowCount")?
        .expect("ActiveRowCount is present");
    assert_eq!(property.ty, TypeInfo::Primitive(PrimitiveType::Integer));
    assert!(property.is_read_only());

    let fill = rowset.lookup_method("Fill")?.expect("Fill is present");
    assert_eq!(fill.min_args(), 0);
    assert_eq!(fill.max_args(), None);

    assert!(rowset.lookup_property("NoSuchProperty")?.is_none());
    Ok(())
}

#[test]
fn test_lookups_ignore_case() -> Result<()> {
    let catalog = ObjectCatalog::from_bytes(full_builder(WriterConfig::default())?.build()?)?;

    for object_name in ["Rowset", "ROWSET", "rowset", "RoWsEt"] {
        let rowset = catalog.lookup_object(object_name)?.expect("case-insensitive object");
        for property_name in ["ActiveRowCount", "activerowcount", "ACTIVEROWCOUNT"] {
            assert!(rowset.lookup_property(property_name)?.is_some());
        }
        assert_eq!(
            rowset.lookup_method("getrow")?.map(|method| method.name),
            Some("GetRow".to_string())
        );
    }

    let by_hash = catalog.lookup_object_by_hash(name_hash("rowset"))?.unwrap();
    assert_eq!(by_hash.name(), "Rowset");
    assert_eq!(
        by_hash.lookup_property_by_hash(name_hash("ActiveRowCount"))?,
        by_hash.lookup_property("activerowcount")?
    );
    assert_eq!(
        by_hash.lookup_method_by_hash(name_hash("GETROW"))?,
        by_hash.lookup_method("GetRow")?
    );
    assert!(by_hash.lookup_property_by_hash(name_hash("Missing"))?.is_none());
    Ok(())
}

#[test]
fn test_all_members_enumerated() -> Result<()> {
    let catalog = ObjectCatalog::from_bytes(full_builder(WriterConfig::default())?.build()?)?;
    let rowset = catalog.lookup_object("Rowset")?.unwrap();

    let mut methods: Vec<String> = rowset.all_methods()?.into_iter().map(|m| m.name).collect();
    methods.sort();
    assert_eq!(methods, vec!["Fill".to_string(), "GetRow".to_string()]);

    let mut properties: Vec<String> = rowset
        .all_properties()?
        .into_iter()
        .map(|p| p.name)
        .collect();
    properties.sort();
    assert_eq!(
        properties,
        vec!["ActiveRowCount".to_string(), "DBRecordName".to_string()]
    );

    assert_eq!(catalog.object_names().len(), 39);
    assert_eq!(catalog.object_names()[0], "Rowset");
    Ok(())
}

#[test]
fn test_probe_distance_of_realistic_catalog() -> Result<()> {
    let catalog = ObjectCatalog::from_bytes(full_builder(WriterConfig::default())?.build()?)?;
    let stats = catalog.stats();

    assert_eq!(stats.item_count, 39);
    assert_eq!(stats.table_size, 131);
    assert!(stats.load_factor <= 0.3);
    assert!(stats.max_probe_distance <= 10);
    assert!(stats.avg_probe_distance < 1.0);
    Ok(())
}

#[test]
fn test_dimensionless_array_rejected_at_build() -> Result<()> {
    let mut builder = CatalogBuilder::new();
    builder.add(ObjectDefinition::new("Grid", ObjectKind::Ui).with_method(
        FunctionInfo::new(
            "GetRows",
            Vec::new(),
            TypeInfo::Array {
                element: Box::new(TypeInfo::Primitive(PrimitiveType::Integer)),
                dimensions: 0,
            },
        ),
    ));

    assert!(matches!(builder.build(), Err(Error::Error(_))));
    Ok(())
}

#[test]
fn test_legacy_layout_compatibility() -> Result<()> {
    let bytes = full_builder(WriterConfig::legacy())?.build()?;
    assert_ne!(bytes[..4], FORMAT_MAGIC);

    let catalog = ObjectCatalog::from_bytes(bytes)?;
    assert_eq!(catalog.format(), TableLayout::Legacy);
    assert_eq!(catalog.len(), 39);
    assert_eq!(catalog.object_names().len(), 39);

    let rowset = catalog.lookup_object("rowset")?.unwrap();
    assert!(rowset.lookup_property("ActiveRowCount")?.is_some());
    Ok(())
}

#[test]
fn test_compact_layout_still_finds_everything() -> Result<()> {
    let catalog = ObjectCatalog::from_bytes(full_builder(WriterConfig::compact())?.build()?)?;
    for name in OBJECT_NAMES.split_whitespace() {
        assert!(catalog.lookup_object(name)?.is_some(), "{name} missing");
    }
    assert!(catalog.lookup_object("NotABuiltin")?.is_none());
    Ok(())
}

#[test]
fn test_system_variable_table_rejected_as_catalog() -> Result<()> {
    let bytes = SystemVariableTable::encode(
        vec![SystemVariableDefinition::new(
            "%Date",
            TypeInfo::Primitive(PrimitiveType::Date),
        )],
        WriterConfig::default(),
    )?;

    assert!(matches!(
        ObjectCatalog::from_bytes(bytes),
        Err(Error::StrategyMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_unknown_version_rejected() -> Result<()> {
    let mut bytes = full_builder(WriterConfig::default())?.build()?;
    bytes[4..6].copy_from_slice(&99u16.to_le_bytes());

    assert!(matches!(
        ObjectCatalog::from_bytes(bytes),
        Err(Error::NotSupported(99))
    ));
    Ok(())
}

#[test]
fn test_truncated_catalog_rejected() -> Result<()> {
    let bytes = full_builder(WriterConfig::default())?.build()?;

    assert!(matches!(ObjectCatalog::from_bytes(Vec::new()), Err(Error::Empty)));
    assert!(ObjectCatalog::from_bytes(bytes[..64].to_vec()).is_err());
    Ok(())
}

#[test]
fn test_missing_data_section_is_fatal() -> Result<()> {
    let bytes = full_builder(WriterConfig::default())?.build()?;
    let data_len = HashTableReader::from_bytes(
        bytes.clone(),
        VariableSizeStrategy::<ObjectRecordCodec>::new(),
    )?
    .data_section()
    .len();

    let truncated = bytes[..bytes.len() - data_len].to_vec();
    let catalog = ObjectCatalog::from_bytes(truncated)?;
    assert_eq!(catalog.len(), 39);
    assert!(matches!(
        catalog.lookup_object("Rowset"),
        Err(Error::MissingDataSection)
    ));
    Ok(())
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        ObjectCatalog::load_from_file(dir.path().join("absent.pcix")),
        Err(Error::FileError(_))
    ));
}

#[test]
fn test_system_variables_from_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sysvars.pcix");
    let bytes = SystemVariableTable::encode(
        vec![
            SystemVariableDefinition::new("%UserId", TypeInfo::Primitive(PrimitiveType::String)),
            SystemVariableDefinition::new("%Date", TypeInfo::Primitive(PrimitiveType::Date)),
        ],
        WriterConfig::default(),
    )?;
    std::fs::write(&path, bytes)?;

    let table = SystemVariableTable::load_from_file(&path)?;
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.lookup("%userid")?.map(|info| info.ty),
        Some(TypeInfo::Primitive(PrimitiveType::String))
    );
    assert!(table.lookup("%Nope")?.is_none());
    Ok(())
}
