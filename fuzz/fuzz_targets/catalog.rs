#![no_main]

use libfuzzer_sys::fuzz_target;
use pcmeta::catalog::{ObjectCatalog, ObjectInfo, SystemVariableTable};

fuzz_target!(|data: &[u8]| {
    if let Ok(catalog) = ObjectCatalog::from_bytes(data.to_vec()) {
        for name in catalog.object_names().iter().take(16) {
            if let Ok(Some(object)) = catalog.lookup_object(name) {
                let _ = object.lookup_method("GetRow");
                let _ = object.lookup_property("Name");
            }
        }
        let _ = catalog.lookup_object("Rowset");
        let _ = catalog.stats();
    }
    if let Ok(table) = SystemVariableTable::from_bytes(data.to_vec()) {
        let _ = table.lookup("%Date");
    }
});
