use crate::model::{Dataset, DerivedFields, Record};
use crate::registry::Registry;
use std::collections::BTreeMap;

/// Campus lists for one set of campus flags, in registry order.
pub fn derive_fields(campus_flags: &BTreeMap<String, bool>, registry: &Registry) -> DerivedFields {
    let mut derived = DerivedFields::default();
    for campus in &registry.campuses {
        if !campus_flags.get(&campus.code).copied().unwrap_or(false) {
            continue;
        }
        derived.procuring_campus_codes.push(campus.code.clone());
        derived.procuring_campus_names.push(campus.label.clone());
        derived.procuring_campus_contacts.push(match &campus.contact {
            Some(contact) => format!("{} ({})", campus.code, contact),
            None => campus.code.clone(),
        });
    }
    derived
}

pub fn derive_record(record: Record, registry: &Registry) -> Record {
    let derived = derive_fields(&record.campus_flags, registry);
    Record { derived, ..record }
}

/// Attaches derived fields to every record; the previous values are replaced.
pub fn derive_all(dataset: Dataset, registry: &Registry) -> Dataset {
    Dataset::new(
        dataset
            .records
            .into_iter()
            .map(|record| derive_record(record, registry))
            .collect(),
    )
}
