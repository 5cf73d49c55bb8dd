//! EDB/OS version tracking: patch dates, skip decisions and upgrade notes per host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::Dataset;
use crate::lenient::{self, apply, text};

#[derive(Debug, Clone, Copy, Default)]
pub struct EdbOsVersions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdbOsFields {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub release_date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub last_applied_date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub next_update: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub skip: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub reason_for_skip: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub upgrade_history: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub upgrade_notes: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdbOsPatch {
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub release_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub last_applied_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub next_update: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub skip: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub reason_for_skip: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub upgrade_history: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub upgrade_notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EdbOsView {
    pub release_date: String,
    pub last_applied_date: String,
    pub next_update: String,
    pub skip: String,
    pub reason_for_skip: String,
    pub upgrade_history: String,
    pub upgrade_notes: String,
}

impl Dataset for EdbOsVersions {
    const NAME: &'static str = "edb_os_versions";
    const TAG: &'static str = "os_edb_backup";

    type Fields = EdbOsFields;
    type Patch = EdbOsPatch;
    type View = EdbOsView;

    fn merge(fields: &mut EdbOsFields, patch: EdbOsPatch) {
        apply(&mut fields.release_date, patch.release_date);
        apply(&mut fields.last_applied_date, patch.last_applied_date);
        apply(&mut fields.next_update, patch.next_update);
        apply(&mut fields.skip, patch.skip);
        apply(&mut fields.reason_for_skip, patch.reason_for_skip);
        apply(&mut fields.upgrade_history, patch.upgrade_history);
        apply(&mut fields.upgrade_notes, patch.upgrade_notes);
    }

    fn view(f: &EdbOsFields) -> EdbOsView {
        EdbOsView {
            release_date: text(&f.release_date),
            last_applied_date: text(&f.last_applied_date),
            next_update: text(&f.next_update),
            skip: text(&f.skip),
            reason_for_skip: text(&f.reason_for_skip),
            upgrade_history: text(&f.upgrade_history),
            upgrade_notes: text(&f.upgrade_notes),
        }
    }
}
