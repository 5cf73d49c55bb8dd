//! Asset inventory ownership and classification per host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::Dataset;
use crate::lenient::{self, apply, text};

#[derive(Debug, Clone, Copy, Default)]
pub struct AssetsInventory;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFields {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub asset_custodian: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub asset_owner: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub risk_owner: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub asset_classification: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::stored")]
    pub data_classification: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetPatch {
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub asset_custodian: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub asset_owner: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub risk_owner: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub asset_classification: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient::field_update")]
    pub data_classification: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetView {
    pub asset_custodian: String,
    pub asset_owner: String,
    pub risk_owner: String,
    pub asset_classification: String,
    pub data_classification: String,
}

impl Dataset for AssetsInventory {
    const NAME: &'static str = "assets_inventory";
    const TAG: &'static str = "assets_inventory_backup";

    type Fields = AssetFields;
    type Patch = AssetPatch;
    type View = AssetView;

    fn merge(fields: &mut AssetFields, patch: AssetPatch) {
        apply(&mut fields.asset_custodian, patch.asset_custodian);
        apply(&mut fields.asset_owner, patch.asset_owner);
        apply(&mut fields.risk_owner, patch.risk_owner);
        apply(&mut fields.asset_classification, patch.asset_classification);
        apply(&mut fields.data_classification, patch.data_classification);
    }

    fn view(f: &AssetFields) -> AssetView {
        AssetView {
            asset_custodian: text(&f.asset_custodian),
            asset_owner: text(&f.asset_owner),
            risk_owner: text(&f.risk_owner),
            asset_classification: text(&f.asset_classification),
            data_classification: text(&f.data_classification),
        }
    }
}
