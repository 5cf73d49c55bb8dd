use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

/// One annotated dataset: its document tag, the fields a record may carry,
/// the partial update clients send and the fixed-shape view they read back.
///
/// The field set doubles as the allow-list: keys outside `Patch` are dropped
/// when an update is decoded, so they never reach the stored record.
pub trait Dataset: Send + Sync + 'static {
    /// Short name used in logs.
    const NAME: &'static str;
    /// `type` written into documents that lack a usable one.
    const TAG: &'static str;

    type Fields: Serialize + DeserializeOwned + Default + Clone + Debug + PartialEq + Send + Sync;
    type Patch: DeserializeOwned + Default + Debug + Send;
    type View: Serialize + Debug + PartialEq + Send;

    /// Shallow merge: fields present in `patch` overwrite, the rest are kept.
    fn merge(fields: &mut Self::Fields, patch: Self::Patch);

    /// Every recognised field, missing ones as `""`.
    fn view(fields: &Self::Fields) -> Self::View;
}
