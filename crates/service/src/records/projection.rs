//! Keyed read view handed to the dashboard.

use std::collections::BTreeMap;

use models::{Dataset, Document};

/// `ip -> view` for every record that has an `ip`. If the file holds the
/// same `ip` twice, the first record wins, the same one an update targets.
pub fn project<D: Dataset>(doc: &Document<D::Fields>) -> BTreeMap<String, D::View> {
    let mut view = BTreeMap::new();
    for record in &doc.records {
        if let Some(ip) = &record.ip {
            view.entry(ip.clone()).or_insert_with(|| D::view(&record.fields));
        }
    }
    view
}
