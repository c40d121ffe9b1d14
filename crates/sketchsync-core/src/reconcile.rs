//! Render reconciler: make the local surface match a store snapshot.

use crate::canvas::RenderSurface;
use crate::record::ShapeRecord;
use crate::shapes::ObjectId;
use crate::store::StoreSnapshot;
use std::collections::HashSet;

/// What one reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub added: Vec<ObjectId>,
    pub updated: Vec<ObjectId>,
    pub removed: Vec<ObjectId>,
    /// Records that failed to parse or deserialize.
    pub skipped: Vec<ObjectId>,
    /// Set when the protected shape had a differing record that was withheld.
    pub withheld: Option<ObjectId>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty()
            && self.updated.is_empty()
            && self.removed.is_empty()
            && self.skipped.is_empty()
            && self.withheld.is_none()
    }
}

/// Apply `snapshot` to `surface`.
///
/// Missing shapes are constructed, differing ones are overwritten, and shapes
/// absent from the snapshot are removed. The `protected` shape, if present on
/// the surface, is never overwritten. A malformed record is skipped without
/// affecting the others.
pub fn reconcile<R: RenderSurface + ?Sized>(
    surface: &mut R,
    snapshot: &StoreSnapshot,
    protected: Option<&ObjectId>,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for (id, text) in snapshot {
        let record = match ShapeRecord::from_json(id, text) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("skipping malformed record {id}: {err}");
                report.skipped.push(id.clone());
                continue;
            }
        };

        let existing = surface.get(id).map(ShapeRecord::from_shape);
        let unchanged = matches!(&existing, Some(Ok(local)) if local.serialized_state == record.serialized_state);
        if unchanged {
            continue;
        }
        if existing.is_some() && protected == Some(id) {
            report.withheld = Some(id.clone());
            continue;
        }

        match record.to_shape() {
            Ok(shape) => {
                surface.insert(shape);
                if existing.is_some() {
                    report.updated.push(id.clone());
                } else {
                    report.added.push(id.clone());
                }
            }
            Err(err) => {
                log::warn!("skipping undeserializable record {id}: {err}");
                report.skipped.push(id.clone());
            }
        }
    }

    report.removed = surface
        .ids()
        .into_iter()
        .filter(|id| !snapshot.contains_key(id))
        .collect();
    let stale: HashSet<ObjectId> = report.removed.iter().cloned().collect();
    surface.remove_many(&stale);

    if !report.is_noop() {
        log::debug!(
            "reconciled: +{} ~{} -{} skipped {}",
            report.added.len(),
            report.updated.len(),
            report.removed.len(),
            report.skipped.len()
        );
    }
    report
}
