//! Hovered and selected objects.

use crate::pick::Picked;

/// At most one hovered and one selected object.
///
/// Identity is compared with [`Picked::same_object`], so re-picking the same
/// object at a later step is not a change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    hovered: Option<Picked>,
    selected: Option<Picked>,
}

fn same(a: &Option<Picked>, b: &Option<Picked>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_object(b),
        (None, None) => true,
        _ => false,
    }
}

impl Selection {
    pub fn hovered(&self) -> Option<&Picked> {
        self.hovered.as_ref()
    }

    pub fn selected(&self) -> Option<&Picked> {
        self.selected.as_ref()
    }

    /// Updates the hovered object. Returns true if a different object (or
    /// none) is now hovered.
    pub fn set_hovered(&mut self, picked: Option<Picked>) -> bool {
        let changed = !same(&self.hovered, &picked);
        self.hovered = picked;
        changed
    }

    /// Updates the selected object. Selecting nothing clears the selection.
    pub fn select(&mut self, picked: Option<Picked>) -> bool {
        let changed = !same(&self.selected, &picked);
        self.selected = picked;
        changed
    }

    pub fn clear(&mut self) {
        self.hovered = None;
        self.selected = None;
    }

    /// The object to draw in the overlay. Hover wins over selection.
    pub fn highlight(&self) -> Option<&Picked> {
        self.hovered.as_ref().or(self.selected.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MapFeature, MapPoint, PolygonFeature, StopSign};

    fn crosswalk(id: i64) -> Picked {
        Picked::MapFeature {
            feature: MapFeature::Crosswalk(PolygonFeature {
                id,
                polygon: vec![],
            }),
        }
    }

    #[test]
    fn test_hover_takes_highlight_priority() {
        let mut sel = Selection::default();
        sel.select(Some(crosswalk(1)));
        assert_eq!(sel.highlight(), Some(&crosswalk(1)));

        sel.set_hovered(Some(crosswalk(2)));
        assert_eq!(sel.highlight(), Some(&crosswalk(2)));

        sel.set_hovered(None);
        assert_eq!(sel.highlight(), Some(&crosswalk(1)));
    }

    #[test]
    fn test_change_detection() {
        let mut sel = Selection::default();
        assert!(sel.set_hovered(Some(crosswalk(1))));
        assert!(!sel.set_hovered(Some(crosswalk(1))));
        assert!(sel.set_hovered(Some(crosswalk(2))));
        assert!(sel.set_hovered(None));
        assert!(!sel.set_hovered(None));
    }

    #[test]
    fn test_same_id_different_kind_is_different() {
        let sign = Picked::MapFeature {
            feature: MapFeature::StopSign(StopSign {
                id: 1,
                position: MapPoint::new(0.0, 0.0),
                lane_ids: vec![],
            }),
        };
        let mut sel = Selection::default();
        sel.select(Some(crosswalk(1)));
        assert!(sel.select(Some(sign)));
    }

    #[test]
    fn test_clear() {
        let mut sel = Selection::default();
        sel.select(Some(crosswalk(1)));
        sel.set_hovered(Some(crosswalk(2)));
        sel.clear();
        assert!(sel.highlight().is_none());
    }
}
