//! Per-object Earth-fixed positions for one propagation pass

use bevy::math::Vec3;

/// Positions in Earth-fixed km, indexed like the catalog.
///
/// The worker ships a flat `f32[3N]` where `(0, 0, 0)` marks "no position";
/// in memory every slot is an explicit `Option`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionBuffer {
    slots: Vec<Option<Vec3>>,
}

impl PositionBuffer {
    pub fn from_flat(flat: &[f32]) -> Self {
        let slots = flat
            .chunks_exact(3)
            .map(|c| {
                let p = Vec3::new(c[0], c[1], c[2]);
                (p.is_finite() && p != Vec3::ZERO).then_some(p)
            })
            .collect();
        Self { slots }
    }

    #[cfg(test)]
    pub(crate) fn from_slots(slots: Vec<Option<Vec3>>) -> Self {
        Self { slots }
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.slots.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Vec3>> + '_ {
        self.slots.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_and_non_finite_slots_are_empty() {
        let flat = [
            7000.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, //
            f32::NAN, 1.0, 2.0, //
            0.0, -6800.0, 10.0,
        ];
        let buf = PositionBuffer::from_flat(&flat);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.get(0), Some(Vec3::new(7000.0, 0.0, 0.0)));
        assert_eq!(buf.get(1), None);
        assert_eq!(buf.get(2), None);
        assert_eq!(buf.get(3), Some(Vec3::new(0.0, -6800.0, 10.0)));
        assert_eq!(buf.valid_count(), 2);
    }

    #[test]
    fn test_out_of_range_is_none() {
        let buf = PositionBuffer::from_slots(vec![Some(Vec3::X)]);
        assert_eq!(buf.get(1), None);
        assert_eq!(buf.get(usize::MAX), None);
    }
}
