// prism_core/src/reflectivity.rs

use std::collections::HashMap;

use tracing::warn;

use crate::types::ObjectHandle;

/// Reflectivity assumed for anything that was never registered: a perfect reflector.
pub const DEFAULT_REFLECTIVITY: f64 = 1.0;

/// Reflectivity of every scene object that declares one, built once when the
/// sensor starts and read concurrently by every ray afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReflectivityIndex {
    /// Percent, in `[0, 100]`.
    percent: HashMap<ObjectHandle, f64>,
}

impl ReflectivityIndex {
    /// Builds the index from `(handle, percent)` pairs. Out-of-range percentages
    /// are clamped; if a handle repeats, the first entry wins.
    pub fn from_objects(objects: impl IntoIterator<Item = (ObjectHandle, f64)>) -> Self {
        let mut percent = HashMap::new();
        for (handle, value) in objects {
            let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) };
            if clamped != value {
                warn!(
                    "Reflectivity {} for object {:?} is outside 0..=100 %, using {}",
                    value, handle, clamped
                );
            }
            percent.entry(handle).or_insert(clamped);
        }
        Self { percent }
    }

    pub fn percent(&self, handle: ObjectHandle) -> Option<f64> {
        self.percent.get(&handle).copied()
    }

    /// Reflectivity on the 0..=1 scale used by the acceptance model.
    pub fn coefficient(&self, handle: ObjectHandle) -> f64 {
        self.percent(handle)
            .map(|p| p / 100.0)
            .unwrap_or(DEFAULT_REFLECTIVITY)
    }

    pub fn len(&self) -> usize {
        self.percent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.percent.is_empty()
    }
}

impl FromIterator<(ObjectHandle, f64)> for ReflectivityIndex {
    fn from_iter<T: IntoIterator<Item = (ObjectHandle, f64)>>(iter: T) -> Self {
        Self::from_objects(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_percent_to_coefficient() {
        let index: ReflectivityIndex = [(ObjectHandle(1), 20.0), (ObjectHandle(2), 80.0)]
            .into_iter()
            .collect();
        assert_eq!(index.len(), 2);
        assert_eq!(index.coefficient(ObjectHandle(1)), 0.2);
        assert_eq!(index.coefficient(ObjectHandle(2)), 0.8);
    }

    #[test]
    fn unknown_objects_are_fully_reflective() {
        let index = ReflectivityIndex::from_objects([(ObjectHandle(1), 20.0)]);
        assert_eq!(index.percent(ObjectHandle(9)), None);
        assert_eq!(index.coefficient(ObjectHandle(9)), DEFAULT_REFLECTIVITY);
        assert_eq!(ReflectivityIndex::default().coefficient(ObjectHandle(0)), 1.0);
    }

    #[test]
    fn clamps_out_of_range_percentages() {
        let index = ReflectivityIndex::from_objects([
            (ObjectHandle(1), 150.0),
            (ObjectHandle(2), -5.0),
        ]);
        assert_eq!(index.percent(ObjectHandle(1)), Some(100.0));
        assert_eq!(index.percent(ObjectHandle(2)), Some(0.0));
    }

    #[test]
    fn first_registration_wins() {
        let index = ReflectivityIndex::from_objects([
            (ObjectHandle(1), 20.0),
            (ObjectHandle(1), 90.0),
        ]);
        assert_eq!(index.percent(ObjectHandle(1)), Some(20.0));
    }
}
