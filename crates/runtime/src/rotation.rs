/// Compare-and-emit watcher for the view rotation.
///
/// Starts with no observed value, so the first observation always counts as a
/// change. After that, only a value different from the previous observation is
/// reported. Two NaN readings count as equal; `0.0` and `-0.0` are equal.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RotationWatcher {
    last: Option<f64>,
}

impl RotationWatcher {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Record `rotation` (radians) and return it if it differs from the last
    /// observed value.
    pub fn observe(&mut self, rotation: f64) -> Option<f64> {
        let unchanged = match self.last {
            Some(prev) => prev == rotation || (prev.is_nan() && rotation.is_nan()),
            None => false,
        };
        if unchanged {
            return None;
        }
        self.last = Some(rotation);
        Some(rotation)
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }
}
