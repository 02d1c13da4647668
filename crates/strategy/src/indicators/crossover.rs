/// Signed crossing of series `a` over series `b`.
///
/// Emits `1.0` on the bar where `a` moves from below `b` to above it,
/// `-1.0` on the opposite move and `0.0` otherwise. Bars where the two
/// series are equal do not reset the side `a` was last seen on.
#[derive(Debug, Clone, Default)]
pub struct CrossOver {
    last_nonzero_diff: Option<f64>,
    primed: bool,
}

impl CrossOver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` on the first pair since there is no previous bar.
    pub fn update(&mut self, a: f64, b: f64) -> Option<f64> {
        let diff = a - b;
        let previous = self.last_nonzero_diff;
        if diff != 0.0 {
            self.last_nonzero_diff = Some(diff);
        }

        if !self.primed {
            self.primed = true;
            return None;
        }

        Some(match previous {
            Some(prev) if prev < 0.0 && diff > 0.0 => 1.0,
            Some(prev) if prev > 0.0 && diff < 0.0 => -1.0,
            _ => 0.0,
        })
    }
}
