use super::Sma;

/// Commodity Channel Index.
///
/// `(tp - sma(tp)) / (factor * meandev)` where `tp` is the typical price
/// `(high + low + close) / 3` and `meandev` is the moving average of
/// `|tp - sma(tp)|`, each term taken against the mean as of its own bar.
/// The first value therefore needs `2 * period - 1` bars. A zero mean
/// deviation reads as 0.
#[derive(Debug, Clone)]
pub struct Cci {
    factor: f64,
    typical: Sma,
    deviation: Sma,
}

impl Cci {
    pub fn new(period: usize, factor: f64) -> Self {
        assert!(factor > 0.0, "CCI factor must be positive");
        Self {
            factor,
            typical: Sma::new(period),
            deviation: Sma::new(period),
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        let tp = (high + low + close) / 3.0;
        let mean = self.typical.update(tp)?;
        let mean_dev = self.deviation.update((tp - mean).abs())?;

        if mean_dev == 0.0 {
            return Some(0.0);
        }
        Some((tp - mean) / (self.factor * mean_dev))
    }
}
