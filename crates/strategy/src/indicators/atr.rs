/// Average True Range with Wilder smoothing.
///
/// True range needs the previous close, so the first bar only primes the
/// indicator. The average is seeded with the SMA of the first `period`
/// true ranges and then smoothed as `(prev * (period - 1) + tr) / period`.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    seed_sum: f64,
    seen: usize,
    value: Option<f64>,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            prev_close: None,
            seed_sum: 0.0,
            seen: 0,
            value: None,
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        let prev_close = self.prev_close.replace(close)?;
        let tr = high.max(prev_close) - low.min(prev_close);

        match self.value {
            Some(prev) => {
                let n = self.period as f64;
                self.value = Some((prev * (n - 1.0) + tr) / n);
            }
            None => {
                self.seed_sum += tr;
                self.seen += 1;
                if self.seen == self.period {
                    self.value = Some(self.seed_sum / self.period as f64);
                }
            }
        }
        self.value
    }
}
