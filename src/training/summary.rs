use std::collections::BTreeMap;

/// 一次迭代上报的观测值，如`{"main/loss": 0.3, "main/accuracy": 0.9}`
pub type Observation = BTreeMap<String, f64>;

/// 按键累计观测值，用于求区间内的平均
#[derive(Debug, Clone, Default)]
pub struct Summary {
    entries: BTreeMap<String, (f64, usize)>,
}

impl Summary {
    pub fn add(&mut self, observation: &Observation) {
        for (key, value) in observation {
            self.add_value(key, *value);
        }
    }

    pub fn add_value(&mut self, key: &str, value: f64) {
        let entry = self.entries.entry(key.to_string()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    /// 各键的平均值
    pub fn compute_mean(&self) -> Observation {
        self.entries
            .iter()
            .map(|(key, (sum, count))| (key.clone(), sum / *count as f64))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
