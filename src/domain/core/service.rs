use serde::{Deserialize, Serialize};

use super::{DurationMode, ServiceKey};

/// サービスエンティティ
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    key: ServiceKey,
    title: String,
    duration: String,
    duration_minutes: u32,
}

impl Service {
    pub fn new(key: ServiceKey, title: String, duration: String, mode: DurationMode) -> Self {
        let duration_minutes = mode.parse(&duration);
        Self {
            key,
            title,
            duration,
            duration_minutes,
        }
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// 登録されている所要時間の表記 (`"1h 30m"` など)
    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }
}
