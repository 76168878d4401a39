/// One serialized beacon record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconCacheRecord {
    timestamp: i64,
    data: String,
}

impl BeaconCacheRecord {
    pub fn new(timestamp: i64, data: String) -> Self {
        Self { timestamp, data }
    }

    /// Creation time in milliseconds since the epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// Size accounted against the cache bounds, in bytes.
    pub fn size(&self) -> i64 {
        self.data.len() as i64
    }
}
