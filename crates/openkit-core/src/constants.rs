/// Beacon protocol version sent as `vv`.
pub const PROTOCOL_VERSION: u32 = 3;

/// Agent version sent as `va`.
pub const OPENKIT_VERSION: &str = "7.0.0000";

/// Platform type sent as `pt`.
pub const PLATFORM_TYPE_OPENKIT: u32 = 1;

/// Agent technology type sent as `tt`.
pub const AGENT_TECHNOLOGY_TYPE: &str = "okrust";

/// Names, values and reasons are truncated to this many characters.
pub const MAX_NAME_LEN: usize = 250;

/// Prefix of web request tags.
pub const WEB_REQUEST_TAG_PREFIX: &str = "MT";

/// Sentinel for "not yet set" timestamps and server values.
pub const UNSET: i64 = -1;

/// Defaults reported when the host application does not configure a device.
pub const DEFAULT_OPERATING_SYSTEM: &str = "OpenKit 7.0.0000";
pub const DEFAULT_MANUFACTURER: &str = "OpenKit";
pub const DEFAULT_MODEL_ID: &str = "OpenKitDevice";
pub const DEFAULT_APPLICATION_VERSION: &str = "7.0.0000";

/// Server-side defaults applied until the first status response arrives.
pub const DEFAULT_SEND_INTERVAL_MS: i64 = 2 * 60 * 1000;
pub const DEFAULT_MAX_BEACON_SIZE_BYTES: i64 = 30 * 1024;
pub const DEFAULT_SERVER_ID: i32 = 1;

/// Name of the background transmission thread.
pub const BEACON_SENDING_THREAD_NAME: &str = "BeaconSendingThread";
