//! # openkit-protocol
//!
//! Turns session activity into beacon records and ships them.
//!
//! - [`Beacon`]: per-session encoder issuing ids, sequence numbers and tags,
//!   writing records into the cache and sending them through a connector
//! - [`serializer`]: the key-value mobile protocol and a JSON alternative
//! - [`HttpConnector`]: reqwest based connector (`http` feature)

pub mod beacon;
pub mod event;
pub mod http_connector;
pub mod serializer;

pub use beacon::{ActionData, Beacon, BeaconProviders, WebRequestData};
pub use event::{ActionRecord, BeaconEvent, BeaconHeader, EventBase, ReportedValue, WebRequestRecord};
pub use http_connector::HttpConnector;
pub use serializer::{serializer_for, BeaconSerializer, JsonSerializer, KeyValueSerializer};
