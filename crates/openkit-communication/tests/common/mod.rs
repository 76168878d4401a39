#![allow(dead_code)]

use std::sync::Arc;

use openkit_cache::BeaconCache;
use openkit_communication::BeaconSendingContext;
use openkit_core::config::SerializationFormat;
use openkit_core::{Configuration, OpenKitConfig};
use openkit_protocol::{serializer_for, Beacon, BeaconProviders};
use openkit_session::{Session, SessionRegistry};
use test_fixtures::{test_config, FakeTimingProvider, FixedThreadIdProvider, ScriptedConnector};

pub struct Harness {
    pub configuration: Arc<Configuration>,
    pub cache: Arc<BeaconCache>,
    pub timing: Arc<FakeTimingProvider>,
    pub connector: Arc<ScriptedConnector>,
    pub context: Arc<BeaconSendingContext>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: OpenKitConfig) -> Self {
        let configuration = Arc::new(Configuration::new(config));
        let cache = Arc::new(BeaconCache::new());
        let timing = Arc::new(FakeTimingProvider::new(1_000));
        let connector = Arc::new(ScriptedConnector::new());
        let context = Arc::new(BeaconSendingContext::new(
            Arc::clone(&configuration),
            connector.clone(),
            timing.clone(),
            Arc::clone(&cache),
        ));
        Self {
            configuration,
            cache,
            timing,
            connector,
            context,
        }
    }

    pub fn session(&self) -> Arc<Session> {
        let providers = BeaconProviders {
            configuration: Arc::clone(&self.configuration),
            cache: Arc::clone(&self.cache),
            timing: self.timing.clone(),
            thread_ids: Arc::new(FixedThreadIdProvider(1)),
            serializer: serializer_for(SerializationFormat::KeyValue),
        };
        let registry: Arc<dyn SessionRegistry> = self.context.clone();
        Session::new(
            Beacon::new(providers, "127.0.0.1"),
            Arc::downgrade(&registry),
        )
    }

    /// Run Init, then the time sync detour, ending in a capture state.
    pub fn run_until_capturing(&self) {
        self.context.execute_current_state();
        assert!(self.context.is_initialized());
        self.context.execute_current_state();
        self.context.execute_current_state();
    }
}
