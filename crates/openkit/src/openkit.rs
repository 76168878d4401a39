//! The [`OpenKit`] facade.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use openkit_cache::BeaconCache;
use openkit_communication::{BeaconSender, BeaconSendingContext};
use openkit_core::traits::{DefaultThreadIdProvider, DefaultTimingProvider};
use openkit_core::{
    Configuration, Connector, OpenKitConfig, OpenKitResult, ThreadIdProvider, TimingProvider,
};
use openkit_protocol::{serializer_for, Beacon, BeaconProviders, BeaconSerializer, HttpConnector};
use openkit_session::{Session, SessionRegistry};

/// One OpenKit instance: a beacon cache, the sending worker, and the
/// sessions created through it. All of them report to a single backend.
pub struct OpenKit {
    configuration: Arc<Configuration>,
    cache: Arc<BeaconCache>,
    timing: Arc<dyn TimingProvider>,
    thread_ids: Arc<dyn ThreadIdProvider>,
    serializer: Arc<dyn BeaconSerializer>,
    sender: BeaconSender,
    shut_down: AtomicBool,
}

impl OpenKit {
    /// Create an instance talking to the backend through `connector`.
    pub fn new(config: OpenKitConfig, connector: Arc<dyn Connector>) -> OpenKitResult<Self> {
        Self::with_providers(
            config,
            connector,
            Arc::new(DefaultTimingProvider::new()),
            Arc::new(DefaultThreadIdProvider),
        )
    }

    /// Create an instance using the HTTP connector. Requests fail with
    /// `FeatureDisabled` unless the `http` feature is enabled.
    pub fn from_config(config: OpenKitConfig) -> OpenKitResult<Self> {
        OpenKitConfig::validate(&config)?;
        let configuration = Arc::new(Configuration::new(config));
        let connector = Arc::new(HttpConnector::new(Arc::clone(&configuration))?);
        Ok(Self::assemble(
            configuration,
            connector,
            Arc::new(DefaultTimingProvider::new()),
            Arc::new(DefaultThreadIdProvider),
        ))
    }

    /// Create an instance with explicit clock and thread id providers.
    pub fn with_providers(
        config: OpenKitConfig,
        connector: Arc<dyn Connector>,
        timing: Arc<dyn TimingProvider>,
        thread_ids: Arc<dyn ThreadIdProvider>,
    ) -> OpenKitResult<Self> {
        OpenKitConfig::validate(&config)?;
        Ok(Self::assemble(
            Arc::new(Configuration::new(config)),
            connector,
            timing,
            thread_ids,
        ))
    }

    fn assemble(
        configuration: Arc<Configuration>,
        connector: Arc<dyn Connector>,
        timing: Arc<dyn TimingProvider>,
        thread_ids: Arc<dyn ThreadIdProvider>,
    ) -> Self {
        let cache = Arc::new(BeaconCache::new());
        let serializer = serializer_for(configuration.settings().protocol.format);
        let context = Arc::new(BeaconSendingContext::new(
            Arc::clone(&configuration),
            connector,
            Arc::clone(&timing),
            Arc::clone(&cache),
        ));

        tracing::debug!(
            application_id = configuration.application_id(),
            endpoint = %configuration.settings().endpoint_url,
            format = serializer.format().name(),
            "openkit created"
        );

        Self {
            configuration,
            cache,
            timing,
            thread_ids,
            serializer,
            sender: BeaconSender::new(context),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Start the background worker.
    pub fn initialize(&self) -> OpenKitResult<()> {
        self.sender.initialize()
    }

    /// Block until the worker finished its init phase. `false` if init
    /// failed or shutdown was requested first.
    pub fn wait_for_init(&self) -> bool {
        self.sender.wait_for_init()
    }

    pub fn wait_for_init_timeout(&self, timeout: Duration) -> bool {
        self.sender.wait_for_init_timeout(timeout)
    }

    pub fn is_initialized(&self) -> bool {
        self.sender.is_initialized()
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Open a new session for a client at `client_ip` (may be empty).
    ///
    /// Once [`OpenKit::shutdown`] has started, the returned session is
    /// already ended and records nothing.
    pub fn create_session(&self, client_ip: &str) -> Arc<Session> {
        let beacon = Beacon::new(
            BeaconProviders {
                configuration: Arc::clone(&self.configuration),
                cache: Arc::clone(&self.cache),
                timing: Arc::clone(&self.timing),
                thread_ids: Arc::clone(&self.thread_ids),
                serializer: Arc::clone(&self.serializer),
            },
            client_ip,
        );

        let registry: Arc<dyn SessionRegistry> = self.sender.context().clone();
        Session::new(beacon, Arc::downgrade(&registry))
    }

    /// Stop the worker after it flushed every session. Safe to call more
    /// than once.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("openkit shutdown requested");
        self.sender.shutdown();
    }
}

impl Drop for OpenKit {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for OpenKit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenKit")
            .field("application_id", &self.configuration.application_id())
            .field("sender", &self.sender)
            .field("shut_down", &self.shut_down.load(Ordering::SeqCst))
            .finish()
    }
}
