//! # Conference Server
//!
//! Wires the conference service together and owns its background tasks:
//!
//! - one [`AriConnector`] per configured engine instance, feeding the
//!   [`EventDispatcher`] and the [`EventBus`]
//! - the termination consumer, turning expired conference timeouts into
//!   `terminate(id, "timeout")`
//! - the retention sweeper, dropping records that ended longer ago than
//!   `database.retention_secs`
//! - the HTTP surface from [`crate::api`]
//!
//! ```no_run
//! use rvoip_conference_engine::config::ServiceConfig;
//! use rvoip_conference_engine::server::ConferenceServerBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = ConferenceServerBuilder::new()
//!     .with_config(ServiceConfig::default())
//!     .build()
//!     .await?;
//! server.start().await?;
//! server.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use rvoip_ari_core::{
    timestamp, AriCommands, AriConnector, AriRestClient, ConnectorConfig, EventHandler, RawEventPublisher,
};

use crate::api::{self, ApiState};
use crate::bus::EventBus;
use crate::conference::{ConferenceEngine, EngineDependencies};
use crate::config::ServiceConfig;
use crate::database::{MemoryDatabase, Repository};
use crate::dispatcher::EventDispatcher;
use crate::error::{ConferenceError, Result};
use crate::monitoring::{CounterMetrics, CONFERENCE_CLOSE_TOTAL, CONFERENCE_CREATE_TOTAL};
use crate::notify::BusNotifier;
use crate::peers::{
    CallManager, CallManagerClient, FlowManager, FlowManagerClient, HttpRequestHandler,
    LocalTerminationScheduler,
};

/// The conference service with its background tasks
pub struct ConferenceServer {
    config: ServiceConfig,
    db: Arc<dyn Repository>,
    engine: Arc<ConferenceEngine>,
    dispatcher: Arc<EventDispatcher>,
    bus: EventBus,
    metrics: Arc<CounterMetrics>,
    scheduler: Arc<LocalTerminationScheduler>,
    termination_rx: Option<mpsc::UnboundedReceiver<Uuid>>,

    connector_handles: Vec<JoinHandle<()>>,
    termination_handle: Option<JoinHandle<()>>,
    sweep_handle: Option<JoinHandle<()>>,
    api_handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: Option<SocketAddr>,
}

impl ConferenceServer {
    fn new(
        config: ServiceConfig,
        db: Arc<dyn Repository>,
        ari: Arc<dyn AriCommands>,
        call_manager: Arc<dyn CallManager>,
        flow_manager: Arc<dyn FlowManager>,
    ) -> Self {
        let bus = EventBus::new();
        let metrics = Arc::new(CounterMetrics::new());
        let (scheduler, termination_rx) = LocalTerminationScheduler::new();
        let scheduler = Arc::new(scheduler);

        let engine = ConferenceEngine::new(
            config.conference.clone(),
            EngineDependencies {
                db: db.clone(),
                ari: ari.clone(),
                call_manager,
                flow_manager,
                scheduler: scheduler.clone(),
                notify: Arc::new(BusNotifier::new(bus.clone())),
                metrics: metrics.clone(),
            },
        );
        let dispatcher = Arc::new(EventDispatcher::new(
            db.clone(),
            engine.clone(),
            ari,
            metrics.clone(),
            config.conference.existence_check_timeout(),
        ));

        Self {
            config,
            db,
            engine,
            dispatcher,
            bus,
            metrics,
            scheduler,
            termination_rx: Some(termination_rx),
            connector_handles: Vec::new(),
            termination_handle: None,
            sweep_handle: None,
            api_handle: None,
            shutdown_tx: None,
            local_addr: None,
        }
    }

    /// Bind the HTTP surface and start the connectors and the termination consumer
    pub async fn start(&mut self) -> Result<()> {
        if self.api_handle.is_some() {
            return Err(ConferenceError::invalid_state("server already started"));
        }

        if let Some(mut rx) = self.termination_rx.take() {
            let engine = self.engine.clone();
            self.termination_handle = Some(tokio::spawn(async move {
                while let Some(conference_id) = rx.recv().await {
                    let engine = engine.clone();
                    tokio::spawn(async move {
                        if let Err(e) = engine.terminate(conference_id, "timeout").await {
                            warn!("⚠️ Timed termination of conference {} failed: {}", conference_id, e);
                        }
                    });
                }
            }));
            info!("✅ Started termination consumer");
        }

        let db = self.db.clone();
        let retention = self.config.database.retention();
        let mut sweep = tokio::time::interval(self.config.database.sweep_interval());
        self.sweep_handle = Some(tokio::spawn(async move {
            loop {
                sweep.tick().await;
                match db.purge_ended(&timestamp::ago(retention)).await {
                    Ok(stats) if stats.total() > 0 => {
                        debug!("🧹 Retention sweep removed {} record(s)", stats.total())
                    }
                    Ok(_) => {}
                    Err(e) => warn!("⚠️ Retention sweep failed: {}", e),
                }
            }
        }));

        let handler: Arc<dyn EventHandler> = self.dispatcher.clone();
        let publisher: Arc<dyn RawEventPublisher> = Arc::new(self.bus.clone());
        for instance in &self.config.ari.instances {
            let connector_config = ConnectorConfig {
                asterisk_id: instance.asterisk_id.clone(),
                url: self.config.ari.websocket_url_for(instance),
                reconnect_delay: self.config.ari.reconnect_delay(),
            };
            let connector = AriConnector::new(connector_config, handler.clone(), publisher.clone());
            self.connector_handles
                .push(tokio::spawn(async move { connector.run().await }));
        }
        info!("✅ Started {} ARI connector(s)", self.connector_handles.len());

        let listener = TcpListener::bind(self.config.api.listen_addr.as_str())
            .await
            .map_err(|e| ConferenceError::config(format!("Failed to bind {}: {}", self.config.api.listen_addr, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ConferenceError::internal(format!("No local address: {}", e)))?;
        let router = api::router(ApiState {
            engine: self.engine.clone(),
            metrics: self.metrics.clone(),
            default_page_size: self.config.api.default_page_size,
        });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.api_handle = Some(tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("❌ HTTP server error: {}", e);
            }
        }));
        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);

        info!("✅ Conference API listening on {}", local_addr);
        Ok(())
    }

    /// Stop the background tasks; pending conference timers are dropped
    pub async fn stop(&mut self) -> Result<()> {
        info!("🛑 Stopping conference server...");

        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.api_handle.take() {
            let _ = handle.await;
        }

        for handle in self.connector_handles.drain(..) {
            handle.abort();
            let _ = handle.await;
        }

        for handle in [self.termination_handle.take(), self.sweep_handle.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
            let _ = handle.await;
        }
        self.scheduler.cancel_all();

        info!("✅ Conference server stopped");
        Ok(())
    }

    /// Run until the task is cancelled, logging a summary every minute
    pub async fn run(&self) -> Result<()> {
        info!("📞 Conference server is running");
        loop {
            sleep(Duration::from_secs(60)).await;
            info!(
                "📊 Stats - Created: {}, Closed: {}, Busy conferences: {}, Pending timers: {}",
                self.metrics.total(CONFERENCE_CREATE_TOTAL),
                self.metrics.total(CONFERENCE_CLOSE_TOTAL),
                self.engine.locks().len(),
                self.scheduler.pending()
            );
        }
    }

    pub fn engine(&self) -> &Arc<ConferenceEngine> {
        &self.engine
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn metrics(&self) -> &Arc<CounterMetrics> {
        &self.metrics
    }

    /// Address of the HTTP surface once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

/// Builder for [`ConferenceServer`]
///
/// Collaborators that are not provided are built from the configuration: the ARI REST
/// client, the peer HTTP clients and an in-memory repository.
pub struct ConferenceServerBuilder {
    config: Option<ServiceConfig>,
    db: Option<Arc<dyn Repository>>,
    ari: Option<Arc<dyn AriCommands>>,
    call_manager: Option<Arc<dyn CallManager>>,
    flow_manager: Option<Arc<dyn FlowManager>>,
}

impl ConferenceServerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            db: None,
            ari: None,
            call_manager: None,
            flow_manager: None,
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_database(mut self, db: Arc<dyn Repository>) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_ari(mut self, ari: Arc<dyn AriCommands>) -> Self {
        self.ari = Some(ari);
        self
    }

    pub fn with_call_manager(mut self, call_manager: Arc<dyn CallManager>) -> Self {
        self.call_manager = Some(call_manager);
        self
    }

    pub fn with_flow_manager(mut self, flow_manager: Arc<dyn FlowManager>) -> Self {
        self.flow_manager = Some(flow_manager);
        self
    }

    pub async fn build(self) -> Result<ConferenceServer> {
        let config = self
            .config
            .ok_or_else(|| ConferenceError::config("Configuration not provided"))?;

        let db: Arc<dyn Repository> = match self.db {
            Some(db) => db,
            None => Arc::new(MemoryDatabase::new()),
        };

        let ari: Arc<dyn AriCommands> = match self.ari {
            Some(ari) => ari,
            None => {
                let mut client = AriRestClient::new(
                    config.ari.username.clone(),
                    config.ari.password.clone(),
                    config.ari.request_timeout(),
                )?;
                for instance in &config.ari.instances {
                    client = client.with_endpoint(instance.asterisk_id.clone(), instance.rest_url.clone());
                }
                Arc::new(client)
            }
        };

        let call_manager: Arc<dyn CallManager> = match self.call_manager {
            Some(call_manager) => call_manager,
            None => {
                let request = HttpRequestHandler::new(&config.peers.call_manager_url, config.peers.request_timeout())?;
                Arc::new(CallManagerClient::new(request))
            }
        };

        let flow_manager: Arc<dyn FlowManager> = match self.flow_manager {
            Some(flow_manager) => flow_manager,
            None => {
                let request = HttpRequestHandler::new(&config.peers.flow_manager_url, config.peers.request_timeout())?;
                Arc::new(FlowManagerClient::new(request))
            }
        };

        Ok(ConferenceServer::new(config, db, ari, call_manager, flow_manager))
    }
}

impl Default for ConferenceServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
