// ── Controller ──
//
// Owns the update cycle for one router: mutual exclusion, ordering of
// sub-fetches, periodic triggers, and change notification. The model is
// owned by whichever cycle holds the guard; consumers read the snapshot
// published at the end of each completed cycle.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tiksync_api::{BasicAuth, RawRecord, RestClient, RouterApi, TlsMode, TransportConfig};
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandResult, disabled_value};
use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::mapper::MapSpec;
use crate::mapper::specs;
use crate::reconcile::{hosts, nat, ports, units};
use crate::store::{DataStore, MergePolicy, RouterState};
use crate::stream::UpdateStream;

const CAPSMAN_MANAGED: &str = "managed by CAPsMAN";

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Whether a triggered cycle ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed,
    /// Another cycle held the guard past the bounded wait.
    Skipped,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
pub struct Controller<A: RouterApi> {
    inner: Arc<ControllerInner<A>>,
}

impl<A: RouterApi> Clone for Controller<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<A> {
    config: ControllerConfig,
    api: A,
    store: Arc<DataStore>,
    connection_state: watch::Sender<ConnectionState>,
    /// The cycle guard. Whoever holds it owns the model.
    cycle: Mutex<CycleState>,
    /// Restarts the refresh timer after a forced cycle.
    refresh_reset: Notify,
    cancel: CancellationToken,
    /// Child of `cancel` for the current session; replaced on reconnect.
    session: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// State carried from one cycle to the next.
#[derive(Default)]
struct CycleState {
    model: RouterState,
    /// NAT names already reported as duplicates.
    nat_warned: HashSet<String>,
    firmware_checked: bool,
}

impl Controller<RestClient> {
    /// Build a controller talking to the router's REST endpoint.
    pub fn from_config(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let auth = BasicAuth {
            username: config.username.clone(),
            password: config.password.clone(),
        };
        let api = RestClient::new(config.url.clone(), auth, &transport)?;
        Ok(Self::new(config, api))
    }
}

impl<A: RouterApi> Controller<A> {
    /// Create a controller. Does NOT connect; call
    /// [`connect()`](Self::connect) to load data and start background tasks.
    pub fn new(config: ControllerConfig, api: A) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let cancel = CancellationToken::new();
        let session = cancel.child_token();
        Self {
            inner: Arc::new(ControllerInner {
                config,
                api,
                store: Arc::new(DataStore::new()),
                connection_state,
                cycle: Mutex::new(CycleState::default()),
                refresh_reset: Notify::new(),
                session: Mutex::new(session),
                cancel,
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Fetch hardware info, run the first cycle, and spawn the periodic
    /// refresh and firmware check tasks.
    ///
    /// Connecting again replaces the tasks of the previous session.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.stop_tasks().await;
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let session = self.inner.cancel.child_token();
        *self.inner.session.lock().await = session.clone();

        if let Err(e) = self.hardware_info().await {
            self.inner
                .connection_state
                .send_replace(ConnectionState::Disconnected);
            return Err(e);
        }

        self.update().await;

        let config = &self.inner.config;
        let mut handles = self.inner.task_handles.lock().await;
        if !config.scan_interval.is_zero() {
            handles.push(tokio::spawn(refresh_task(
                self.clone(),
                config.scan_interval,
                session.clone(),
            )));
        }
        if !config.firmware_check_interval.is_zero() {
            handles.push(tokio::spawn(firmware_task(
                self.clone(),
                config.firmware_check_interval,
                session,
            )));
        }
        drop(handles);

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(url = %config.url, "connected to router");
        Ok(())
    }

    /// Cancel background tasks and mark the controller disconnected.
    pub async fn disconnect(&self) {
        self.stop_tasks().await;
        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Cancel the current session's tasks and wait for them to exit.
    async fn stop_tasks(&self) {
        self.inner.session.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
    }

    /// Routerboard details. The router reports them once per boot.
    async fn hardware_info(&self) -> Result<(), CoreError> {
        let raw = self.inner.api.fetch("/system/routerboard").await?;
        let mut guard = self.inner.cycle.lock().await;
        if let Some(routerboard) = apply_singleton(&specs::ROUTERBOARD, None, &raw) {
            guard.model.routerboard = routerboard;
        }
        debug!(model = %guard.model.routerboard.model, "hardware info loaded");
        Ok(())
    }

    // ── Update cycles ────────────────────────────────────────────

    /// Run one regular cycle: fetch, merge, resolve, publish, signal.
    ///
    /// Waits at most `cycle_lock_timeout` for a cycle already in flight;
    /// past that the request is dropped.
    pub async fn update(&self) -> CycleOutcome {
        let Ok(mut guard) =
            tokio::time::timeout(self.inner.config.cycle_lock_timeout, self.inner.cycle.lock())
                .await
        else {
            debug!("update cycle still in flight, skipping");
            return CycleOutcome::Skipped;
        };

        self.run_cycle(&mut guard).await;
        self.inner.store.publish(guard.model.clone());
        CycleOutcome::Completed
    }

    /// Run a cycle now and restart the periodic timer.
    pub async fn force_update(&self) -> CycleOutcome {
        let outcome = self.update().await;
        self.inner.refresh_reset.notify_one();
        outcome
    }

    /// Refresh the firmware update singleton and signal subscribers.
    pub async fn check_firmware(&self) -> CycleOutcome {
        let Ok(mut guard) =
            tokio::time::timeout(self.inner.config.cycle_lock_timeout, self.inner.cycle.lock())
                .await
        else {
            debug!("firmware check waiting on a cycle, skipping");
            return CycleOutcome::Skipped;
        };

        self.refresh_firmware(&mut guard).await;
        self.inner.store.publish(guard.model.clone());
        CycleOutcome::Completed
    }

    async fn run_cycle(&self, state: &mut CycleState) {
        let started = std::time::Instant::now();
        let config = &self.inner.config;

        if !state.firmware_checked {
            self.refresh_firmware(state).await;
        }

        let model = &mut state.model;

        // Interfaces first: everything below resolves names through them.
        let interfaces_fresh = match self.fetch("/interface").await {
            Some(raw) => {
                model
                    .interfaces
                    .normalize(&specs::INTERFACE, &raw, MergePolicy::Retain);
                model.reindex_interfaces();
                true
            }
            None => false,
        };

        if config.track_arp {
            self.resolve_port_clients(model).await;
        } else {
            ports::mark_tracking_disabled(model);
        }

        if let Some(raw) = self.fetch("/ip/dns/static").await {
            model
                .dns
                .normalize(&specs::STATIC_DNS, &raw, MergePolicy::Prune);
        }

        self.refresh_dhcp(model).await;

        if let Some(raw) = self.fetch("/ip/firewall/nat").await {
            model.nat.normalize(&specs::NAT, &raw, MergePolicy::Prune);
            nat::dedupe(&mut model.nat, &mut state.nat_warned);
        }

        if let Some(raw) = self.fetch("/system/resource").await {
            if let Some(mut resource) = apply_singleton::<crate::model::Resource>(&specs::RESOURCE, None, &raw) {
                resource.compute_usage();
                model.resource = resource;
            }
        }

        if let Some(raw) = self.fetch("/system/script").await {
            model
                .scripts
                .normalize(&specs::SCRIPT, &raw, MergePolicy::Prune);
        }

        if let Some(raw) = self.fetch("/queue/simple").await {
            let unit = config.unit;
            model
                .queues
                .normalize_with(&specs::QUEUE, &raw, MergePolicy::Prune, |queue| {
                    units::convert_queue(queue, unit)
                });
        }

        if interfaces_fresh {
            units::update_traffic(&mut model.interfaces, config.unit, Utc::now());
        }

        if config.track_hosts {
            hosts::merge_hosts(model);
            hosts::resolve_hostnames(model);
            let targets = hosts::probe_targets(model);
            let results =
                hosts::probe_all(&self.inner.api, targets, config.probe_concurrency).await;
            hosts::apply_probes(model, &results, Utc::now());
        }

        debug!(
            interfaces = model.interfaces.len(),
            hosts = model.hosts.len(),
            nat = model.nat.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "update cycle complete"
        );
    }

    async fn resolve_port_clients(&self, model: &mut RouterState) {
        let Some(raw) = self.fetch("/ip/arp").await else {
            return;
        };
        model.arp.normalize(&specs::ARP, &raw, MergePolicy::Rebuild);

        let pass = ports::attribute_arp(model, &self.inner.config.bridge_interface);
        if pass.bridge_used {
            if let Some(raw) = self.fetch("/interface/bridge/host").await {
                model
                    .bridge_hosts
                    .normalize(&specs::BRIDGE_HOST, &raw, MergePolicy::Rebuild);
            }
            ports::attribute_bridge_hosts(model, &pass.mac2ip);
        }
        ports::apply_port_clients(model);
    }

    async fn refresh_dhcp(&self, model: &mut RouterState) {
        if let Some(raw) = self.fetch("/ip/dhcp-server").await {
            model
                .dhcp_servers
                .normalize(&specs::DHCP_SERVER, &raw, MergePolicy::Prune);
        }

        if let Some(raw) = self.fetch("/ip/dhcp-server/network").await {
            model.dhcp_networks.normalize_with(
                &specs::DHCP_NETWORK,
                &raw,
                MergePolicy::Prune,
                |network| {
                    if network.cidr.is_none() {
                        network.cidr = network.address.parse().ok();
                    }
                    Ok(())
                },
            );
        }

        if let Some(raw) = self.fetch("/ip/dhcp-server/lease").await {
            let servers = &model.dhcp_servers;
            model.dhcp_leases.normalize_with(
                &specs::DHCP_LEASE,
                &raw,
                MergePolicy::Prune,
                |lease| {
                    let interface = servers
                        .get(&lease.server)
                        .map(|s| s.interface.as_str())
                        .filter(|i| !i.is_empty())
                        .unwrap_or(crate::model::UNKNOWN);
                    interface.clone_into(&mut lease.interface);
                    Ok(())
                },
            );
        }
    }

    async fn refresh_firmware(&self, state: &mut CycleState) {
        let Some(raw) = self.fetch("/system/package/update").await else {
            return;
        };
        if let Some(firmware) = apply_singleton(&specs::FIRMWARE_UPDATE, None, &raw) {
            state.model.firmware = firmware;
            state.firmware_checked = true;
        }
    }

    /// Fetch one path. A failure is logged and yields `None`, which the
    /// caller treats as "nothing changed".
    async fn fetch(&self, path: &str) -> Option<Vec<RawRecord>> {
        match self.inner.api.fetch(path).await {
            Ok(raw) => {
                debug!(path, records = raw.len(), "fetched");
                Some(raw)
            }
            Err(e) => {
                warn!(path, error = %e, "fetch failed, keeping previous data");
                None
            }
        }
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command, then run an immediate cycle so the model
    /// reflects it.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::RouterDisconnected);
        }

        let result = route_command(self, cmd).await?;
        self.force_update().await;
        Ok(result)
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Whether the last request reached the router.
    pub fn connected(&self) -> bool {
        self.inner.api.is_connected()
    }

    /// The model as of the last completed cycle.
    pub fn snapshot(&self) -> Arc<RouterState> {
        self.inner.store.snapshot()
    }

    /// Subscribe to completed cycles.
    pub fn subscribe(&self) -> UpdateStream {
        self.inner.store.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Run a regular cycle every `period`. A forced cycle restarts the timer.
async fn refresh_task<A: RouterApi>(
    controller: Controller<A>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = controller.inner.refresh_reset.notified() => interval.reset(),
            _ = interval.tick() => {
                controller.update().await;
            }
        }
    }
}

/// Check for firmware updates every `period`.
async fn firmware_task<A: RouterApi>(
    controller: Controller<A>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                controller.check_firmware().await;
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Resolve a command against the published model and send it.
async fn route_command<A: RouterApi>(
    controller: &Controller<A>,
    cmd: Command,
) -> Result<CommandResult, CoreError> {
    let api = &controller.inner.api;
    let snapshot = controller.snapshot();

    match cmd {
        Command::SetInterfaceEnabled { interface, enabled } => {
            let (key, iface) = snapshot
                .interface(&interface)
                .ok_or_else(|| not_found("interface", &interface))?;
            if iface.about == CAPSMAN_MANAGED {
                return Err(CoreError::Rejected {
                    message: format!("interface {key} is {CAPSMAN_MANAGED}"),
                });
            }

            let (match_field, match_value) =
                if iface.is_virtual() || iface.default_name.is_empty() {
                    ("name", iface.name.as_str())
                } else {
                    ("default-name", iface.default_name.as_str())
                };
            api.mutate(
                "/interface",
                match_field,
                match_value,
                "disabled",
                disabled_value(enabled),
            )
            .await?;
            Ok(updated("/interface", match_value))
        }

        Command::SetNatRuleEnabled { uniq_id, enabled } => {
            let rule = snapshot
                .nat
                .values()
                .find(|r| r.uniq_id == uniq_id)
                .ok_or_else(|| not_found("nat rule", &uniq_id))?;
            api.mutate(
                "/ip/firewall/nat",
                ".id",
                &rule.id,
                "disabled",
                disabled_value(enabled),
            )
            .await?;
            Ok(updated("/ip/firewall/nat", &rule.id))
        }

        Command::SetQueueEnabled { name, enabled } => {
            let queue = snapshot
                .queues
                .get(&name)
                .ok_or_else(|| not_found("queue", &name))?;
            api.mutate(
                "/queue/simple",
                ".id",
                &queue.id,
                "disabled",
                disabled_value(enabled),
            )
            .await?;
            Ok(updated("/queue/simple", &queue.id))
        }

        Command::RunScript { name } => {
            if !snapshot.scripts.contains_key(&name) {
                return Err(not_found("script", &name));
            }
            api.invoke("/system/script", "run", "name", &name).await?;
            Ok(CommandResult::Invoked {
                path: "/system/script".into(),
                command: "run".into(),
            })
        }

        Command::SetValue {
            path,
            match_field,
            match_value,
            set_field,
            value,
        } => {
            api.mutate(&path, &match_field, &match_value, &set_field, value)
                .await?;
            Ok(CommandResult::Updated {
                path,
                matched: format!("{match_field}={match_value}"),
            })
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Map the first record of a singleton path, logging a malformed one.
fn apply_singleton<T>(spec: &MapSpec, existing: Option<&T>, raw: &[RawRecord]) -> Option<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    let first = raw.first()?;
    match spec.apply(existing, first) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(entity = spec.entity, error = %e, "ignoring malformed record");
            None
        }
    }
}

fn not_found(entity_type: &str, identifier: &str) -> CoreError {
    CoreError::NotFound {
        entity_type: entity_type.into(),
        identifier: identifier.into(),
    }
}

fn updated(path: &str, matched: &str) -> CommandResult {
    CommandResult::Updated {
        path: path.into(),
        matched: matched.into(),
    }
}

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
