//! Startup and shutdown ordering
//!
//! Startup: connect → subscribe → dashboard. Any startup failure returns an
//! error before the terminal is touched. Shutdown runs once, after the latch
//! fires: disconnect (with grace) → stop dashboard → summary.

use crate::domain::display;
use crate::infra::config::Config;
use crate::infra::metrics::SessionMetrics;
use crate::io::session::Session;
use crate::services::shutdown::{ShutdownLatch, ShutdownReason};
use crate::ui;
use anyhow::{bail, Context};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Process phases, in the only order they may occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Starting,
    Connected,
    Subscribed,
    Running,
    ShuttingDown,
    Terminated,
}

impl Phase {
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Starting => Some(Phase::Connected),
            Phase::Connected => Some(Phase::Subscribed),
            Phase::Subscribed => Some(Phase::Running),
            Phase::Running => Some(Phase::ShuttingDown),
            Phase::ShuttingDown => Some(Phase::Terminated),
            Phase::Terminated => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Starting => "starting",
            Phase::Connected => "connected",
            Phase::Subscribed => "subscribed",
            Phase::Running => "running",
            Phase::ShuttingDown => "shutting_down",
            Phase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// One-shot phase tracker
#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { phase: Phase::Starting }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to `next`; only the immediate successor is accepted
    pub fn advance(&mut self, next: Phase) -> anyhow::Result<()> {
        if self.phase.next() != Some(next) {
            bail!("invalid lifecycle transition {} -> {}", self.phase, next);
        }
        info!(from = %self.phase, to = %next, "lifecycle_transition");
        self.phase = next;
        Ok(())
    }
}

/// Run the monitor until quit or interrupt
pub async fn run(config: Config) -> anyhow::Result<()> {
    let mut lifecycle = Lifecycle::new();
    let state = display::shared();
    let metrics = Arc::new(SessionMetrics::new());

    let mut session = Session::connect(&config, state.clone(), metrics.clone()).await?;
    lifecycle.advance(Phase::Connected)?;

    session.subscribe_all(&config.topics()).await?;
    lifecycle.advance(Phase::Subscribed)?;

    let latch = Arc::new(ShutdownLatch::new());
    let session = session.start();

    let signal_latch = latch.clone();
    let signal_task = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                signal_latch.trigger(ShutdownReason::Interrupt);
            }
            Err(e) => warn!(error = %e, "interrupt_handler_unavailable"),
        }
    });

    let ui_latch = latch.clone();
    let tick_rate = config.tick_rate();
    let dashboard = tokio::task::spawn_blocking(move || ui::run(state, &ui_latch, tick_rate));
    lifecycle.advance(Phase::Running)?;

    let reason = latch.wait().await;
    lifecycle.advance(Phase::ShuttingDown)?;
    info!(reason = ?reason, "shutdown_started");

    session.disconnect(config.disconnect_grace()).await;
    let dashboard_result = dashboard.await.context("dashboard thread panicked")?;
    signal_task.abort();

    metrics.snapshot().log();
    lifecycle.advance(Phase::Terminated)?;
    dashboard_result
}
