//! Terminal dashboard
//!
//! - `widgets` - fixed widget set and gauge computation
//!
//! The UI loop runs on a blocking thread. It redraws once per tick,
//! independently of message arrival, and turns key presses into shutdown
//! triggers.

pub mod widgets;

use crate::domain::display::SharedState;
use crate::io::terminal::TerminalGuard;
use crate::services::shutdown::{ShutdownLatch, ShutdownReason};
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use std::time::{Duration, Instant};
use tracing::{debug, error};

pub use widgets::{gauge_percent, Dashboard};

/// Upper bound on how long a key poll blocks, so a latch fired elsewhere is
/// noticed promptly
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Render step: copy display state into the widgets, then redraw
///
/// The state lock is released before drawing.
pub fn render_step<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &mut Dashboard,
    state: &SharedState,
) -> anyhow::Result<()> {
    dashboard.refresh(&state.lock());
    terminal.draw(|f| dashboard.draw(f)).context("failed to draw dashboard")?;
    Ok(())
}

/// Map a key press to a shutdown trigger
///
/// Raw mode delivers Ctrl+C as a key, so it is routed to the interrupt path.
pub fn key_action(key: &KeyEvent) -> Option<ShutdownReason> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ShutdownReason::Interrupt)
        }
        KeyCode::Char('q') => Some(ShutdownReason::QuitKey),
        _ => None,
    }
}

/// Own the terminal and run the dashboard until the latch fires
pub fn run(state: SharedState, latch: &ShutdownLatch, tick_rate: Duration) -> anyhow::Result<()> {
    let result = TerminalGuard::enter().and_then(|mut guard| {
        event_loop(guard.terminal_mut(), &state, latch, tick_rate)
    });

    if let Err(e) = &result {
        error!(error = %e, "dashboard_failed");
        latch.trigger(ShutdownReason::UiFailure);
    }
    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &SharedState,
    latch: &ShutdownLatch,
    tick_rate: Duration,
) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new();
    let mut last_tick: Option<Instant> = None;

    while !latch.is_triggered() {
        if last_tick.map_or(true, |tick| tick.elapsed() >= tick_rate) {
            render_step(terminal, &mut dashboard, state)?;
            last_tick = Some(Instant::now());
        }

        let until_tick = last_tick.map_or(Duration::ZERO, |tick| tick_rate.saturating_sub(tick.elapsed()));
        if event::poll(until_tick.min(INPUT_POLL)).context("failed to poll terminal events")? {
            if let Event::Key(key) = event::read().context("failed to read terminal event")? {
                if let Some(reason) = key_action(&key) {
                    latch.trigger(reason);
                }
            }
        }
    }

    debug!("dashboard_loop_stopped");
    Ok(())
}
