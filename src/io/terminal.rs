//! Raw-mode terminal session for the dashboard

use anyhow::Context;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

pub type DashboardTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Alternate-screen terminal; restored on drop, including during a panic
pub struct TerminalGuard {
    terminal: DashboardTerminal,
}

impl TerminalGuard {
    pub fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;

        let setup = || -> anyhow::Result<DashboardTerminal> {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout))
                .context("failed to initialise terminal")?;
            terminal.hide_cursor().context("failed to hide cursor")?;
            terminal.clear().context("failed to clear terminal")?;
            Ok(terminal)
        };

        match setup() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                Err(e)
            }
        }
    }

    pub fn terminal_mut(&mut self) -> &mut DashboardTerminal {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
