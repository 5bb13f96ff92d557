//! Fixed dashboard widget set
//!
//! Every widget has a static position and size. The render step only
//! rewrites widget text and the gauge percentage.

use crate::domain::display::DisplayState;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

const HEADER_AREA: Rect = Rect { x: 0, y: 0, width: 35, height: 3 };
const UPTIME_AREA: Rect = Rect { x: 3, y: 3, width: 50, height: 1 };
const HEAP_AREA: Rect = Rect { x: 3, y: 4, width: 50, height: 1 };
const MAX_HEAP_AREA: Rect = Rect { x: 3, y: 5, width: 50, height: 1 };
const SUBSCRIPTIONS_AREA: Rect = Rect { x: 3, y: 6, width: 50, height: 1 };
const CONNECTIONS_AREA: Rect = Rect { x: 0, y: 8, width: 70, height: 3 };

/// `round(100 * count / max)`, or 0 when `max` is 0
pub fn gauge_percent(count: u64, max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    let (count, max) = (u128::from(count), u128::from(max));
    let rounded = (200 * count + max) / (2 * max);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// Single-line metric readout: fixed label followed by the current value
#[derive(Debug, Clone)]
pub struct TextPanel {
    area: Rect,
    label: &'static str,
    text: String,
}

impl TextPanel {
    fn new(area: Rect, label: &'static str) -> Self {
        Self { area, label, text: label.to_string() }
    }

    fn set_value(&mut self, value: &str) {
        self.text.clear();
        self.text.push_str(self.label);
        self.text.push_str(value);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn draw(&self, f: &mut Frame) {
        let area = self.area.intersection(f.area());
        if area.is_empty() {
            return;
        }
        let panel = Paragraph::new(self.text.as_str())
            .style(Style::default().fg(Color::White).bg(Color::Black));
        f.render_widget(panel, area);
    }
}

/// Connection count against the broker's connection maximum
#[derive(Debug, Clone)]
pub struct ConnectionGauge {
    area: Rect,
    percent: u64,
    label: String,
}

impl ConnectionGauge {
    fn new(area: Rect) -> Self {
        Self { area, percent: 0, label: String::new() }
    }

    fn set(&mut self, count: u64, max: u64) {
        self.percent = gauge_percent(count, max);
        self.label = format!("{}/{}", count, max);
    }

    /// Unclamped percentage; the bar itself stops at 100
    pub fn percent(&self) -> u64 {
        self.percent
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn draw(&self, f: &mut Frame) {
        let area = self.area.intersection(f.area());
        if area.is_empty() {
            return;
        }
        // Bounded by min(100), so the narrowing cast is lossless
        let bar = self.percent.min(100) as u16;
        let gauge = Gauge::default()
            .block(Block::default().title(" Connections ").borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Green))
            .percent(bar)
            .label(Span::styled(self.label.clone(), Style::default().fg(Color::White)));
        f.render_widget(gauge, area);
    }
}

/// All widgets on screen
#[derive(Debug, Clone)]
pub struct Dashboard {
    broker_connected: bool,
    uptime: TextPanel,
    heap: TextPanel,
    max_heap: TextPanel,
    subscriptions: TextPanel,
    connections: ConnectionGauge,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        let mut dashboard = Self {
            broker_connected: false,
            uptime: TextPanel::new(UPTIME_AREA, "MQTT Broker Uptime:."),
            heap: TextPanel::new(HEAP_AREA, "Current Heap Size:.."),
            max_heap: TextPanel::new(MAX_HEAP_AREA, "Max Heap Size:......"),
            subscriptions: TextPanel::new(SUBSCRIPTIONS_AREA, "Subscription Count:."),
            connections: ConnectionGauge::new(CONNECTIONS_AREA),
        };
        dashboard.refresh(&DisplayState::default());
        dashboard
    }

    /// Copy the current display state into widget text and gauge percent
    pub fn refresh(&mut self, state: &DisplayState) {
        self.broker_connected = state.broker_connected;
        self.uptime.set_value(&state.uptime);
        self.heap.set_value(&state.current_heap_size);
        self.max_heap.set_value(&state.max_heap_size);
        self.subscriptions.set_value(&state.subscription_count);
        self.connections.set(state.connection_count, state.max_connection_count);
    }

    pub fn uptime(&self) -> &TextPanel {
        &self.uptime
    }

    pub fn connections(&self) -> &ConnectionGauge {
        &self.connections
    }

    pub fn draw(&self, f: &mut Frame) {
        self.draw_header(f);
        self.uptime.draw(f);
        self.heap.draw(f);
        self.max_heap.draw(f);
        self.subscriptions.draw(f);
        self.connections.draw(f);
    }

    fn draw_header(&self, f: &mut Frame) {
        let area = HEADER_AREA.intersection(f.area());
        if area.is_empty() {
            return;
        }
        let (status_text, status_color) =
            if self.broker_connected { ("● live", Color::Green) } else { ("○ down", Color::Red) };

        let header = Paragraph::new(Line::from(vec![
            Span::styled("  Press [q] to Quit  ", Style::default().fg(Color::White)),
            Span::styled(status_text, Style::default().fg(status_color)),
        ]))
        .block(
            Block::default()
                .title(Span::styled(" mqtt-sysmon ", Style::default().add_modifier(Modifier::BOLD)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(header, area);
    }
}
