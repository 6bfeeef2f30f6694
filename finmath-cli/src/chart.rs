//! Terminal pie charts.
//!
//! The pie is drawn on a braille canvas: a grid of points inside the unit
//! circle is split into slices by angle, starting at 140° and running
//! counter-clockwise. A legend beside the pie carries the slice labels.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use finmath_core::format_eur;
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Paragraph, Widget, Wrap,
    },
    Terminal,
};
use std::collections::BTreeMap;
use std::io;
use tracing::debug;

const START_ANGLE: f64 = 140.0;
const GRID_STEPS: usize = 120;

const PALETTE: [Color; 12] = [
    Color::Blue,
    Color::Yellow,
    Color::Green,
    Color::Red,
    Color::Magenta,
    Color::Cyan,
    Color::LightRed,
    Color::LightGreen,
    Color::LightBlue,
    Color::LightYellow,
    Color::LightMagenta,
    Color::Gray,
];

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    title: String,
    subtitle: Option<String>,
    slices: Vec<PieSlice>,
    /// Append the euro value to each percentage
    show_values: bool,
}

impl PieChart {
    pub fn new(title: impl Into<String>, slices: Vec<PieSlice>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            slices,
            show_values: false,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn show_values(mut self, show: bool) -> Self {
        self.show_values = show;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value.max(0.0)).sum()
    }

    /// Percent of total per slice; all zero when the total is zero.
    pub fn shares(&self) -> Vec<f64> {
        let total = self.total();
        self.slices
            .iter()
            .map(|s| if total > 0.0 { s.value.max(0.0) / total * 100.0 } else { 0.0 })
            .collect()
    }

    /// `"12.3% (€1,234.56)"`, or just the percentage
    pub fn slice_label(&self, index: usize) -> Option<String> {
        let slice = self.slices.get(index)?;
        let pct = self.shares()[index];
        Some(if self.show_values {
            format!("{pct:.1}% ({})", format_eur(slice.value))
        } else {
            format!("{pct:.1}%")
        })
    }

    /// Grid points inside the unit circle, grouped by the slice they fall in.
    fn slice_points(&self) -> Vec<Vec<(f64, f64)>> {
        let mut points = vec![Vec::new(); self.slices.len()];
        let total = self.total();
        if total <= 0.0 {
            return points;
        }

        let mut bounds = Vec::with_capacity(self.slices.len());
        let mut acc = 0.0;
        for s in &self.slices {
            acc += s.value.max(0.0) / total * 360.0;
            bounds.push(acc);
        }

        let step = 2.0 / GRID_STEPS as f64;
        for i in 0..=GRID_STEPS {
            for j in 0..=GRID_STEPS {
                let x = -1.0 + i as f64 * step;
                let y = -1.0 + j as f64 * step;
                if x * x + y * y > 1.0 {
                    continue;
                }
                let angle = (y.atan2(x).to_degrees() - START_ANGLE).rem_euclid(360.0);
                let slice = bounds
                    .iter()
                    .position(|b| angle < *b)
                    .unwrap_or(self.slices.len() - 1);
                points[slice].push((x, y));
            }
        }
        points
    }

    fn legend(&self) -> Paragraph<'_> {
        let lines: Vec<Line> = self
            .slices
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(PALETTE[i % PALETTE.len()])),
                    Span::raw(format!(
                        "{}  {}",
                        s.label,
                        self.slice_label(i).unwrap_or_default()
                    )),
                ])
            })
            .collect();
        Paragraph::new(lines).wrap(Wrap { trim: true })
    }
}

/// Canvas bounds that keep the circle round on cells about twice as tall as wide.
fn canvas_bounds(area: Rect) -> ([f64; 2], [f64; 2]) {
    let w = f64::from(area.width.max(1));
    let h = f64::from(area.height.max(1)) * 2.0;
    if w >= h {
        let half = w / h;
        ([-half, half], [-1.0, 1.0])
    } else {
        let half = h / w;
        ([-1.0, 1.0], [-half, half])
    }
}

impl Widget for &PieChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = Block::default().borders(Borders::ALL).title(Line::from(Span::styled(
            self.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if let Some(sub) = &self.subtitle {
            block = block.title_bottom(sub.as_str());
        }
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(inner);

        let (x_bounds, y_bounds) = canvas_bounds(chunks[0]);
        let points = self.slice_points();
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                for (i, coords) in points.iter().enumerate() {
                    ctx.draw(&Points {
                        coords: coords.as_slice(),
                        color: PALETTE[i % PALETTE.len()],
                    });
                }
            })
            .render(chunks[0], buf);

        self.legend().render(chunks[1], buf);
    }
}

/// Category shares of the absolute total.
pub fn category_chart(sums: &BTreeMap<String, f64>) -> PieChart {
    let total: f64 = sums.values().sum();
    let slices = sums
        .iter()
        .map(|(label, value)| PieSlice {
            label: label.clone(),
            value: value.abs(),
        })
        .collect();
    PieChart::new("Transaction Amount by Category", slices)
        .subtitle(format!("Total: {}", format_eur(total)))
        .show_values(true)
}

pub fn cluster_chart(sums: &BTreeMap<usize, f64>) -> PieChart {
    let slices = sums
        .iter()
        .map(|(cluster, value)| PieSlice {
            label: format!("Cluster {cluster}"),
            value: value.abs(),
        })
        .collect();
    PieChart::new("Share of Total Transaction Amount by Cluster", slices)
}

/// Show each chart full-screen in turn. Any key advances; `q` or Esc quits.
pub fn show_charts(charts: &[PieChart]) -> Result<()> {
    if charts.is_empty() {
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = chart_loop(&mut terminal, charts);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn chart_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, charts: &[PieChart]) -> Result<()> {
    for chart in charts {
        debug!(title = chart.title(), "drawing chart");
        terminal.draw(|f| {
            let area = f.area();
            f.render_widget(chart, area);
        })?;
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    _ => break,
                }
            }
        }
    }
    Ok(())
}
