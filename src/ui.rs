use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use filing_charts::chart::{
    activity_color, bar_layout, nice_ticks, palette_color, pie_bounds, pie_slices, polar,
    value_range, Rgb, ASSET_COLORS, LIABILITY_COLORS,
};
use filing_charts::{BalanceSheet, Cashflow, CategoryAmount, ReportConfig, VERSION};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Paragraph,
    },
    Frame, Terminal,
};
use std::io;

/// Radius of the pie plus room for the exploded wedges
const PIE_EXTENT: f64 = 1.15;

/// Angular step when filling a wedge with radial lines
const WEDGE_STEP_DEGREES: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Assets,
    Liabilities,
    Cashflow,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Assets, Page::Liabilities, Page::Cashflow];

    pub fn next(&self) -> Self {
        match self {
            Page::Overview => Page::Assets,
            Page::Assets => Page::Liabilities,
            Page::Liabilities => Page::Cashflow,
            Page::Cashflow => Page::Overview,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Overview => Page::Cashflow,
            Page::Assets => Page::Overview,
            Page::Liabilities => Page::Assets,
            Page::Cashflow => Page::Liabilities,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Overview => "Overview",
            Page::Assets => "Assets",
            Page::Liabilities => "Liabilities",
            Page::Cashflow => "Cashflow",
        }
    }
}

pub struct App {
    pub sheet: BalanceSheet,
    pub cashflow: Cashflow,
    pub config: ReportConfig,
    pub current_page: Page,
}

impl App {
    pub fn new(sheet: BalanceSheet, cashflow: Cashflow, config: ReportConfig) -> Self {
        Self {
            sheet,
            cashflow,
            config,
            current_page: Page::Overview,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// Jump to a page by its 1-based tab number; out of range is ignored
    pub fn select_page(&mut self, number: usize) {
        if let Some(page) = number.checked_sub(1).and_then(|i| Page::ALL.get(i)) {
            self.current_page = *page;
        }
    }

    /// Applies a key press; returns true when the UI should close
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
            }
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Right | KeyCode::Char('l') => self.next_page(),
            KeyCode::Left | KeyCode::Char('h') => self.previous_page(),
            KeyCode::Char(c @ '1'..='4') => self.select_page(c as usize - '0' as usize),
            _ => {}
        }
        false
    }
}

/// Runs its restore closure when dropped, including while a panic unwinds
struct TerminalGuard<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> Drop for TerminalGuard<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

/// Best effort: every step runs even if an earlier one failed
fn restore_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen, crossterm::cursor::Show);
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let _guard = TerminalGuard {
        restore: restore_terminal,
    };
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // The guard restores the terminal before the error (or panic) is reported
    run_app(&mut terminal, app)?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Charts
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Overview => render_overview(f, chunks[1], app),
        Page::Assets => render_assets(f, chunks[1], app),
        Page::Liabilities => render_liabilities(f, chunks[1], app),
        Page::Cashflow => render_cashflow(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(format!("{} {}", i + 1, page.title()), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Assets: {}", app.sheet.total_assets()),
        Style::default().fg(Color::Green),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("Liabilities: {}", app.sheet.total_liabilities()),
        Style::default().fg(Color::Red),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Years: {}", app.cashflow.years.len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} | filing-charts v{} ", app.config.company, VERSION)),
    );

    f.render_widget(header, area);
}

fn render_status_bar(f: &mut Frame, area: Rect) {
    let status_spans = vec![
        Span::styled(" Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Next page | "),
        Span::styled("Shift+Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Previous | "),
        Span::styled("1-4", Style::default().fg(Color::Yellow)),
        Span::raw(" Jump | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_overview(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_assets(f, top[0], app);
    render_liabilities(f, top[1], app);
    render_cashflow(f, rows[1], app);
}

fn render_assets(f: &mut Frame, area: Rect, app: &App) {
    render_pie(
        f,
        area,
        &app.config.assets_title(),
        &app.sheet.assets,
        &ASSET_COLORS,
    );
}

fn render_liabilities(f: &mut Frame, area: Rect, app: &App) {
    render_pie(
        f,
        area,
        &app.config.liabilities_title(),
        &app.sheet.liabilities,
        &LIABILITY_COLORS,
    );
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn chart_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().add_modifier(Modifier::BOLD),
        ))
}

fn render_empty(f: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(Span::styled(
        message.to_string(),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_pie(f: &mut Frame, area: Rect, title: &str, items: &[CategoryAmount], palette: &[Rgb]) {
    let block = chart_block(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let amounts: Vec<f64> = items.iter().map(|i| i.amount).collect();
    let slices = pie_slices(&amounts);
    if slices.is_empty() {
        render_empty(f, inner, "No positive amounts to chart");
        return;
    }

    let label_width = items
        .iter()
        .map(|i| i.category.chars().count())
        .max()
        .unwrap_or(0)
        .saturating_add(10);
    let legend_width = u16::try_from(label_width)
        .unwrap_or(u16::MAX)
        .min(inner.width / 2);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(legend_width)])
        .split(inner);
    let plot = chunks[0];
    if plot.width == 0 || plot.height == 0 {
        return;
    }

    let (x_bounds, y_bounds) = pie_bounds(plot.width, plot.height, PIE_EXTENT);
    let units_per_cell = (x_bounds[1] - x_bounds[0]) / plot.width.max(1) as f64;

    let canvas = Canvas::default()
        .marker(Marker::HalfBlock)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for slice in &slices {
                let wedge_color = color(palette_color(palette, slice.index));
                let (cx, cy) = slice.center(1.0);
                let mut angle = slice.start;
                while angle <= slice.end {
                    let (dx, dy) = polar(1.0, angle);
                    ctx.draw(&CanvasLine {
                        x1: cx,
                        y1: cy,
                        x2: cx + dx,
                        y2: cy + dy,
                        color: wedge_color,
                    });
                    angle += WEDGE_STEP_DEGREES;
                }
            }

            ctx.layer();
            for slice in &slices {
                let label = slice.label();
                let (x, y) = slice.label_anchor(1.0);
                let x = x - label.len() as f64 * units_per_cell / 2.0;
                ctx.print(
                    x,
                    y,
                    Span::styled(
                        label,
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });
    f.render_widget(canvas, plot);

    let legend: Vec<Line> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let share = slices
                .iter()
                .find(|s| s.index == index)
                .map(|s| s.label())
                .unwrap_or_else(|| "n/a".to_string());
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(color(palette_color(palette, index)))),
                Span::raw(truncate(&item.category, legend_width.saturating_sub(9) as usize)),
                Span::styled(format!(" {}", share), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(legend), chunks[1]);
}

fn render_cashflow(f: &mut Frame, area: Rect, app: &App) {
    let title = app.config.cashflow_title(&app.cashflow.year_span());
    let block = chart_block(&title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let bars = bar_layout(&app.cashflow);
    if bars.is_empty() {
        render_empty(f, inner, "No cashflow values to chart");
        return;
    }
    if inner.height < 7 {
        render_empty(f, inner, "Enlarge the terminal to see the cashflow chart");
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Axis caption + legend
            Constraint::Min(3),    // Bars
            Constraint::Length(1), // X axis caption
        ])
        .split(inner);

    render_cashflow_legend(f, chunks[0], app);

    let plot = chunks[1];
    let (lo, hi) = value_range(&bars);
    let ticks = nice_ticks(lo, hi, 5);
    let tick_labels: Vec<String> = ticks.iter().map(|t| format!("{}", t)).collect();

    // One row above the tallest bar for its label, two below the lowest
    // for its label and the year axis
    let span = if hi > lo { hi - lo } else { 1.0 };
    let row_units = span / (plot.height as f64 - 4.0);
    let y_bounds = [lo - 2.0 * row_units, hi + row_units];

    // Reserve columns on the left for the tick labels
    let years = app.cashflow.years.len() as f64;
    let label_cells = tick_labels.iter().map(|l| l.len()).max().unwrap_or(0) as f64 + 1.0;
    let plot_cells = (plot.width as f64 - label_cells).max(1.0);
    let units_per_cell = years / plot_cells;
    let x_bounds = [-0.5 - label_cells * units_per_cell, years - 0.5];

    let canvas = Canvas::default()
        .marker(Marker::HalfBlock)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for tick in &ticks {
                ctx.draw(&CanvasLine {
                    x1: -0.5,
                    y1: *tick,
                    x2: x_bounds[1],
                    y2: *tick,
                    color: Color::DarkGray,
                });
            }

            for bar in &bars {
                let bar_color = color(activity_color(&app.cashflow.rows[bar.activity].activity));
                let mut x = bar.x;
                while x <= bar.x + bar.width {
                    ctx.draw(&CanvasLine {
                        x1: x,
                        y1: 0.0,
                        x2: x,
                        y2: bar.value,
                        color: bar_color,
                    });
                    x += units_per_cell;
                }
            }

            ctx.draw(&CanvasLine {
                x1: -0.5,
                y1: 0.0,
                x2: x_bounds[1],
                y2: 0.0,
                color: Color::White,
            });

            ctx.layer();
            for (tick, label) in ticks.iter().zip(&tick_labels) {
                ctx.print(
                    x_bounds[0],
                    *tick,
                    Span::styled(label.clone(), Style::default().fg(Color::DarkGray)),
                );
            }

            for bar in &bars {
                let label = bar.label();
                let x = bar.center() - label.len() as f64 * units_per_cell / 2.0;
                let y = if bar.label_above() {
                    bar.value + row_units
                } else {
                    bar.value - row_units
                };
                ctx.print(x, y, Span::styled(label, Style::default().fg(Color::White)));
            }

            for (i, year) in app.cashflow.years.iter().enumerate() {
                let x = i as f64 - year.len() as f64 * units_per_cell / 2.0;
                ctx.print(
                    x,
                    y_bounds[0],
                    Span::styled(year.clone(), Style::default().fg(Color::Gray)),
                );
            }
        });
    f.render_widget(canvas, plot);

    let caption = Paragraph::new(Span::styled(
        "Fiscal Year",
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center);
    f.render_widget(caption, chunks[2]);
}

fn render_cashflow_legend(f: &mut Frame, area: Rect, app: &App) {
    const Y_CAPTION: &str = "Amount (in Crores)";

    let mut legend_spans = vec![];
    for row in &app.cashflow.rows {
        legend_spans.push(Span::styled(
            "■ ",
            Style::default().fg(color(activity_color(&row.activity))),
        ));
        legend_spans.push(Span::raw(format!("{}  ", row.activity)));
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(Y_CAPTION.len() as u16), Constraint::Min(0)])
        .split(area);

    f.render_widget(
        Paragraph::new(Span::styled(Y_CAPTION, Style::default().fg(Color::Gray))),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(Line::from(legend_spans)).alignment(Alignment::Right),
        chunks[1],
    );
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        format!("{}...", s.chars().take(max_len - 3).collect::<String>())
    }
}
