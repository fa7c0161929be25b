use crate::app::{App, Focus};
use crate::braille::BrailleCanvas;
use crate::dashboard::{format_rate, DashboardView};
use crate::data::MunicipalRecord;
use crate::map::{palette, MapLayers};
use crate::stats::{ColorScale, RankingAxis};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Widget,
        Wrap,
    },
    Frame,
};

const EMPTY_BRAILLE: u32 = 0x2800;

/// Screen regions, shared by rendering and mouse hit-testing
struct Panels {
    header: Rect,
    departments: Rect,
    municipalities: Rect,
    metrics: Rect,
    comparison: Rect,
    top: Rect,
    bottom: Rect,
    map: Rect,
    legend: Rect,
    totals: Rect,
    status: Rect,
}

fn panels(area: Rect) -> Panels {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(28),
            Constraint::Percentage(40),
            Constraint::Min(30),
        ])
        .split(rows[1]);

    let lists = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(columns[0]);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Min(4),
            Constraint::Min(4),
        ])
        .split(columns[1]);

    let map_column = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Percentage(30),
        ])
        .split(columns[2]);

    Panels {
        header: rows[0],
        departments: lists[0],
        municipalities: lists[1],
        metrics: charts[0],
        comparison: charts[1],
        top: charts[2],
        bottom: charts[3],
        map: map_column[0],
        legend: map_column[1],
        totals: map_column[2],
        status: rows[2],
    }
}

/// Terminal cells available to the map canvas inside its border
pub fn map_inner_area(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(panels(area).map)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let p = panels(frame.area());
    let view = app.view();

    render_header(frame, &view, p.header);
    render_department_list(frame, app, p.departments);
    render_municipality_list(frame, app, p.municipalities);
    render_metrics(frame, &view, p.metrics);
    render_comparison(frame, &view, p.comparison);
    render_ranking(frame, "Most", &view.top, view.axis, p.top, Color::Red);
    render_ranking(frame, "Fewest", &view.bottom, view.axis, p.bottom, Color::Green);
    render_map(frame, app, p.map);
    render_legend(frame, app, p.legend);
    render_totals(frame, &view, p.totals);
    render_status_bar(frame, app, p.status);
}

fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn render_header(frame: &mut Frame, view: &DashboardView, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            " Homicides in Colombia, 2024 ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.department, Style::default().fg(Color::Cyan)),
        Span::styled(" / ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.municipality, Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_department_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .departments
        .iter()
        .map(|d| ListItem::new(d.as_str()))
        .collect();
    let list = List::new(items)
        .block(panel_block("Departments", app.focus == Focus::Departments))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.department_index());
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_municipality_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .selection
        .municipalities()
        .iter()
        .map(|m| ListItem::new(m.as_str()))
        .collect();
    let list = List::new(items)
        .block(panel_block("Municipalities", app.focus == Focus::Municipalities))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.municipality_index());
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_metrics(frame: &mut Frame, view: &DashboardView, area: Rect) {
    let block = panel_block("Municipality", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let record = match &view.record {
        Ok(record) => record,
        Err(e) => {
            let message = Paragraph::new(e.to_string())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(message, inner);
            return;
        }
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let facts = vec![
        Line::from(vec![
            Span::styled("Homicides ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                record.homicides.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Population ", Style::default().fg(Color::DarkGray)),
            Span::styled(record.population.to_string(), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("Rate per 100k ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{:.2}", record.rate), Style::default().fg(Color::Yellow)),
        ]),
    ];
    frame.render_widget(Paragraph::new(facts), rows[0]);

    if let Some(ratio) = view.gauge_ratio() {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Red).bg(Color::Black))
            .ratio(ratio)
            .label(format!("{:.2} of max {:.2}", record.rate, view.max_rate));
        frame.render_widget(gauge, rows[1]);
    }
}

/// Chart value for a rate; bar charts take integers, so keep two decimals
fn rate_value(rate: f64) -> u64 {
    (rate.max(0.0) * 100.0).round() as u64
}

fn render_comparison(frame: &mut Frame, view: &DashboardView, area: Rect) {
    let c = &view.comparison;
    let entries = [
        ("Municipal", c.municipal.clone(), Color::Red),
        ("Dept mean", c.department_mean.clone(), Color::Yellow),
        ("National", Ok(c.national), Color::Cyan),
    ];

    let bars: Vec<Bar<'_>> = entries
        .into_iter()
        .map(|(label, rate, color)| {
            let value = rate.as_ref().map(|r| rate_value(*r)).unwrap_or(0);
            Bar::default()
                .value(value)
                .text_value(format_rate(&rate))
                .label(Line::from(label))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::White).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel_block("Rate per 100k", false))
        .data(BarGroup::default().bars(&bars))
        .bar_gap(2)
        .bar_width(9);
    frame.render_widget(chart, area);
}

fn axis_value(record: &MunicipalRecord, axis: RankingAxis) -> (u64, String) {
    match axis {
        RankingAxis::Count => (record.homicides, record.homicides.to_string()),
        RankingAxis::Rate => (rate_value(record.rate), format!("{:.2}", record.rate)),
    }
}

fn render_ranking(
    frame: &mut Frame,
    title: &str,
    records: &[&MunicipalRecord],
    axis: RankingAxis,
    area: Rect,
    color: Color,
) {
    let bars: Vec<Bar<'_>> = records
        .iter()
        .map(|record| {
            let (value, text) = axis_value(record, axis);
            Bar::default()
                .value(value)
                .text_value(text)
                .label(Line::from(record.municipality_key()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::White).bg(color))
        })
        .collect();

    let title = format!("{} {} (top {})", title, axis.label(), records.len());
    let chart = BarChart::default()
        .block(panel_block(&title, false))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0);
    frame.render_widget(chart, area);
}

fn render_totals(frame: &mut Frame, view: &DashboardView, area: Rect) {
    let bars: Vec<Bar<'_>> = view
        .departments
        .iter()
        .map(|summary| {
            let selected = summary.department == view.department;
            let color = if selected { Color::Yellow } else { Color::Magenta };
            Bar::default()
                .value(summary.homicides)
                .label(Line::from(summary.department.as_str()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::White).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel_block("Homicides by department", false))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0);
    frame.render_widget(chart, area);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel_block("Homicide rate by municipality", app.focus == Focus::Map);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !app.map.has_data() {
        let placeholder = Paragraph::new("No boundary data loaded")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, inner);
        return;
    }

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.set_size(inner.width as usize * 2, inner.height as usize * 4);

    let layers = app.map.render(
        inner.width as usize,
        inner.height as usize,
        &viewport,
        Some(app.highlight()),
    );
    frame.render_widget(MapWidget { layers }, inner);
}

/// Custom widget that renders the choropleth with outline layers on top
struct MapWidget {
    layers: MapLayers,
}

/// Union of the dots of two braille characters
fn merge_braille(under: char, over: char) -> char {
    let bits = (under as u32 - EMPTY_BRAILLE) | (over as u32 - EMPTY_BRAILLE);
    char::from_u32(EMPTY_BRAILLE | bits).unwrap_or(over)
}

impl MapWidget {
    /// Render an outline layer with a specific color, merging with what is below
    fn render_outline(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for row in 0..canvas.height().min(area.height as usize) {
            for col in 0..canvas.width().min(area.width as usize) {
                let Some((ch, _)) = canvas.cell(col, row) else {
                    continue;
                };
                let cell = &mut buf[(area.x + col as u16, area.y + row as u16)];
                let under = cell.symbol().chars().next().filter(|c| {
                    (EMPTY_BRAILLE..=EMPTY_BRAILLE + 0xFF).contains(&(*c as u32))
                });
                let merged = under.map_or(ch, |u| merge_braille(u, ch));
                cell.set_char(merged).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let fill = &self.layers.fill;
        for row in 0..fill.height().min(area.height as usize) {
            for col in 0..fill.width().min(area.width as usize) {
                if let Some((ch, tint)) = fill.cell(col, row) {
                    let color = tint.map_or(Color::Gray, palette::shade_color);
                    buf[(area.x + col as u16, area.y + row as u16)]
                        .set_char(ch)
                        .set_fg(color);
                }
            }
        }

        Self::render_outline(&self.layers.department, Color::White, area, buf);
        Self::render_outline(&self.layers.selected, Color::Red, area, buf);
    }
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(" rate ", Style::default().fg(Color::DarkGray))];

    match app.map.scale() {
        ColorScale::Gamma { vmin, vmax, .. } => {
            spans.push(Span::styled(format!("{:.1} ", vmin), Style::default().fg(Color::White)));
            for step in 0..10 {
                let (r, g, b) = palette::ramp(step as f64 / 9.0);
                spans.push(Span::styled("█", Style::default().fg(Color::Rgb(r, g, b))));
            }
            spans.push(Span::styled(format!(" {:.1}", vmax), Style::default().fg(Color::White)));
        }
        ColorScale::Flat => {
            let (r, g, b) = palette::ramp(0.5);
            spans.push(Span::styled("█", Style::default().fg(Color::Rgb(r, g, b))));
            spans.push(Span::styled(" all equal", Style::default().fg(Color::White)));
        }
    }

    let (_, missing) = app.map.coverage();
    spans.push(Span::styled("  █", Style::default().fg(palette::NO_DATA)));
    spans.push(Span::styled(
        format!(" no data ({})", missing),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ranking: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.axis.label(), Style::default().fg(Color::Magenta)),
        Span::styled(format!(" N={} ", app.top_n), Style::default().fg(Color::Magenta)),
    ];

    match &app.status {
        Some(message) => {
            spans.push(Span::styled("| ", Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(message.as_str(), Style::default().fg(Color::Red)));
        }
        None => spans.push(Span::styled(
            "| Tab:focus ↑↓:select hjkl:pan +/-:zoom m:metric [/]:N r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        )),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
