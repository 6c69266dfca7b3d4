use crate::app::{App, ErrorDialog, Focus, Rendered};
use crate::chart::{annotation_rows, format_final_pct};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, LegendPosition, Paragraph, Wrap,
    },
    Frame,
};

const BACKGROUND: Color = Color::Rgb(0x1e, 0x1e, 0x2f);
const FIELD_BACKGROUND: Color = Color::Rgb(0x2e, 0x2e, 0x3e);
const ACCENT: Color = Color::Rgb(0x2d, 0x8c, 0xf0);
const FORM_WIDTH: u16 = 46;
const ANNOTATION_WIDTH: u16 = 11;

pub const WINDOW_TITLE: &str = "Portfolio Comparison";
pub const CHART_TITLE: &str = "Portfolio Performance Comparison";

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(BACKGROUND).fg(Color::White)),
        area,
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FORM_WIDTH), Constraint::Min(0)])
        .split(area);

    draw_form(f, columns[0], app);
    draw_chart_panel(f, columns[1], app);

    if let Some(dialog) = &app.error {
        draw_error_dialog(f, dialog);
    }
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { ACCENT } else { Color::White };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(FIELD_BACKGROUND).fg(Color::White))
}

fn draw_form(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(5),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(app.start.label())
            .block(field_block("Start date", app.focus == Focus::StartDate)),
        rows[0],
    );
    f.render_widget(
        Paragraph::new(app.end.label()).block(field_block("End date", app.focus == Focus::EndDate)),
        rows[1],
    );

    draw_editor(f, rows[2], app);

    let button_style = if app.focus == Focus::CompareButton {
        Style::default()
            .bg(ACCENT)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().bg(ACCENT).fg(Color::White).add_modifier(Modifier::BOLD)
    };
    let label = if app.busy { "Comparing…" } else { "Compare" };
    f.render_widget(
        Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(button_style)
            .block(Block::default().borders(Borders::ALL).border_style(button_style)),
        rows[3],
    );

    let help = Paragraph::new(vec![
        Line::from("Tab/Shift+Tab focus   F5/Ctrl+R compare"),
        Line::from("Dates: ↑/↓ day  PgUp/PgDn month  t today"),
        Line::from("Ctrl+Q quit"),
    ])
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::TOP));
    f.render_widget(help, rows[4]);
}

fn draw_editor(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Portfolios;
    let block = field_block("Portfolios (name: {ticker: weight})", focused);
    let inner = block.inner(area);

    let (row, col) = app.editor.cursor();
    let visible = inner.height.max(1) as usize;
    let scroll = row.saturating_sub(visible - 1);

    let lines: Vec<Line> = app
        .editor
        .lines()
        .iter()
        .map(|l| Line::from(l.as_str()))
        .collect();
    f.render_widget(
        Paragraph::new(lines).block(block).scroll((scroll as u16, 0)),
        area,
    );

    if focused && app.error.is_none() {
        let x = inner.x + (col as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + (row - scroll) as u16;
        f.set_cursor_position((x, y));
    }
}

fn draw_chart_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            CHART_TITLE,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(BACKGROUND).fg(Color::White));

    let Some(rendered) = &app.rendered else {
        let text = if app.busy {
            "Fetching prices…"
        } else {
            "Enter portfolios and dates, then press Compare."
        };
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray))
                .block(block),
            area,
        );
        return;
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(ANNOTATION_WIDTH)])
        .split(inner);

    draw_chart(f, parts[0], rendered);
    draw_annotations(f, parts[1], rendered);

    if app.busy {
        let status = Rect {
            x: inner.x,
            y: inner.y,
            width: inner.width.min(20),
            height: 1.min(inner.height),
        };
        f.render_widget(
            Paragraph::new("Fetching prices…").style(Style::default().fg(Color::Yellow)),
            status,
        );
    }
}

fn draw_chart(f: &mut Frame, area: Rect, rendered: &Rendered) {
    let model = &rendered.chart;
    let datasets: Vec<Dataset> = model
        .lines
        .iter()
        .map(|line| {
            Dataset::default()
                .name(line.name.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(line.color))
                .data(&line.points)
        })
        .collect();

    let axis_style = Style::default().fg(Color::Gray);
    let x_title = format!(
        "Date ({} to {})",
        rendered.run.start.format("%Y-%m-%d"),
        rendered.run.end.format("%Y-%m-%d")
    );
    let chart = Chart::new(datasets)
        .style(Style::default().bg(BACKGROUND))
        .x_axis(
            Axis::default()
                .title(Span::styled(x_title, axis_style))
                .style(axis_style)
                .bounds(model.x_bounds)
                .labels(model.x_labels.clone()),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Cumulative Return (%)", axis_style))
                .style(axis_style)
                .bounds(model.y_bounds)
                .labels(model.y_labels.clone()),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Percentage(60), Constraint::Percentage(60)));

    f.render_widget(chart, area);
}

// Chart rows exclude the x-axis line and its labels at the bottom.
fn draw_annotations(f: &mut Frame, area: Rect, rendered: &Rendered) {
    let model = &rendered.chart;
    let plot_height = area.height.saturating_sub(2);
    let finals: Vec<Option<f64>> = model.lines.iter().map(|l| l.final_pct).collect();
    let rows = annotation_rows(&finals, model.y_bounds, plot_height);

    for (line, row) in model.lines.iter().zip(rows) {
        let Some(row) = row else { continue };
        let target = Rect {
            x: area.x,
            y: area.y + row,
            width: area.width,
            height: 1,
        };
        f.render_widget(
            Paragraph::new(Span::styled(
                format!(" {}", format_final_pct(line.final_pct)),
                Style::default().fg(line.color).add_modifier(Modifier::BOLD),
            )),
            target,
        );
    }
}

fn draw_error_dialog(f: &mut Frame, dialog: &ErrorDialog) {
    let popup_area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, popup_area);

    let body = vec![
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(Span::styled(
            "[ OK ]  Enter / Esc",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
    ];
    let paragraph = Paragraph::new(body)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(dialog.title.as_str())
                .border_style(Style::default().fg(Color::Red))
                .style(Style::default().bg(FIELD_BACKGROUND)),
        )
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
