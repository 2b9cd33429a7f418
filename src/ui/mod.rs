use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use std::time::Instant;

use crate::app::{App, Popup};
use crate::theme::Theme;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),  // Info line
            Constraint::Length(3),  // Hearts box
            Constraint::Min(6),     // Actions block
            Constraint::Length(5),  // Farm plots
            Constraint::Length(1),  // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_hearts_box(f, app, chunks[1]);
    draw_actions_block(f, app, chunks[2]);
    draw_farm_box(f, app, chunks[3]);
    draw_footer(f, &app.theme, chunks[4]);

    if app.popup == Popup::Help {
        draw_help_popup(f, &app.theme);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let line = if let Some(ref status) = app.status_message {
        let color = if status.starts_with("Error") { theme.danger } else { theme.warning };
        Line::from(Span::styled(status, Style::default().fg(color)))
    } else {
        Line::from(vec![
            Span::styled("🌱 TERMINAL FARM", Style::default().fg(theme.success).add_modifier(Modifier::BOLD)),
            Span::styled(" │ ", Style::default().fg(theme.text_dim)),
            Span::styled(format!("${}", app.wallet.money), Style::default().fg(theme.warning)),
            Span::styled(" │ ", Style::default().fg(theme.text_dim)),
            Span::styled(
                format!(
                    "{} free plots, {} ready",
                    app.farm.free_plots(),
                    app.farm.ready_plots(Instant::now())
                ),
                Style::default().fg(theme.text_dim),
            ),
        ])
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_hearts_box(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .title(Span::styled(
            format!(" Stamina {}/{} ", app.stamina.current, app.stamina.max),
            Style::default().fg(theme.header),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.inactive));

    // Drawn from the icons in the hearts container, not from the stamina value
    let mut spans = vec![Span::raw(" ")];
    for variant in app.page.hearts() {
        spans.push(Span::styled(variant.glyph(), Style::default().fg(theme.heart(variant))));
        spans.push(Span::raw(" "));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_actions_block(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let page = &app.page;
    let doc = page.document();
    let title = doc.text(page.elements().title);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));

    let selected = app.selected_element();
    let back = page.elements().back_trigger;

    let lines: Vec<Line> = page
        .clickable()
        .into_iter()
        .map(|id| {
            let is_selected = Some(id) == selected;
            let marker = if is_selected { "▶ " } else { "  " };
            let label = if id == back {
                format!("← {}", page.label(id))
            } else {
                page.label(id).to_string()
            };

            let style = if is_selected {
                Style::default().bg(theme.bg_selected).fg(theme.text).add_modifier(Modifier::BOLD)
            } else if id == back {
                Style::default().fg(theme.text_dim)
            } else {
                Style::default().fg(theme.text)
            };

            Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.accent)),
                Span::styled(label, style),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_farm_box(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .title(Span::styled(" Farm ", Style::default().fg(theme.header)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.inactive));

    let now = Instant::now();
    let spans: Vec<Span> = app
        .farm
        .plots
        .iter()
        .enumerate()
        .flat_map(|(i, plot)| {
            let (text, color) = match plot {
                Some(plot) if plot.is_ready(now) => {
                    (format!("[{} {} ✓]", i + 1, plot.crop), theme.success)
                }
                Some(plot) => (
                    format!("[{} {} {:.0}%]", i + 1, plot.crop, plot.progress(now) * 100.0),
                    theme.warning,
                ),
                None => (format!("[{} ·]", i + 1), theme.text_dim),
            };
            [Span::styled(text, Style::default().fg(color)), Span::raw(" ")]
        })
        .collect();

    let farm = Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(farm, area);
}

fn draw_footer(f: &mut Frame, theme: &Theme, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(theme.accent));
    let hint = |h: &'static str| Span::styled(h, Style::default().fg(theme.text_dim));

    let footer = Paragraph::new(Line::from(vec![
        key("↑/↓"), hint(" move  "),
        key("Enter"), hint(" select  "),
        key("p"), hint(" plant  "),
        key("Esc"), hint(" back  "),
        key("+/-"), hint(" health  "),
        key("?"), hint(" help  "),
        key("q"), hint(" quit"),
    ]))
    .alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, theme: &Theme) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(theme.header).add_modifier(Modifier::BOLD)))
    };
    let entry = |key: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(key, Style::default().fg(theme.accent)),
            Span::raw(text),
        ])
    };

    let help_text = vec![
        section("═══ Navigation ═══"),
        entry("  ↑/↓ j/k   ", "Move through the current menu"),
        entry("  Enter     ", "Activate the selected entry"),
        entry("  p         ", "Open the seed menu"),
        entry("  Esc/b     ", "Back to the main menu"),
        Line::from(""),
        section("═══ Stamina ═══"),
        entry("  +/-       ", "Add or remove half a heart"),
        entry("  Sleep     ", "Restore all hearts"),
        Line::from(vec![Span::raw("            Planting costs money and stamina; each seed shows both")]),
        Line::from(""),
        section("═══ Farm ═══"),
        entry("  Harvest   ", "Sell every ready crop (marked ✓)"),
        Line::from(""),
        section("═══ Quick Start ═══"),
        entry("  farmdeck                  ", "Launch this TUI"),
        entry("  farmdeck --hearts 12.5    ", "Print a hearts bar"),
        entry("  farmdeck --hearts 3 --json", " Hearts bar as JSON"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(theme.text_dim)),
            Span::styled("h", Style::default().fg(theme.accent)),
            Span::styled("/", Style::default().fg(theme.text_dim)),
            Span::styled("?", Style::default().fg(theme.accent)),
            Span::styled("/", Style::default().fg(theme.text_dim)),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::styled(" to close", Style::default().fg(theme.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" farmdeck Help ", Style::default().fg(theme.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
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
