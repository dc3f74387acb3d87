use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::about::{ABOUT_SECTIONS, ABOUT_TITLE};
use crate::config::ColorConfig;
use crate::tui::app::{ActivePane, TuiApp};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    if app.state.is_loading && app.state.items.is_empty() {
        render_notice(frame, chunks[0], "Loading headlines...", Style::default(), colors);
    } else if app.state.is_blank_failure() {
        let message = app.state.error_message.clone().unwrap_or_default();
        let style = Style::default().fg(colors.error_fg).bg(colors.error_bg);
        render_notice(frame, chunks[0], &format!("{}\n\nPress R to retry", message), style, colors);
    } else {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[0]);

        render_list_pane(frame, app, panes[0], colors);
        render_detail_pane(frame, app, panes[1], colors);
    }

    render_status_bar(frame, app, chunks[1], colors);

    if app.show_about {
        render_about(frame, chunks[0], colors);
    }
}

fn border_style(active: bool, colors: &ColorConfig) -> Style {
    if active {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    }
}

fn render_notice(frame: &mut Frame, area: Rect, message: &str, style: Style, colors: &ColorConfig) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(false, colors));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Roughly centred vertically
    let top = inner.height.saturating_sub(message.lines().count() as u16) / 2;
    let body = Rect {
        y: inner.y + top,
        height: inner.height.saturating_sub(top),
        ..inner
    };

    let paragraph = Paragraph::new(message.to_string())
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, body);
}

fn render_list_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::Headlines;

    let items: Vec<ListItem> = app
        .headlines()
        .iter()
        .map(|headline| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    headline.published_at.format("%m/%d ").to_string(),
                    Style::default().fg(colors.date),
                ),
                Span::styled(
                    headline.display_title().to_string(),
                    Style::default().fg(colors.headline),
                ),
            ]))
        })
        .collect();

    let title = format!(
        " Headlines ({}) [{}/{}] ",
        app.headlines().len(),
        (app.index + 1).min(app.headlines().len().max(1)),
        app.headlines().len().max(1)
    );

    let highlight_style = if is_active {
        Style::default()
            .bg(colors.selection_bg)
            .fg(colors.selection_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active, colors));

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style)
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_detail_pane(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::Detail;

    let content = if let Some(headline) = app.selected() {
        let mut lines = vec![
            Line::from(Span::styled(
                headline.display_title().to_string(),
                Style::default().fg(colors.headline).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                headline.source_name.clone(),
                Style::default().fg(colors.source),
            )),
            Line::from(Span::styled(
                format!("Published {}", headline.published_at.format("%Y-%m-%d %H:%M")),
                Style::default().fg(colors.date),
            )),
        ];
        if let Some(generated) = headline.summary_generated_at {
            lines.push(Line::from(Span::styled(
                format!("Summarized {}", generated.format("%Y-%m-%d %H:%M")),
                Style::default().fg(colors.date),
            )));
        }
        lines.push(Line::from(Span::styled(
            headline.url.clone(),
            Style::default().fg(colors.link),
        )));
        lines.push(Line::from(""));

        for paragraph in tidy_paragraphs(headline.display_content()).lines() {
            lines.push(Line::from(paragraph.to_string()));
        }

        Text::from(lines)
    } else {
        Text::from("No headline selected")
    };

    let block = Block::default()
        .title(format!(" Detail [{}] ", app.text_scale))
        .borders(Borders::ALL)
        .border_style(border_style(is_active, colors));
    let inner = block
        .inner(area)
        .inner(Margin::new(app.text_scale.detail_margin(), 0));
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, inner);
}

fn render_about(frame: &mut Frame, area: Rect, colors: &ColorConfig) {
    let width = area.width.saturating_sub(4).min(64);
    let height = area.height.saturating_sub(2).min(16);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let mut lines = Vec::new();
    for section in ABOUT_SECTIONS {
        lines.push(Line::from(Span::styled(
            section.title,
            Style::default().fg(colors.headline).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(section.body));
        lines.push(Line::from(""));
    }

    let block = Block::default()
        .title(format!(" {} ", ABOUT_TITLE))
        .borders(Borders::ALL)
        .border_style(border_style(true, colors));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true }),
        popup,
    );
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let (status, style) = match &app.state.error_message {
        // Failed refresh with a list still on screen
        Some(message) if !app.state.items.is_empty() => (
            format!("{}  (R:Retry)", message),
            Style::default().fg(colors.error_fg).bg(colors.error_bg),
        ),
        _ => {
            let status = if app.state.is_loading {
                "Refreshing...".to_string()
            } else if let Some(ref msg) = app.status_message {
                msg.clone()
            } else {
                "j/k:Nav  n/p:Page  Tab:Pane  o:Open  R:Refresh  Esc:Cancel  +/-:Text  ?:About  q:Quit"
                    .to_string()
            };
            (status, Style::default().fg(colors.status_fg).bg(colors.status_bg))
        }
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Collapse whitespace runs and blank-line runs; the text itself is plain
/// and left as sent.
fn tidy_paragraphs(text: &str) -> String {
    let mut out = String::new();
    let mut pending_space = false;

    for c in text.chars() {
        match c {
            '\n' => {
                out.truncate(out.trim_end_matches(' ').len());
                if !out.is_empty() && !out.ends_with("\n\n") {
                    out.push('\n');
                }
                pending_space = false;
            }
            c if c.is_whitespace() => pending_space = true,
            c => {
                if pending_space && !out.is_empty() && !out.ends_with('\n') {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextScale;
    use crate::domain::{FetchState, Headline, HeadlineId, Phase};
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn draw(app: &mut TuiApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|frame| render(frame, app, &ColorConfig::default()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn one_headline() -> Arc<[Headline]> {
        Arc::from(vec![Headline {
            id: HeadlineId(0),
            title: "Rates held steady".into(),
            description: String::new(),
            url: "https://news.example/rates".into(),
            image_url: None,
            summary: "The bank kept rates unchanged.".into(),
            published_at: Utc.with_ymd_and_hms(2025, 4, 19, 5, 48, 31).unwrap(),
            summary_generated_at: None,
            source_name: "NPR".into(),
            source_url: "https://npr.org".into(),
        }])
    }

    #[test]
    fn test_loading_with_no_items() {
        let mut app = TuiApp::new(TextScale::default());
        app.apply(FetchState::project(Arc::from(Vec::new()), Phase::Loading));
        assert!(draw(&mut app).contains("Loading headlines..."));
    }

    #[test]
    fn test_blank_failure_is_full_screen() {
        let mut app = TuiApp::new(TextScale::default());
        app.apply(FetchState::project(
            Arc::from(Vec::new()),
            Phase::Failed("Could not reach the server.".into()),
        ));

        let screen = draw(&mut app);
        assert!(screen.contains("Could not reach the server."));
        assert!(screen.contains("Press R to retry"));
        assert!(!screen.contains("Headlines ("));
    }

    #[test]
    fn test_failure_with_items_shows_banner_and_list() {
        let mut app = TuiApp::new(TextScale::default());
        let items = one_headline();
        app.apply(FetchState::project(items.clone(), Phase::Loaded));
        app.apply(FetchState::project(items, Phase::Failed("Network down".into())));

        let screen = draw(&mut app);
        assert!(screen.contains("Rates held steady"));
        assert!(screen.contains("Network down  (R:Retry)"));
    }

    #[test]
    fn test_detail_shows_summary_and_scale() {
        let mut app = TuiApp::new(TextScale::MAX);
        app.apply(FetchState::project(one_headline(), Phase::Loaded));

        let screen = draw(&mut app);
        assert!(screen.contains("The bank kept rates unchanged."));
        assert!(screen.contains("Detail [1.4x]"));
    }

    #[test]
    fn test_about_overlay_covers_panes() {
        let mut app = TuiApp::new(TextScale::default());
        app.apply(FetchState::project(one_headline(), Phase::Loaded));
        assert!(!draw(&mut app).contains(ABOUT_TITLE));

        app.toggle_about();
        let screen = draw(&mut app);
        assert!(screen.contains(ABOUT_TITLE));
        assert!(screen.contains("Hourly updates"));
        assert!(screen.contains("?:About"));
    }

    #[test]
    fn test_tidy_paragraphs() {
        assert_eq!(tidy_paragraphs("Hello   world"), "Hello world");
        assert_eq!(tidy_paragraphs("one\n\n\n  two"), "one\n\ntwo");
        assert_eq!(tidy_paragraphs("  plain  "), "plain");
    }

    #[test]
    fn test_angle_brackets_survive() {
        assert_eq!(tidy_paragraphs("a < b > c"), "a < b > c");
        assert_eq!(tidy_paragraphs("Rates <b>rose</b>"), "Rates <b>rose</b>");
    }

    #[test]
    fn test_detail_keeps_comparison_text_verbatim() {
        let mut headline = one_headline()[0].clone();
        headline.summary = "Inflation: a < b > c".into();

        let mut app = TuiApp::new(TextScale::default());
        app.apply(FetchState::project(Arc::from(vec![headline]), Phase::Loaded));

        assert!(draw(&mut app).contains("Inflation: a < b > c"));
    }
}
