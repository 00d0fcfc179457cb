use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use wayplan_core::Sender;

use crate::app::{App, InputMode, Screen};

/// The terminal has no home indicator, so the safe-area contribution to the
/// composer inset is zero and the hidden-keyboard minimum applies.
const SAFE_AREA_BOTTOM: f32 = 0.0;

/// Logical inset units per terminal row when applying the derived padding.
const UNITS_PER_ROW: f32 = 8.0;

fn inset_rows(bottom_padding: f32) -> u16 {
    (bottom_padding / UNITS_PER_ROW).round() as u16
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Plans => render_plans_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let screen_title = match (&app.screen, app.chat.as_ref()) {
        (Screen::Chat, Some(chat)) => chat.title.clone(),
        _ => "Travel Plans".to_string(),
    };

    let title = Line::from(vec![
        Span::styled(" Wayplan ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(screen_title, Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Plans => " PLANS ",
        Screen::Chat => " CHAT ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let disabled_style = Style::default().bg(Color::Black).fg(Color::DarkGray);

    let hints = match (app.screen, app.input_mode) {
        (Screen::Plans, _) => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" open ", label_style),
            Span::styled(" n ", key_style),
            Span::styled(" new plan ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (Screen::Chat, InputMode::Normal) => vec![
            Span::styled(" i ", key_style),
            Span::styled(" compose ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" back ", label_style),
        ],
        (Screen::Chat, InputMode::Editing) => {
            // The send affordance dims while the draft is blank.
            let can_send = app.chat.as_ref().is_some_and(|c| c.composer.can_submit());
            let send_style = if can_send { label_style } else { disabled_style };
            vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" send ", send_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" done ", label_style),
            ]
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);

    let footer = Paragraph::new(Line::from(spans));
    frame.render_widget(footer, area);
}

fn render_plans_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Travel Plans ");

    if app.plans.is_empty() {
        let placeholder = Paragraph::new("No plans yet. Press 'n' to start one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app
        .plans
        .list()
        .iter()
        .map(|summary| {
            let detail = if summary.destination.is_empty() {
                summary.last_message.clone()
            } else if summary.last_message.is_empty() {
                summary.destination.clone()
            } else {
                format!("{}: {}", summary.destination, summary.last_message)
            };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        summary.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(summary.date.clone(), Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(Span::styled(detail, Style::default().fg(Color::Gray))),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.plan_state);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let animation_frame = app.animation_frame;
    let editing = app.input_mode == InputMode::Editing;
    let Some(chat) = app.chat.as_mut() else {
        return;
    };

    // Bottom padding below the composer comes from the keyboard coordinator,
    // mapped from logical units to rows.
    let insets = chat.keyboard.insets(SAFE_AREA_BOTTOM);
    let margin_rows = inset_rows(insets.bottom_padding);

    let [transcript_area, notice_area, input_area, _margin_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(if chat.reply_notice.is_some() { 1 } else { 0 }),
        Constraint::Length(3),
        Constraint::Length(margin_rows),
    ])
    .areas(area);

    // Store transcript dimensions for scroll calculations (inner size minus borders)
    chat.viewport_height = transcript_area.height.saturating_sub(2);
    chat.viewport_width = transcript_area.width.saturating_sub(2);

    let transcript_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", chat.title));

    let messages = chat.store.list();
    let waiting = chat.is_waiting();

    let transcript_text = if messages.is_empty() && !waiting {
        Text::from(Span::styled(
            "Where would you like to go?",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &messages {
            let (label, label_color) = match msg.sender {
                Sender::User => ("You", Color::Cyan),
                Sender::Assistant => ("Guide", Color::Yellow),
            };
            lines.push(Line::from(vec![
                Span::styled(
                    label,
                    Style::default()
                        .fg(label_color)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", msg.sent_at.format("%-I:%M %p")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            for line in msg.body.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if waiting {
            lines.push(Line::from(Span::styled(
                "Guide",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let transcript = Paragraph::new(transcript_text)
        .block(transcript_block)
        .wrap(Wrap { trim: true })
        .scroll((chat.scroll, 0));

    frame.render_widget(transcript, transcript_area);

    if let Some(notice) = chat.reply_notice {
        let notice_line = Paragraph::new(Span::styled(
            format!(" {notice}"),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::ITALIC),
        ));
        frame.render_widget(notice_line, notice_area);
    }

    // Composer input; the border brightens while focused
    let input_border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Message ");

    // Horizontal scrolling keeps the cursor visible in a long draft.
    // Inner width = total width - 2 (for borders)
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = chat.composer.cursor();

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let draft = chat.composer.draft();
    let input = if draft.is_empty() && !editing {
        Paragraph::new("Type your message...")
            .style(Style::default().fg(Color::DarkGray))
            .block(input_block)
    } else {
        let visible_text: String = draft.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text)
            .style(Style::default().fg(Color::Cyan))
            .block(input_block)
    };

    frame.render_widget(input, input_area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}
