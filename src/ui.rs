use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
};
use corpspeak_core::{format_message, ChatMessage, ChatRole, ContentBlock};
use crate::app::{App, InputMode};
use crate::theme::Palette;

const TITLE: &str = "Layman to corporate speak";

/// Side panels are only drawn when the terminal is at least this wide
const SIDE_PANELS_MIN_WIDTH: u16 = 100;
const SIDE_PANEL_WIDTH: u16 = 24;

const PORTRAIT: [&str; 4] = [
    "╭───────╮",
    "│ ◕   ◕ │",
    "│   ▿   │",
    "╰───────╯",
];

/// Lines for a single formatted block
pub fn block_lines(block: &ContentBlock, palette: &Palette) -> Vec<Line<'static>> {
    let text_style = Style::default().fg(palette.text);
    let marker_style = Style::default().fg(palette.accent);

    match block {
        ContentBlock::Paragraph(text) => text
            .split('\n')
            .map(|line| Line::from(Span::styled(line.to_string(), text_style)))
            .collect(),
        ContentBlock::UnorderedList(items) => items
            .iter()
            .map(|item| {
                Line::from(vec![
                    Span::styled("  • ", marker_style),
                    Span::styled(item.clone(), text_style),
                ])
            })
            .collect(),
        ContentBlock::OrderedList(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Line::from(vec![
                    Span::styled(format!("  {}. ", i + 1), marker_style),
                    Span::styled(item.clone(), text_style),
                ])
            })
            .collect(),
    }
}

fn message_lines(message: &ChatMessage, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    match message.role {
        ChatRole::User => {
            // Users see exactly what they typed
            lines.push(Line::from(Span::styled("You", palette.label())).alignment(Alignment::Right));
            let bubble = Style::default().fg(palette.text).bg(palette.user_bubble);
            for line in message.content.split('\n') {
                lines.push(Line::from(Span::styled(line.to_string(), bubble)).alignment(Alignment::Right));
            }
        }
        ChatRole::Assistant => {
            lines.push(Line::from(Span::styled("AI", palette.label())));
            let blocks = format_message(&message.content);
            for (i, block) in blocks.iter().enumerate() {
                if i > 0 {
                    lines.push(Line::default());
                }
                lines.extend(block_lines(block, palette));
            }
        }
    }

    lines.push(Line::default());
    lines
}

/// Every line of the chat history, including the loading indicator
pub fn chat_lines(
    messages: &[ChatMessage],
    loading: bool,
    animation_frame: u8,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = messages
        .iter()
        .flat_map(|msg| message_lines(msg, palette))
        .collect();

    if loading {
        lines.push(Line::from(Span::styled("AI", palette.label())));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            palette.muted().add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = app.palette();

    frame.render_widget(Block::default().style(palette.base()), area);

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, &palette);

    let main_area = if body_area.width >= SIDE_PANELS_MIN_WIDTH {
        let [left, middle, right] = Layout::horizontal([
            Constraint::Length(SIDE_PANEL_WIDTH),
            Constraint::Min(0),
            Constraint::Length(SIDE_PANEL_WIDTH),
        ])
        .areas(body_area);
        render_profile(frame, left, "Corporate", Borders::RIGHT, &palette);
        render_profile(frame, right, "Layman", Borders::LEFT, &palette);
        middle
    } else {
        body_area
    };

    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(main_area);

    render_chat(app, frame, chat_area, &palette);
    render_input(app, frame, input_area, &palette);
    render_footer(app, frame, footer_area, &palette);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    frame.render_widget(Block::default().style(palette.surface()), area);

    // Equal-width columns either side keep the title centered
    let [_, title_area, toggle_area] = Layout::horizontal([
        Constraint::Length(12),
        Constraint::Min(0),
        Constraint::Length(12),
    ])
    .areas(area);

    let title_style = palette.surface().add_modifier(Modifier::BOLD);
    let title = Paragraph::new(Line::from(Span::styled(TITLE, title_style)))
        .alignment(Alignment::Center);
    frame.render_widget(title, title_area);

    let switch = if app.theme.is_dark() { "[x]" } else { "[ ]" };
    let toggle = Paragraph::new(Line::from(vec![
        Span::raw("☀ "),
        Span::styled(switch, Style::default().fg(palette.accent)),
        Span::raw(" ☾ "),
    ]))
    .style(palette.surface())
    .alignment(Alignment::Right);
    frame.render_widget(toggle, toggle_area);
}

fn render_profile(frame: &mut Frame, area: Rect, name: &str, borders: Borders, palette: &Palette) {
    let block = Block::default()
        .borders(borders)
        .border_style(palette.border(false))
        .style(palette.base());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = PORTRAIT
        .iter()
        .map(|row| Line::from(Span::styled(*row, Style::default().fg(palette.text_muted))))
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        name.to_string(),
        palette.base().add_modifier(Modifier::BOLD),
    )));

    // Vertically center the portrait
    let height = lines.len() as u16;
    let top = inner.y + inner.height.saturating_sub(height) / 2;
    let portrait_area = Rect {
        x: inner.x,
        y: top,
        width: inner.width,
        height: height.min(inner.height),
    };

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), portrait_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    // Store area for mouse hit-testing
    app.chat_area = Some(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.query_chat_height = area.height.saturating_sub(2);
    app.query_chat_width = area.width.saturating_sub(2);

    let focused = app.input_mode == InputMode::Normal;
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(focused))
        .title(format!(" {} ", app.settings.model));

    let chat_text = if app.conversation.is_empty() && !app.query_loading {
        Text::from(Span::styled(
            "Say something plainly and get it back in corporate speak...",
            palette.muted(),
        ))
    } else {
        Text::from(chat_lines(
            app.conversation.messages(),
            app.query_loading,
            app.animation_frame,
            palette,
        ))
    };

    // No trimming, list indentation must survive wrapping
    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.query_scroll, 0));

    frame.render_widget(chat, area);

    let total_rows = app.chat_row_count();
    if total_rows > app.query_chat_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None)
            .thumb_style(Style::default().fg(palette.scrollbar()));

        let mut scrollbar_state =
            ScrollbarState::new(total_rows.saturating_sub(app.query_chat_height) as usize + 1)
                .position(app.query_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let editing = app.input_mode == InputMode::Editing;
    let title = if app.query_loading { " Waiting for reply... " } else { " Message (Enter to send) " };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(editing))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.query_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if app.query_input.is_empty() {
        Paragraph::new(Span::styled("Type your message...", palette.muted()))
    } else {
        // Get the visible slice of the input
        let visible_text: String = app.query_input
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(palette.text))
    };

    frame.render_widget(input.block(input_block), area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let mode_style = Style::default().bg(palette.accent).fg(palette.surface).add_modifier(Modifier::BOLD);
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    let key_style = Style::default().bg(palette.border).fg(palette.text);
    let label_style = palette.surface();

    let hints = match app.input_mode {
        InputMode::Normal => vec![
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" t ", key_style),
            Span::styled(" theme ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Ctrl+T ", key_style),
            Span::styled(" theme ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(palette.surface());
    frame.render_widget(footer, area);
}
