use crate::app::MessageRow;
use crate::catalog::compose_message;
use crate::model::Origin;
use crate::tokens::{TokenSet, HASHTAG_PREFIX, MENTION_PREFIX};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

/// Each row shows the text that would be posted: the template followed by the
/// current selection, with hashtags and mentions highlighted.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    rows: &[MessageRow],
    selection: &TokenSet,
    index: usize,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("Messages");

    if rows.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No messages in this category",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "Press n to write one",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    // borders plus the status marker column
    let width = (area.width as usize).saturating_sub(12).max(10);
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let style = if row.tweeted {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            let text = compose_message(&row.text, selection);
            let mut lines: Vec<Line> = textwrap::wrap(&text, width)
                .into_iter()
                .enumerate()
                .map(|(i, chunk)| {
                    let prefix = if i == 0 {
                        markers(row)
                    } else {
                        " ".repeat(7)
                    };
                    let mut spans = vec![Span::styled(prefix, Style::default().fg(Color::Green))];
                    spans.extend(highlight_tokens(&chunk, style));
                    Line::from(spans)
                })
                .collect();
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(index));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Split `line` into spans, styling `#tag` and `@handle` words apart from
/// the surrounding text.
fn highlight_tokens(line: &str, base: Style) -> Vec<Span<'static>> {
    let token_style = base.fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    let mut plain = String::new();
    for piece in line.split_inclusive(' ') {
        let word = piece.trim_end_matches(' ');
        let is_token = word.len() > 1 && word.starts_with([HASHTAG_PREFIX, MENTION_PREFIX]);
        if is_token {
            if !plain.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut plain), base));
            }
            spans.push(Span::styled(word.to_string(), token_style));
            plain.push_str(&piece[word.len()..]);
        } else {
            plain.push_str(piece);
        }
    }
    if !plain.is_empty() {
        spans.push(Span::styled(plain, base));
    }
    spans
}

/// Fixed-width status column: tweeted, truthed, custom.
fn markers(row: &MessageRow) -> String {
    format!(
        "{}{}{}  ",
        if row.tweeted { "[T]" } else { "[ ]" },
        if row.truthed { "R" } else { " " },
        if row.origin == Origin::Custom { "*" } else { " " },
    )
}
