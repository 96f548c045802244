use crate::app::TagRow;
use crate::model::Origin;
use crate::tokens::TokenSet;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    rows: &[TagRow],
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
        .title(format!("Append ({} selected)", selection.len()));

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| match row {
            TagRow::Header(label) => ListItem::new(Line::from(Span::styled(
                label.clone(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))),
            TagRow::Token { token, origin } => {
                let check = if selection.contains(token) { "[x] " } else { "[ ] " };
                let mut spans = vec![
                    Span::raw(check),
                    Span::styled(token.clone(), Style::default().fg(Color::Cyan)),
                ];
                if *origin == Origin::Custom {
                    spans.push(Span::styled(" *", Style::default().fg(Color::DarkGray)));
                }
                ListItem::new(Line::from(spans))
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if focused {
        state.select(Some(index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
