use crate::catalog::Progress;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Tabs},
};

pub fn render(frame: &mut Frame, area: Rect, categories: &[(String, Progress)], selected: usize) {
    let titles: Vec<Line> = categories
        .iter()
        .map(|(name, progress)| Line::from(tab_title(name, *progress)))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray))
                .title("Categories"),
        )
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn tab_title(name: &str, progress: Progress) -> String {
    format!("{} ({}/{})", name, progress.done, progress.total)
}
