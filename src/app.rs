use crate::catalog::Progress;
use crate::model::{Origin, ShareTarget};
use crate::share::Launcher;
use crate::state::AppState;
use crate::store::PreferenceStore;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Messages,
    Tags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    AddMessage,
    AddHashtag,
    AddMentionHandle,
    AddMentionGroup { handle: String },
    ConfirmClearHistory,
    ConfirmClearPreferences,
}

impl Mode {
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            Mode::Normal => None,
            Mode::AddMessage => Some("New message"),
            Mode::AddHashtag => Some("New hashtag"),
            Mode::AddMentionHandle => Some("New mention"),
            Mode::AddMentionGroup { .. } => Some("Mention group"),
            Mode::ConfirmClearHistory => Some("Clear posting history? (y/n)"),
            Mode::ConfirmClearPreferences => Some("Clear hashtags, mentions and selection? (y/n)"),
        }
    }

    fn takes_text(&self) -> bool {
        matches!(
            self,
            Mode::AddMessage
                | Mode::AddHashtag
                | Mode::AddMentionHandle
                | Mode::AddMentionGroup { .. }
        )
    }
}

/// One row of the tag panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRow {
    Header(String),
    Token { token: String, origin: Origin },
}

/// One row of the message list, owned so it can outlive a state borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub id: String,
    pub text: String,
    pub origin: Origin,
    pub tweeted: bool,
    pub truthed: bool,
}

pub struct App<S: PreferenceStore, L: Launcher> {
    state: AppState<S>,
    launcher: L,
    category_index: usize,
    message_index: usize,
    tag_index: usize,
    focus: Focus,
    mode: Mode,
    input: String,
    status: Option<String>,
    should_quit: bool,
}

impl<S: PreferenceStore, L: Launcher> App<S, L> {
    pub fn new(state: AppState<S>, launcher: L) -> Self {
        let mut app = Self {
            state,
            launcher,
            category_index: 0,
            message_index: 0,
            tag_index: 0,
            focus: Focus::Messages,
            mode: Mode::Normal,
            input: String::new(),
            status: None,
            should_quit: false,
        };
        app.tag_index = app.first_token_row().unwrap_or(0);
        app
    }

    pub fn state(&self) -> &AppState<S> {
        &self.state
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn category_index(&self) -> usize {
        self.category_index
    }

    pub fn message_index(&self) -> usize {
        self.message_index
    }

    pub fn tag_index(&self) -> usize {
        self.tag_index
    }

    pub fn current_category(&self) -> &str {
        &self.state.catalog().categories()[self.category_index]
    }

    pub fn category_progress(&self) -> Vec<(String, Progress)> {
        self.state
            .catalog()
            .categories()
            .iter()
            .map(|c| (c.clone(), self.state.progress(c)))
            .collect()
    }

    pub fn message_rows(&self) -> Vec<MessageRow> {
        let category = self.current_category();
        self.state
            .entries(category)
            .into_iter()
            .map(|entry| MessageRow {
                id: entry.message.id.clone(),
                text: entry.message.text.clone(),
                origin: entry.origin,
                tweeted: self.state.is_done(ShareTarget::Tweet, category, &entry.message.id),
                truthed: self.state.is_done(ShareTarget::Truth, category, &entry.message.id),
            })
            .collect()
    }

    pub fn tag_rows(&self) -> Vec<TagRow> {
        let mut rows = vec![TagRow::Header("Hashtags".to_string())];
        rows.extend(self.state.hashtag_items().into_iter().map(|item| TagRow::Token {
            token: item.token,
            origin: item.origin,
        }));
        for view in self.state.mention_views() {
            rows.push(TagRow::Header(view.label));
            rows.extend(view.items.into_iter().map(|item| TagRow::Token {
                token: item.token,
                origin: item.origin,
            }));
        }
        rows
    }

    fn first_token_row(&self) -> Option<usize> {
        self.tag_rows()
            .iter()
            .position(|r| matches!(r, TagRow::Token { .. }))
    }

    fn selected_message(&self) -> Option<MessageRow> {
        self.message_rows().into_iter().nth(self.message_index)
    }

    fn selected_tag(&self) -> Option<(String, Origin)> {
        match self.tag_rows().into_iter().nth(self.tag_index)? {
            TagRow::Token { token, origin } => Some((token, origin)),
            TagRow::Header(_) => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.mode.takes_text() {
            self.handle_input_key(key);
            return;
        }
        match self.mode {
            Mode::ConfirmClearHistory | Mode::ConfirmClearPreferences => {
                self.handle_confirm_key(key);
                return;
            }
            _ => {}
        }

        self.status = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Messages => Focus::Tags,
                    Focus::Tags => Focus::Messages,
                }
            }
            KeyCode::Left | KeyCode::Char('h') => self.previous_category(),
            KeyCode::Right | KeyCode::Char('l') => self.next_category(),
            KeyCode::Up | KeyCode::Char('k') => self.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Char('c') => self.mode = Mode::ConfirmClearHistory,
            KeyCode::Char('C') => self.mode = Mode::ConfirmClearPreferences,
            _ => match self.focus {
                Focus::Messages => self.handle_message_key(key.code),
                Focus::Tags => self.handle_tag_key(key.code),
            },
        }
    }

    fn handle_message_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('t') | KeyCode::Enter => self.dispatch(ShareTarget::Tweet),
            KeyCode::Char('r') => self.dispatch(ShareTarget::Truth),
            KeyCode::Char('n') => self.begin_input(Mode::AddMessage),
            KeyCode::Char('d') => self.remove_selected_message(),
            _ => {}
        }
    }

    fn handle_tag_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some((token, _)) = self.selected_tag() {
                    let selected = self.state.toggle(&token);
                    self.status = Some(format!(
                        "{} {}",
                        token,
                        if selected { "selected" } else { "deselected" }
                    ));
                }
            }
            KeyCode::Char('a') => self.begin_input(Mode::AddHashtag),
            KeyCode::Char('m') => self.begin_input(Mode::AddMentionHandle),
            KeyCode::Char('d') => self.remove_selected_tag(),
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.close_input(),
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            match self.mode {
                Mode::ConfirmClearHistory => {
                    self.state.clear_history();
                    self.status = Some("History cleared".to_string());
                }
                Mode::ConfirmClearPreferences => {
                    self.state.clear_preferences();
                    self.status = Some("Preferences cleared".to_string());
                    self.clamp_tag_index();
                }
                _ => {}
            }
        }
        self.mode = Mode::Normal;
    }

    fn begin_input(&mut self, mode: Mode) {
        self.mode = mode;
        self.input.clear();
    }

    fn close_input(&mut self) {
        self.mode = Mode::Normal;
        self.input.clear();
    }

    fn submit_input(&mut self) {
        let input = std::mem::take(&mut self.input);
        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let category = self.current_category().to_string();

        let outcome = match mode {
            Mode::AddMessage => self
                .state
                .add_custom_message(&category, &input)
                .map(|_| "Message added".to_string()),
            Mode::AddHashtag => self
                .state
                .add_custom_hashtag(&input)
                .map(|tag| format!("Added {tag}")),
            Mode::AddMentionHandle => {
                // The group is asked for next; nothing is stored yet.
                self.mode = Mode::AddMentionGroup { handle: input };
                return;
            }
            Mode::AddMentionGroup { handle } => self
                .state
                .add_custom_mention(&handle, &input)
                .map(|mention| format!("Added {mention}")),
            _ => return,
        };
        self.status = Some(match outcome {
            Ok(message) => message,
            Err(e) => e.to_string(),
        });
    }

    fn dispatch(&mut self, target: ShareTarget) {
        let Some(row) = self.selected_message() else {
            return;
        };
        let category = self.current_category().to_string();
        let url = match self.state.dispatch(target, &category, &row.id) {
            Ok(url) => url,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };
        self.status = Some(match self.launcher.launch(&url) {
            Ok(()) => format!("Opened {} share", target.label()),
            Err(e) => {
                tracing::error!(error = %e, "failed to open share url");
                format!("Could not open browser: {e}")
            }
        });
    }

    fn remove_selected_message(&mut self) {
        let Some(row) = self.selected_message() else {
            return;
        };
        let category = self.current_category().to_string();
        self.status = Some(match self.state.remove_message(&category, &row.id) {
            Ok(Origin::BuiltIn) => "Message hidden".to_string(),
            Ok(Origin::Custom) => "Message deleted".to_string(),
            Err(e) => e.to_string(),
        });
        self.clamp_message_index();
    }

    fn remove_selected_tag(&mut self) {
        let Some((token, origin)) = self.selected_tag() else {
            return;
        };
        if origin == Origin::BuiltIn {
            self.status = Some(format!("{token} is built in and cannot be removed"));
            return;
        }
        let removed = if token.starts_with('#') {
            self.state.remove_custom_hashtag(&token)
        } else {
            self.state.remove_custom_mention(&token)
        };
        if removed {
            self.status = Some(format!("Removed {token}"));
        }
        self.clamp_tag_index();
    }

    fn next_category(&mut self) {
        let count = self.state.catalog().categories().len();
        self.category_index = (self.category_index + 1) % count;
        self.message_index = 0;
    }

    fn previous_category(&mut self) {
        let count = self.state.catalog().categories().len();
        self.category_index = (self.category_index + count - 1) % count;
        self.message_index = 0;
    }

    fn move_up(&mut self) {
        match self.focus {
            Focus::Messages => self.message_index = self.message_index.saturating_sub(1),
            Focus::Tags => {
                let rows = self.tag_rows();
                if let Some(idx) = rows[..self.tag_index.min(rows.len())]
                    .iter()
                    .rposition(|r| matches!(r, TagRow::Token { .. }))
                {
                    self.tag_index = idx;
                }
            }
        }
    }

    fn move_down(&mut self) {
        match self.focus {
            Focus::Messages => {
                let len = self.message_rows().len();
                if self.message_index + 1 < len {
                    self.message_index += 1;
                }
            }
            Focus::Tags => {
                let rows = self.tag_rows();
                if let Some(offset) = rows
                    .iter()
                    .skip(self.tag_index + 1)
                    .position(|r| matches!(r, TagRow::Token { .. }))
                {
                    self.tag_index += offset + 1;
                }
            }
        }
    }

    fn clamp_message_index(&mut self) {
        let len = self.message_rows().len();
        self.message_index = self.message_index.min(len.saturating_sub(1));
    }

    fn clamp_tag_index(&mut self) {
        let rows = self.tag_rows();
        if matches!(rows.get(self.tag_index), Some(TagRow::Token { .. })) {
            return;
        }
        let before = rows[..self.tag_index.min(rows.len())]
            .iter()
            .rposition(|r| matches!(r, TagRow::Token { .. }));
        self.tag_index = before.or_else(|| self.first_token_row()).unwrap_or(0);
    }
}
