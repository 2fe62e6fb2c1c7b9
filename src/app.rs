use ratatui::layout::Rect;
use ratatui::widgets::{Paragraph, Wrap};
use tracing::{info, warn};
use corpspeak_core::ai::reply_or_fallback;
use corpspeak_core::{CompletionSettings, Config, Conversation, OpenAIClient, ThemeMode};
use crate::theme::Palette;
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub const MISSING_KEY_REPLY: &str =
    "Error: OpenAI API key not configured. Set OPENAI_API_KEY or add \"api_key\" to the config file.";

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub theme: ThemeMode,
    /// Write theme changes back to the config file
    pub persist_theme: bool,

    // Chat state
    pub conversation: Conversation,
    pub query_input: String,
    pub query_cursor: usize, // cursor position in query_input, in chars
    pub query_loading: bool,
    pub query_scroll: u16,
    pub query_chat_height: u16, // Height of chat area for scroll calculations
    pub query_chat_width: u16,  // Width of chat area for wrap calculations
    pub query_task: Option<tokio::task::JoinHandle<anyhow::Result<String>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Chat area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Completion
    pub client: Option<OpenAIClient>,
    pub settings: CompletionSettings,
}

impl App {
    pub fn new(client: Option<OpenAIClient>, settings: CompletionSettings, theme: ThemeMode) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            theme,
            persist_theme: false,

            conversation: Conversation::new(),
            query_input: String::new(),
            query_cursor: 0,
            query_loading: false,
            query_scroll: 0,
            query_chat_height: 0,
            query_chat_width: 0,
            query_task: None,

            animation_frame: 0,

            chat_area: None,

            client,
            settings,
        }
    }

    pub fn palette(&self) -> Palette {
        Palette::for_mode(self.theme)
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        info!(theme = self.theme.as_str(), "theme toggled");
        if self.persist_theme {
            if let Err(e) = Config::save_theme(self.theme) {
                warn!("could not save theme: {:#}", e);
            }
        }
    }

    /// Send the current input. Ignored for blank input or while a request is
    /// still running.
    pub fn submit_query(&mut self) {
        if self.query_input.trim().is_empty() || self.query_task.is_some() {
            return;
        }

        let user_message = std::mem::take(&mut self.query_input);
        self.query_cursor = 0;
        self.conversation.push_user(user_message);

        let Some(client) = self.client.clone() else {
            warn!("no API key configured, skipping request");
            self.conversation.push_assistant(MISSING_KEY_REPLY);
            self.scroll_query_to_bottom();
            return;
        };

        info!(
            model = %self.settings.model,
            messages = self.conversation.len(),
            "submitting message"
        );

        self.query_loading = true;
        // Scroll to bottom so "Thinking..." is visible
        self.scroll_query_to_bottom();

        let settings = self.settings.clone();
        let history = self.conversation.messages().to_vec();
        self.query_task = Some(tokio::spawn(async move {
            client.chat(&settings, &history).await
        }));
    }

    /// Collect the reply of a finished request, if any.
    pub async fn poll_query_task(&mut self) {
        let finished = self
            .query_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        let Some(task) = self.query_task.take() else {
            return;
        };
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(anyhow::anyhow!("request task failed: {}", e)),
        };

        self.conversation.push_assistant(reply_or_fallback(result));
        self.query_loading = false;
        self.animation_frame = 0;
        self.scroll_query_to_bottom();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.query_loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Number of terminal rows the chat needs at the current width
    pub fn chat_row_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.query_chat_width > 0 {
            self.query_chat_width
        } else {
            50
        };

        let lines = ui::chat_lines(
            self.conversation.messages(),
            self.query_loading,
            self.animation_frame,
            &self.palette(),
        );

        // Count rows with the same word wrapping the chat widget renders with
        let rows = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .line_count(wrap_width);
        rows.min(u16::MAX as usize) as u16
    }

    fn max_query_scroll(&self) -> u16 {
        let visible_height = if self.query_chat_height > 0 {
            self.query_chat_height
        } else {
            20
        };
        self.chat_row_count().saturating_sub(visible_height)
    }

    pub fn scroll_query_to_bottom(&mut self) {
        self.query_scroll = self.max_query_scroll();
    }

    pub fn scroll_query_to_top(&mut self) {
        self.query_scroll = 0;
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.query_scroll = self.query_scroll.saturating_add(rows).min(self.max_query_scroll());
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.query_scroll = self.query_scroll.saturating_sub(rows);
    }

    pub fn half_page(&self) -> u16 {
        (self.query_chat_height / 2).max(1)
    }
}
