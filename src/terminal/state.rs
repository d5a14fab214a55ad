use ratatui::widgets::ListState;
use url::Url;

use crate::auth::BrowserLauncher;
use crate::domain::email::{EmailId, ListFilter};
use crate::mail::EmailApi;
use crate::session::{AuthStatus, Notice, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Html = 0,
    Text = 1,
    Raw = 2,
}

impl DetailTab {
    pub const TITLES: [&'static str; 3] = ["HTML View", "Plain Text", "Raw Data"];

    pub fn next(self) -> Self {
        match self {
            DetailTab::Html => DetailTab::Text,
            DetailTab::Text => DetailTab::Raw,
            DetailTab::Raw => DetailTab::Html,
        }
    }
}

/// Which filter field the keyboard is currently typing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Query,
    Labels,
}

/// Backends the key handlers may call.
pub struct Services<'a> {
    pub api: &'a dyn EmailApi,
    pub browser: &'a dyn BrowserLauncher,
}

pub struct AppState {
    pub session: SessionState,
    pub filter: ListFilter,
    pub auth_url: Url,

    pub list_state: ListState,
    pub tab: DetailTab,
    pub body_scroll: u16,

    pub token_input: String,
    pub editing: Option<FilterField>,
    pub edit_buffer: String,

    pub notice: Option<Notice>,
}

impl AppState {
    pub fn new(auth_url: Url) -> Self {
        Self {
            session: SessionState::new(),
            filter: ListFilter::default(),
            auth_url,
            list_state: ListState::default(),
            tab: DetailTab::default(),
            body_scroll: 0,
            token_input: String::new(),
            editing: None,
            edit_buffer: String::new(),
            notice: None,
        }
    }

    pub fn highlighted_id(&self) -> Option<EmailId> {
        let idx = self.list_state.selected()?;
        self.session.emails.get(idx).map(|e| e.id.clone())
    }

    pub fn move_selection(&mut self, delta: i32) {
        let len = self.session.emails.len() as i32;
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let next = (cur + delta).clamp(0, len - 1) as usize;
        self.list_state.select(Some(next));
        // opening only happens on Enter
    }

    pub fn scroll_body(&mut self, delta: i32) {
        if self.session.selected.is_none() {
            return;
        }
        if delta < 0 {
            self.body_scroll = self.body_scroll.saturating_sub((-delta) as u16);
        } else {
            self.body_scroll = self.body_scroll.saturating_add(delta as u16);
        }
    }

    pub fn connect(&mut self, services: &Services) {
        if let Some(n) = self.session.connect(&self.auth_url, services.browser) {
            self.notice = Some(n);
        }
    }

    /// Submits the typed token; on success the first page is fetched right away.
    pub fn submit_token(&mut self, services: &Services) {
        let notice = self.session.submit_token(&self.token_input, services.api);
        if self.session.status == AuthStatus::Authenticated {
            self.token_input.clear();
            self.fetch(services);
        } else {
            self.notice = Some(notice);
        }
    }

    pub fn fetch(&mut self, services: &Services) {
        let notice = self.session.fetch_emails(&self.filter, services.api);
        if self.session.emails.is_empty() {
            self.list_state.select(None);
        } else {
            let keep = self
                .list_state
                .selected()
                .filter(|i| *i < self.session.emails.len());
            self.list_state.select(keep.or(Some(0)));
        }
        self.notice = Some(notice);
    }

    pub fn open_highlighted(&mut self, services: &Services) {
        let Some(id) = self.highlighted_id() else {
            return;
        };
        self.session.select_email(&id);
        self.body_scroll = 0;
        self.tab = DetailTab::default();
        self.notice = self.session.load_selected_details(services.api);
    }

    pub fn close_email(&mut self) {
        self.session.back_to_list();
        self.body_scroll = 0;
    }

    pub fn start_editing(&mut self, field: FilterField) {
        self.edit_buffer = match field {
            FilterField::Query => self.filter.query.clone(),
            FilterField::Labels => self.filter.label_ids.clone(),
        };
        self.editing = Some(field);
    }

    pub fn commit_edit(&mut self) {
        let Some(field) = self.editing.take() else {
            return;
        };
        let value = std::mem::take(&mut self.edit_buffer);
        match field {
            FilterField::Query => self.filter.query = value,
            FilterField::Labels => self.filter.label_ids = value,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.edit_buffer.clear();
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.list_state.select(None);
        self.tab = DetailTab::default();
        self.body_scroll = 0;
        self.token_input.clear();
        self.cancel_edit();
        self.notice = Some(Notice::Info("Logged out".to_string()));
    }
}
