use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::AuthStatus;
use crate::terminal::state::{AppState, FilterField, Services};

/// Applies one terminal event. Returns `true` when the viewer should exit.
pub fn handle_event(event: Event, state: &mut AppState, services: &Services) -> Result<bool> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(key, state, services),
        Event::Paste(text) => {
            handle_paste(&text, state);
            Ok(false)
        }
        _ => Ok(false),
    }
}

pub fn handle_key(key: KeyEvent, state: &mut AppState, services: &Services) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(true);
    }
    match state.session.status {
        AuthStatus::NotAuthenticated => Ok(handle_signed_out_keys(key, state, services)),
        AuthStatus::Authenticating => Ok(handle_token_keys(key, state, services)),
        AuthStatus::Authenticated => {
            if state.editing.is_some() {
                handle_edit_keys(key, state);
                Ok(false)
            } else {
                Ok(handle_mailbox_keys(key, state, services))
            }
        }
    }
}

fn handle_paste(text: &str, state: &mut AppState) {
    let text = text.trim();
    match state.session.status {
        AuthStatus::Authenticating => state.token_input.push_str(text),
        AuthStatus::Authenticated if state.editing.is_some() => state.edit_buffer.push_str(text),
        _ => {}
    }
}

fn handle_signed_out_keys(key: KeyEvent, state: &mut AppState, services: &Services) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('c') => state.connect(services),
        _ => {}
    }
    false
}

fn handle_token_keys(key: KeyEvent, state: &mut AppState, services: &Services) -> bool {
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Enter => state.submit_token(services),
        KeyCode::Backspace => {
            state.token_input.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.token_input.clear();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.token_input.push(c);
        }
        _ => {}
    }
    false
}

fn handle_edit_keys(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Enter => state.commit_edit(),
        KeyCode::Esc => state.cancel_edit(),
        KeyCode::Backspace => {
            state.edit_buffer.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.edit_buffer.push(c);
        }
        _ => {}
    }
}

fn handle_mailbox_keys(key: KeyEvent, state: &mut AppState, services: &Services) -> bool {
    let reading = state.session.selected.is_some();
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc => {
            if reading {
                state.close_email();
            } else {
                return true;
            }
        }
        KeyCode::Enter => state.open_highlighted(services),
        KeyCode::Tab => {
            state.tab = state.tab.next();
            state.body_scroll = 0;
        }
        KeyCode::Char('r') => state.fetch(services),
        KeyCode::Char('o') => state.logout(),
        KeyCode::Char('/') => state.start_editing(FilterField::Query),
        KeyCode::Char('l') => state.start_editing(FilterField::Labels),
        KeyCode::Char('+') | KeyCode::Char('=') => state.filter.adjust_max_results(1),
        KeyCode::Char('-') => state.filter.adjust_max_results(-1),
        KeyCode::Char('s') => state.filter.include_spam_trash = !state.filter.include_spam_trash,
        KeyCode::Down | KeyCode::Char('j') => {
            if reading {
                state.scroll_body(1);
            } else {
                state.move_selection(1);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if reading {
                state.scroll_body(-1);
            } else {
                state.move_selection(-1);
            }
        }
        KeyCode::PageDown => state.scroll_body(10),
        KeyCode::PageUp => state.scroll_body(-10),
        KeyCode::Home => {
            if !state.session.emails.is_empty() {
                state.list_state.select(Some(0));
            }
        }
        KeyCode::End => {
            if !state.session.emails.is_empty() {
                state.list_state.select(Some(state.session.emails.len() - 1));
            }
        }
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Notice;
    use crate::session::testing::{FakeBrowser, FakeEmailApi, auth_url, details, summary};

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(text: &str, state: &mut AppState, services: &Services) {
        for c in text.chars() {
            handle_event(press(KeyCode::Char(c)), state, services).unwrap();
        }
    }

    #[test]
    fn full_walkthrough_from_connect_to_logout() {
        let mut api = FakeEmailApi {
            accepted_token: Some("abc123".into()),
            emails: vec![summary("m1"), summary("m2")],
            ..Default::default()
        };
        api.details.insert("m2".into(), details("m2", "Invoice"));
        let browser = FakeBrowser::new(true);
        let services = Services {
            api: &api,
            browser: &browser,
        };
        let mut state = AppState::new(auth_url());

        handle_event(press(KeyCode::Char('c')), &mut state, &services).unwrap();
        assert_eq!(state.session.status, AuthStatus::Authenticating);

        // 'q' is part of a token here, not quit
        type_text("abq", &mut state, &services);
        handle_event(press(KeyCode::Backspace), &mut state, &services).unwrap();
        handle_event(Event::Paste("c123\n".into()), &mut state, &services).unwrap();
        handle_event(press(KeyCode::Enter), &mut state, &services).unwrap();

        assert_eq!(state.session.status, AuthStatus::Authenticated);
        assert_eq!(state.session.access_token(), Some("abc123"));
        assert!(state.token_input.is_empty());
        assert_eq!(state.session.emails.len(), 2);
        assert_eq!(state.notice, Some(Notice::Success("Found 2 emails".into())));

        handle_event(press(KeyCode::Char('j')), &mut state, &services).unwrap();
        handle_event(press(KeyCode::Enter), &mut state, &services).unwrap();
        assert_eq!(state.session.selected.as_deref(), Some("m2"));
        assert_eq!(
            state.session.selected_details().and_then(|d| d.subject.as_deref()),
            Some("Invoice")
        );

        let quit = handle_event(press(KeyCode::Esc), &mut state, &services).unwrap();
        assert!(!quit);
        assert!(state.session.selected.is_none());

        handle_event(press(KeyCode::Char('o')), &mut state, &services).unwrap();
        assert_eq!(state.session.status, AuthStatus::NotAuthenticated);
        assert_eq!(state.session.cache_len(), 0);
    }

    #[test]
    fn failed_token_keeps_input_for_correction() {
        let api = FakeEmailApi::default();
        let browser = FakeBrowser::new(true);
        let services = Services {
            api: &api,
            browser: &browser,
        };
        let mut state = AppState::new(auth_url());
        state.connect(&services);

        type_text("bad", &mut state, &services);
        handle_event(press(KeyCode::Enter), &mut state, &services).unwrap();

        assert_eq!(state.session.status, AuthStatus::Authenticating);
        assert_eq!(state.token_input, "bad");
        assert!(state.notice.as_ref().is_some_and(|n| n.is_error()));
        assert!(api.list_calls.borrow().is_empty());
    }

    #[test]
    fn filter_edits_reach_the_next_fetch() {
        let api = FakeEmailApi {
            accepted_token: Some("t".into()),
            ..Default::default()
        };
        let browser = FakeBrowser::new(true);
        let services = Services {
            api: &api,
            browser: &browser,
        };
        let mut state = AppState::new(auth_url());
        state.connect(&services);
        type_text("t", &mut state, &services);
        handle_event(press(KeyCode::Enter), &mut state, &services).unwrap();

        handle_event(press(KeyCode::Char('/')), &mut state, &services).unwrap();
        type_text("from:bob", &mut state, &services);
        handle_event(press(KeyCode::Enter), &mut state, &services).unwrap();
        handle_event(press(KeyCode::Char('s')), &mut state, &services).unwrap();
        handle_event(press(KeyCode::Char('+')), &mut state, &services).unwrap();
        handle_event(press(KeyCode::Char('r')), &mut state, &services).unwrap();

        let calls = api.list_calls.borrow();
        let (_, last) = calls.last().unwrap();
        assert_eq!(last.query, "from:bob");
        assert!(last.include_spam_trash);
        assert_eq!(last.max_results, 11);
        assert_eq!(
            state.notice.as_ref().map(|n| n.text()),
            Some("No emails found matching your criteria")
        );
    }

    #[test]
    fn quit_keys_per_screen() {
        let api = FakeEmailApi::default();
        let browser = FakeBrowser::new(true);
        let services = Services {
            api: &api,
            browser: &browser,
        };
        let mut state = AppState::new(auth_url());
        assert!(handle_event(press(KeyCode::Char('q')), &mut state, &services).unwrap());

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(handle_event(ctrl_c, &mut state, &services).unwrap());
        assert_eq!(state.session.status, AuthStatus::NotAuthenticated);
    }
}
