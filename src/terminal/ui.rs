use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
};

use crate::domain::email::EmailDetails;
use crate::mail::decoders::html_to_text;
use crate::session::{AuthStatus, Notice};
use crate::terminal::state::{AppState, DetailTab, FilterField};

pub fn render(f: &mut Frame, state: &AppState) {
    let [header, main, status, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_header(f, header, state);
    match state.session.status {
        AuthStatus::NotAuthenticated => render_signed_out(f, main),
        AuthStatus::Authenticating => render_token_prompt(f, main, state),
        AuthStatus::Authenticated => render_mailbox(f, main, state),
    }
    render_notice(f, status, state.notice.as_ref());
    render_hints(f, footer, state);
}

fn render_header(f: &mut Frame, area: Rect, state: &AppState) {
    let (label, color) = match state.session.status {
        AuthStatus::Authenticated => ("Logged In", Color::Green),
        AuthStatus::Authenticating => ("Authentication in progress...", Color::Yellow),
        AuthStatus::NotAuthenticated => ("Not Logged In", Color::Red),
    };
    let mut spans = vec![Span::styled(label, Style::default().fg(color))];
    if state.session.status == AuthStatus::Authenticated {
        spans.push(Span::raw(format!(
            "   Emails loaded: {}",
            state.session.emails.len()
        )));
    }
    let p = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" FoundrMate Email Viewer ")
            .borders(Borders::ALL),
    );
    f.render_widget(p, area);
}

fn render_signed_out(f: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from("Please authenticate with your Google account to access your emails."),
        Line::from(""),
        Line::from("1. Press c to Connect with Google"),
        Line::from("2. Authenticate with your Google account in the browser"),
        Line::from("3. Paste the access token when asked"),
        Line::from("4. Use the filters to find specific emails"),
        Line::from("5. Press Enter on any email to view its details"),
        Line::from(""),
        Line::from(Span::styled(
            "Security note",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("- Your access token is kept in memory only"),
        Line::from("- Nothing is written to disk"),
        Line::from("- Always logout when done"),
    ]);
    let p = Paragraph::new(text)
        .block(Block::default().title(" Authentication ").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn render_token_prompt(f: &mut Frame, area: Rect, state: &AppState) {
    let [info, input, _] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let p = Paragraph::new(vec![
        Line::from("Waiting for authentication to complete..."),
        Line::from(format!("Sign-in page: {}", state.auth_url)),
    ])
    .block(Block::default().title(" Authentication ").borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    f.render_widget(p, info);

    let masked = "*".repeat(state.token_input.chars().count());
    let p = Paragraph::new(masked).block(
        Block::default()
            .title(" Access Token ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(p, input);
}

fn render_mailbox(f: &mut Frame, area: Rect, state: &AppState) {
    let [filters, body] = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
    render_filters(f, filters, state);

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).areas(body);

    let reading = state.session.selected.is_some();
    let (list_border, body_border) = if reading {
        (Color::DarkGray, Color::Yellow)
    } else {
        (Color::Yellow, Color::DarkGray)
    };

    let items: Vec<ListItem> = state
        .session
        .emails
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let title = e
                .subject
                .clone()
                .unwrap_or_else(|| format!("Email {}", i + 1));
            let mut lines = vec![Line::from(Span::styled(
                title,
                Style::default().add_modifier(Modifier::BOLD),
            ))];
            if let Some(from) = &e.from {
                lines.push(Line::from(Span::styled(
                    from.clone(),
                    Style::default().fg(Color::Gray),
                )));
            }
            lines.push(Line::from(Span::styled(
                format!(
                    "ID: {}  Thread: {}",
                    e.id,
                    e.thread_id.as_deref().unwrap_or("N/A")
                ),
                Style::default().fg(Color::DarkGray),
            )));
            ListItem::new(Text::from(lines))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Email List ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(list_border)),
        )
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));

    f.render_stateful_widget(list, left, &mut state.list_state.clone());

    let block = Block::default()
        .title(" Email Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(body_border));

    if !reading {
        let hint = if state.session.emails.is_empty() {
            "No emails loaded. Press r to fetch."
        } else {
            "Select an email and press Enter to view its details."
        };
        f.render_widget(Paragraph::new(hint).block(block), right);
        return;
    }

    let Some(details) = state.session.selected_details() else {
        f.render_widget(
            Paragraph::new("No email data available").block(block),
            right,
        );
        return;
    };

    let inner = block.inner(right);
    f.render_widget(block, right);
    let [meta, tabs, content] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    f.render_widget(Paragraph::new(metadata_lines(details)), meta);
    f.render_widget(
        Tabs::new(DetailTab::TITLES)
            .select(state.tab as usize)
            .highlight_style(Style::default().fg(Color::Yellow)),
        tabs,
    );
    let p = Paragraph::new(tab_content(details, state.tab, content.width as usize))
        .wrap(Wrap { trim: false })
        .scroll((state.body_scroll, 0));
    f.render_widget(p, content);
}

fn render_filters(f: &mut Frame, area: Rect, state: &AppState) {
    let field = |name: &str, value: &str, target: FilterField| -> Vec<Span<'static>> {
        let editing = state.editing == Some(target);
        let shown = if editing {
            format!("{}▏", state.edit_buffer)
        } else if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        };
        let style = if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        vec![
            Span::raw(format!("{name}: ")),
            Span::styled(shown, style),
            Span::raw("   "),
        ]
    };

    let mut spans = vec![
        Span::raw(format!("Max: {}   ", state.filter.max_results)),
        Span::raw(format!(
            "Spam/Trash: {}   ",
            if state.filter.include_spam_trash { "yes" } else { "no" }
        )),
    ];
    spans.extend(field("Query", &state.filter.query, FilterField::Query));
    spans.extend(field("Labels", &state.filter.label_ids, FilterField::Labels));

    let p = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Search and Filter Options ")
            .borders(Borders::ALL),
    );
    f.render_widget(p, area);
}

fn metadata_lines(d: &EmailDetails) -> Vec<Line<'static>> {
    let pair = |a: &str, av: &Option<String>, b: &str, bv: &Option<String>| {
        Line::from(vec![
            Span::styled(format!("{a}: "), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{:<40}", av.as_deref().unwrap_or("N/A"))),
            Span::styled(format!("{b}: "), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(bv.as_deref().unwrap_or("N/A").to_string()),
        ])
    };
    vec![
        pair("From", &d.from, "To", &d.to),
        pair("Subject", &d.subject, "CC", &d.cc),
        pair("Date", &d.date, "BCC", &d.bcc),
    ]
}

fn tab_content(d: &EmailDetails, tab: DetailTab, width: usize) -> String {
    match tab {
        DetailTab::Html => match &d.body.html {
            Some(html) => html_to_text(html, width),
            None => "No HTML content available".to_string(),
        },
        DetailTab::Text => d
            .body
            .text
            .clone()
            .unwrap_or_else(|| "No plain text content available".to_string()),
        DetailTab::Raw => {
            serde_json::to_string_pretty(&d.raw).unwrap_or_else(|_| d.raw.to_string())
        }
    }
}

fn render_notice(f: &mut Frame, area: Rect, notice: Option<&Notice>) {
    let Some(notice) = notice else {
        return;
    };
    let color = match notice {
        Notice::Info(_) => Color::Cyan,
        Notice::Success(_) => Color::Green,
        Notice::Warning(_) => Color::Yellow,
        Notice::Error(_) => Color::Red,
    };
    f.render_widget(
        Paragraph::new(notice.text().to_string()).style(Style::default().fg(color)),
        area,
    );
}

fn render_hints(f: &mut Frame, area: Rect, state: &AppState) {
    let keys: Vec<(&str, &str)> = match state.session.status {
        AuthStatus::NotAuthenticated => vec![("c", "connect"), ("q", "quit")],
        AuthStatus::Authenticating => {
            vec![("Enter", "submit token"), ("Ctrl-U", "clear"), ("Esc", "quit")]
        }
        AuthStatus::Authenticated if state.editing.is_some() => {
            vec![("Enter", "apply"), ("Esc", "cancel")]
        }
        AuthStatus::Authenticated => vec![
            ("j/k", "move"),
            ("Enter", "view"),
            ("Esc", "back"),
            ("Tab", "tab"),
            ("r", "fetch"),
            ("/", "query"),
            ("l", "labels"),
            ("+/-", "max"),
            ("s", "spam"),
            ("o", "logout"),
            ("q", "quit"),
        ],
    };
    let mut spans = Vec::new();
    for (key, action) in keys {
        spans.push(Span::styled(key, Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(format!(" {action}  ")));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
