pub mod events;
pub mod state;
pub mod ui;

use anyhow::{Result, anyhow};
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste};
use log::info;
use ratatui::DefaultTerminal;

use crate::auth::{SystemBrowser, google_auth_url};
use crate::config::Config;
use crate::http::build_client;
use crate::mail::HttpEmailApi;
use crate::terminal::state::{AppState, Services};

/// Runs the interactive viewer until the user quits.
pub fn run_tui(cfg: &Config) -> Result<()> {
    let http = build_client(cfg.request_timeout())?;
    let api = HttpEmailApi::new(cfg.email_base_url()?, http);
    let browser = SystemBrowser;
    let services = Services {
        api: &api,
        browser: &browser,
    };
    let mut state = AppState::new(google_auth_url(&cfg.auth_base_url()?)?);
    info!(
        "Configured backend URLs - Auth: {}, Email: {}",
        cfg.auth_base_url()?,
        cfg.email_base_url()?
    );

    color_eyre::install().map_err(|e| anyhow!("{e}"))?;
    let terminal = ratatui::init();
    // paste support is cosmetic; typing still works without it
    let _ = crossterm::execute!(std::io::stdout(), EnableBracketedPaste);

    info!("Application started");
    let result = run(terminal, &mut state, &services);

    let _ = crossterm::execute!(std::io::stdout(), DisableBracketedPaste);
    ratatui::restore();
    info!("Application closed");
    result
}

fn run(mut terminal: DefaultTerminal, state: &mut AppState, services: &Services) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, state))?;
        let ev = event::read()?;
        if events::handle_event(ev, state, services)? {
            break;
        }
    }
    Ok(())
}
