use std::{io, process::Stdio, thread, time::Duration};

use anyhow::{Context, Result};
use contesthub_core::{
    format, CategoryFilter, Collection, Contest, Dashboard, FetchScope, Hackathon, Listing,
    ListingClient, ListingEvent,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::ui::{self, Theme};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Contests,
    Hackathons,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Contests => "Coding Contests",
            Tab::Hackathons => "Hackathons",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Contests => 0,
            Tab::Hackathons => 1,
        }
    }

    fn toggled(self) -> Self {
        match self {
            Tab::Contests => Tab::Hackathons,
            Tab::Hackathons => Tab::Contests,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
}

/// Side effects requested by key handling, executed by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Open(String),
    Quit,
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal dashboard over the contest and hackathon collections.
pub struct ContestHubApp {
    state: UiState,
    scope: FetchScope,
    listing_rx: Option<mpsc::Receiver<ListingEvent>>,
    theme: Theme,
}

impl ContestHubApp {
    pub fn new(client: ListingClient) -> Self {
        let (listing_tx, listing_rx) = mpsc::channel(8);
        let platforms = client.config().platforms.clone();
        Self {
            state: UiState::new(platforms),
            scope: FetchScope::new(client, listing_tx),
            listing_rx: Some(listing_rx),
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.scope.spawn_all(&mut self.state.dashboard);
        self.state.set_status("Loading contests and hackathons".to_string());

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let mut listing_rx = self.listing_rx.take();
        let result = self
            .event_loop(&mut terminal, &mut event_rx, &mut listing_rx)
            .await;

        self.scope.cancel();
        restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        event_rx: &mut mpsc::Receiver<AppEvent>,
        listing_rx: &mut Option<mpsc::Receiver<ListingEvent>>,
    ) -> Result<()> {
        loop {
            terminal.draw(|frame| ui::draw(frame, &mut self.state, &self.theme))?;
            if self.state.should_quit {
                break;
            }

            let command = if let Some(rx) = listing_rx.as_mut() {
                let mut listing_closed = false;
                let command = tokio::select! {
                    maybe_event = event_rx.recv() => match maybe_event {
                        Some(event) => self.process_app_event(event),
                        None => Some(Command::Quit),
                    },
                    maybe_listing = rx.recv() => {
                        match maybe_listing {
                            Some(event) => self.state.apply_listing_event(event),
                            None => listing_closed = true,
                        }
                        None
                    }
                };
                if listing_closed {
                    *listing_rx = None;
                }
                command
            } else {
                match event_rx.recv().await {
                    Some(event) => self.process_app_event(event),
                    None => Some(Command::Quit),
                }
            };

            if let Some(command) = command {
                self.execute(command);
            }
            if self.state.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn process_app_event(&mut self, event: AppEvent) -> Option<Command> {
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                self.state.handle_key(key)
            }
            AppEvent::Input(_) => None,
            AppEvent::Tick => {
                self.state.tick = self.state.tick.wrapping_add(1);
                None
            }
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Quit => self.state.should_quit = true,
            Command::Refresh => {
                info!("Manual refresh requested");
                self.scope.spawn_all(&mut self.state.dashboard);
                self.state.set_status("Refreshing…".to_string());
            }
            Command::Open(url) => match open_url(&url) {
                Ok(()) => self.state.set_status(format!("Opened {url}")),
                Err(err) => {
                    error!(?err, %url, "Failed to open link");
                    self.state.set_status(format!("Failed to open link: {err}"));
                }
            },
        }
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

/// Hand a link to the desktop's default opener.
fn open_url(url: &str) -> Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = std::process::Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        std::process::Command::new("xdg-open")
    };

    command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to launch opener for {url}"))?;
    Ok(())
}

/// Everything the view reads: the dashboard plus navigation state.
pub struct UiState {
    pub dashboard: Dashboard,
    pub tab: Tab,
    pub mode: Mode,
    pub platforms: Vec<String>,
    pub cursors: [usize; 2],
    pub offset: usize,
    pub list_height: usize,
    pub status: String,
    pub tick: usize,
    pub should_quit: bool,
}

impl UiState {
    pub fn new(platforms: Vec<String>) -> Self {
        Self {
            dashboard: Dashboard::new(),
            tab: Tab::Contests,
            mode: Mode::Browse,
            platforms,
            cursors: [0, 0],
            offset: 0,
            list_height: 1,
            status: "Ready".to_string(),
            tick: 0,
            should_quit: false,
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status = message;
    }

    pub fn cursor(&self) -> usize {
        self.cursors[self.tab.index()]
    }

    fn set_cursor(&mut self, value: usize) {
        self.cursors[self.tab.index()] = value;
    }

    /// Number of entries in the active tab's filtered view.
    pub fn visible_len(&self) -> usize {
        match self.tab {
            Tab::Contests => self.dashboard.visible_contests().items().len(),
            Tab::Hackathons => self.dashboard.visible_hackathons().items().len(),
        }
    }

    pub fn selected_contest(&self) -> Option<&Contest> {
        self.dashboard
            .visible_contests()
            .items()
            .get(self.cursors[Tab::Contests.index()])
            .copied()
    }

    pub fn selected_hackathon(&self) -> Option<&Hackathon> {
        self.dashboard
            .visible_hackathons()
            .items()
            .get(self.cursors[Tab::Hackathons.index()])
            .copied()
    }

    pub fn apply_listing_event(&mut self, event: ListingEvent) {
        let collection = match &event {
            ListingEvent::Contests { .. } => Collection::Contests,
            ListingEvent::Hackathons { .. } => Collection::Hackathons,
        };
        if !self.dashboard.apply(event) {
            return;
        }
        self.clamp_cursor();

        let failed = [
            self.dashboard.contests().error(),
            self.dashboard.hackathons().error(),
        ]
        .iter()
        .flatten()
        .count();
        if self.dashboard.is_loading() {
            self.set_status(format!("Received {collection}, still loading…"));
        } else if failed > 0 {
            warn!(failed, "Finished loading with errors");
            self.set_status("Some listings failed to load. Press r to retry".to_string());
        } else {
            let message = format!(
                "Loaded {} contests • {} hackathons",
                self.dashboard.contests().items().len(),
                self.dashboard.hackathons().items().len()
            );
            info!("{message}");
            self.set_status(message);
        }
    }

    /// Interpret a key press, returning any side effect for the event loop.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }
        match self.mode {
            Mode::Search => {
                self.handle_search_key(key);
                None
            }
            Mode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.dashboard.query_mut().clear();
                self.reset_cursor();
                self.set_status("Search cleared".to_string());
            }
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                let query = self.dashboard.query().as_str().to_string();
                self.set_status(format!("Search applied: {query}"));
            }
            KeyCode::Backspace => {
                self.dashboard.query_mut().pop();
                self.reset_cursor();
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.dashboard.query_mut().push(c);
                    self.reset_cursor();
                }
            }
            _ => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(Command::Quit),
            KeyCode::Tab | KeyCode::BackTab => self.switch_tab(self.tab.toggled()),
            KeyCode::Char('1') => self.switch_tab(Tab::Contests),
            KeyCode::Char('2') => self.switch_tab(Tab::Hackathons),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => self.move_to(0),
            KeyCode::Char('G') | KeyCode::End => self.move_to(usize::MAX),
            KeyCode::PageDown => self.move_cursor(self.list_height.max(1) as isize),
            KeyCode::PageUp => self.move_cursor(-(self.list_height.max(1) as isize)),
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                self.set_status("Type to search, Enter to keep, Esc to clear".to_string());
            }
            KeyCode::Char('f') => self.cycle_category(),
            KeyCode::Char('a') => {
                self.dashboard.set_category(CategoryFilter::All);
                self.reset_cursor();
                self.set_status("Showing all platforms".to_string());
            }
            KeyCode::Char('r') => return Some(Command::Refresh),
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Enter => match self.tab {
                Tab::Hackathons => self.toggle_selected(),
                Tab::Contests => return self.open_selected(),
            },
            KeyCode::Char('o') => return self.open_selected(),
            _ => {}
        }
        None
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.offset = 0;
            self.clamp_cursor();
        }
    }

    fn cycle_category(&mut self) {
        if self.tab != Tab::Contests {
            self.set_status("Platform filter applies to contests".to_string());
            return;
        }
        let next = self.dashboard.category().cycle(&self.platforms);
        self.set_status(format!("Platform: {}", format::platform_label(next.token())));
        self.dashboard.set_category(next);
        self.reset_cursor();
    }

    fn toggle_selected(&mut self) {
        if self.tab != Tab::Hackathons {
            return;
        }
        let Some(key) = self
            .selected_hackathon()
            .and_then(|hackathon| hackathon.key())
            .map(str::to_string)
        else {
            return;
        };
        self.dashboard.toggle_expansion(&key);
    }

    fn open_selected(&mut self) -> Option<Command> {
        let link = match self.tab {
            Tab::Contests => self.selected_contest().and_then(|c| c.link()),
            Tab::Hackathons => self.selected_hackathon().and_then(|h| h.link()),
        }
        .map(str::to_string);

        if link.is_none() {
            self.set_status("No link available".to_string());
        }
        link.map(Command::Open)
    }

    fn reset_cursor(&mut self) {
        self.set_cursor(0);
        self.offset = 0;
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let idx = (self.cursor() as isize + delta).clamp(0, len as isize - 1);
        self.set_cursor(idx as usize);
        self.ensure_cursor_visible();
    }

    fn move_to(&mut self, index: usize) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        self.set_cursor(index.min(len - 1));
        self.ensure_cursor_visible();
    }

    /// Keep the cursor inside the filtered view after data or filters change.
    pub fn clamp_cursor(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.set_cursor(0);
            self.offset = 0;
        } else if self.cursor() >= len {
            self.set_cursor(len - 1);
        }
        self.ensure_cursor_visible();
    }

    fn ensure_cursor_visible(&mut self) {
        let len = self.visible_len();
        if len == 0 || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let cursor = self.cursor();
        if cursor < self.offset {
            self.offset = cursor;
        } else if cursor >= self.offset + height {
            self.offset = cursor + 1 - height;
        }
        self.offset = self.offset.min(len.saturating_sub(height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contesthub_core::{fetch::FetchError, listing::LoadTicket, Collection, DisplayState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn contest(name: &str, platform: &str, url: &str) -> Contest {
        Contest {
            name: Some(name.into()),
            platform: Some(platform.into()),
            start_time: Some("2024-01-01T10:00:00Z".into()),
            duration: Some("1h 30m".into()),
            url: Some(url.into()),
        }
    }

    fn hackathon(id: &str, title: &str) -> Hackathon {
        Hackathon {
            id: Some(id.into()),
            title: Some(title.into()),
            url: Some(format!("https://devpost/{id}")),
            ..Hackathon::default()
        }
    }

    fn loaded_state() -> UiState {
        let mut state = UiState::new(vec![
            "leetcode".into(),
            "codeforces".into(),
            "codechef".into(),
        ]);
        state.list_height = 10;
        let contests = state.dashboard.begin_load(Collection::Contests);
        let hackathons = state.dashboard.begin_load(Collection::Hackathons);
        state.apply_listing_event(ListingEvent::Contests {
            ticket: contests,
            result: Ok(vec![
                contest("Weekly 300", "LeetCode", "https://lc/300"),
                contest("Round 918 (Div. 2)", "codeforces", "https://cf/918"),
                contest("Starters 115", "codechef", "https://cc/115"),
            ]),
        });
        state.apply_listing_event(ListingEvent::Hackathons {
            ticket: hackathons,
            result: Ok(vec![hackathon("11", "AI Jam"), hackathon("12", "Web Sprint")]),
        });
        state
    }

    #[test]
    fn status_reports_totals_once_settled() {
        let state = loaded_state();
        assert_eq!(state.status, "Loaded 3 contests • 2 hackathons");
    }

    #[test]
    fn failure_in_one_collection_is_reported() {
        let mut state = UiState::new(Vec::new());
        let contests = state.dashboard.begin_load(Collection::Contests);
        let hackathons = state.dashboard.begin_load(Collection::Hackathons);
        state.apply_listing_event(ListingEvent::Contests {
            ticket: contests,
            result: Err(FetchError::Status {
                collection: Collection::Contests,
                status: 500,
                reason: "Internal Server Error".into(),
            }),
        });
        assert!(state.status.contains("still loading"));
        state.apply_listing_event(ListingEvent::Hackathons {
            ticket: hackathons,
            result: Ok(vec![hackathon("1", "Solo")]),
        });
        assert!(state.status.contains("Press r to retry"));
        assert_eq!(state.dashboard.visible_hackathons().items().len(), 1);
    }

    #[test]
    fn cycling_platform_filters_contests() {
        let mut state = loaded_state();
        state.handle_key(key(KeyCode::Char('f')));
        assert_eq!(state.dashboard.category().token(), "leetcode");
        assert_eq!(state.visible_len(), 1);
        assert_eq!(state.status, "Platform: LeetCode");

        state.handle_key(key(KeyCode::Char('f')));
        assert_eq!(state.selected_contest().unwrap().display_name(), "Round 918 (Div. 2)");

        state.handle_key(key(KeyCode::Char('a')));
        assert_eq!(state.visible_len(), 3);
    }

    #[test]
    fn search_mode_edits_query_live() {
        let mut state = loaded_state();
        state.handle_key(key(KeyCode::Char('/')));
        assert_eq!(state.mode, Mode::Search);
        for ch in "WEEK".chars() {
            state.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::SHIFT));
        }
        assert_eq!(state.visible_len(), 1);

        // `q` is text while searching.
        assert_eq!(state.handle_key(key(KeyCode::Char('q'))), None);
        assert_eq!(state.visible_len(), 0);
        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.visible_len(), 1);

        state.handle_key(key(KeyCode::Esc));
        assert_eq!(state.mode, Mode::Browse);
        assert!(state.dashboard.query().is_empty());
        assert_eq!(state.visible_len(), 3);
    }

    #[test]
    fn search_applies_across_tabs() {
        let mut state = loaded_state();
        state.handle_key(key(KeyCode::Char('/')));
        for ch in "sprint".chars() {
            state.handle_key(key(KeyCode::Char(ch)));
        }
        state.handle_key(key(KeyCode::Enter));
        state.handle_key(key(KeyCode::Char('2')));
        assert_eq!(state.tab, Tab::Hackathons);
        assert_eq!(
            state.selected_hackathon().unwrap().display_title(),
            "Web Sprint"
        );
    }

    #[test]
    fn navigation_clamps_to_view() {
        let mut state = loaded_state();
        state.handle_key(key(KeyCode::Char('k')));
        assert_eq!(state.cursor(), 0);
        state.handle_key(key(KeyCode::Char('G')));
        assert_eq!(state.cursor(), 2);
        state.handle_key(key(KeyCode::Down));
        assert_eq!(state.cursor(), 2);
        state.handle_key(key(KeyCode::Home));
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn cursor_follows_shrinking_view() {
        let mut state = loaded_state();
        state.list_height = 1;
        state.handle_key(key(KeyCode::End));
        assert_eq!(state.offset, 2);

        state.dashboard.set_category(CategoryFilter::parse("leetcode"));
        state.clamp_cursor();
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.offset, 0);
    }

    #[test]
    fn space_toggles_selected_hackathon_only() {
        let mut state = loaded_state();
        state.handle_key(key(KeyCode::Tab));
        state.handle_key(key(KeyCode::Char(' ')));
        assert!(state.dashboard.is_expanded("11"));
        assert!(!state.dashboard.is_expanded("12"));

        state.handle_key(key(KeyCode::Down));
        state.handle_key(key(KeyCode::Enter));
        assert!(state.dashboard.is_expanded("12"));
        assert!(state.dashboard.is_expanded("11"));

        state.handle_key(key(KeyCode::Char(' ')));
        assert!(!state.dashboard.is_expanded("12"));
    }

    #[test]
    fn open_and_refresh_commands() {
        let mut state = loaded_state();
        assert_eq!(
            state.handle_key(key(KeyCode::Enter)),
            Some(Command::Open("https://lc/300".into()))
        );
        assert_eq!(state.handle_key(key(KeyCode::Char('r'))), Some(Command::Refresh));

        state.handle_key(key(KeyCode::Char('2')));
        assert_eq!(
            state.handle_key(key(KeyCode::Char('o'))),
            Some(Command::Open("https://devpost/11".into()))
        );
        assert_eq!(state.handle_key(key(KeyCode::Char('q'))), Some(Command::Quit));
    }

    #[test]
    fn open_without_link_sets_status() {
        let mut state = UiState::new(Vec::new());
        let ticket = state.dashboard.begin_load(Collection::Contests);
        state.apply_listing_event(ListingEvent::Contests {
            ticket,
            result: Ok(vec![Contest::default()]),
        });
        assert_eq!(state.handle_key(key(KeyCode::Char('o'))), None);
        assert_eq!(state.status, "No link available");
    }

    #[test]
    fn stale_events_leave_state_untouched() {
        let mut state = loaded_state();
        let stale: LoadTicket = state.dashboard.begin_load(Collection::Contests);
        let _current = state.dashboard.begin_load(Collection::Contests);
        let before = state.status.clone();
        state.apply_listing_event(ListingEvent::Contests {
            ticket: stale,
            result: Ok(Vec::new()),
        });
        assert_eq!(state.status, before);
        assert!(state.dashboard.contests().is_loading());
        assert_eq!(state.dashboard.visible_contests(), DisplayState::Loading);
    }
}
