//! Rendering for the dashboard. Everything here is derived from [`UiState`].

use contesthub_core::{format, CategoryFilter, Contest, DisplayState, Hackathon, Listing};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{Mode, Tab, UiState};

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary_fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub selection_bg: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Indexed(99),
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

impl Theme {
    /// Tag colour for a contest platform.
    pub fn platform_color(&self, platform: &str) -> Color {
        match platform.to_lowercase().as_str() {
            "leetcode" => Color::Yellow,
            "codeforces" => Color::Red,
            "codechef" => Color::Blue,
            _ => Color::Gray,
        }
    }
}

pub fn draw(frame: &mut Frame, state: &mut UiState, theme: &Theme) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(size);

    render_header(frame, chunks[0], theme);
    render_controls(frame, chunks[1], state, theme);
    render_body(frame, chunks[2], state, theme);
    render_status(frame, chunks[3], state, theme);
}

fn render_header(frame: &mut Frame, area: Rect, theme: &Theme) {
    let title = Line::from(vec![
        Span::styled("Dev ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            "Competitions",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" Hub", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            "  coding contests and hackathons in one place",
            Style::default().fg(theme.muted),
        ),
    ]);
    let paragraph = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_controls(frame: &mut Frame, area: Rect, state: &UiState, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
        ])
        .split(area);

    let tabs = Tabs::new(vec![Tab::Contests.title(), Tab::Hackathons.title()])
        .select(state.tab.index())
        .block(Block::default().borders(Borders::ALL).title("View [Tab]"))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    frame.render_widget(tabs, columns[0]);

    let platforms = Paragraph::new(platform_line(state, theme))
        .block(Block::default().borders(Borders::ALL).title("Platform [f/a]"));
    frame.render_widget(platforms, columns[1]);

    let placeholder = match state.tab {
        Tab::Contests => "Search contests...",
        Tab::Hackathons => "Search hackathons...",
    };
    let query = state.dashboard.query().as_str();
    let search_line = if query.is_empty() && state.mode != Mode::Search {
        Line::from(Span::styled(placeholder, Style::default().fg(theme.muted)))
    } else {
        let mut spans = vec![Span::raw(query.to_string())];
        if state.mode == Mode::Search {
            spans.push(Span::styled("▏", Style::default().fg(theme.accent)));
        }
        Line::from(spans)
    };
    let border = if state.mode == Mode::Search {
        Style::default().fg(theme.accent)
    } else {
        Style::default()
    };
    let search = Paragraph::new(search_line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("Search [/]"),
    );
    frame.render_widget(search, columns[2]);
}

fn platform_line(state: &UiState, theme: &Theme) -> Line<'static> {
    if state.tab != Tab::Contests {
        return Line::from(Span::styled(
            "applies to contests",
            Style::default().fg(theme.muted),
        ));
    }

    let active = state.dashboard.category();
    let mut spans = Vec::new();
    let options = std::iter::once(CategoryFilter::All)
        .chain(state.platforms.iter().map(|p| CategoryFilter::parse(p)));
    for option in options {
        if !spans.is_empty() {
            spans.push(Span::styled(" · ", Style::default().fg(theme.muted)));
        }
        let label = match &option {
            CategoryFilter::All => "All".to_string(),
            CategoryFilter::Only(token) => format::platform_label(token),
        };
        let style = if &option == active {
            let color = match &option {
                CategoryFilter::All => theme.accent,
                CategoryFilter::Only(token) => theme.platform_color(token),
            };
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn render_body(frame: &mut Frame, area: Rect, state: &mut UiState, theme: &Theme) {
    state.list_height = area.height.saturating_sub(2) as usize;
    state.clamp_cursor();
    let state = &*state;

    match state.tab {
        Tab::Contests => match state.dashboard.visible_contests() {
            DisplayState::Loading => render_loading(frame, area, "contests", state.tick, theme),
            DisplayState::Error(message) => render_error(frame, area, message, theme),
            DisplayState::Empty => render_empty(
                frame,
                area,
                "No contests found matching your criteria.",
                theme,
            ),
            DisplayState::Populated(items) => {
                let (list_area, detail_area) = split_body(area);
                render_contest_list(frame, list_area, &items, state, theme);
                let selected = items.get(state.cursor()).copied();
                render_contest_details(frame, detail_area, selected, theme);
            }
        },
        Tab::Hackathons => match state.dashboard.visible_hackathons() {
            DisplayState::Loading => {
                render_loading(frame, area, "hackathons", state.tick, theme)
            }
            DisplayState::Error(message) => render_error(frame, area, message, theme),
            DisplayState::Empty => render_empty(
                frame,
                area,
                "No hackathons found matching your criteria.",
                theme,
            ),
            DisplayState::Populated(items) => {
                let (list_area, detail_area) = split_body(area);
                render_hackathon_list(frame, list_area, &items, state, theme);
                let selected = items.get(state.cursor()).copied();
                render_hackathon_details(frame, detail_area, selected, state, theme);
            }
        },
    }
}

fn split_body(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    (chunks[0], chunks[1])
}

fn render_loading(frame: &mut Frame, area: Rect, what: &str, tick: usize, theme: &Theme) {
    let spinner = SPINNER[tick % SPINNER.len()];
    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(spinner, Style::default().fg(theme.accent)),
        Span::raw(format!(" Loading {what}…")),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let lines = vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme.danger),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to retry",
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.danger))
                .title("Error"),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_empty(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let paragraph = Paragraph::new(Span::styled(
        message.to_string(),
        Style::default().fg(theme.muted),
    ))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn list_state(state: &UiState, len: usize) -> ListState {
    let selected = (len > 0).then(|| state.cursor().min(len - 1));
    ListState::default()
        .with_offset(state.offset)
        .with_selected(selected)
}

fn marker(selected: bool, theme: &Theme) -> Span<'static> {
    if selected {
        Span::styled(
            "▶ ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::raw("  ")
    }
}

fn render_contest_list(
    frame: &mut Frame,
    area: Rect,
    contests: &[&Contest],
    state: &UiState,
    theme: &Theme,
) {
    let items: Vec<ListItem> = contests
        .iter()
        .enumerate()
        .map(|(idx, contest)| {
            let platform = contest.platform_tag();
            ListItem::new(Line::from(vec![
                marker(idx == state.cursor(), theme),
                Span::styled(
                    contest.display_name().to_string(),
                    Style::default()
                        .fg(theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(
                    platform.to_string(),
                    Style::default().fg(theme.platform_color(platform)),
                ),
            ]))
        })
        .collect();

    let title = format!("Contests ({})", contests.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(theme.selection_bg));
    let mut list_state = list_state(state, contests.len());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_contest_details(frame: &mut Frame, area: Rect, contest: Option<&Contest>, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL).title("Contest Details");
    let Some(contest) = contest else {
        frame.render_widget(Paragraph::new("Nothing selected").block(block), area);
        return;
    };

    let platform = contest.platform_tag();
    let mut lines = vec![
        Line::from(Span::styled(
            contest.display_name().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            platform.to_string(),
            Style::default()
                .fg(theme.platform_color(platform))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Starts:   {}", contest.start_label())),
        Line::from(format!("Duration: {}", contest.duration_label())),
        Line::from(""),
    ];
    match contest.link() {
        Some(url) => {
            lines.push(Line::from(vec![
                Span::styled("View Contest ", Style::default().fg(theme.accent)),
                Span::raw(url.to_string()),
            ]));
            lines.push(Line::from(Span::styled(
                "Enter/o to open in browser",
                Style::default().fg(theme.muted),
            )));
        }
        None => lines.push(Line::from(Span::styled(
            "No contest link",
            Style::default().fg(theme.muted),
        ))),
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_hackathon_list(
    frame: &mut Frame,
    area: Rect,
    hackathons: &[&Hackathon],
    state: &UiState,
    theme: &Theme,
) {
    let items: Vec<ListItem> = hackathons
        .iter()
        .enumerate()
        .map(|(idx, hackathon)| {
            let expanded = hackathon
                .key()
                .map(|key| state.dashboard.is_expanded(key))
                .unwrap_or(false);
            let mut spans = vec![
                marker(idx == state.cursor(), theme),
                Span::styled(
                    if expanded { "▾ " } else { "▸ " },
                    Style::default().fg(theme.muted),
                ),
                Span::styled(
                    hackathon.display_title().to_string(),
                    Style::default()
                        .fg(theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                ),
            ];
            if hackathon.is_featured() {
                spans.push(Span::styled(
                    "  Featured",
                    Style::default().fg(theme.warning),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!("Hackathons ({})", hackathons.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(theme.selection_bg));
    let mut list_state = list_state(state, hackathons.len());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_hackathon_details(
    frame: &mut Frame,
    area: Rect,
    hackathon: Option<&Hackathon>,
    state: &UiState,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Hackathon Details");
    let Some(hackathon) = hackathon else {
        frame.render_widget(Paragraph::new("Nothing selected").block(block), area);
        return;
    };

    let mut title = vec![Span::styled(
        hackathon.display_title().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if hackathon.is_featured() {
        title.push(Span::styled(
            "  Featured",
            Style::default().fg(theme.warning),
        ));
    }

    let mut lines = vec![
        Line::from(title),
        Line::from(""),
        Line::from(format!("Location: {}", hackathon.location_label())),
        Line::from(format!("Dates:    {}", hackathon.dates_label())),
        Line::from(format!("Deadline: {}", hackathon.deadline_label())),
    ];
    if let Some(participants) = hackathon.participants_label() {
        lines.push(Line::from(format!("Participants: {participants}")));
    }
    if let Some(prize) = hackathon.prize_label() {
        lines.push(Line::from(Span::styled(
            prize,
            Style::default()
                .fg(theme.success)
                .add_modifier(Modifier::BOLD),
        )));
    }
    let themes = hackathon.theme_names();
    if !themes.is_empty() {
        let tags = themes
            .iter()
            .map(|name| format!("#{name}"))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::from(Span::styled(tags, Style::default().fg(theme.accent))));
    }
    if let Some(register) = hackathon.registration_url() {
        lines.push(Line::from(vec![
            Span::styled("Register ", Style::default().fg(theme.accent)),
            Span::raw(register.to_string()),
        ]));
    }

    let expanded = hackathon
        .key()
        .map(|key| state.dashboard.is_expanded(key))
        .unwrap_or(false);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        if expanded {
            "Show less [Space]"
        } else {
            "Show more [Space]"
        },
        Style::default().fg(theme.accent),
    )));

    if expanded {
        lines.push(Line::from(Span::styled(
            "─".repeat(area.width.saturating_sub(2) as usize),
            Style::default().fg(theme.muted),
        )));
        lines.push(Line::from(format!(
            "Organization: {}",
            hackathon.organization_label()
        )));
        lines.push(Line::from(format!("Status: {}", hackathon.status_label())));
        lines.push(Line::from(format!(
            "Invite Only: {}",
            hackathon.invite_only_label()
        )));
        lines.push(Line::from(format!(
            "Prizes: {}",
            hackathon.cash_prizes_label()
        )));
        lines.push(Line::from(format!(
            "Managed by Devpost: {}",
            hackathon.managed_by_devpost_label()
        )));
        lines.push(Line::from(vec![
            Span::styled("Thumbnail: ", Style::default().fg(theme.muted)),
            Span::raw(hackathon.thumbnail_label().to_string()),
        ]));
        if let Some(url) = hackathon.details_url() {
            lines.push(Line::from(vec![
                Span::styled("More Details ", Style::default().fg(theme.accent)),
                Span::raw(url.to_string()),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, area: Rect, state: &UiState, theme: &Theme) {
    let primary = if state.mode == Mode::Search {
        format!("Search: {}", state.dashboard.query().as_str())
    } else {
        state.status.clone()
    };
    let keys = "q quit · Tab switch · / search · f platform · Space details · o open · r retry";
    let paragraph = Paragraph::new(Line::from(vec![
        Span::raw(primary),
        Span::styled(format!("   {keys}"), Style::default().fg(theme.muted)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Status"))
    .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use contesthub_core::{fetch::FetchError, Collection, ListingEvent};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn render(state: &mut UiState) -> String {
        let backend = TestBackend::new(140, 32);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::default();
        terminal.draw(|frame| draw(frame, state, &theme)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn press(state: &mut UiState, code: KeyCode) {
        state.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn search(state: &mut UiState, text: &str) {
        press(state, KeyCode::Char('/'));
        for ch in text.chars() {
            press(state, KeyCode::Char(ch));
        }
        press(state, KeyCode::Enter);
    }

    fn with_contests(body: &str) -> UiState {
        let mut state = UiState::new(vec!["leetcode".into(), "codeforces".into()]);
        let ticket = state.dashboard.begin_load(Collection::Contests);
        let result = contesthub_core::fetch::parse_envelope(body.as_bytes()).map_err(|message| {
            FetchError::Decode {
                collection: Collection::Contests,
                message,
            }
        });
        state.apply_listing_event(ListingEvent::Contests { ticket, result });
        state
    }

    fn with_hackathons(body: &str) -> UiState {
        let mut state = UiState::new(Vec::new());
        let ticket = state.dashboard.begin_load(Collection::Hackathons);
        let result = contesthub_core::fetch::parse_envelope(body.as_bytes()).map_err(|message| {
            FetchError::Decode {
                collection: Collection::Hackathons,
                message,
            }
        });
        state.apply_listing_event(ListingEvent::Hackathons { ticket, result });
        press(&mut state, KeyCode::Char('2'));
        state
    }

    const WEEKLY: &str = r#"{"data":[{"name":"Weekly 300","platform":"LeetCode","startTime":"2024-01-01T10:00:00Z","duration":"1h 30m","url":"https://x"}]}"#;

    #[test]
    fn shows_loading_before_fetch_settles() {
        let mut state = UiState::new(Vec::new());
        state.dashboard.begin_load(Collection::Contests);
        let screen = render(&mut state);
        assert!(screen.contains("Loading contests"));
        assert!(screen.contains("Dev Competitions Hub"));
    }

    #[test]
    fn shows_error_with_retry_hint() {
        let mut state = UiState::new(Vec::new());
        let ticket = state.dashboard.begin_load(Collection::Contests);
        state.apply_listing_event(ListingEvent::Contests {
            ticket,
            result: Err(FetchError::Status {
                collection: Collection::Contests,
                status: 500,
                reason: "Internal Server Error".into(),
            }),
        });
        let screen = render(&mut state);
        assert!(screen.contains("Failed to fetch contests: 500 Internal Server Error"));
        assert!(screen.contains("Press r to retry"));
    }

    #[test]
    fn contest_filter_and_search_scenario() {
        let mut state = with_contests(WEEKLY);

        let screen = render(&mut state);
        assert!(screen.contains("Weekly 300"));
        assert!(screen.contains("LeetCode"));
        assert!(screen.contains("Contests (1)"));
        assert!(screen.contains("Duration: 1h 30m"));

        press(&mut state, KeyCode::Char('f'));
        press(&mut state, KeyCode::Char('f'));
        assert_eq!(state.dashboard.category().token(), "codeforces");
        let screen = render(&mut state);
        assert!(screen.contains("No contests found matching your criteria."));
        assert!(!screen.contains("Weekly 300"));

        press(&mut state, KeyCode::Char('a'));
        search(&mut state, "WeEkLy");
        let screen = render(&mut state);
        assert!(screen.contains("Contests (1)"));

        press(&mut state, KeyCode::Char('/'));
        press(&mut state, KeyCode::Esc);
        search(&mut state, "div2");
        let screen = render(&mut state);
        assert!(screen.contains("No contests found matching your criteria."));
    }

    #[test]
    fn empty_envelope_renders_empty_state() {
        let mut state = with_contests("{}");
        let screen = render(&mut state);
        assert!(screen.contains("No contests found matching your criteria."));
    }

    #[test]
    fn hackathon_prize_is_rendered_without_markup() {
        let mut state =
            with_hackathons(r#"{"data":[{"id":5,"title":"Prize Hunt","prize_amount":"<b>$5,000</b>"}]}"#);
        let screen = render(&mut state);
        assert!(screen.contains("Prize pool: $5,000"));
        assert!(!screen.contains("<b>"));
        assert!(screen.contains("Location: Location not specified"));
        assert!(screen.contains("Deadline: Deadline not specified"));
    }

    #[test]
    fn expansion_reveals_detail_panel() {
        let mut state = with_hackathons(
            r#"{"data":[{"id":5,"title":"Prize Hunt","organization_name":"Acme","prizes_counts":{"cash":2}},{"id":6,"title":"Second"}]}"#,
        );
        let collapsed = render(&mut state);
        assert!(collapsed.contains("Show more"));
        assert!(!collapsed.contains("Organization: Acme"));

        press(&mut state, KeyCode::Char(' '));
        let expanded = render(&mut state);
        assert!(expanded.contains("Show less"));
        assert!(expanded.contains("Organization: Acme"));
        assert!(expanded.contains("Prizes: 2 cash prize(s)"));
        assert!(expanded.contains("Invite Only: No"));

        press(&mut state, KeyCode::Down);
        let other = render(&mut state);
        assert!(other.contains("Show more"));
        assert!(!other.contains("Organization:"));
    }

    #[test]
    fn more_details_needs_registration_link() {
        let mut state = with_hackathons(
            r#"{"data":[{"id":1,"title":"Closed","url":"https://devpost/closed"},{"id":2,"title":"Open","url":"https://devpost/open","start_a_submission_url":"https://devpost/open/go","thumbnail_url":"https://img/2.png"}]}"#,
        );
        press(&mut state, KeyCode::Char(' '));
        let closed = render(&mut state);
        assert!(!closed.contains("More Details"));
        assert!(closed.contains("Thumbnail: /api/placeholder/200/150"));

        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Char(' '));
        let open = render(&mut state);
        assert!(open.contains("More Details https://devpost/open"));
        assert!(open.contains("Thumbnail: https://img/2.png"));
    }

    #[test]
    fn empty_hackathon_search() {
        let mut state = with_hackathons(r#"{"data":[{"id":5,"title":"Prize Hunt"}]}"#);
        search(&mut state, "nothing");
        let screen = render(&mut state);
        assert!(screen.contains("No hackathons found matching your criteria."));
    }
}
