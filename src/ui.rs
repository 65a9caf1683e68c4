use crate::entities::{AccountDirectory, AllowanceConfig, AllowanceSplit};
use crate::error::ApiError;
use crate::schedule::{
    format_payment_preview, format_schedule, next_occurrence, ordinal, weekday_name, Frequency,
    RecurrenceRule, ScheduleValues,
};
use crate::splits::{format_total, SplitEntry, SplitSet};
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::collections::HashMap;
use std::io;

/// Where edits go when the user confirms them
pub trait AllowanceSink {
    /// Persist a split set; returns the server's confirmation message
    fn save_splits(&mut self, config_id: i64, entries: &[SplitEntry]) -> Result<String, ApiError>;

    /// Persist a schedule; returns the server's confirmation message
    fn save_schedule(&mut self, config_id: i64, values: &ScheduleValues) -> Result<String, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Allowances,
    Splits,
    Schedule,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Allowances => Page::Splits,
            Page::Splits => Page::Schedule,
            Page::Schedule => Page::Allowances,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Allowances => Page::Schedule,
            Page::Splits => Page::Allowances,
            Page::Schedule => Page::Splits,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Allowances => "Allowances",
            Page::Splits => "Splits",
            Page::Schedule => "Schedule",
        }
    }
}

/// Transient message shown in the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Notice {
            message: message.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SplitEditor {
    pub config_id: i64,
    pub user_name: String,
    pub set: SplitSet,
    pub selected: usize,
    /// Text typed into the selected row since it was selected
    pub input: String,
}

#[derive(Debug, Clone)]
pub struct ScheduleEditor {
    pub config_id: i64,
    pub user_name: String,
    pub rule: RecurrenceRule,
}

impl ScheduleEditor {
    fn cycle_frequency(&mut self) {
        let frequency = self.rule.frequency.next();
        self.rule = if frequency.uses_day_of_week() {
            RecurrenceRule::from_parts(frequency, Some(self.rule.day_of_week.unwrap_or(0)), None)
        } else {
            RecurrenceRule::monthly(self.rule.day_of_month.unwrap_or(1))
        };
    }

    fn shift_anchor(&mut self, forward: bool) {
        if self.rule.frequency.uses_day_of_week() {
            let dow = self.rule.day_of_week.unwrap_or(0);
            self.rule.day_of_week = Some(if forward { (dow + 1) % 7 } else { (dow + 6) % 7 });
        } else {
            let dom = self.rule.day_of_month.unwrap_or(1);
            self.rule.day_of_month = Some(if forward { dom % 31 + 1 } else { (dom + 29) % 31 + 1 });
        }
    }
}

pub struct App {
    pub accounts: AccountDirectory,
    pub allowances: Vec<AllowanceConfig>,
    pub splits: HashMap<i64, Vec<AllowanceSplit>>,
    pub state: TableState,
    pub current_page: Page,
    pub split_editor: Option<SplitEditor>,
    pub schedule_editor: Option<ScheduleEditor>,
    pub today: NaiveDate,
    pub notice: Option<Notice>,
}

impl App {
    pub fn new(
        accounts: AccountDirectory,
        allowances: Vec<AllowanceConfig>,
        splits: HashMap<i64, Vec<AllowanceSplit>>,
        today: NaiveDate,
    ) -> Self {
        let mut state = TableState::default();
        if !allowances.is_empty() {
            state.select(Some(0));
        }

        Self {
            accounts,
            allowances,
            splits,
            state,
            current_page: Page::Allowances,
            split_editor: None,
            schedule_editor: None,
            today,
            notice: None,
        }
    }

    pub fn selected_allowance(&self) -> Option<&AllowanceConfig> {
        self.state.selected().and_then(|i| self.allowances.get(i))
    }

    pub fn next(&mut self) {
        let len = self.allowances.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.allowances.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Open the split editor for the selected allowance
    pub fn open_split_editor(&mut self) {
        let Some(config) = self.selected_allowance() else {
            return;
        };
        let config_id = config.id;
        let user_id = config.user_id;
        let user_name = config.display_name.clone();

        let current = self.splits.get(&config_id).cloned().unwrap_or_default();
        let set = SplitSet::for_accounts(user_id, &self.accounts, &current);

        if set.is_empty() {
            self.notice = Some(Notice::error("No checking or savings accounts found for this user"));
            return;
        }

        self.split_editor = Some(SplitEditor {
            config_id,
            user_name,
            set,
            selected: 0,
            input: String::new(),
        });
        self.current_page = Page::Splits;
    }

    /// Open the schedule editor for the selected allowance
    pub fn open_schedule_editor(&mut self) {
        let Some(config) = self.selected_allowance() else {
            return;
        };

        let mut rule = config.rule();
        if rule.validate().is_err() {
            rule = match rule.frequency {
                Frequency::Monthly => RecurrenceRule::monthly(1),
                frequency => RecurrenceRule::from_parts(frequency, Some(0), None),
            };
        }

        self.schedule_editor = Some(ScheduleEditor {
            config_id: config.id,
            user_name: config.display_name.clone(),
            rule,
        });
        self.current_page = Page::Schedule;
    }

    /// Handle one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, sink: &mut dyn AllowanceSink) -> bool {
        if code == KeyCode::Tab || code == KeyCode::BackTab {
            self.current_page = if modifiers.contains(KeyModifiers::SHIFT) || code == KeyCode::BackTab {
                self.current_page.previous()
            } else {
                self.current_page.next()
            };
            return false;
        }

        match self.current_page {
            Page::Allowances => match code {
                KeyCode::Char('q') | KeyCode::Esc => return true,
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.previous(),
                KeyCode::Enter => self.open_split_editor(),
                KeyCode::Char('s') => self.open_schedule_editor(),
                _ => {}
            },
            Page::Splits => self.handle_split_key(code, sink),
            Page::Schedule => self.handle_schedule_key(code, sink),
        }

        false
    }

    fn handle_split_key(&mut self, code: KeyCode, sink: &mut dyn AllowanceSink) {
        if code == KeyCode::Esc {
            self.split_editor = None;
            self.current_page = Page::Allowances;
            return;
        }

        let Some(editor) = self.split_editor.as_mut() else {
            return;
        };
        let len = editor.set.len();
        let account_id = editor.set.entries()[editor.selected].account_id;

        match code {
            KeyCode::Down | KeyCode::Char('j') => {
                editor.selected = (editor.selected + 1) % len;
                editor.input.clear();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                editor.selected = (editor.selected + len - 1) % len;
                editor.input.clear();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                editor.input.push(c);
                let _ = editor.set.set_from_input(account_id, &editor.input);
            }
            KeyCode::Backspace => {
                editor.input.pop();
                let _ = editor.set.set_from_input(account_id, &editor.input);
            }
            KeyCode::Char('+') => {
                editor.input.clear();
                let _ = editor.set.adjust(account_id, 5.0);
            }
            KeyCode::Char('-') => {
                editor.input.clear();
                let _ = editor.set.adjust(account_id, -5.0);
            }
            KeyCode::Enter => self.save_splits(sink),
            _ => {}
        }
    }

    fn save_splits(&mut self, sink: &mut dyn AllowanceSink) {
        let Some(editor) = self.split_editor.as_ref() else {
            return;
        };

        // Confirm stays disabled while the live total is off
        if !editor.set.can_confirm() {
            self.notice = Some(Notice::error("Total must equal 100%"));
            return;
        }

        let submission = match editor.set.submission() {
            Ok(submission) => submission,
            Err(e) => {
                self.notice = Some(Notice::error(e.to_string()));
                return;
            }
        };

        let config_id = editor.config_id;
        match sink.save_splits(config_id, &submission.splits) {
            Ok(message) => {
                let saved = submission
                    .splits
                    .iter()
                    .map(|entry| {
                        let account = self.accounts.find_by_id(entry.account_id);
                        AllowanceSplit {
                            account_id: entry.account_id,
                            percentage: entry.percentage,
                            nickname: account.and_then(|a| a.nickname.clone()),
                            account_type: account.map(|a| a.account_type),
                        }
                    })
                    .collect();
                self.splits.insert(config_id, saved);
                self.split_editor = None;
                self.current_page = Page::Allowances;
                self.notice = Some(Notice::info(message));
            }
            Err(e) => self.notice = Some(Notice::error(e.user_message())),
        }
    }

    fn handle_schedule_key(&mut self, code: KeyCode, sink: &mut dyn AllowanceSink) {
        if code == KeyCode::Esc {
            self.schedule_editor = None;
            self.current_page = Page::Allowances;
            return;
        }

        let Some(editor) = self.schedule_editor.as_mut() else {
            return;
        };

        match code {
            KeyCode::Char('f') => editor.cycle_frequency(),
            KeyCode::Right | KeyCode::Char('l') => editor.shift_anchor(true),
            KeyCode::Left | KeyCode::Char('h') => editor.shift_anchor(false),
            KeyCode::Enter => self.save_schedule(sink),
            _ => {}
        }
    }

    fn save_schedule(&mut self, sink: &mut dyn AllowanceSink) {
        let Some(editor) = self.schedule_editor.as_ref() else {
            return;
        };
        let config_id = editor.config_id;

        let values = match ScheduleValues::from_rule(&editor.rule, self.today) {
            Ok(values) => values,
            Err(e) => {
                self.notice = Some(Notice::error(e.to_string()));
                return;
            }
        };

        match sink.save_schedule(config_id, &values) {
            Ok(message) => {
                if let Some(config) = self.allowances.iter_mut().find(|c| c.id == config_id) {
                    config.frequency = values.frequency;
                    config.day_of_week = values.day_of_week;
                    config.day_of_month = values.day_of_month;
                    config.next_payment_date = values.next_payment_date;
                }
                self.schedule_editor = None;
                self.current_page = Page::Allowances;
                self.notice = Some(Notice::info(message));
            }
            Err(e) => self.notice = Some(Notice::error(e.user_message())),
        }
    }
}

pub fn run_ui(app: &mut App, sink: &mut dyn AllowanceSink) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, sink);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    sink: &mut dyn AllowanceSink,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_key(key.code, key.modifiers, sink) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Allowances => render_allowances(f, chunks[1], app),
        Page::Splits => render_splits(f, chunks[1], app),
        Page::Schedule => render_schedule(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Allowances, Page::Splits, Page::Schedule];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Today: {}", app.today.format("%Y-%m-%d")),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_allowances(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Kid", "Amount", "Schedule", "Next", "Distribution", "Active"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows: Vec<Row> = app
        .allowances
        .iter()
        .map(|config| {
            let distribution = match app.splits.get(&config.id) {
                Some(splits) if !splits.is_empty() => splits
                    .iter()
                    .map(|s| format!("{} {}%", s.nickname.as_deref().unwrap_or("Unnamed"), s.percentage))
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => "Default account".to_string(),
            };
            let (active, active_color) = if config.active {
                ("yes", Color::Green)
            } else {
                ("no", Color::DarkGray)
            };

            Row::new(vec![
                Cell::from(config.display_name.clone()),
                Cell::from(format!("${:.2}", config.amount)),
                Cell::from(format_schedule(&config.rule())),
                Cell::from(config.next_payment_label()),
                Cell::from(distribution),
                Cell::from(active).style(Style::default().fg(active_color)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(22),
        Constraint::Length(18),
        Constraint::Min(20),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" 📅 Allowances "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_splits(f: &mut Frame, area: Rect, app: &App) {
    let Some(editor) = app.split_editor.as_ref() else {
        render_placeholder(f, area, "Select an allowance and press Enter to edit its splits");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let rows: Vec<Row> = editor
        .set
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let (icon, label) = match app.accounts.find_by_id(entry.account_id) {
                Some(account) => (account.account_type.icon(), account.label().to_string()),
                None => ("?", format!("Account {}", entry.account_id)),
            };
            let value = if i == editor.selected && !editor.input.is_empty() {
                format!("{}_", editor.input)
            } else {
                format!("{}", entry.percentage)
            };
            let style = if i == editor.selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(format!("{} {}", icon, label)),
                Cell::from(format!("{} %", value)),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(12)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" 💰 Allowance Splits - {} ", editor.user_name)),
    );
    f.render_widget(table, chunks[0]);

    let validation = editor.set.validation();
    let (color, hint) = if validation.is_valid {
        (Color::Green, "Enter to save")
    } else {
        (Color::Red, "⚠️ Total must equal 100%")
    };

    let total = Paragraph::new(Line::from(vec![
        Span::styled("  Total: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format_total(validation.total), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw("   "),
        Span::styled(hint, Style::default().fg(color)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(total, chunks[1]);
}

fn render_schedule(f: &mut Frame, area: Rect, app: &App) {
    let Some(editor) = app.schedule_editor.as_ref() else {
        render_placeholder(f, area, "Select an allowance and press 's' to edit its schedule");
        return;
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let rule = &editor.rule;

    let anchor = if rule.frequency.uses_day_of_week() {
        rule.day_of_week.and_then(weekday_name).unwrap_or("-").to_string()
    } else {
        rule.day_of_month.map(ordinal).unwrap_or_else(|| "-".to_string())
    };

    let preview = match next_occurrence(rule, app.today) {
        Ok(date) => Span::styled(format_payment_preview(date), Style::default().fg(Color::Green)),
        Err(e) => Span::styled(e.to_string(), Style::default().fg(Color::Red)),
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![Span::styled("  Frequency: ", label), Span::raw(rule.frequency.label())]),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                if rule.frequency.uses_day_of_week() { "  Schedule Day: " } else { "  Day of Month: " },
                label,
            ),
            Span::raw(anchor),
        ]),
        Line::from(""),
        Line::from(vec![Span::raw("  "), Span::raw(format!("Allowance will be paid: {}", format_schedule(rule)))]),
        Line::from(""),
        Line::from(vec![Span::raw("  "), preview]),
    ];

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" Edit Schedule - {} ", editor.user_name)),
    );
    f.render_widget(panel, area);
}

fn render_placeholder(f: &mut Frame, area: Rect, text: &str) {
    let panel = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", text),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(notice) = &app.notice {
        let color = if notice.is_error { Color::Red } else { Color::Green };
        status_spans.push(Span::styled(format!(" {} ", notice.message), Style::default().fg(color)));
        status_spans.push(Span::raw("|"));
    }

    let keys: &[(&str, &str)] = match app.current_page {
        Page::Allowances => &[("Enter", "Splits"), ("s", "Schedule"), ("↑/↓", "Nav"), ("q", "Quit")],
        Page::Splits => &[("0-9", "Type"), ("+/-", "±5%"), ("Enter", "Save"), ("Esc", "Back")],
        Page::Schedule => &[("f", "Frequency"), ("←/→", "Day"), ("Enter", "Save"), ("Esc", "Back")],
    };
    for (key, action) in keys {
        status_spans.push(Span::raw(" "));
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(format!(" {} |", action)));
    }
    status_spans.push(Span::styled(" Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
