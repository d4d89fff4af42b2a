// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use leadbook_app::{
    AgentEndpoint, AppCommand, AppMode, AppState, ChatBridge, ChatMessage, ChatRole,
    ChatVisibility, Console, DraftField, EMPLOYEE_COUNT_BUCKETS, FieldInput, FormKind, Lead,
    LeadId, LeadStatus, LeadStore, NewLeadForm, NoticeLevel, Reload, SearchField, Selection,
    SortOrder, cycle_optional, encode_list,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const CHAT_VISIBLE_ENTRIES: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuiOptions {
    /// Shown in the header, e.g. the backend URL or `demo`.
    pub backend_label: String,
    pub show_chat: bool,
}

/// Completions sent back to the UI thread by worker threads.
#[derive(Debug)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Refreshed(Result<Vec<Lead>>),
    Created(Result<Lead>),
    Saved(Result<Lead>),
    Deleted { id: LeadId, result: Result<()> },
    ChatReplied { request_id: u64, result: Result<String> },
    ResetDone(Result<()>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    cursor: usize,
    form: Option<NewLeadForm>,
    form_field: usize,
    edit_field: usize,
    chat_input: String,
    history_cursor: Option<usize>,
    history_buffer: String,
    status_level: Option<NoticeLevel>,
    status_token: u64,
    help_visible: bool,
}

struct Session<S> {
    console: Console,
    state: AppState,
    view: ViewData,
    store: S,
    tx: Sender<InternalEvent>,
    backend_label: String,
}

impl<S> Session<S>
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    fn new(console: Console, store: S, tx: Sender<InternalEvent>, options: TuiOptions) -> Self {
        let mut state = AppState::default();
        if !options.show_chat {
            state.chat = ChatVisibility::Hidden;
        }
        Self {
            console,
            state,
            view: ViewData::default(),
            store,
            tx,
            backend_label: options.backend_label,
        }
    }

    /// Runs `job` against a clone of the store on a worker thread.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&S) -> InternalEvent + Send + 'static,
    {
        let store = self.store.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            if tx.send(job(&store)).is_err() {
                debug!("ui closed before request completed");
            }
        });
    }
}

pub fn run_app<S>(console: Console, store: S, options: TuiOptions) -> Result<()>
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (internal_tx, internal_rx) = mpsc::channel();
    let mut session = Session::new(console, store, internal_tx, options);
    request_refresh(&mut session);

    let mut result = Ok(());
    loop {
        process_internal_events(&mut session, &internal_rx);

        if let Err(error) = terminal.draw(|frame| {
            render(
                frame,
                &session.console,
                &session.state,
                &session.view,
                &session.backend_label,
            )
        }) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(POLL_INTERVAL).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(&mut session, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<S>(session: &mut Session<S>, rx: &Receiver<InternalEvent>)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    while let Ok(event) = rx.try_recv() {
        apply_internal_event(session, event);
    }
}

fn apply_internal_event<S>(session: &mut Session<S>, event: InternalEvent)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    let reload = match event {
        InternalEvent::ClearStatus { token } => {
            if token == session.view.status_token {
                session.state.dispatch(AppCommand::ClearStatus);
                session.view.status_level = None;
            }
            Reload::Skip
        }
        InternalEvent::Refreshed(fetched) => {
            let _ = session.console.finish_refresh(fetched);
            Reload::Skip
        }
        InternalEvent::Created(created) => {
            let outcome = session.console.finish_create(created);
            if outcome.result.is_ok() {
                session.view.form = None;
                if session.state.mode == AppMode::Form(FormKind::NewLead) {
                    session.state.dispatch(AppCommand::ExitToNav);
                }
            }
            outcome.reload
        }
        InternalEvent::Saved(updated) => session.console.finish_save(updated).reload,
        InternalEvent::Deleted { id, result } => session.console.finish_delete(id, result).reload,
        InternalEvent::ChatReplied { request_id, result } => {
            session.console.finish_chat(request_id, result).reload
        }
        InternalEvent::ResetDone(result) => session.console.finish_reset(result).reload,
    };

    if reload.is_needed() {
        request_refresh(session);
    }
    sync_mode(session);
    clamp_cursor(session);
    flush_notices(session);
}

// Edit mode follows the selection: a successful save or a refresh that
// dropped the lead both end it.
fn sync_mode<S>(session: &mut Session<S>) {
    if session.state.mode == AppMode::Form(FormKind::EditLead)
        && !session.console.selection().is_editing()
    {
        session.state.dispatch(AppCommand::ExitToNav);
    }
}

fn clamp_cursor<S>(session: &mut Session<S>) {
    let rows = session.console.visible_page().len();
    session.view.cursor = session.view.cursor.min(rows.saturating_sub(1));
}

fn request_refresh<S>(session: &mut Session<S>)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    session.console.begin_refresh();
    session.spawn(|store| InternalEvent::Refreshed(store.list_leads()));
}

fn request_reset<S>(session: &mut Session<S>)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    if session.console.begin_reset() {
        emit_status(session, NoticeLevel::Info, "resetting chat session");
        session.spawn(|store| InternalEvent::ResetDone(store.reset()));
    }
    flush_notices(session);
}

fn flush_notices<S>(session: &mut Session<S>) {
    for notice in session.console.take_notices() {
        emit_status(session, notice.level, notice.text);
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status<S>(session: &mut Session<S>, level: NoticeLevel, message: impl Into<String>) {
    session.state.dispatch(AppCommand::SetStatus(message.into()));
    session.view.status_level = Some(level);
    session.view.status_token = session.view.status_token.saturating_add(1);
    schedule_status_clear(&session.tx, session.view.status_token);
}

/// Returns true when the app should quit.
fn handle_key_event<S>(session: &mut Session<S>, key: KeyEvent) -> bool
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    if session.view.help_visible {
        session.view.help_visible = false;
        return false;
    }

    match session.state.mode {
        AppMode::Nav => return handle_nav_key(session, key),
        AppMode::Search(field) => handle_search_key(session, field, key),
        AppMode::Form(FormKind::NewLead) => handle_create_form_key(session, key),
        AppMode::Form(FormKind::EditLead) => handle_edit_form_key(session, key),
        AppMode::ChatInput => handle_chat_input_key(session, key),
        AppMode::ConfirmDelete(id) => handle_confirm_delete_key(session, id, key),
    }
    false
}

fn handle_nav_key<S>(session: &mut Session<S>, key: KeyEvent) -> bool
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Down | KeyCode::Char('j') => move_cursor(session, 1),
        KeyCode::Up | KeyCode::Char('k') => move_cursor(session, -1),
        KeyCode::PageDown | KeyCode::Char(']') => turn_page(session, 1),
        KeyCode::PageUp | KeyCode::Char('[') => turn_page(session, -1),
        KeyCode::Enter => {
            if let Some(lead) = lead_under_cursor(session) {
                session.console.selection_mut().open(lead);
            }
        }
        KeyCode::Esc => {
            if session.console.selection().is_open() {
                session.console.selection_mut().close();
            } else {
                session.state.dispatch(AppCommand::ClearStatus);
                session.view.status_level = None;
            }
        }
        KeyCode::Char('/') => {
            session
                .state
                .dispatch(AppCommand::EnterSearch(SearchField::Company));
        }
        KeyCode::Char('l') => {
            session
                .state
                .dispatch(AppCommand::EnterSearch(SearchField::Location));
        }
        KeyCode::Char('s') => {
            let mut query = session.console.query().clone();
            query.status = cycle_optional(&LeadStatus::ALL, query.status, 1);
            let label = query.status.map_or("any", LeadStatus::as_str);
            session.console.set_query(query);
            session.view.cursor = 0;
            emit_status(session, NoticeLevel::Info, format!("status filter: {label}"));
        }
        KeyCode::Char('b') => {
            let mut query = session.console.query().clone();
            let current = query
                .employee_count
                .as_deref()
                .and_then(|count| EMPLOYEE_COUNT_BUCKETS.into_iter().find(|bucket| *bucket == count));
            let next = cycle_optional(&EMPLOYEE_COUNT_BUCKETS, current, 1);
            query.employee_count = next.map(str::to_owned);
            session.console.set_query(query);
            session.view.cursor = 0;
            emit_status(
                session,
                NoticeLevel::Info,
                format!("employee filter: {}", next.unwrap_or("any")),
            );
        }
        KeyCode::Char('o') => {
            let mut query = session.console.query().clone();
            query.sort = query.sort.next();
            let label = sort_label(query.sort);
            session.console.set_query(query);
            session.view.cursor = 0;
            emit_status(session, NoticeLevel::Info, format!("sort: {label}"));
        }
        KeyCode::Char('x') => {
            session.console.set_query(Default::default());
            session.view.cursor = 0;
            emit_status(session, NoticeLevel::Info, "filters cleared");
        }
        KeyCode::Char('a') => {
            session.view.form = Some(NewLeadForm::default());
            session.view.form_field = 0;
            session.state.dispatch(AppCommand::OpenForm(FormKind::NewLead));
        }
        KeyCode::Char('e') => {
            if session.console.selection_mut().edit() {
                session.view.edit_field = 0;
                session.state.dispatch(AppCommand::OpenForm(FormKind::EditLead));
            } else {
                emit_status(session, NoticeLevel::Info, "open a lead with enter first");
            }
        }
        KeyCode::Char('d') => {
            let target = session
                .console
                .selection()
                .selected_id()
                .or_else(|| lead_under_cursor(session).map(|lead| lead.id));
            if let Some(id) = target {
                session.state.dispatch(AppCommand::ConfirmDelete(id));
                session.view.status_level = Some(NoticeLevel::Info);
            }
        }
        KeyCode::Char('r') => {
            emit_status(session, NoticeLevel::Info, "refreshing");
            request_refresh(session);
        }
        KeyCode::Tab | KeyCode::Char('c') => {
            session.view.history_cursor = None;
            session.state.dispatch(AppCommand::FocusChatInput);
        }
        KeyCode::Char('t') => {
            session.state.dispatch(AppCommand::ToggleChat);
        }
        KeyCode::Char('N') => request_reset(session),
        KeyCode::Char('?') => session.view.help_visible = true,
        _ => {}
    }
    false
}

fn lead_under_cursor<S>(session: &Session<S>) -> Option<Lead> {
    session
        .console
        .visible_page()
        .get(session.view.cursor)
        .map(|lead| (*lead).clone())
}

fn move_cursor<S>(session: &mut Session<S>, delta: isize) {
    let rows = session.console.visible_page().len();
    if rows == 0 {
        session.view.cursor = 0;
        return;
    }
    let next = (session.view.cursor as isize + delta).clamp(0, rows as isize - 1);
    session.view.cursor = next as usize;
}

fn turn_page<S>(session: &mut Session<S>, delta: isize) {
    session.console.turn_page(delta);
    session.view.cursor = 0;
}

fn handle_search_key<S>(session: &mut Session<S>, field: SearchField, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            session.console.search_text_mut(field).clear();
            session.state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Enter => {
            session.state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Backspace => {
            session.console.search_text_mut(field).pop();
        }
        KeyCode::Char(ch) if is_plain(key.modifiers) => {
            session.console.search_text_mut(field).push(ch);
        }
        _ => return,
    }
    session.view.cursor = 0;
}

fn handle_create_form_key<S>(session: &mut Session<S>, key: KeyEvent)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    let fields = DraftField::for_form(FormKind::NewLead);
    let field = fields[session.view.form_field.min(fields.len() - 1)];

    match key.code {
        KeyCode::Esc => {
            session.view.form = None;
            session.state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Tab | KeyCode::Down => {
            session.view.form_field = step_index(session.view.form_field, fields.len(), 1);
        }
        KeyCode::BackTab | KeyCode::Up => {
            session.view.form_field = step_index(session.view.form_field, fields.len(), -1);
        }
        KeyCode::Left | KeyCode::Right if field.input(FormKind::NewLead) == FieldInput::Choice => {
            let delta = if key.code == KeyCode::Left { -1 } else { 1 };
            if let Some(form) = session.view.form.as_mut() {
                form.cycle_choice(field, delta);
            }
        }
        KeyCode::Enter => submit_create_form(session),
        KeyCode::Backspace => {
            if let Some(text) = session.view.form.as_mut().and_then(|form| form.text_mut(field)) {
                text.pop();
            }
        }
        KeyCode::Char(ch) if is_plain(key.modifiers) => {
            if let Some(text) = session.view.form.as_mut().and_then(|form| form.text_mut(field)) {
                text.push(ch);
            }
        }
        _ => {}
    }
}

fn submit_create_form<S>(session: &mut Session<S>)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    let Some(form) = session.view.form.clone() else {
        return;
    };
    match session.console.begin_create(&form) {
        Ok(lead) => {
            emit_status(session, NoticeLevel::Info, "adding lead");
            session.spawn(move |store| InternalEvent::Created(store.create_lead(&lead)));
        }
        Err(_) => flush_notices(session),
    }
}

fn handle_edit_form_key<S>(session: &mut Session<S>, key: KeyEvent)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    let fields = DraftField::for_form(FormKind::EditLead);
    let field = fields[session.view.edit_field.min(fields.len() - 1)];

    // The draft is frozen until the in-flight update lands.
    if session.console.is_saving() && key.code != KeyCode::Esc {
        return;
    }

    match key.code {
        KeyCode::Esc => {
            session.console.selection_mut().cancel();
            session.state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            submit_edit_form(session);
        }
        KeyCode::Enter => submit_edit_form(session),
        KeyCode::Tab | KeyCode::Down => {
            session.view.edit_field = step_index(session.view.edit_field, fields.len(), 1);
        }
        KeyCode::BackTab | KeyCode::Up => {
            session.view.edit_field = step_index(session.view.edit_field, fields.len(), -1);
        }
        KeyCode::Left | KeyCode::Right if field.input(FormKind::EditLead) == FieldInput::Choice => {
            let delta = if key.code == KeyCode::Left { -1 } else { 1 };
            if let Some(draft) = session.console.selection_mut().draft_mut() {
                draft.cycle_choice(field, delta);
            }
        }
        KeyCode::Backspace => {
            if let Some(text) = session
                .console
                .selection_mut()
                .draft_mut()
                .and_then(|draft| draft.text_mut(field))
            {
                text.pop();
            }
        }
        KeyCode::Char(ch) if is_plain(key.modifiers) => {
            if let Some(text) = session
                .console
                .selection_mut()
                .draft_mut()
                .and_then(|draft| draft.text_mut(field))
            {
                text.push(ch);
            }
        }
        _ => {}
    }
}

fn submit_edit_form<S>(session: &mut Session<S>)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    match session.console.begin_save() {
        Some(Ok((id, patch))) => {
            emit_status(session, NoticeLevel::Info, "saving");
            session.spawn(move |store| InternalEvent::Saved(store.update_lead(id, &patch)));
        }
        Some(Err(_)) => flush_notices(session),
        None => {
            session.state.dispatch(AppCommand::ExitToNav);
        }
    }
}

fn handle_chat_input_key<S>(session: &mut Session<S>, key: KeyEvent)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Tab, _) => {
            session.state.dispatch(AppCommand::ExitToNav);
        }
        (KeyCode::Char('r'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            request_reset(session);
        }
        (KeyCode::Up, _) => {
            let history = session.console.chat().inputs().to_vec();
            chat_history_prev(&mut session.view, &history);
        }
        (KeyCode::Down, _) => {
            let history = session.console.chat().inputs().to_vec();
            chat_history_next(&mut session.view, &history);
        }
        (KeyCode::Enter, _) => submit_chat_input(session),
        (KeyCode::Backspace, _) => {
            session.view.chat_input.pop();
            session.view.history_cursor = None;
        }
        (KeyCode::Char(ch), modifiers) if is_plain(modifiers) => {
            session.view.chat_input.push(ch);
            session.view.history_cursor = None;
        }
        _ => {}
    }
}

fn submit_chat_input<S>(session: &mut Session<S>)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    if session.console.chat().is_processing() {
        emit_status(session, NoticeLevel::Info, "agent is still answering");
        return;
    }

    let input = std::mem::take(&mut session.view.chat_input);
    session.view.history_cursor = None;
    session.view.history_buffer.clear();

    let Some(pending) = session.console.begin_chat(&input) else {
        return;
    };
    let request_id = pending.request_id;
    session.spawn(move |store| InternalEvent::ChatReplied {
        request_id,
        result: store.chat(&pending.message),
    });
}

fn chat_history_prev(view: &mut ViewData, history: &[String]) {
    if history.is_empty() {
        return;
    }

    match view.history_cursor {
        None => {
            view.history_buffer = view.chat_input.clone();
            view.history_cursor = Some(history.len() - 1);
        }
        Some(cursor) if cursor > 0 => {
            view.history_cursor = Some(cursor - 1);
        }
        Some(_) => {}
    }

    if let Some(entry) = view.history_cursor.and_then(|cursor| history.get(cursor)) {
        view.chat_input = entry.clone();
    }
}

fn chat_history_next(view: &mut ViewData, history: &[String]) {
    let Some(cursor) = view.history_cursor else {
        return;
    };

    if cursor + 1 < history.len() {
        view.history_cursor = Some(cursor + 1);
        view.chat_input = history[cursor + 1].clone();
    } else {
        view.history_cursor = None;
        view.chat_input = std::mem::take(&mut view.history_buffer);
    }
}

fn handle_confirm_delete_key<S>(session: &mut Session<S>, id: LeadId, key: KeyEvent)
where
    S: LeadStore + AgentEndpoint + Clone + Send + 'static,
{
    session.state.dispatch(AppCommand::ExitToNav);
    if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        emit_status(session, NoticeLevel::Info, format!("deleting lead {id}"));
        session.spawn(move |store| InternalEvent::Deleted {
            id,
            result: store.delete_lead(id),
        });
    } else {
        emit_status(session, NoticeLevel::Info, "delete canceled");
    }
}

fn is_plain(modifiers: KeyModifiers) -> bool {
    modifiers.is_empty() || modifiers == KeyModifiers::SHIFT
}

fn step_index(current: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + delta).rem_euclid(len as isize) as usize
}

fn sort_label(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Server => "server order",
        SortOrder::IndustryAsc => "industry a-z",
        SortOrder::IndustryDesc => "industry z-a",
    }
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    console: &Console,
    state: &AppState,
    view: &ViewData,
    backend_label: &str,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(console, backend_label))
        .block(Block::default().title("leadbook").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let main_area = if state.chat == ChatVisibility::Visible {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(layout[1]);
        render_chat(frame, columns[1], console.chat(), state, view);
        columns[0]
    } else {
        layout[1]
    };

    if console.selection().is_open() {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main_area);
        render_table(frame, rows[0], console, view);
        let title = if console.selection().is_editing() {
            "edit lead"
        } else {
            "lead"
        };
        let detail = Paragraph::new(detail_text(console.selection(), view.edit_field))
            .wrap(Wrap { trim: false })
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(detail, rows[1]);
    } else {
        render_table(frame, main_area, console, view);
    }

    let status_fg = match view.status_level {
        Some(NoticeLevel::Error) => Color::Red,
        Some(NoticeLevel::Success) => Color::Green,
        Some(NoticeLevel::Info) | None => Color::Yellow,
    };
    let status = Paragraph::new(status_text(state, console))
        .style(Style::default().fg(status_fg))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(form) = &view.form
        && state.mode == AppMode::Form(FormKind::NewLead)
    {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(form_text(form, view.form_field))
            .block(Block::default().title("add lead").borders(Borders::ALL));
        frame.render_widget(overlay, area);
    }

    if view.help_visible {
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, console: &Console, view: &ViewData) {
    let selected_id = console.selection().selected_id();
    let header = Row::new(
        ["", "company", "location", "industry", "employees", "status"]
            .into_iter()
            .map(|label| {
                Cell::from(label).style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            }),
    );

    let rows = console
        .visible_page()
        .into_iter()
        .enumerate()
        .map(|(index, lead)| {
            let marker = if Some(lead.id) == selected_id { "●" } else { "" };
            let mut style = Style::default().fg(status_color(lead.status));
            if index == view.cursor {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            Row::new(vec![
                Cell::from(marker),
                Cell::from(lead.company_name.clone()),
                Cell::from(lead.location.clone()),
                Cell::from(lead.industry.clone()),
                Cell::from(lead.employee_count.clone()),
                Cell::from(lead.status.as_str()),
            ])
            .style(style)
        })
        .collect::<Vec<_>>();

    let widths = [
        Constraint::Length(1),
        Constraint::Min(14),
        Constraint::Min(10),
        Constraint::Min(10),
        Constraint::Length(10),
        Constraint::Length(13),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(console))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn status_color(status: LeadStatus) -> Color {
    match status {
        LeadStatus::New => Color::White,
        LeadStatus::Qualified => Color::Green,
        LeadStatus::Disqualified => Color::DarkGray,
        LeadStatus::Contacted => Color::Cyan,
        LeadStatus::Negotiating => Color::Magenta,
    }
}

fn render_chat(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    chat: &ChatBridge,
    state: &AppState,
    view: &ViewData,
) {
    let focused = state.mode == AppMode::ChatInput;
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let body = Paragraph::new(chat_text(chat, &view.chat_input, focused))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("agent")
                .borders(Borders::ALL)
                .border_style(border),
        );
    frame.render_widget(body, area);
}

fn header_text(console: &Console, backend_label: &str) -> String {
    let query = console.query();
    let mut parts = vec![
        backend_label.to_owned(),
        format!("{} leads", console.cache().len()),
    ];
    if !query.company.is_empty() {
        parts.push(format!("company~{:?}", query.company));
    }
    if !query.location.is_empty() {
        parts.push(format!("location~{:?}", query.location));
    }
    if let Some(status) = query.status {
        parts.push(format!("status={}", status.as_str()));
    }
    if let Some(bucket) = &query.employee_count {
        parts.push(format!("employees={bucket}"));
    }
    if query.sort != SortOrder::Server {
        parts.push(sort_label(query.sort).to_owned());
    }
    if console.cache().is_loading() {
        parts.push("loading...".to_owned());
    }
    parts.join(" | ")
}

fn table_title(console: &Console) -> String {
    let shown = console.visible_leads().len();
    let mut title = format!(
        "leads {}/{}",
        console.page() + 1,
        console.page_count()
    );
    if console.query().is_active() {
        title.push_str(&format!(" ({shown} of {})", console.cache().len()));
    }
    title
}

fn detail_text(selection: &Selection, edit_field: usize) -> String {
    match selection {
        Selection::Closed => String::new(),
        Selection::Viewing(lead) => {
            let mut lines = vec![
                format!("{} (#{})", lead.company_name, lead.id),
                format!("website: {}", lead.website_url),
                format!("location: {}", lead.location),
                format!("industry: {}", lead.industry),
                format!("employees: {}", lead.employee_count),
                format!("product: {}", lead.product.as_deref().unwrap_or("")),
                format!(
                    "product type: {}",
                    lead.product_type.map_or("", |kind| kind.as_str())
                ),
                format!("transport modes: {}", encode_list(&lead.transport_modes)),
                format!("import locations: {}", encode_list(&lead.import_locations)),
                format!("export locations: {}", encode_list(&lead.export_locations)),
                format!("status: {}", lead.status.as_str()),
            ];
            lines.push(String::new());
            lines.push("e edit | d delete | esc close".to_owned());
            lines.join("\n")
        }
        Selection::Editing { lead, draft } => {
            let mut lines = vec![format!("{} (#{})", lead.company_name, lead.id)];
            for (index, field) in DraftField::EDIT.iter().enumerate() {
                let prefix = if index == edit_field { "> " } else { "  " };
                let value = draft.text(*field);
                let value = if field.input(FormKind::EditLead) == FieldInput::Choice {
                    format!("< {} >", if value.is_empty() { "none" } else { value.as_str() })
                } else {
                    value
                };
                lines.push(format!("{prefix}{}: {value}", field.label()));
                if index == edit_field
                    && let Some(hint) = field.hint()
                {
                    lines.push(format!("    {hint}"));
                }
            }
            lines.push(String::new());
            lines.push("tab next | left/right choose | enter save | esc cancel".to_owned());
            lines.join("\n")
        }
    }
}

fn form_text(form: &NewLeadForm, field_index: usize) -> String {
    let mut lines = Vec::new();
    for (index, field) in DraftField::CREATE.iter().enumerate() {
        let prefix = if index == field_index { "> " } else { "  " };
        let required = matches!(field, DraftField::CompanyName | DraftField::WebsiteUrl);
        let marker = if required { " *" } else { "" };
        let value = form.text(*field);
        let value = if field.input(FormKind::NewLead) == FieldInput::Choice {
            format!("< {} >", if value.is_empty() { "none" } else { value.as_str() })
        } else {
            value
        };
        lines.push(format!("{prefix}{}{marker}: {value}", field.label()));
    }
    lines.push(String::new());
    lines.push("tab next | left/right choose | enter add | esc cancel".to_owned());
    lines.join("\n")
}

fn chat_text(chat: &ChatBridge, input: &str, focused: bool) -> String {
    let transcript = chat.transcript();
    let keep = transcript.len().saturating_sub(CHAT_VISIBLE_ENTRIES);
    let mut lines: Vec<String> = transcript
        .iter()
        .skip(keep)
        .map(format_chat_message)
        .collect();

    if chat.is_processing() {
        lines.push("agent is thinking...".to_owned());
    }
    lines.push(String::new());
    let cursor = if focused { "_" } else { "" };
    lines.push(format!("> {input}{cursor}"));
    if focused {
        lines.push("enter send | up/down history | ctrl+r new session | esc back".to_owned());
    }
    lines.join("\n")
}

fn format_chat_message(message: &ChatMessage) -> String {
    let label = match message.role {
        ChatRole::User => "you",
        ChatRole::Agent => "agent",
    };
    format!("[{}] {label}: {}", clock(message.sent_at), message.content)
}

fn clock(at: OffsetDateTime) -> String {
    at.format(format_description!("[hour]:[minute]"))
        .unwrap_or_default()
}

fn status_text(state: &AppState, console: &Console) -> String {
    if let Some(status) = &state.status_line {
        return status.clone();
    }
    match state.mode {
        AppMode::Nav => {
            if console.selection().is_open() {
                "e edit | d delete | esc close | ? help".to_owned()
            } else {
                "enter open | a add | / company | l location | c chat | ? help | q quit".to_owned()
            }
        }
        AppMode::Search(field) => format!(
            "search {}: {}_ | enter keep | esc clear",
            field.label(),
            console.query().text(field)
        ),
        AppMode::Form(FormKind::NewLead) => "add lead".to_owned(),
        AppMode::Form(FormKind::EditLead) => "editing lead".to_owned(),
        AppMode::ChatInput => "chat".to_owned(),
        AppMode::ConfirmDelete(id) => format!("delete lead {id}? y/n"),
    }
}

fn help_overlay_text() -> &'static str {
    "j/k or up/down  move\n\
     [ / ]           previous / next page\n\
     enter           open lead\n\
     e               edit open lead\n\
     d               delete lead\n\
     a               add lead\n\
     / and l         search company / location\n\
     s / b           cycle status / employee filter\n\
     o               cycle industry sort\n\
     x               clear filters\n\
     r               refresh\n\
     c or tab        chat input\n\
     t               show / hide chat\n\
     N               new chat session\n\
     q               quit"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
