// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FormKind, LeadId, SearchField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatVisibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Search(SearchField),
    Form(FormKind),
    ChatInput,
    ConfirmDelete(LeadId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub chat: ChatVisibility,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            chat: ChatVisibility::Visible,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    EnterSearch(SearchField),
    OpenForm(FormKind),
    FocusChatInput,
    ConfirmDelete(LeadId),
    ExitToNav,
    ToggleChat,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    ChatVisibilityChanged(ChatVisibility),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::EnterSearch(field) => {
                self.mode = AppMode::Search(field);
                vec![
                    AppEvent::ModeChanged(self.mode),
                    self.set_status(&format!("search {}", field.label())),
                ]
            }
            AppCommand::OpenForm(kind) => {
                self.mode = AppMode::Form(kind);
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::FocusChatInput => {
                let mut events = Vec::new();
                if self.chat == ChatVisibility::Hidden {
                    self.chat = ChatVisibility::Visible;
                    events.push(AppEvent::ChatVisibilityChanged(self.chat));
                }
                self.mode = AppMode::ChatInput;
                events.push(AppEvent::ModeChanged(self.mode));
                events
            }
            AppCommand::ConfirmDelete(id) => {
                self.mode = AppMode::ConfirmDelete(id);
                vec![
                    AppEvent::ModeChanged(self.mode),
                    self.set_status(&format!("delete lead {id}? y/n")),
                ]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ToggleChat => {
                self.chat = match self.chat {
                    ChatVisibility::Hidden => ChatVisibility::Visible,
                    ChatVisibility::Visible => ChatVisibility::Hidden,
                };
                if self.chat == ChatVisibility::Hidden && self.mode == AppMode::ChatInput {
                    self.mode = AppMode::Nav;
                }
                let label = match self.chat {
                    ChatVisibility::Hidden => "chat hidden",
                    ChatVisibility::Visible => "chat open",
                };
                vec![
                    AppEvent::ChatVisibilityChanged(self.chat),
                    self.set_status(label),
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState, ChatVisibility};
    use crate::{FormKind, LeadId, SearchField};

    #[test]
    fn enter_search_updates_status() {
        let mut state = AppState::default();

        let events = state.dispatch(AppCommand::EnterSearch(SearchField::Location));
        assert_eq!(state.mode, AppMode::Search(SearchField::Location));
        assert_eq!(
            events,
            vec![
                AppEvent::ModeChanged(AppMode::Search(SearchField::Location)),
                AppEvent::StatusUpdated("search location".to_owned()),
            ],
        );
    }

    #[test]
    fn toggle_chat_leaves_chat_input() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::FocusChatInput);
        assert_eq!(state.mode, AppMode::ChatInput);

        let hidden = state.dispatch(AppCommand::ToggleChat);
        assert_eq!(state.chat, ChatVisibility::Hidden);
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(
            hidden,
            vec![
                AppEvent::ChatVisibilityChanged(ChatVisibility::Hidden),
                AppEvent::StatusUpdated("chat hidden".to_owned()),
            ],
        );
    }

    #[test]
    fn focusing_chat_input_reopens_hidden_chat() {
        let mut state = AppState {
            chat: ChatVisibility::Hidden,
            ..AppState::default()
        };
        let events = state.dispatch(AppCommand::FocusChatInput);
        assert_eq!(
            events,
            vec![
                AppEvent::ChatVisibilityChanged(ChatVisibility::Visible),
                AppEvent::ModeChanged(AppMode::ChatInput),
            ],
        );
    }

    #[test]
    fn mode_transitions() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::OpenForm(FormKind::NewLead));
        assert_eq!(state.mode, AppMode::Form(FormKind::NewLead));

        state.dispatch(AppCommand::ConfirmDelete(LeadId::new(3)));
        assert_eq!(state.mode, AppMode::ConfirmDelete(LeadId::new(3)));
        assert_eq!(state.status_line.as_deref(), Some("delete lead 3? y/n"));

        state.dispatch(AppCommand::ExitToNav);
        assert_eq!(state.mode, AppMode::Nav);

        state.dispatch(AppCommand::ClearStatus);
        assert!(state.status_line.is_none());
    }
}
