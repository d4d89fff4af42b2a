// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ChatMessage, SyncError};

pub const INITIAL_MARKERS: [&str; 2] = [
    "[SYSTEM] Initialized leadbook agent console",
    "[SYSTEM] Context loaded. Ready for instructions.",
];
pub const RESET_MARKER: &str = "[SYSTEM] Session reset. Context cleared.";

const INPUT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChat {
    pub request_id: u64,
    pub message: String,
}

/// Ordered agent conversation plus the single-flight guard.
///
/// Entries are only appended; the whole transcript is swapped out on reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatBridge {
    transcript: Vec<ChatMessage>,
    in_flight: Option<u64>,
    next_request_id: u64,
    inputs: Vec<String>,
}

impl Default for ChatBridge {
    fn default() -> Self {
        Self {
            transcript: INITIAL_MARKERS.into_iter().map(ChatMessage::agent).collect(),
            in_flight: None,
            next_request_id: 0,
            inputs: Vec::new(),
        }
    }
}

impl ChatBridge {
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Echoes the user's text into the transcript and hands back the request
    /// to send. `None` for blank input or while another request is in flight.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingChat> {
        if text.trim().is_empty() || self.in_flight.is_some() {
            return None;
        }

        self.next_request_id = self.next_request_id.wrapping_add(1);
        let request_id = self.next_request_id;
        self.in_flight = Some(request_id);
        self.transcript.push(ChatMessage::user(text));
        self.remember_input(text);

        Some(PendingChat {
            request_id,
            message: text.to_owned(),
        })
    }

    /// Appends the agent's reply, or a synthesized error entry. Returns false
    /// for a completion that does not belong to the request in flight.
    pub fn finish_send(&mut self, request_id: u64, outcome: Result<String, SyncError>) -> bool {
        if self.in_flight != Some(request_id) {
            return false;
        }

        let entry = match outcome {
            Ok(reply) => ChatMessage::agent(reply),
            Err(error) => ChatMessage::agent(format!("[ERROR] {}", capitalize(&error.to_string()))),
        };
        self.transcript.push(entry);
        self.in_flight = None;
        true
    }

    pub fn reset(&mut self) {
        self.transcript = vec![ChatMessage::agent(RESET_MARKER)];
    }

    /// Previously submitted inputs, oldest first.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn remember_input(&mut self, text: &str) {
        if self.inputs.last().is_some_and(|last| last == text) {
            return;
        }
        self.inputs.push(text.to_owned());
        if self.inputs.len() > INPUT_HISTORY_LIMIT {
            self.inputs.remove(0);
        }
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatBridge, INITIAL_MARKERS, RESET_MARKER};
    use crate::{ChatRole, SyncError};

    fn contents(bridge: &ChatBridge) -> Vec<&str> {
        bridge
            .transcript()
            .iter()
            .map(|message| message.content.as_str())
            .collect()
    }

    #[test]
    fn starts_with_system_markers() {
        let bridge = ChatBridge::default();
        assert_eq!(contents(&bridge), INITIAL_MARKERS.to_vec());
        assert!(!bridge.is_processing());
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut bridge = ChatBridge::default();
        assert!(bridge.begin_send("   \n").is_none());
        assert_eq!(bridge.transcript().len(), 2);
    }

    #[test]
    fn second_send_while_in_flight_is_a_no_op() {
        let mut bridge = ChatBridge::default();
        let first = bridge.begin_send("qualify lead 3").expect("first send");
        let len = bridge.transcript().len();

        assert!(bridge.begin_send("hello").is_none());
        assert_eq!(bridge.transcript().len(), len);

        assert!(bridge.finish_send(first.request_id, Ok("done".to_owned())));
        assert!(bridge.begin_send("hello").is_some());
    }

    #[test]
    fn user_entry_precedes_agent_reply() {
        let mut bridge = ChatBridge::default();
        let pending = bridge.begin_send("hi").expect("send");
        assert!(bridge.is_processing());
        assert_eq!(bridge.transcript().last().map(|m| m.role), Some(ChatRole::User));

        bridge.finish_send(pending.request_id, Ok("hello there".to_owned()));
        let tail: Vec<_> = bridge.transcript()[2..]
            .iter()
            .map(|message| (message.role, message.content.as_str()))
            .collect();
        assert_eq!(
            tail,
            vec![(ChatRole::User, "hi"), (ChatRole::Agent, "hello there")]
        );
        assert!(!bridge.is_processing());
    }

    #[test]
    fn failure_appends_error_entry() {
        let mut bridge = ChatBridge::default();
        let pending = bridge.begin_send("hi").expect("send");
        bridge.finish_send(
            pending.request_id,
            Err(SyncError::Agent {
                message: "server returned 502".to_owned(),
            }),
        );
        let last = bridge.transcript().last().expect("entry");
        assert_eq!(last.role, ChatRole::Agent);
        assert_eq!(
            last.content,
            "[ERROR] Failed to communicate with agent: server returned 502"
        );
        assert!(!bridge.is_processing());
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut bridge = ChatBridge::default();
        let pending = bridge.begin_send("hi").expect("send");
        assert!(!bridge.finish_send(pending.request_id + 1, Ok("late".to_owned())));
        assert!(bridge.is_processing());
    }

    #[test]
    fn reset_leaves_single_marker() {
        let mut bridge = ChatBridge::default();
        let pending = bridge.begin_send("hi").expect("send");
        bridge.finish_send(pending.request_id, Ok("yo".to_owned()));
        bridge.reset();
        assert_eq!(contents(&bridge), vec![RESET_MARKER]);
        assert_eq!(bridge.inputs(), ["hi".to_owned()]);
    }
}
