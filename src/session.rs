use chrono::Utc;
use leptos::logging::error;
use leptos::*;

use crate::api::Backend;
use crate::composer::{compose, PendingAttachment};
use crate::socket::{Channel, ChannelEvent};
use crate::state::{derive_title, ConversationMeta, StreamEvent, Transcript, DEFAULT_TITLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// What removing a conversation did to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    NotFound,
    Kept,
    Rebind(String),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Select {
    AlreadyCurrent,
    Switched,
}

/// Conversation list, selection and channel status. All transitions are
/// plain functions; effects (HTTP, sockets) live in the store around them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    conversations: Vec<ConversationMeta>,
    current: Option<String>,
    status: ConnectionStatus,
    awaiting_reply: bool,
}

impl Session {
    pub fn conversations(&self) -> &[ConversationMeta] {
        &self.conversations
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_meta(&self) -> Option<&ConversationMeta> {
        let current = self.current.as_deref()?;
        self.conversations.iter().find(|c| c.id == current)
    }

    pub fn is_current(&self, id: &str) -> bool {
        self.current.as_deref() == Some(id)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn set_awaiting_reply(&mut self, awaiting: bool) {
        self.awaiting_reply = awaiting;
    }

    pub fn can_send(&self) -> bool {
        self.status == ConnectionStatus::Connected && !self.awaiting_reply
    }

    /// Wholesale replacement with the backend's list. Selects the first
    /// entry only when nothing was current; returns the new selection.
    pub fn replace_conversations(&mut self, list: Vec<ConversationMeta>) -> Option<String> {
        self.conversations = list;
        if self.current.is_some() {
            return None;
        }
        self.current = self.conversations.first().map(|c| c.id.clone());
        self.current.clone()
    }

    /// The backend lists newest first, so a fresh conversation goes on top.
    pub fn insert_created(&mut self, meta: ConversationMeta) {
        self.current = Some(meta.id.clone());
        self.conversations.insert(0, meta);
    }

    pub fn remove(&mut self, id: &str) -> Removal {
        let Some(index) = self.conversations.iter().position(|c| c.id == id) else {
            return Removal::NotFound;
        };
        self.conversations.remove(index);
        if self.current.as_deref() != Some(id) {
            return Removal::Kept;
        }
        match self.conversations.first() {
            Some(next) => {
                let next_id = next.id.clone();
                self.current = Some(next_id.clone());
                Removal::Rebind(next_id)
            }
            None => {
                self.current = None;
                Removal::Empty
            }
        }
    }

    pub fn select(&mut self, id: &str) -> Select {
        if self.current.as_deref() == Some(id) {
            return Select::AlreadyCurrent;
        }
        self.current = Some(id.to_string());
        Select::Switched
    }

    /// Installs a synthetic conversation so the UI has something to show
    /// when the first list fetch fails.
    pub fn install_offline_fallback(&mut self) {
        if !self.conversations.is_empty() {
            return;
        }
        let meta = ConversationMeta::local();
        self.current = Some(meta.id.clone());
        self.conversations.push(meta);
    }

    /// Titles an untitled current conversation after its first message.
    pub fn maybe_title_current(&mut self, text: &str) {
        let Some(current) = self.current.clone() else {
            return;
        };
        if let Some(conv) = self.conversations.iter_mut().find(|c| c.id == current) {
            if conv.title.is_empty() || conv.title == DEFAULT_TITLE {
                conv.title = derive_title(text);
            }
        }
    }
}

/// Signal-backed store shared through context. Cheap to copy; every method
/// runs on the browser event loop, so transitions never interleave.
#[derive(Clone, Copy)]
pub struct ChatStore {
    pub session: RwSignal<Session>,
    pub transcript: RwSignal<Transcript>,
    pub pending_attachment: RwSignal<Option<PendingAttachment>>,
    pub notice: RwSignal<Option<String>>,
    backend: StoredValue<Backend>,
    channel: StoredValue<Option<Channel>>,
}

impl ChatStore {
    pub fn new(backend: Backend) -> ChatStore {
        ChatStore {
            session: create_rw_signal(Session::default()),
            transcript: create_rw_signal(Transcript::default()),
            pending_attachment: create_rw_signal(None),
            notice: create_rw_signal(None),
            backend: store_value(backend),
            channel: store_value(None),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend.get_value()
    }

    pub fn report(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{message}");
        self.notice.set(Some(message));
    }

    pub fn dismiss_notice(&self) {
        self.notice.set(None);
    }

    /// Initial fetch of the conversation list.
    pub fn load(&self) {
        let store = *self;
        spawn_local(async move {
            match store.backend().conversations().await {
                Ok(list) => {
                    let was_empty = list.is_empty();
                    let selected = store
                        .session
                        .try_update(|s| s.replace_conversations(list))
                        .flatten();
                    if let Some(id) = selected {
                        store.activate(id);
                    } else if was_empty {
                        store.create();
                    }
                }
                Err(err) => {
                    store.report(format!("Could not load conversations: {err}"));
                    store.session.update(|s| s.install_offline_fallback());
                }
            }
        });
    }

    pub fn create(&self) {
        let store = *self;
        spawn_local(async move {
            match store.backend().create_conversation().await {
                Ok(meta) => {
                    let id = meta.id.clone();
                    store.session.update(|s| s.insert_created(meta));
                    store.activate(id);
                }
                Err(err) => store.report(format!("Could not create a conversation: {err}")),
            }
        });
    }

    pub fn delete(&self, id: String) {
        let store = *self;
        spawn_local(async move {
            match store.backend().delete_conversation(&id).await {
                Ok(()) => {
                    let removal = store
                        .session
                        .try_update(|s| s.remove(&id))
                        .unwrap_or(Removal::NotFound);
                    match removal {
                        // A non-current deletion leaves the open channel alone.
                        Removal::Kept | Removal::NotFound => {}
                        Removal::Rebind(next) => store.activate(next),
                        Removal::Empty => store.create(),
                    }
                }
                Err(err) => store.report(format!("Could not delete the conversation: {err}")),
            }
        });
    }

    pub fn select(&self, id: String) {
        let outcome = self
            .session
            .try_update(|s| s.select(&id))
            .unwrap_or(Select::AlreadyCurrent);
        if outcome == Select::Switched {
            self.activate(id);
        }
    }

    /// Manual reconnect for a dead channel. A local fallback conversation
    /// retries the backend from scratch instead.
    pub fn retry_current(&self) {
        let current = self.session.with_untracked(|s| s.current_meta().cloned());
        match current {
            Some(meta) if meta.local => {
                self.session.set(Session::default());
                self.transcript.set(Transcript::default());
                self.load();
            }
            Some(meta) => self.activate(meta.id),
            None => self.load(),
        }
    }

    /// Refuses quietly unless connected and idle; returns whether the draft
    /// was consumed so the input can clear itself.
    pub fn send(&self, typed: &str) -> bool {
        if !self.session.with_untracked(Session::can_send) {
            return false;
        }
        let pending = self.pending_attachment.get_untracked();
        let Some(outbound) = compose(typed, pending.as_ref()) else {
            return false;
        };
        let delivered = self.channel.with_value(|channel| match channel {
            Some(channel) => channel.send(&outbound.wire_text).is_ok(),
            None => false,
        });
        if !delivered {
            self.report("The connection dropped before the message could be sent.");
            return false;
        }
        let display = outbound.body.display_text();
        self.transcript
            .update(|t| t.push_user(outbound.body, Utc::now().naive_utc()));
        self.session.update(|s| {
            s.set_awaiting_reply(true);
            s.maybe_title_current(&display);
        });
        self.pending_attachment.set(None);
        true
    }

    pub fn shutdown(&self) {
        self.close_channel();
    }

    /// Makes `id` the live conversation: fresh buffer, persisted history,
    /// then a channel bound to it. Each step re-checks the selection so a
    /// response that raced a newer switch is discarded.
    fn activate(&self, id: String) {
        let store = *self;
        self.close_channel();
        self.transcript.set(Transcript::default());
        spawn_local(async move {
            let local = store
                .session
                .with_untracked(|s| s.current_meta().is_some_and(|meta| meta.local));
            if local {
                return;
            }
            match store.backend().history(&id).await {
                Ok(history) => {
                    if !store.session.with_untracked(|s| s.is_current(&history.id)) {
                        return;
                    }
                    store
                        .transcript
                        .set(Transcript::from_history(history.messages));
                }
                Err(err) => {
                    if !store.session.with_untracked(|s| s.is_current(&id)) {
                        return;
                    }
                    store.report(format!("Could not load messages: {err}"));
                }
            }
            if store.session.with_untracked(|s| s.is_current(&id)) {
                store.open_channel(id);
            }
        });
    }

    fn open_channel(&self, id: String) {
        let store = *self;
        let url = match store.backend().stream_url(&id) {
            Ok(url) => url,
            Err(err) => {
                store.report(format!("Bad stream URL: {err}"));
                return;
            }
        };
        self.session
            .update(|s| s.set_status(ConnectionStatus::Connecting));
        match Channel::open(url.as_str(), move |event| store.on_channel_event(event)) {
            Ok(channel) => self.channel.set_value(Some(channel)),
            Err(err) => {
                self.session
                    .update(|s| s.set_status(ConnectionStatus::Disconnected));
                self.report(format!("Could not open the chat channel: {err}"));
            }
        }
    }

    fn close_channel(&self) {
        self.channel.set_value(None);
        self.session.update(|s| {
            s.set_status(ConnectionStatus::Disconnected);
            s.set_awaiting_reply(false);
        });
    }

    fn on_channel_event(&self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => self
                .session
                .update(|s| s.set_status(ConnectionStatus::Connected)),
            ChannelEvent::Stream(stream_event) => {
                if stream_event == StreamEvent::Terminal {
                    self.session.update(|s| s.set_awaiting_reply(false));
                }
                let at = Utc::now().naive_utc();
                self.transcript.update(|t| t.apply(stream_event, at));
            }
            ChannelEvent::Closed => {
                self.session.update(|s| {
                    s.set_status(ConnectionStatus::Disconnected);
                    s.set_awaiting_reply(false);
                });
                // The channel must not be dropped from inside its own
                // callback; release it once this handler has unwound.
                let store = *self;
                spawn_local(async move {
                    store.channel.set_value(None);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn meta(id: &str) -> ConversationMeta {
        let at: NaiveDateTime = chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        ConversationMeta {
            id: id.to_string(),
            title: DEFAULT_TITLE.to_string(),
            created_at: at,
            updated_at: at,
            local: false,
        }
    }

    #[test]
    fn replacing_the_list_selects_the_first_only_when_nothing_is_current() {
        let mut session = Session::default();
        let selected = session.replace_conversations(vec![meta("a"), meta("b")]);
        assert_eq!(selected.as_deref(), Some("a"));
        assert_eq!(session.current(), Some("a"));

        let selected = session.replace_conversations(vec![meta("c"), meta("a")]);
        assert_eq!(selected, None);
        assert_eq!(session.current(), Some("a"));
    }

    #[test]
    fn selecting_the_current_conversation_is_a_no_op() {
        let mut session = Session::default();
        session.replace_conversations(vec![meta("a"), meta("b")]);
        assert_eq!(session.select("a"), Select::AlreadyCurrent);
        assert_eq!(session.select("b"), Select::Switched);
        assert_eq!(session.current(), Some("b"));
    }

    #[test]
    fn removing_the_current_conversation_rebinds_to_the_first_remaining() {
        let mut session = Session::default();
        session.replace_conversations(vec![meta("a"), meta("b"), meta("c")]);
        assert_eq!(session.remove("a"), Removal::Rebind("b".to_string()));
        assert_eq!(session.current(), Some("b"));
    }

    #[test]
    fn removing_a_non_current_conversation_keeps_the_selection() {
        let mut session = Session::default();
        session.replace_conversations(vec![meta("a"), meta("b")]);
        assert_eq!(session.remove("b"), Removal::Kept);
        assert_eq!(session.current(), Some("a"));
    }

    #[test]
    fn removing_the_last_conversation_asks_for_a_replacement() {
        let mut session = Session::default();
        session.replace_conversations(vec![meta("a")]);
        assert_eq!(session.remove("a"), Removal::Empty);
        assert_eq!(session.current(), None);
        assert_eq!(session.remove("a"), Removal::NotFound);
    }

    #[test]
    fn sending_requires_a_connected_idle_channel() {
        let mut session = Session::default();
        session.replace_conversations(vec![meta("a")]);
        assert!(!session.can_send());

        session.set_status(ConnectionStatus::Connected);
        assert!(session.can_send());

        session.set_awaiting_reply(true);
        assert!(!session.can_send());
    }

    #[test]
    fn the_first_message_titles_an_untitled_conversation() {
        let mut session = Session::default();
        session.replace_conversations(vec![meta("a")]);
        session.maybe_title_current("how do I test async code in Rust?");
        let title = session.current_meta().unwrap().title.clone();
        assert!(title.starts_with("how do I test async code in"));

        session.maybe_title_current("something else entirely");
        assert_eq!(session.current_meta().unwrap().title, title);
    }

    #[test]
    fn the_offline_fallback_installs_exactly_one_local_conversation() {
        let mut session = Session::default();
        session.install_offline_fallback();
        assert_eq!(session.conversations().len(), 1);
        assert!(session.conversations()[0].local);
        assert!(session.current().is_some());

        session.install_offline_fallback();
        assert_eq!(session.conversations().len(), 1);
    }
}
