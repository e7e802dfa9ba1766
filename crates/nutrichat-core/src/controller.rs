//! Conversation controller
//!
//! Owns the transcript and the request lifecycle. At most one request is
//! outstanding; it is identified by an id so a reply that settles after
//! `new_conversation` can be recognized and dropped.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::reply::{MenuItem, Reply};
use crate::state::{ChatMessage, Conversation};
use crate::transport::ChatTransport;

/// The one request in flight, handed to whoever performs the network call
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: u64,
    pub text: String,
    pub cancel: CancellationToken,
}

impl PendingRequest {
    /// Run the transport call. Returns `None` if the request was cancelled
    /// before the backend answered.
    pub async fn dispatch<T>(&self, transport: &T) -> Option<Result<Reply, TransportError>>
    where
        T: ChatTransport + ?Sized,
    {
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            result = transport.send(&self.text) => Some(result),
        }
    }
}

struct Outstanding {
    id: u64,
    cancel: CancellationToken,
}

pub struct ChatController<T: ?Sized> {
    transport: Arc<T>,
    conversation: Conversation,
    menu_items: Vec<MenuItem>,
    outstanding: Option<Outstanding>,
    next_id: u64,
}

impl<T: ChatTransport> ChatController<T> {
    pub fn new(transport: T) -> Self {
        Self::with_shared(Arc::new(transport))
    }
}

impl<T: ChatTransport + ?Sized> ChatController<T> {
    fn with_shared(transport: Arc<T>) -> Self {
        Self {
            transport,
            conversation: Conversation::new(),
            menu_items: Vec::new(),
            outstanding: None,
            next_id: 1,
        }
    }

    /// Shared handle for tasks that perform the network call.
    pub fn transport(&self) -> Arc<T> {
        Arc::clone(&self.transport)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    pub fn awaiting_reply(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Menu items attached to the latest reply in this conversation.
    pub fn menu_items(&self) -> &[MenuItem] {
        &self.menu_items
    }

    /// Record the user's turn and open a request for it.
    ///
    /// Returns `None` (and changes nothing) when the trimmed text is empty
    /// or a request is already outstanding.
    pub fn begin(&mut self, text: &str) -> Option<PendingRequest> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.outstanding.is_some() {
            tracing::debug!("ignoring submission while a reply is pending");
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        let cancel = CancellationToken::new();

        self.conversation.push(ChatMessage::user(text));
        self.outstanding = Some(Outstanding {
            id,
            cancel: cancel.clone(),
        });
        tracing::info!(request_id = id, "sending question to backend");

        Some(PendingRequest {
            id,
            text: text.to_string(),
            cancel,
        })
    }

    /// Apply the settlement of request `id`.
    ///
    /// Appends exactly one assistant message and clears the pending state.
    /// Returns `false` when `id` is not the outstanding request (it was
    /// superseded by a reset), in which case nothing changes.
    pub fn complete(&mut self, id: u64, result: Result<Reply, TransportError>) -> bool {
        match &self.outstanding {
            Some(outstanding) if outstanding.id == id => {}
            _ => {
                tracing::debug!(request_id = id, "discarding stale reply");
                return false;
            }
        }
        self.outstanding = None;

        match result {
            Ok(reply) => {
                tracing::info!(request_id = id, items = reply.menu_items.len(), "reply received");
                self.menu_items = reply.menu_items;
                self.conversation.push(ChatMessage::assistant(reply.content));
            }
            Err(err) => {
                tracing::warn!(request_id = id, error = %err, "chat request failed");
                let notice = self.error_notice(&err);
                self.conversation.push(ChatMessage::assistant(notice));
            }
        }
        true
    }

    /// One full turn: validate, ask the backend, record the answer.
    ///
    /// Returns `false` when the submission was rejected. Transport failures
    /// never escape; they become an assistant message.
    pub async fn send_message(&mut self, text: &str) -> bool {
        let Some(request) = self.begin(text) else {
            return false;
        };

        let transport = self.transport();
        if let Some(result) = request.dispatch(transport.as_ref()).await {
            self.complete(request.id, result);
        }
        true
    }

    /// Start over from the greeting. Any outstanding request is cancelled and
    /// its reply, should it still arrive, is ignored.
    pub fn new_conversation(&mut self) {
        if let Some(outstanding) = self.outstanding.take() {
            tracing::info!(request_id = outstanding.id, "cancelling pending request");
            outstanding.cancel.cancel();
        }
        self.menu_items.clear();
        self.conversation.reset();
    }

    fn error_notice(&self, err: &TransportError) -> String {
        format!(
            "⚠️ Maaf, terjadi kesalahan: {}\n\nPastikan backend server sudah berjalan di {}",
            err,
            self.transport.base_url()
        )
    }
}
