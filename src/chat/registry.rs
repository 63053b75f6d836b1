//! In-memory session registry: matching, relaying and teardown.
//!
//! Two lock levels keep every operation atomic:
//! - the directory (`std::sync::Mutex`) owns participant lists, kinds and the
//!   `user_id -> session_id` index; it is only held for short synchronous
//!   sections and never across an `.await`.
//! - each session's conversation (`tokio::sync::Mutex`) owns its outbox and
//!   transcript; a send holds it across reply generation so a reader never
//!   observes a human message without the reply that answers it.
//!
//! In automated sessions nothing is stored until the reply exists: the human
//! message and its reply are appended together, so a send cancelled while
//! generating leaves the conversation untouched.
//!
//! Lock order is conversation before directory, and the directory guard is
//! always released before a conversation lock is awaited.

use super::types::{
    AnswerOutcome, JoinOutcome, JoinStatus, RegistryStats, SessionInfo, SessionKind, StoredMessage,
};
use super::validate;
use crate::config::MatchingConfig;
use crate::error::{ResponderError, SessionError};
use crate::responder::{ReplyGenerator, ReplyRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// A session never holds more than this many participants.
pub const MAX_PARTICIPANTS: usize = 2;

/// Sent in place of an automated reply when generation fails or times out.
pub const FALLBACK_REPLY: &str = "sorry, lost my train of thought there. what were you saying?";

/// Default bound on a single reply generation.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(20);

/// An outbox entry, addressed to the peer at the time it was sent.
struct Pending {
    recipient: String,
    message: StoredMessage,
}

#[derive(Default)]
struct ConversationLog {
    /// Messages not yet consumed by their recipient.
    outbox: Vec<Pending>,
    /// Full history, used as generation context. Never truncated.
    transcript: Vec<StoredMessage>,
}

impl ConversationLog {
    fn push(&mut self, recipient: String, message: StoredMessage) {
        self.transcript.push(message.clone());
        self.outbox.push(Pending { recipient, message });
    }

    /// Drop entries addressed to someone who has since left.
    fn forget_departed(&mut self, participants: &[String]) {
        self.outbox
            .retain(|pending| participants.contains(&pending.recipient));
    }
}

struct Conversation {
    closed: AtomicBool,
    log: tokio::sync::Mutex<ConversationLog>,
}

impl Conversation {
    fn new() -> Self {
        Self {
            closed: AtomicBool::new(false),
            log: tokio::sync::Mutex::new(ConversationLog::default()),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

struct SessionSlot {
    kind: SessionKind,
    /// Join order. Automated sessions hold the human first, then the responder.
    participants: Vec<String>,
    automated_id: Option<String>,
    conversation: Arc<Conversation>,
}

#[derive(Default)]
struct Directory {
    sessions: HashMap<String, SessionSlot>,
    /// Reverse index covering every participant, automated ones included.
    members: HashMap<String, String>,
}

impl Directory {
    /// Resolve the caller's session through the reverse index.
    ///
    /// `Ok(None)` means the caller has no session; an index entry pointing at
    /// a missing session is an invariant violation.
    fn session_of(&self, user_id: &str) -> Result<Option<(&String, &SessionSlot)>, SessionError> {
        let Some(session_id) = self.members.get(user_id) else {
            return Ok(None);
        };
        match self.sessions.get(session_id) {
            Some(slot) => Ok(Some((session_id, slot))),
            None => {
                tracing::error!(
                    user_id,
                    session_id = session_id.as_str(),
                    "reverse index references a missing session"
                );
                Err(SessionError::Internal(format!(
                    "session record for {session_id} is missing"
                )))
            }
        }
    }
}

/// Everything a send needs after the directory guard is dropped.
struct SendTarget {
    session_id: String,
    kind: SessionKind,
    automated_id: Option<String>,
    recipient: String,
    participants: Vec<String>,
    conversation: Arc<Conversation>,
}

pub struct SessionRegistry {
    directory: Mutex<Directory>,
    generator: Arc<dyn ReplyGenerator>,
    matching: MatchingConfig,
    reply_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(generator: Arc<dyn ReplyGenerator>) -> Self {
        Self {
            directory: Mutex::new(Directory::default()),
            generator,
            matching: MatchingConfig::default(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    pub fn with_matching(mut self, matching: MatchingConfig) -> Self {
        self.matching = matching;
        self
    }

    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    pub fn matching(&self) -> &MatchingConfig {
        &self.matching
    }

    fn directory(&self) -> MutexGuard<'_, Directory> {
        self.directory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn kind_for(&self, session_id: &str) -> SessionKind {
        if session_id.starts_with(&self.matching.human_session_prefix) {
            SessionKind::Human
        } else {
            SessionKind::Automated
        }
    }

    fn new_automated_id(&self) -> String {
        format!(
            "{}{}",
            self.matching.automated_id_prefix,
            Uuid::new_v4().simple()
        )
    }

    /// Put `user_id` into `session_id`, creating the session on first use.
    pub fn join_or_create(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<JoinOutcome, SessionError> {
        let user_id = validate::user_id(user_id, &self.matching)?;
        let session_id = validate::session_id(session_id)?;

        let mut guard = self.directory();
        let Directory { sessions, members } = &mut *guard;

        if let Some(current) = members.get(user_id) {
            if current != session_id {
                return Err(SessionError::FailedPrecondition(format!(
                    "user {user_id} is already in session {current}; leave it first"
                )));
            }
            let slot = sessions.get(session_id).ok_or_else(|| {
                SessionError::Internal(format!("session record for {session_id} is missing"))
            })?;
            return Ok(JoinOutcome {
                status: JoinStatus::AlreadyIn,
                session_id: session_id.to_string(),
                participants: slot.participants.len(),
                kind: slot.kind,
            });
        }

        if let Some(slot) = sessions.get_mut(session_id) {
            if slot.participants.len() >= MAX_PARTICIPANTS {
                return Err(SessionError::ResourceExhausted(format!(
                    "session {session_id} already has {MAX_PARTICIPANTS} participants"
                )));
            }
            slot.participants.push(user_id.to_string());
            members.insert(user_id.to_string(), session_id.to_string());
            tracing::info!(session_id, kind = %slot.kind, "session matched");
            return Ok(JoinOutcome {
                status: status_for(slot.participants.len()),
                session_id: session_id.to_string(),
                participants: slot.participants.len(),
                kind: slot.kind,
            });
        }

        let kind = self.kind_for(session_id);
        let mut participants = vec![user_id.to_string()];
        let automated_id = match kind {
            SessionKind::Human => None,
            SessionKind::Automated => {
                let id = self.new_automated_id();
                participants.push(id.clone());
                members.insert(id.clone(), session_id.to_string());
                Some(id)
            }
        };
        members.insert(user_id.to_string(), session_id.to_string());

        let outcome = JoinOutcome {
            status: status_for(participants.len()),
            session_id: session_id.to_string(),
            participants: participants.len(),
            kind,
        };
        sessions.insert(
            session_id.to_string(),
            SessionSlot {
                kind,
                participants,
                automated_id,
                conversation: Arc::new(Conversation::new()),
            },
        );
        tracing::info!(session_id, kind = %kind, "session created");
        Ok(outcome)
    }

    /// Relay `text` from `sender_id` to their peer.
    ///
    /// In automated sessions the reply is generated before this returns, so
    /// the caller waits on the generator.
    pub async fn send_message(&self, sender_id: &str, text: &str) -> Result<(), SessionError> {
        let sender_id = validate::user_id(sender_id, &self.matching)?;
        let text = validate::message_text(text, &self.matching)?;

        let target = {
            let directory = self.directory();
            let Some((session_id, slot)) = directory.session_of(sender_id)? else {
                return Err(SessionError::NotFound(format!(
                    "user {sender_id} is not in a session"
                )));
            };
            if slot.participants.len() < MAX_PARTICIPANTS {
                return Err(SessionError::FailedPrecondition(format!(
                    "session {session_id} is still waiting for a second participant"
                )));
            }
            let Some(recipient) = slot
                .participants
                .iter()
                .find(|participant| participant.as_str() != sender_id)
            else {
                return Err(SessionError::Internal(format!(
                    "session {session_id} has no peer for {sender_id}"
                )));
            };
            SendTarget {
                session_id: session_id.clone(),
                kind: slot.kind,
                automated_id: slot.automated_id.clone(),
                recipient: recipient.clone(),
                participants: slot.participants.clone(),
                conversation: Arc::clone(&slot.conversation),
            }
        };

        let mut log = target.conversation.log.lock().await;
        if target.conversation.is_closed() {
            return Err(SessionError::NotFound(format!(
                "session {} has closed",
                target.session_id
            )));
        }
        log.forget_departed(&target.participants);

        let message = StoredMessage::human(sender_id, text);

        match (target.kind, target.automated_id) {
            (SessionKind::Automated, Some(automated_id)) => {
                let reply = self
                    .generate_reply(&target.session_id, &log.transcript, text)
                    .await;
                log.push(target.recipient, message);
                log.push(
                    sender_id.to_string(),
                    StoredMessage::automated(automated_id, reply),
                );
            }
            (SessionKind::Automated, None) => {
                tracing::error!(
                    session_id = target.session_id.as_str(),
                    "automated session has no responder identity"
                );
                return Err(SessionError::Internal(format!(
                    "session {} has no automated participant",
                    target.session_id
                )));
            }
            (SessionKind::Human, _) => log.push(target.recipient, message),
        }

        Ok(())
    }

    /// One bounded attempt; any failure becomes [`FALLBACK_REPLY`].
    async fn generate_reply(
        &self,
        session_id: &str,
        history: &[StoredMessage],
        latest: &str,
    ) -> String {
        let request = ReplyRequest {
            session_id,
            history,
            latest,
        };
        let outcome = tokio::time::timeout(self.reply_timeout, self.generator.generate(request))
            .await
            .unwrap_or_else(|_| {
                Err(ResponderError::Timeout {
                    secs: self.reply_timeout.as_secs(),
                })
            });

        match outcome {
            Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
            Ok(_) => {
                tracing::warn!(
                    session_id,
                    generator = self.generator.name(),
                    "generator returned an empty reply; using fallback"
                );
                FALLBACK_REPLY.to_string()
            }
            Err(error) => {
                tracing::warn!(
                    session_id,
                    generator = self.generator.name(),
                    error = %error,
                    "reply generation failed; using fallback"
                );
                FALLBACK_REPLY.to_string()
            }
        }
    }

    fn conversation_of(&self, user_id: &str) -> Result<Option<Arc<Conversation>>, SessionError> {
        let directory = self.directory();
        Ok(directory
            .session_of(user_id)?
            .map(|(_, slot)| Arc::clone(&slot.conversation)))
    }

    /// Drain every pending message addressed to `user_id`.
    ///
    /// Messages the caller authored stay queued for their peer. Entries
    /// addressed to a participant who left are never handed to whoever
    /// takes the freed seat.
    pub async fn receive_messages(&self, user_id: &str) -> Result<Vec<StoredMessage>, SessionError> {
        let user_id = validate::user_id(user_id, &self.matching)?;
        let Some(conversation) = self.conversation_of(user_id)? else {
            return Ok(Vec::new());
        };

        let mut log = conversation.log.lock().await;
        if conversation.is_closed() {
            return Ok(Vec::new());
        }

        let (delivered, retained): (Vec<_>, Vec<_>) = std::mem::take(&mut log.outbox)
            .into_iter()
            .partition(|pending| pending.recipient == user_id);
        log.outbox = retained;
        Ok(delivered.into_iter().map(|pending| pending.message).collect())
    }

    /// Record the caller's guess, then remove them from their session.
    pub fn submit_answer(
        &self,
        user_id: &str,
        guess: SessionKind,
    ) -> Result<AnswerOutcome, SessionError> {
        let user_id = validate::user_id(user_id, &self.matching)?;
        let actual = self.depart(user_id)?;
        let correct = guess == actual;
        tracing::info!(kind = %actual, correct, "answer submitted");
        Ok(AnswerOutcome { correct, actual })
    }

    pub fn leave_session(&self, user_id: &str) -> Result<(), SessionError> {
        let user_id = validate::user_id(user_id, &self.matching)?;
        self.depart(user_id).map(|_| ())
    }

    /// Remove `user_id` from its session and tear the session down when
    /// nobody real is left. Returns the session's kind.
    fn depart(&self, user_id: &str) -> Result<SessionKind, SessionError> {
        let mut guard = self.directory();
        let Directory { sessions, members } = &mut *guard;

        let Some(session_id) = members.remove(user_id) else {
            return Err(SessionError::NotFound(format!(
                "user {user_id} is not in a session"
            )));
        };
        let Some(slot) = sessions.get_mut(&session_id) else {
            tracing::error!(
                user_id,
                session_id = session_id.as_str(),
                "reverse index references a missing session"
            );
            return Err(SessionError::Internal(format!(
                "session record for {session_id} is missing"
            )));
        };

        let kind = slot.kind;
        slot.participants.retain(|participant| participant != user_id);

        if slot.participants.is_empty() || kind == SessionKind::Automated {
            if let Some(slot) = sessions.remove(&session_id) {
                for participant in &slot.participants {
                    members.remove(participant);
                }
                slot.conversation.close();
            }
            tracing::info!(session_id = session_id.as_str(), kind = %kind, "session closed");
        } else {
            tracing::info!(
                session_id = session_id.as_str(),
                remaining = slot.participants.len(),
                "participant left"
            );
        }

        Ok(kind)
    }

    pub async fn session_info(&self, user_id: &str) -> Result<SessionInfo, SessionError> {
        let user_id = validate::user_id(user_id, &self.matching)?;
        let (session_id, participants, kind, conversation) = {
            let directory = self.directory();
            let Some((session_id, slot)) = directory.session_of(user_id)? else {
                return Err(SessionError::NotFound(format!(
                    "user {user_id} is not in a session"
                )));
            };
            (
                session_id.clone(),
                slot.participants.clone(),
                slot.kind,
                Arc::clone(&slot.conversation),
            )
        };

        let message_count = conversation.log.lock().await.transcript.len();
        Ok(SessionInfo {
            session_id,
            participants,
            message_count,
            kind,
        })
    }

    /// Messages waiting for `user_id`; zero when they have no session.
    pub async fn pending_count(&self, user_id: &str) -> Result<usize, SessionError> {
        let user_id = validate::user_id(user_id, &self.matching)?;
        let Some(conversation) = self.conversation_of(user_id)? else {
            return Ok(0);
        };

        let log = conversation.log.lock().await;
        Ok(log
            .outbox
            .iter()
            .filter(|pending| pending.recipient == user_id)
            .count())
    }

    /// Total queued messages in a session, whoever authored them.
    #[cfg(test)]
    pub(crate) async fn outbox_len(&self, session_id: &str) -> Option<usize> {
        let conversation = {
            let directory = self.directory();
            Arc::clone(&directory.sessions.get(session_id)?.conversation)
        };
        let log = conversation.log.lock().await;
        Some(log.outbox.len())
    }

    #[cfg(test)]
    pub(crate) fn has_session(&self, session_id: &str) -> bool {
        self.directory().sessions.contains_key(session_id)
    }

    pub fn stats(&self) -> RegistryStats {
        let directory = self.directory();
        RegistryStats {
            sessions: directory.sessions.len(),
            participants: directory.members.len(),
            waiting: directory
                .sessions
                .values()
                .filter(|slot| slot.participants.len() < MAX_PARTICIPANTS)
                .count(),
        }
    }
}

fn status_for(participants: usize) -> JoinStatus {
    if participants >= MAX_PARTICIPANTS {
        JoinStatus::Joined
    } else {
        JoinStatus::Waiting
    }
}
