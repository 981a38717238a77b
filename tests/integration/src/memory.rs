//! In-memory adapters for every service port
//!
//! Stores are `DashMap`s keyed by aggregate id. Recorders and fault
//! switches sit behind `parking_lot` locks so tests can inspect and steer
//! them without awaiting.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use huddle_core::{
    ChatId, ChatView, DomainEvent, Invite, InviteId, Member, Message, MessageId, Pagination,
    UserId, Workspace, WorkspaceId,
};
use huddle_service::ports::{
    ChatReadModel, EventPublisher, IdentityError, IdentityProvider, MessageCommandRepository,
    MessageQueryRepository, PublishError, RepoResult, RepositoryError, TagJob, TagProcessor,
    WorkspaceCommandRepository, WorkspaceQueryRepository,
};
use huddle_service::RequestContext;
use parking_lot::Mutex;
use tokio::sync::mpsc;

// ============================================================================
// Shared Plumbing
// ============================================================================

/// Counts down injected failures
#[derive(Debug, Default)]
pub struct FaultSwitch {
    pending: Mutex<usize>,
}

impl FaultSwitch {
    /// Make the next call fail
    pub fn arm(&self) {
        *self.pending.lock() += 1;
    }

    pub fn disarm(&self) {
        *self.pending.lock() = 0;
    }

    fn trip(&self) -> bool {
        let mut pending = self.pending.lock();
        if *pending == 0 {
            return false;
        }
        *pending -= 1;
        true
    }
}

/// A stored aggregate plus its insertion order, used to break ties
/// between records created in the same instant
#[derive(Debug, Clone)]
struct Stored<T> {
    seq: u64,
    value: T,
}

/// Compare-and-swap upsert: the stored version must equal the one the
/// writer loaded, with 0 standing for "no record yet"
fn upsert<K, T>(
    map: &DashMap<K, Stored<T>>,
    seq: &AtomicU64,
    key: K,
    expected: u64,
    value: T,
    version: impl Fn(&T) -> u64,
) -> RepoResult<()>
where
    K: Eq + std::hash::Hash,
{
    match map.entry(key) {
        Entry::Occupied(mut entry) => {
            let stored = version(&entry.get().value);
            if stored != expected {
                return Err(RepositoryError::Conflict { stored, expected });
            }
            entry.get_mut().value = value;
        }
        Entry::Vacant(entry) => {
            if expected != 0 {
                return Err(RepositoryError::Conflict {
                    stored: 0,
                    expected,
                });
            }
            entry.insert(Stored {
                seq: seq.fetch_add(1, Ordering::SeqCst),
                value,
            });
        }
    }
    Ok(())
}

// ============================================================================
// Message Repository
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: DashMap<MessageId, Stored<Message>>,
    seq: AtomicU64,
    pub save_faults: FaultSwitch,
    /// Cancel the caller's context once the next save has been attempted
    pub cancel_on_save: FaultSwitch,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Direct read that bypasses the port, for assertions
    pub fn get(&self, id: MessageId) -> Option<Message> {
        self.messages.get(&id).map(|s| s.value.clone())
    }

    fn store(&self, message: &mut Message) -> RepoResult<()> {
        if self.save_faults.trip() {
            return Err(RepositoryError::backend(anyhow!("injected message save failure")));
        }
        let expected = message.persisted_version();
        let mut stored = message.clone();
        stored.mark_persisted();
        upsert(&self.messages, &self.seq, message.id(), expected, stored, Message::version)?;
        message.mark_persisted();
        Ok(())
    }

    /// Matching messages, newest first
    fn newest_first(&self, keep: impl Fn(&Message) -> bool) -> Vec<Message> {
        let mut found: Vec<_> = self
            .messages
            .iter()
            .filter(|s| keep(&s.value))
            .map(|s| ((s.value.created_at(), s.seq), s.value.clone()))
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0));
        found.into_iter().map(|(_, m)| m).collect()
    }
}

#[async_trait]
impl MessageCommandRepository for InMemoryMessageRepository {
    async fn save(&self, cx: &RequestContext, message: &mut Message) -> RepoResult<()> {
        cx.check()?;
        let outcome = self.store(message);
        if self.cancel_on_save.trip() {
            cx.token().cancel();
        }
        outcome
    }

    async fn delete(&self, cx: &RequestContext, id: MessageId) -> RepoResult<()> {
        cx.check()?;
        self.messages
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl MessageQueryRepository for InMemoryMessageRepository {
    async fn find_by_id(&self, cx: &RequestContext, id: MessageId) -> RepoResult<Message> {
        cx.check()?;
        self.get(id).ok_or(RepositoryError::NotFound)
    }

    async fn find_by_chat(
        &self,
        cx: &RequestContext,
        chat_id: ChatId,
        page: Pagination,
    ) -> RepoResult<Vec<Message>> {
        cx.check()?;
        Ok(page.slice(self.newest_first(|m| m.chat_id() == chat_id)))
    }

    async fn find_thread(
        &self,
        cx: &RequestContext,
        parent_id: MessageId,
    ) -> RepoResult<Vec<Message>> {
        cx.check()?;
        let mut replies = self.newest_first(|m| m.parent_message_id() == Some(parent_id));
        replies.reverse();
        Ok(replies)
    }

    async fn count_by_chat(&self, cx: &RequestContext, chat_id: ChatId) -> RepoResult<u64> {
        cx.check()?;
        Ok(self
            .messages
            .iter()
            .filter(|s| s.value.chat_id() == chat_id)
            .count() as u64)
    }

    async fn count_thread_replies(
        &self,
        cx: &RequestContext,
        parent_id: MessageId,
    ) -> RepoResult<u64> {
        cx.check()?;
        Ok(self
            .messages
            .iter()
            .filter(|s| s.value.parent_message_id() == Some(parent_id))
            .count() as u64)
    }

    async fn find_reaction_users(
        &self,
        cx: &RequestContext,
        message_id: MessageId,
        emoji: &str,
    ) -> RepoResult<Vec<UserId>> {
        cx.check()?;
        let message = self.get(message_id).ok_or(RepositoryError::NotFound)?;
        Ok(message
            .reactions()
            .iter()
            .filter(|r| r.is_emoji(emoji))
            .map(huddle_core::Reaction::user_id)
            .collect())
    }

    async fn search_in_chat(
        &self,
        cx: &RequestContext,
        chat_id: ChatId,
        query: &str,
        page: Pagination,
    ) -> RepoResult<Vec<Message>> {
        cx.check()?;
        let needle = query.to_lowercase();
        Ok(page.slice(self.newest_first(|m| {
            m.chat_id() == chat_id
                && !m.is_deleted()
                && m.content().to_lowercase().contains(&needle)
        })))
    }

    async fn find_by_author(
        &self,
        cx: &RequestContext,
        author_id: UserId,
        page: Pagination,
    ) -> RepoResult<Vec<Message>> {
        cx.check()?;
        Ok(page.slice(self.newest_first(|m| m.author_id() == author_id)))
    }
}

// ============================================================================
// Workspace Repository
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryWorkspaceRepository {
    workspaces: DashMap<WorkspaceId, Stored<Workspace>>,
    seq: AtomicU64,
    pub save_faults: FaultSwitch,
    pub delete_faults: FaultSwitch,
    /// Cancel the caller's context once the next save has been attempted
    pub cancel_on_save: FaultSwitch,
}

impl InMemoryWorkspaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    pub fn get(&self, id: WorkspaceId) -> Option<Workspace> {
        self.workspaces.get(&id).map(|s| s.value.clone())
    }

    fn store(&self, workspace: &mut Workspace) -> RepoResult<()> {
        if self.save_faults.trip() {
            return Err(RepositoryError::backend(anyhow!("injected workspace save failure")));
        }
        let expected = workspace.persisted_version();
        let mut stored = workspace.clone();
        stored.mark_persisted();
        upsert(
            &self.workspaces,
            &self.seq,
            workspace.id(),
            expected,
            stored,
            Workspace::version,
        )?;
        workspace.mark_persisted();
        Ok(())
    }

    /// Matching workspaces, oldest first
    fn oldest_first(&self, keep: impl Fn(&Workspace) -> bool) -> Vec<Workspace> {
        let mut found: Vec<_> = self
            .workspaces
            .iter()
            .filter(|s| keep(&s.value))
            .map(|s| ((s.value.created_at(), s.seq), s.value.clone()))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        found.into_iter().map(|(_, w)| w).collect()
    }

    fn find(&self, keep: impl Fn(&Workspace) -> bool) -> Option<Workspace> {
        self.workspaces
            .iter()
            .find(|s| keep(&s.value))
            .map(|s| s.value.clone())
    }
}

#[async_trait]
impl WorkspaceCommandRepository for InMemoryWorkspaceRepository {
    async fn save(&self, cx: &RequestContext, workspace: &mut Workspace) -> RepoResult<()> {
        cx.check()?;
        let outcome = self.store(workspace);
        if self.cancel_on_save.trip() {
            cx.token().cancel();
        }
        outcome
    }

    async fn delete(&self, cx: &RequestContext, id: WorkspaceId) -> RepoResult<()> {
        cx.check()?;
        if self.delete_faults.trip() {
            return Err(RepositoryError::backend(anyhow!("injected workspace delete failure")));
        }
        self.workspaces
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl WorkspaceQueryRepository for InMemoryWorkspaceRepository {
    async fn find_by_id(&self, cx: &RequestContext, id: WorkspaceId) -> RepoResult<Workspace> {
        cx.check()?;
        self.get(id).ok_or(RepositoryError::NotFound)
    }

    async fn find_by_keycloak_group_id(
        &self,
        cx: &RequestContext,
        group_id: &str,
    ) -> RepoResult<Workspace> {
        cx.check()?;
        self.find(|w| w.keycloak_group_id() == group_id)
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self, cx: &RequestContext, page: Pagination) -> RepoResult<Vec<Workspace>> {
        cx.check()?;
        Ok(page.slice(self.oldest_first(|_| true)))
    }

    async fn count(&self, cx: &RequestContext) -> RepoResult<u64> {
        cx.check()?;
        Ok(self.workspaces.len() as u64)
    }

    async fn find_invite_by_token(&self, cx: &RequestContext, token: &str) -> RepoResult<Invite> {
        cx.check()?;
        self.workspaces
            .iter()
            .find_map(|s| s.value.find_invite_by_token(token).ok().cloned())
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_workspace_by_invite_id(
        &self,
        cx: &RequestContext,
        invite_id: InviteId,
    ) -> RepoResult<Workspace> {
        cx.check()?;
        self.find(|w| w.find_invite(invite_id).is_ok())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_by_user(
        &self,
        cx: &RequestContext,
        user_id: UserId,
        page: Pagination,
    ) -> RepoResult<Vec<Workspace>> {
        cx.check()?;
        Ok(page.slice(self.oldest_first(|w| w.is_member(user_id))))
    }

    async fn count_by_user(&self, cx: &RequestContext, user_id: UserId) -> RepoResult<u64> {
        cx.check()?;
        Ok(self
            .workspaces
            .iter()
            .filter(|s| s.value.is_member(user_id))
            .count() as u64)
    }

    async fn find_member(
        &self,
        cx: &RequestContext,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> RepoResult<Member> {
        cx.check()?;
        self.get(workspace_id)
            .and_then(|w| w.member(user_id).cloned())
            .ok_or(RepositoryError::NotFound)
    }
}

// ============================================================================
// Chat Read-model
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryChatReadModel {
    chats: DashMap<ChatId, ChatView>,
}

impl InMemoryChatReadModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chat with the given participants and return its id
    pub fn add_chat(&self, participants: impl IntoIterator<Item = UserId>) -> ChatId {
        let id = ChatId::new();
        self.chats.insert(id, ChatView::new(id, participants));
        id
    }
}

#[async_trait]
impl ChatReadModel for InMemoryChatReadModel {
    async fn find_chat(&self, cx: &RequestContext, chat_id: ChatId) -> RepoResult<ChatView> {
        cx.check()?;
        self.chats
            .get(&chat_id)
            .map(|c| c.value().clone())
            .ok_or(RepositoryError::NotFound)
    }
}

// ============================================================================
// Identity Provider
// ============================================================================

/// One recorded call against the fake identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCall {
    CreateGroup { name: String },
    DeleteGroup { group_id: String },
    AddUser { user_id: UserId, group_id: String },
    RemoveUser { user_id: UserId, group_id: String },
}

#[derive(Debug, Default)]
struct IdentityState {
    next_group: u64,
    groups: HashSet<String>,
    memberships: HashSet<(String, UserId)>,
    calls: Vec<IdentityCall>,
}

/// Group store with per-operation failure switches. Group ids are `G1`,
/// `G2`, ... in creation order.
#[derive(Debug, Default)]
pub struct FakeIdentityProvider {
    state: Mutex<IdentityState>,
    pub create_faults: FaultSwitch,
    pub delete_faults: FaultSwitch,
    pub add_user_faults: FaultSwitch,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<IdentityCall> {
        self.state.lock().calls.clone()
    }

    pub fn has_group(&self, group_id: &str) -> bool {
        self.state.lock().groups.contains(group_id)
    }

    pub fn group_count(&self) -> usize {
        self.state.lock().groups.len()
    }

    pub fn is_in_group(&self, user_id: UserId, group_id: &str) -> bool {
        self.state
            .lock()
            .memberships
            .contains(&(group_id.to_owned(), user_id))
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn create_group(&self, cx: &RequestContext, name: &str) -> Result<String, IdentityError> {
        cx.check().map_err(IdentityError::new)?;
        let mut state = self.state.lock();
        state.calls.push(IdentityCall::CreateGroup {
            name: name.to_owned(),
        });
        if self.create_faults.trip() {
            return Err(IdentityError::new(anyhow!("injected create_group failure")));
        }
        state.next_group += 1;
        let group_id = format!("G{}", state.next_group);
        state.groups.insert(group_id.clone());
        Ok(group_id)
    }

    async fn delete_group(&self, cx: &RequestContext, group_id: &str) -> Result<(), IdentityError> {
        cx.check().map_err(IdentityError::new)?;
        let mut state = self.state.lock();
        state.calls.push(IdentityCall::DeleteGroup {
            group_id: group_id.to_owned(),
        });
        if self.delete_faults.trip() {
            return Err(IdentityError::new(anyhow!("injected delete_group failure")));
        }
        if !state.groups.remove(group_id) {
            return Err(IdentityError::new(anyhow!("group {group_id} does not exist")));
        }
        state.memberships.retain(|(g, _)| g != group_id);
        Ok(())
    }

    async fn add_user_to_group(
        &self,
        cx: &RequestContext,
        user_id: UserId,
        group_id: &str,
    ) -> Result<(), IdentityError> {
        cx.check().map_err(IdentityError::new)?;
        let mut state = self.state.lock();
        state.calls.push(IdentityCall::AddUser {
            user_id,
            group_id: group_id.to_owned(),
        });
        if self.add_user_faults.trip() {
            return Err(IdentityError::new(anyhow!("injected add_user_to_group failure")));
        }
        if !state.groups.contains(group_id) {
            return Err(IdentityError::new(anyhow!("group {group_id} does not exist")));
        }
        state.memberships.insert((group_id.to_owned(), user_id));
        Ok(())
    }

    async fn remove_user_from_group(
        &self,
        cx: &RequestContext,
        user_id: UserId,
        group_id: &str,
    ) -> Result<(), IdentityError> {
        cx.check().map_err(IdentityError::new)?;
        let mut state = self.state.lock();
        state.calls.push(IdentityCall::RemoveUser {
            user_id,
            group_id: group_id.to_owned(),
        });
        state.memberships.remove(&(group_id.to_owned(), user_id));
        Ok(())
    }
}

// ============================================================================
// Event Publisher
// ============================================================================

#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<DomainEvent>>,
    pub faults: FaultSwitch,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(DomainEvent::event_type).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, cx: &RequestContext, event: &DomainEvent) -> Result<(), PublishError> {
        cx.check().map_err(PublishError::new)?;
        if self.faults.trip() {
            return Err(PublishError::new(anyhow!("injected publish failure")));
        }
        self.events.lock().push(event.clone());
        Ok(())
    }
}

// ============================================================================
// Tag Processor
// ============================================================================

/// Forwards every job it sees; fails jobs whose content contains `#fail`
#[derive(Debug)]
pub struct RecordingTagProcessor {
    seen: mpsc::UnboundedSender<TagJob>,
}

impl RecordingTagProcessor {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TagJob>) {
        let (seen, rx) = mpsc::unbounded_channel();
        (Self { seen }, rx)
    }
}

#[async_trait]
impl TagProcessor for RecordingTagProcessor {
    async fn process(&self, cx: &RequestContext, job: &TagJob) -> anyhow::Result<()> {
        cx.check()?;
        self.seen.send(job.clone())?;
        if job.content.contains("#fail") {
            anyhow::bail!("tag command failed for message {}", job.message_id);
        }
        Ok(())
    }
}
