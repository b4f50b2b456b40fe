//! Fixtures and in-memory collaborators shared by unit tests.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::{
    auth::middleware::AuthUser,
    error::AppError,
    models::{
        comments::{
            ApprovalStatus, AuthorSnapshot, Comment, CommentAuthor, CommentFlag, CommentRef,
            RelatedRef,
        },
        related::RelatedEntity,
        reports::{AbuseReport, ReportReason},
        users::ExtendedProfile,
    },
    repositories::{
        comments::{CommentFilter, CommentRepository, NewComment},
        related::RelatedEntityRepository,
        reports::{NewAbuseReport, ReportRepository},
        users::{ProfileLookup, ProfileQuery},
    },
    services::{
        config::{ConfigCache, StaticConfigSource},
        content_filter::WordListFilter,
        notifier::Notifier,
    },
    usecases::{comments::CommentService, context::WorkflowContext, reports::ReportService},
};

pub fn comment_fixture(id: i64, related: &str) -> Comment {
    let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    Comment {
        id,
        document_id: format!("doc-{id}"),
        content: "Original content".to_string(),
        author: CommentAuthor::User(AuthorSnapshot {
            id: "1".to_string(),
            document_id: Some("user-doc-1".to_string()),
            name: Some("Owner".to_string()),
            username: Some("owner".to_string()),
            email: Some("owner@example.com".to_string()),
            avatar: Some("https://cdn.example.com/a.png".to_string()),
        }),
        thread_of: None,
        related: related.to_string(),
        approval_status: ApprovalStatus::Approved,
        removed: false,
        blocked: false,
        blocked_thread: false,
        is_admin_comment: false,
        locale: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn reply_fixture(id: i64, parent: i64) -> Comment {
    let mut comment = comment_fixture(id, "article:1");
    comment.thread_of = Some(parent);
    comment
}

pub fn anonymous_fixture(id: i64, author_id: &str) -> Comment {
    let mut comment = comment_fixture(id, "article:1");
    comment.author = CommentAuthor::Anonymous(AuthorSnapshot {
        id: author_id.to_string(),
        name: Some("Anon".to_string()),
        username: Some("Anon".to_string()),
        email: Some("anon@example.com".to_string()),
        ..Default::default()
    });
    comment
}

pub fn auth_user(id: i64) -> AuthUser {
    AuthUser {
        id,
        document_id: Some(format!("user-doc-{id}")),
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
    }
}

pub async fn config_with(entries: Vec<(&str, Value)>) -> ConfigCache {
    let values: HashMap<String, Value> = entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    ConfigCache::load(Arc::new(StaticConfigSource::new(values)))
        .await
        .unwrap()
}

#[derive(Default)]
pub struct InMemoryComments {
    rows: Mutex<Vec<Comment>>,
    next_id: AtomicI64,
    flag_updates: AtomicUsize,
    fail_by_id: AtomicBool,
}

impl InMemoryComments {
    pub fn with(rows: Vec<Comment>) -> Self {
        let store = Self::default();
        store.insert_all(rows);
        store
    }

    pub fn insert_all(&self, rows: Vec<Comment>) {
        let max_id = rows.iter().map(|row| row.id).max().unwrap_or(0);
        self.next_id.fetch_max(max_id, Ordering::SeqCst);
        self.rows.lock().unwrap().extend(rows);
    }

    pub fn get(&self, id: i64) -> Comment {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .unwrap_or_else(|| panic!("comment {id} not stored"))
    }

    pub fn all(&self) -> Vec<Comment> {
        self.rows.lock().unwrap().clone()
    }

    /// Number of non-empty `set_flag` batches written.
    pub fn flag_updates(&self) -> usize {
        self.flag_updates.load(Ordering::SeqCst)
    }

    /// Makes every lookup by numeric id fail like a transport error.
    pub fn fail_lookups_by_id(&self) {
        self.fail_by_id.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CommentRepository for InMemoryComments {
    async fn find_one(&self, filter: &CommentFilter) -> Result<Option<Comment>, AppError> {
        if matches!(filter.reference, CommentRef::ById(_)) && self.fail_by_id.load(Ordering::SeqCst)
        {
            return Err(AppError::Internal("lookup failed".to_string()));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| filter.matches(row))
            .cloned())
    }

    async fn create(&self, comment: NewComment) -> Result<Comment, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut row = comment_fixture(id, &comment.related);
        row.content = comment.content;
        row.author = comment.author;
        row.thread_of = comment.thread_of;
        row.approval_status = comment.approval_status;
        row.locale = comment.locale;
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Comment, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
        row.content = content.to_string();
        Ok(row.clone())
    }

    async fn set_flag(
        &self,
        ids: &[i64],
        flag: CommentFlag,
        value: bool,
    ) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.flag_updates.fetch_add(1, Ordering::SeqCst);
        let mut touched = 0;
        for row in self.rows.lock().unwrap().iter_mut() {
            if ids.contains(&row.id) {
                row.set_flag(flag, value);
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn find_reply_ids(&self, parent_id: i64) -> Result<Vec<i64>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.thread_of == Some(parent_id))
            .map(|row| row.id)
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryRelated {
    entities: Mutex<Vec<RelatedEntity>>,
}

impl InMemoryRelated {
    pub fn insert(&self, related: &str, require_comments_approval: bool) {
        let related = RelatedRef::parse(related).unwrap();
        self.entities.lock().unwrap().push(RelatedEntity {
            entity_type: related.entity_type,
            entity_id: related.entity_id,
            locale: None,
            require_comments_approval,
        });
    }
}

#[async_trait]
impl RelatedEntityRepository for InMemoryRelated {
    async fn find_related(
        &self,
        related: &RelatedRef,
        _locale: Option<&str>,
    ) -> Result<Option<RelatedEntity>, AppError> {
        Ok(self
            .entities
            .lock()
            .unwrap()
            .iter()
            .find(|entity| {
                entity.entity_type == related.entity_type && entity.entity_id == related.entity_id
            })
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryReports {
    rows: Mutex<Vec<AbuseReport>>,
    fail: AtomicBool,
}

impl InMemoryReports {
    pub fn all(&self) -> Vec<AbuseReport> {
        self.rows.lock().unwrap().clone()
    }

    pub fn fail_writes(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReportRepository for InMemoryReports {
    async fn create(&self, report: NewAbuseReport) -> Result<AbuseReport, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("insert failed".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = AbuseReport {
            id: rows.len() as i64 + 1,
            comment_id: report.comment_id,
            reason: report.reason,
            content: report.content,
            resolved: false,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }
}

/// Profile lookup answering from a fixed table and recording every query.
#[derive(Default)]
pub struct StubProfiles {
    answers: Vec<(ProfileQuery, Option<ExtendedProfile>)>,
    calls: Mutex<Vec<ProfileQuery>>,
}

impl StubProfiles {
    pub fn with_profile(mut self, query: ProfileQuery, profile: ExtendedProfile) -> Self {
        self.answers.push((query, Some(profile)));
        self
    }

    pub fn with_failure(mut self, query: ProfileQuery) -> Self {
        self.answers.push((query, None));
        self
    }

    pub fn calls(&self) -> Vec<ProfileQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileLookup for StubProfiles {
    async fn find_profile(
        &self,
        query: &ProfileQuery,
    ) -> Result<Option<ExtendedProfile>, AppError> {
        self.calls.lock().unwrap().push(query.clone());
        match self.answers.iter().find(|(known, _)| known == query) {
            Some((_, Some(profile))) => Ok(Some(profile.clone())),
            Some((_, None)) => Err(AppError::Internal("profile lookup failed".to_string())),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentNotification {
    AbuseReport(ReportReason),
    Reply { reply_id: i64, parent_id: i64 },
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn reply_parents(&self) -> Vec<i64> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                SentNotification::Reply { parent_id, .. } => Some(parent_id),
                SentNotification::AbuseReport(_) => None,
            })
            .collect()
    }

    pub fn abuse_reasons(&self) -> Vec<ReportReason> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                SentNotification::AbuseReport(reason) => Some(reason),
                SentNotification::Reply { .. } => None,
            })
            .collect()
    }

    /// Yields to spawned notification tasks until `count` have been sent.
    pub async fn wait_for_calls(&self, count: usize) {
        for _ in 0..1000 {
            if self.sent.lock().unwrap().len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {count} notifications, got {:?}", self.sent());
    }

    fn record(&self, sent: SentNotification) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(sent);
        if self.fail {
            return Err(AppError::ExternalService("smtp unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_abuse_report(
        &self,
        reason: ReportReason,
        _content: &str,
    ) -> Result<(), AppError> {
        self.record(SentNotification::AbuseReport(reason))
    }

    async fn send_reply_notification(
        &self,
        reply: &Comment,
        parent: &Comment,
    ) -> Result<(), AppError> {
        self.record(SentNotification::Reply {
            reply_id: reply.id,
            parent_id: parent.id,
        })
    }
}

/// In-memory wiring of both workflows.
pub struct Harness {
    pub store: Arc<InMemoryComments>,
    pub related: Arc<InMemoryRelated>,
    pub report_store: Arc<InMemoryReports>,
    pub profiles: Arc<StubProfiles>,
    pub notifier: Arc<RecordingNotifier>,
    pub config: Arc<ConfigCache>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryComments::default()),
            related: Arc::new(InMemoryRelated::default()),
            report_store: Arc::new(InMemoryReports::default()),
            profiles: Arc::new(StubProfiles::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            config: Arc::new(ConfigCache::new(Arc::new(StaticConfigSource::default()))),
        }
    }

    pub async fn with_config(entries: Vec<(&str, Value)>) -> Self {
        Self {
            config: Arc::new(config_with(entries).await),
            ..Self::new()
        }
    }

    pub fn with_related(self, related: &str, require_comments_approval: bool) -> Self {
        self.related.insert(related, require_comments_approval);
        self
    }

    pub fn with_comments(self, rows: Vec<Comment>) -> Self {
        self.store.insert_all(rows);
        self
    }

    pub fn with_failing_notifier(self) -> Self {
        Self {
            notifier: Arc::new(RecordingNotifier::failing()),
            ..self
        }
    }

    pub fn context(&self) -> WorkflowContext {
        WorkflowContext {
            comments: self.store.clone(),
            related: self.related.clone(),
            reports: self.report_store.clone(),
            profiles: self.profiles.clone(),
            filter: Arc::new(WordListFilter::new(["heck"])),
            config: self.config.clone(),
            notifier: self.notifier.clone(),
        }
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.context())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.context())
    }
}
