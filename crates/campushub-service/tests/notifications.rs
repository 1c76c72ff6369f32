//! End-to-end tests for the notification fan-out pipeline, driven against
//! in-memory fakes of the directory, store, and session registry seams.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;

use campushub_core::config::notifications::NotificationsConfig;
use campushub_core::error::{AppError, ErrorKind};
use campushub_core::result::AppResult;
use campushub_core::traits::{Directory, SessionRegistry};
use campushub_core::types::id::{BatchId, BranchId, CollegeId, NotificationId, SessionId, UserId};
use campushub_core::types::pagination::{PageRequest, PageResponse};
use campushub_database::NotificationStore;
use campushub_entity::notification::{
    Notification, NotificationCategory, NotificationContent, NotificationTarget,
};
use campushub_service::notification::{
    DeliveryDispatcher, DeliveryOutcome, NotificationService, TargetResolver,
};

// ============================================================
// Fakes for the trait seams
// ============================================================

/// In-memory store honoring the `NotificationStore` contract. Creation
/// times are strictly increasing so ordering assertions are
/// deterministic.
struct InMemoryStore {
    rows: Mutex<Vec<Notification>>,
    base: DateTime<Utc>,
    seq: AtomicI64,
    fail_for: Mutex<HashSet<UserId>>,
}

impl InMemoryStore {
    fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            base: Utc::now(),
            seq: AtomicI64::new(0),
            fail_for: Mutex::new(HashSet::new()),
        }
    }

    fn fail_persistence_for(&self, recipient: UserId) {
        self.fail_for.lock().unwrap().insert(recipient);
    }

    fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn read_at_of(&self, id: NotificationId) -> Option<DateTime<Utc>> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .and_then(|n| n.read_at)
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn create(
        &self,
        recipient: UserId,
        content: &NotificationContent,
    ) -> AppResult<Notification> {
        if self.fail_for.lock().unwrap().contains(&recipient) {
            return Err(AppError::database("storage rejected the write"));
        }
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let notification = Notification {
            id: NotificationId::new(),
            user_id: recipient,
            category: content.category,
            title: content.title.clone(),
            body: content.body.clone(),
            payload: content.payload.clone(),
            read_at: None,
            created_at: self.base + Duration::milliseconds(seq),
        };
        self.rows.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient: UserId,
    ) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == recipient)
        {
            Some(row) => {
                if row.read_at.is_none() {
                    row.read_at = Some(Utc::now());
                }
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "No notification {notification_id} for this recipient"
            ))),
        }
    }

    async fn list_for_recipient(
        &self,
        recipient: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let rows = self.rows.lock().unwrap();
        let mut mine: Vec<Notification> = rows
            .iter()
            .filter(|n| n.user_id == recipient)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = mine.len() as u64;
        let items: Vec<Notification> = mine
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn count_unread(&self, recipient: UserId) -> AppResult<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|n| n.user_id == recipient && n.read_at.is_none())
            .count() as i64)
    }
}

#[derive(Default)]
struct FakeDirectory {
    colleges: HashMap<CollegeId, Vec<UserId>>,
    branches: HashMap<BranchId, Vec<UserId>>,
    batches: HashMap<BatchId, Vec<UserId>>,
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn members_of_college(&self, college_id: CollegeId) -> AppResult<Vec<UserId>> {
        self.colleges
            .get(&college_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Unknown college: {college_id}")))
    }

    async fn members_of_branch(&self, branch_id: BranchId) -> AppResult<Vec<UserId>> {
        self.branches
            .get(&branch_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Unknown branch: {branch_id}")))
    }

    async fn members_of_batch(&self, batch_id: BatchId) -> AppResult<Vec<UserId>> {
        self.batches
            .get(&batch_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Unknown batch: {batch_id}")))
    }
}

#[derive(Default)]
struct FakeRegistry {
    sessions: Mutex<HashMap<UserId, Vec<SessionId>>>,
    failing: Mutex<HashSet<SessionId>>,
    pushed: Mutex<Vec<(SessionId, String)>>,
}

impl FakeRegistry {
    fn open_session(&self, user_id: UserId) -> SessionId {
        let session = SessionId::new();
        self.sessions
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .push(session);
        session
    }

    fn break_session(&self, session_id: SessionId) {
        self.failing.lock().unwrap().insert(session_id);
    }

    fn pushed_count(&self) -> usize {
        self.pushed.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionRegistry for FakeRegistry {
    async fn live_sessions_of(&self, user_id: UserId) -> Vec<SessionId> {
        self.sessions
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn push_to(&self, session_id: SessionId, payload: String) -> AppResult<()> {
        if self.failing.lock().unwrap().contains(&session_id) {
            return Err(AppError::session("session closed mid-push"));
        }
        self.pushed.lock().unwrap().push((session_id, payload));
        Ok(())
    }
}

// ============================================================
// Harness
// ============================================================

struct Harness {
    store: Arc<InMemoryStore>,
    registry: Arc<FakeRegistry>,
    service: NotificationService,
}

fn harness_with_directory(directory: FakeDirectory) -> Harness {
    let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();

    let store = Arc::new(InMemoryStore::new());
    let registry = Arc::new(FakeRegistry::default());
    let service = NotificationService::new(
        store.clone(),
        TargetResolver::new(Arc::new(directory)),
        DeliveryDispatcher::new(registry.clone()),
        NotificationsConfig::default(),
    );
    Harness {
        store,
        registry,
        service,
    }
}

fn harness() -> Harness {
    harness_with_directory(FakeDirectory::default())
}

fn content() -> NotificationContent {
    NotificationContent::new(
        NotificationCategory::Announcement,
        "Exam schedule",
        "Midterm dates have been published",
    )
}

// ============================================================
// Batch sends
// ============================================================

#[tokio::test]
async fn test_send_to_many_persists_one_record_per_recipient() {
    let h = harness();
    let recipients = vec![UserId::new(), UserId::new(), UserId::new()];

    let outcomes = h.service.send_to_many(&recipients, &content()).await.unwrap();

    assert_eq!(outcomes.len(), 3);
    let ids: HashSet<NotificationId> = outcomes
        .iter()
        .map(|o| o.result.as_ref().unwrap().notification.id)
        .collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(h.store.row_count(), 3);
}

#[tokio::test]
async fn test_send_to_many_preserves_input_order() {
    let h = harness();
    let recipients = vec![UserId::new(), UserId::new(), UserId::new()];

    let outcomes = h.service.send_to_many(&recipients, &content()).await.unwrap();

    let reported: Vec<UserId> = outcomes.iter().map(|o| o.recipient).collect();
    assert_eq!(reported, recipients);
}

#[tokio::test]
async fn test_one_recipient_failure_does_not_block_the_rest() {
    let h = harness();
    let ok_a = UserId::new();
    let broken = UserId::new();
    let ok_b = UserId::new();
    h.store.fail_persistence_for(broken);

    let outcomes = h
        .service
        .send_to_many(&[ok_a, broken, ok_b], &content())
        .await
        .unwrap();

    assert!(outcomes[0].result.is_ok());
    assert_eq!(
        outcomes[1].result.as_ref().unwrap_err().kind,
        ErrorKind::Database
    );
    assert!(outcomes[2].result.is_ok());
    assert_eq!(h.store.row_count(), 2);
}

#[tokio::test]
async fn test_empty_recipient_set_fails_wholesale() {
    let h = harness();
    let err = h.service.send_to_many(&[], &content()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_duplicate_recipients_collapsed() {
    let h = harness();
    let a = UserId::new();
    let b = UserId::new();

    let outcomes = h.service.send_to_many(&[a, b, a], &content()).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(h.store.row_count(), 2);
}

#[tokio::test]
async fn test_blank_content_rejected_before_any_write() {
    let h = harness();
    let blank = NotificationContent::new(NotificationCategory::System, "", "body");

    let err = h
        .service
        .send_to_one(UserId::new(), &blank)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(h.store.row_count(), 0);
}

// ============================================================
// Announcements
// ============================================================

#[tokio::test]
async fn test_announcement_creates_independent_records() {
    let college = CollegeId::new();
    let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
    let mut directory = FakeDirectory::default();
    directory.colleges.insert(college, vec![a, b, c]);
    let h = harness_with_directory(directory);

    let outcomes = h
        .service
        .send_announcement(
            &NotificationTarget::College { college_id: college },
            &content(),
        )
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(h.store.row_count(), 3);

    // Marking A's record read leaves B's and C's untouched.
    let a_receipt = outcomes
        .iter()
        .find(|o| o.recipient == a)
        .unwrap()
        .result
        .as_ref()
        .unwrap();
    h.service.mark_read(a, a_receipt.notification.id).await.unwrap();

    assert_eq!(h.service.unread_count(a).await.unwrap(), 0);
    assert_eq!(h.service.unread_count(b).await.unwrap(), 1);
    assert_eq!(h.service.unread_count(c).await.unwrap(), 1);
}

#[tokio::test]
async fn test_announcement_to_unknown_scope_writes_nothing() {
    let h = harness();

    let err = h
        .service
        .send_announcement(
            &NotificationTarget::Branch {
                branch_id: BranchId::new(),
            },
            &content(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Resolution);
    assert_eq!(h.store.row_count(), 0);
}

#[tokio::test]
async fn test_announcement_to_empty_explicit_list_fails() {
    let h = harness();

    let err = h
        .service
        .send_announcement(&NotificationTarget::Users { users: Vec::new() }, &content())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Resolution);
    assert_eq!(h.store.row_count(), 0);
}

// ============================================================
// Delivery outcomes vs. persistence
// ============================================================

#[tokio::test]
async fn test_offline_recipient_is_skipped_but_record_remains() {
    let h = harness();
    let recipient = UserId::new();

    let receipt = h.service.send_to_one(recipient, &content()).await.unwrap();

    assert_eq!(receipt.delivery, DeliveryOutcome::Skipped);
    let listed = h
        .service
        .list_for_recipient(recipient, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].id, receipt.notification.id);
}

#[tokio::test]
async fn test_partial_session_failure_leaves_record_untouched() {
    let h = harness();
    let recipient = UserId::new();
    let _good = h.registry.open_session(recipient);
    let bad = h.registry.open_session(recipient);
    h.registry.break_session(bad);

    let receipt = h.service.send_to_one(recipient, &content()).await.unwrap();

    assert_eq!(
        receipt.delivery,
        DeliveryOutcome::PartiallyFailed {
            delivered: 1,
            failed: 1
        }
    );
    assert_eq!(h.registry.pushed_count(), 1);
    // Persisted state is unaffected by the dispatch result.
    assert!(h.store.read_at_of(receipt.notification.id).is_none());
    assert_eq!(h.service.unread_count(recipient).await.unwrap(), 1);
}

#[tokio::test]
async fn test_online_recipient_reaches_every_session() {
    let h = harness();
    let recipient = UserId::new();
    h.registry.open_session(recipient);
    h.registry.open_session(recipient);

    let receipt = h.service.send_to_one(recipient, &content()).await.unwrap();

    assert_eq!(receipt.delivery, DeliveryOutcome::Delivered { sessions: 2 });
    assert_eq!(h.registry.pushed_count(), 2);
}

// ============================================================
// Read state
// ============================================================

#[tokio::test]
async fn test_mark_read_is_idempotent() {
    let h = harness();
    let recipient = UserId::new();
    let receipt = h.service.send_to_one(recipient, &content()).await.unwrap();
    let id = receipt.notification.id;

    h.service.mark_read(recipient, id).await.unwrap();
    let first = h.store.read_at_of(id).expect("read_at set");

    h.service.mark_read(recipient, id).await.unwrap();
    assert_eq!(h.store.read_at_of(id), Some(first));
}

#[tokio::test]
async fn test_mark_read_by_wrong_recipient_fails_without_mutation() {
    let h = harness();
    let owner = UserId::new();
    let stranger = UserId::new();
    let receipt = h.service.send_to_one(owner, &content()).await.unwrap();

    let err = h
        .service
        .mark_read(stranger, receipt.notification.id)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(h.store.read_at_of(receipt.notification.id).is_none());
}

#[tokio::test]
async fn test_mark_read_unknown_notification_fails() {
    let h = harness();
    let err = h
        .service
        .mark_read(UserId::new(), NotificationId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

// ============================================================
// Listing
// ============================================================

#[tokio::test]
async fn test_list_orders_newest_first_across_sends() {
    let h = harness();
    let recipient = UserId::new();

    let first = h.service.send_to_one(recipient, &content()).await.unwrap();
    let second = h.service.send_to_one(recipient, &content()).await.unwrap();

    let listed = h
        .service
        .list_for_recipient(recipient, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.items[0].id, second.notification.id);
    assert_eq!(listed.items[1].id, first.notification.id);

    // A subsequent send appears at the head.
    let third = h.service.send_to_one(recipient, &content()).await.unwrap();
    let listed = h
        .service
        .list_for_recipient(recipient, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.items[0].id, third.notification.id);
    assert!(
        listed
            .items
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at)
    );
}

#[tokio::test]
async fn test_list_respects_pagination_window() {
    let h = harness();
    let recipient = UserId::new();
    for _ in 0..5 {
        h.service.send_to_one(recipient, &content()).await.unwrap();
    }

    let page = h
        .service
        .list_for_recipient(recipient, &PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_items, 5);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next);
    assert!(page.has_previous);
}

// ============================================================
// Cancellation
// ============================================================

#[tokio::test]
async fn test_cancellation_stops_new_units() {
    let h = harness();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcomes = h
        .service
        .send_to_many_with_cancel(&[UserId::new(), UserId::new()], &content(), &cancel)
        .await
        .unwrap();

    assert!(
        outcomes
            .iter()
            .all(|o| o.result.as_ref().unwrap_err().kind == ErrorKind::Cancelled)
    );
    assert_eq!(h.store.row_count(), 0);
}
