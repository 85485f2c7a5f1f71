//! Scripted collaborators for controller tests.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::Map;
use tokio::sync::Notify;

use crate::{
    api::TaleApi,
    auth::{session::Session, Credentials, Identity, RegisterRequest, User},
    context::AppContext,
    error::ApiError,
    nav::{Navigator, Route},
    notify::Notifier,
    response::{AuthResponse, LikeStatus},
    tales::{ChildAge, Draft, GeneratedTale, GenerationRequest, Mood, Tale, TaleId},
};

pub fn tale(id: &str, title: &str, is_public: bool) -> Tale {
    Tale {
        id: TaleId::new(id),
        title: title.to_string(),
        content: format!("{title} begins.\n\n{title} ends."),
        topic: "Adventure".to_string(),
        child_age: ChildAge::EarlyElementary,
        mood: Mood::Happy,
        is_public,
        likes: 0,
        is_liked: false,
        author: None,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    }
}

pub fn generated(title: &str) -> GeneratedTale {
    GeneratedTale {
        title: title.to_string(),
        content: "Once upon a time.\n\nThey lived happily.".to_string(),
        topic: "Friendship".to_string(),
        child_age: ChildAge::EarlyElementary,
        mood: Mood::Happy,
        extra: Map::new(),
    }
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        message: None,
    }
}

#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    errors: Mutex<Vec<(&'static str, ApiError)>>,
    gates: Mutex<Vec<(&'static str, Arc<Notify>)>>,
    pub generated: Mutex<Option<GeneratedTale>>,
    pub saved: Mutex<Vec<Draft>>,
    pub user_tales: Mutex<Vec<Tale>>,
    pub public_tales: Mutex<Vec<Tale>>,
    pub like_status: Mutex<Option<LikeStatus>>,
    pub visibility_requests: Mutex<Vec<(TaleId, bool)>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().insert(op);
    }

    pub fn fail_with(&self, op: &'static str, err: ApiError) {
        self.errors.lock().push((op, err));
    }

    pub fn succeed_on(&self, op: &'static str) {
        self.failing.lock().remove(op);
        self.errors.lock().retain(|(name, _)| *name != op);
    }

    /// Blocks `op` until the returned handle is notified.
    pub fn hold(&self, op: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().push((op, gate.clone()));
        gate
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|name| **name == op).count()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    async fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        self.calls.lock().push(op);

        let gate = self
            .gates
            .lock()
            .iter()
            .find(|(name, _)| *name == op)
            .map(|(_, gate)| gate.clone());
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some((_, err)) = self.errors.lock().iter().find(|(name, _)| *name == op) {
            return Err(err.clone());
        }
        if self.failing.lock().contains(op) {
            return Err(server_error());
        }
        Ok(())
    }
}

#[async_trait]
impl TaleApi for FakeApi {
    async fn generate(
        &self,
        _token: &str,
        request: &GenerationRequest,
    ) -> Result<GeneratedTale, ApiError> {
        self.enter("generate").await?;
        Ok(self
            .generated
            .lock()
            .clone()
            .unwrap_or_else(|| generated(&format!("A tale about {}", request.topic))))
    }

    async fn create_tale(&self, _token: &str, draft: &Draft) -> Result<Option<Tale>, ApiError> {
        self.enter("create").await?;
        self.saved.lock().push(draft.clone());
        let mut saved = tale("saved-1", &draft.title, draft.is_public);
        saved.content = draft.content.clone();
        Ok(Some(saved))
    }

    async fn user_tales(&self, _token: &str) -> Result<Vec<Tale>, ApiError> {
        self.enter("user_tales").await?;
        Ok(self.user_tales.lock().clone())
    }

    async fn set_visibility(
        &self,
        _token: &str,
        id: &TaleId,
        is_public: bool,
    ) -> Result<(), ApiError> {
        self.enter("set_visibility").await?;
        self.visibility_requests.lock().push((id.clone(), is_public));
        Ok(())
    }

    async fn delete_tale(&self, _token: &str, _id: &TaleId) -> Result<(), ApiError> {
        self.enter("delete").await
    }

    async fn public_tales(&self, _token: Option<&str>) -> Result<Vec<Tale>, ApiError> {
        self.enter("public_tales").await?;
        Ok(self.public_tales.lock().clone())
    }

    async fn like_tale(&self, _token: &str, _id: &TaleId) -> Result<LikeStatus, ApiError> {
        self.enter("like").await?;
        Ok((*self.like_status.lock()).unwrap_or(LikeStatus {
            likes: 1,
            is_liked: true,
        }))
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<(), ApiError> {
        self.enter("register").await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.enter("login").await?;
        Ok(AuthResponse {
            token: "issued-token".to_string(),
            user: User {
                id: "u-1".to_string(),
                name: "Ada".to_string(),
                email: credentials.email.clone(),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notices.lock().push(Notice::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices.lock().push(Notice::Error(message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub session: Arc<Session>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub ctx: AppContext,
}

impl Harness {
    pub fn signed_in() -> Self {
        let harness = Self::anonymous();
        harness.session.sign_in(Identity::new(
            User {
                id: "u-1".to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            "test-token",
        ));
        harness
    }

    pub fn anonymous() -> Self {
        let api = FakeApi::new();
        let session = Arc::new(Session::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let ctx = AppContext::new(
            api.clone(),
            session.clone(),
            notifier.clone(),
            navigator.clone(),
        );
        Self {
            api,
            session,
            notifier,
            navigator,
            ctx,
        }
    }
}

/// Yields until the fake has seen `n` calls to `op`.
pub async fn wait_for_calls(api: &FakeApi, op: &str, n: usize) {
    while api.count(op) < n {
        tokio::task::yield_now().await;
    }
}
