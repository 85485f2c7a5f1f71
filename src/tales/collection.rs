use std::{collections::HashSet, str::FromStr};

use parking_lot::Mutex;

use crate::{
    auth::Identity,
    context::AppContext,
    error::TaleError,
    nav::Route,
    tales::{in_flight::InFlight, Tale, TaleId},
};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this tale?";

/// Explicit guard for irreversible actions.
pub trait Confirm: Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisibilityFilter {
    #[default]
    All,
    Public,
    Private,
}

impl VisibilityFilter {
    pub fn matches(&self, tale: &Tale) -> bool {
        match self {
            VisibilityFilter::All => true,
            VisibilityFilter::Public => tale.is_public,
            VisibilityFilter::Private => !tale.is_public,
        }
    }
}

impl FromStr for VisibilityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(VisibilityFilter::All),
            "public" => Ok(VisibilityFilter::Public),
            "private" => Ok(VisibilityFilter::Private),
            other => Err(format!(
                "unknown filter {other:?}, expected all, public or private"
            )),
        }
    }
}

/// Tab counts shown above the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabCounts {
    pub all: usize,
    pub public: usize,
    pub private: usize,
}

#[derive(Debug, Default)]
struct CollectionState {
    tales: Vec<Tale>,
    filter: VisibilityFilter,
    loading: bool,
    pending: HashSet<TaleId>,
}

impl CollectionState {
    fn find_mut(&mut self, id: &TaleId) -> Option<&mut Tale> {
        self.tales.iter_mut().find(|tale| &tale.id == id)
    }
}

/// The signed-in user's own tales (the dashboard).
///
/// Visibility changes and deletes are applied locally only after the server
/// acknowledges them.
pub struct TaleCollection {
    ctx: AppContext,
    state: Mutex<CollectionState>,
}

impl TaleCollection {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(CollectionState::default()),
        }
    }

    pub fn tales(&self) -> Vec<Tale> {
        self.state.lock().tales.clone()
    }

    pub fn get(&self, id: &TaleId) -> Option<Tale> {
        self.state.lock().tales.iter().find(|t| &t.id == id).cloned()
    }

    pub fn filter(&self) -> VisibilityFilter {
        self.state.lock().filter
    }

    pub fn set_filter(&self, filter: VisibilityFilter) {
        self.state.lock().filter = filter;
    }

    /// The loaded tales passing the current filter, in load order.
    pub fn visible(&self) -> Vec<Tale> {
        let state = self.state.lock();
        state
            .tales
            .iter()
            .filter(|tale| state.filter.matches(tale))
            .cloned()
            .collect()
    }

    pub fn counts(&self) -> TabCounts {
        let state = self.state.lock();
        let public = state.tales.iter().filter(|t| t.is_public).count();
        TabCounts {
            all: state.tales.len(),
            public,
            private: state.tales.len() - public,
        }
    }

    /// Placeholder text when the current view is empty.
    pub fn empty_message(&self) -> Option<&'static str> {
        let state = self.state.lock();
        if state.tales.is_empty() {
            Some("You haven't created any tales yet.")
        } else if !state.tales.iter().any(|t| state.filter.matches(t)) {
            Some("No tales match the selected filter.")
        } else {
            None
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn is_pending(&self, id: &TaleId) -> bool {
        self.state.lock().pending.contains(id)
    }

    fn require_identity(&self) -> Result<Identity, TaleError> {
        self.ctx.identity.current().ok_or_else(|| {
            self.ctx.navigator.navigate(Route::SignIn);
            TaleError::Unauthenticated
        })
    }

    /// Marks `id` as having a mutation in flight until the returned guard is
    /// finished or dropped.
    fn begin_mutation(
        &self,
        id: &TaleId,
        action: &'static str,
    ) -> Result<InFlight<'_, CollectionState, impl FnOnce(&mut CollectionState)>, TaleError> {
        {
            let mut state = self.state.lock();
            if !state.tales.iter().any(|t| &t.id == id) {
                return Err(TaleError::NotFound(id.clone()));
            }
            if !state.pending.insert(id.clone()) {
                return Err(TaleError::Busy(action));
            }
        }

        let id = id.clone();
        Ok(InFlight::new(&self.state, move |state: &mut CollectionState| {
            state.pending.remove(&id);
        }))
    }

    pub async fn load(&self) -> Result<usize, TaleError> {
        let identity = self.require_identity()?;

        {
            let mut state = self.state.lock();
            if state.loading {
                return Err(TaleError::Busy("load"));
            }
            state.loading = true;
        }
        let in_flight = InFlight::new(&self.state, |state: &mut CollectionState| {
            state.loading = false;
        });

        let result = self.ctx.api.user_tales(&identity.token).await;

        let mut state = in_flight.finish();
        match result {
            Ok(tales) => {
                tracing::debug!(count = tales.len(), "loaded user tales");
                state.tales = tales;
                Ok(state.tales.len())
            }
            Err(e) => {
                drop(state);
                tracing::error!("Error fetching tales: {:?}", e);
                self.ctx.notifier.error("Failed to load your tales");
                Err(e.into())
            }
        }
    }

    /// Flips a tale between public and private. Returns the new visibility.
    pub async fn toggle_visibility(&self, id: &TaleId) -> Result<bool, TaleError> {
        let identity = self.require_identity()?;

        let in_flight = self.begin_mutation(id, "visibility")?;
        let requested = !self
            .get(id)
            .map(|t| t.is_public)
            .ok_or_else(|| TaleError::NotFound(id.clone()))?;

        let result = self
            .ctx
            .api
            .set_visibility(&identity.token, id, requested)
            .await;

        {
            let mut state = in_flight.finish();
            if result.is_ok() {
                if let Some(tale) = state.find_mut(id) {
                    tale.is_public = requested;
                }
            }
        }

        match result {
            Ok(()) => {
                let label = if requested { "public" } else { "private" };
                tracing::info!(%id, visibility = label, "tale visibility updated");
                self.ctx.notifier.success(&format!("Tale is now {label}"));
                Ok(requested)
            }
            Err(e) => {
                tracing::error!("Error updating tale: {:?}", e);
                self.ctx.notifier.error("Failed to update tale");
                Err(e.into())
            }
        }
    }

    /// Deletes a tale after the user confirms.
    pub async fn delete(&self, id: &TaleId, confirm: &dyn Confirm) -> Result<(), TaleError> {
        let identity = self.require_identity()?;

        if self.get(id).is_none() {
            return Err(TaleError::NotFound(id.clone()));
        }

        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(%id, "delete cancelled");
            return Err(TaleError::ConfirmationDeclined);
        }

        let in_flight = self.begin_mutation(id, "delete")?;

        let result = self.ctx.api.delete_tale(&identity.token, id).await;

        {
            let mut state = in_flight.finish();
            if result.is_ok() {
                if let Some(index) = state.tales.iter().position(|t| &t.id == id) {
                    state.tales.remove(index);
                }
            }
        }

        match result {
            Ok(()) => {
                tracing::info!(%id, "tale deleted");
                self.ctx.notifier.success("Tale deleted successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error deleting tale: {:?}", e);
                self.ctx.notifier.error("Failed to delete tale");
                Err(e.into())
            }
        }
    }
}
