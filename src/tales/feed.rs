use std::collections::HashSet;

use parking_lot::Mutex;

use crate::{
    context::AppContext,
    error::TaleError,
    response::LikeStatus,
    tales::{in_flight::InFlight, ChildAge, Tale, TaleId},
};

/// Topics offered by the explore page's topic filter.
pub const TOPICS: [&str; 7] = [
    "Adventure",
    "Animals",
    "Fantasy",
    "Friendship",
    "Nature",
    "Space",
    "Other",
];

/// Explore page filters. Empty values match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilters {
    pub search: String,
    pub topic: String,
    pub age: Option<ChildAge>,
}

impl FeedFilters {
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || !self.topic.is_empty() || self.age.is_some()
    }

    pub fn matches(&self, tale: &Tale) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = tale.title.to_lowercase().contains(&needle)
            || tale.content.to_lowercase().contains(&needle);
        let matches_topic = self.topic.is_empty() || tale.topic == self.topic;
        let matches_age = self.age.map_or(true, |age| tale.child_age == age);

        matches_search && matches_topic && matches_age
    }
}

pub fn filter_tales(tales: &[Tale], filters: &FeedFilters) -> Vec<Tale> {
    tales
        .iter()
        .filter(|tale| filters.matches(tale))
        .cloned()
        .collect()
}

#[derive(Debug, Default)]
struct FeedState {
    tales: Vec<Tale>,
    filters: FeedFilters,
    loading: bool,
    pending: HashSet<TaleId>,
}

/// Public tales from every author (the explore page).
///
/// Like counts are never computed locally; each like replaces the entry's
/// counters with the values the server returns.
pub struct PublicFeed {
    ctx: AppContext,
    state: Mutex<FeedState>,
}

impl PublicFeed {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(FeedState::default()),
        }
    }

    pub fn tales(&self) -> Vec<Tale> {
        self.state.lock().tales.clone()
    }

    pub fn get(&self, id: &TaleId) -> Option<Tale> {
        self.state.lock().tales.iter().find(|t| &t.id == id).cloned()
    }

    pub fn filters(&self) -> FeedFilters {
        self.state.lock().filters.clone()
    }

    pub fn apply_filters(&self, filters: FeedFilters) {
        self.state.lock().filters = filters;
    }

    pub fn reset_filters(&self) {
        self.state.lock().filters = FeedFilters::default();
    }

    pub fn has_active_filters(&self) -> bool {
        self.state.lock().filters.is_active()
    }

    pub fn visible(&self) -> Vec<Tale> {
        let state = self.state.lock();
        filter_tales(&state.tales, &state.filters)
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn is_pending(&self, id: &TaleId) -> bool {
        self.state.lock().pending.contains(id)
    }

    pub async fn load(&self) -> Result<usize, TaleError> {
        {
            let mut state = self.state.lock();
            if state.loading {
                return Err(TaleError::Busy("load"));
            }
            state.loading = true;
        }
        let in_flight = InFlight::new(&self.state, |state: &mut FeedState| {
            state.loading = false;
        });

        let token = self.ctx.identity.token();
        let result = self.ctx.api.public_tales(token.as_deref()).await;

        let loaded = {
            let mut state = in_flight.finish();
            result.map(|tales| {
                state.tales = tales;
                state.tales.len()
            })
        };

        loaded.map_err(|e| {
            tracing::error!("Error fetching tales: {:?}", e);
            self.ctx.notifier.error("Failed to load tales");
            TaleError::from(e)
        })
    }

    pub async fn like(&self, id: &TaleId) -> Result<LikeStatus, TaleError> {
        let Some(identity) = self.ctx.identity.current() else {
            self.ctx.notifier.error("Please sign in to like tales");
            return Err(TaleError::Unauthenticated);
        };

        {
            let mut state = self.state.lock();
            if !state.tales.iter().any(|t| &t.id == id) {
                return Err(TaleError::NotFound(id.clone()));
            }
            if !state.pending.insert(id.clone()) {
                return Err(TaleError::Busy("like"));
            }
        }
        let liked_id = id.clone();
        let in_flight = InFlight::new(&self.state, move |state: &mut FeedState| {
            state.pending.remove(&liked_id);
        });

        let result = self.ctx.api.like_tale(&identity.token, id).await;

        {
            let mut state = in_flight.finish();
            if let Ok(status) = &result {
                if let Some(tale) = state.tales.iter_mut().find(|t| &t.id == id) {
                    tale.likes = status.likes;
                    tale.is_liked = status.is_liked;
                }
            }
        }

        match result {
            Ok(status) => {
                tracing::debug!(%id, likes = status.likes, liked = status.is_liked, "like recorded");
                self.ctx.notifier.success(if status.is_liked {
                    "Tale liked!"
                } else {
                    "Like removed"
                });
                Ok(status)
            }
            Err(e) => {
                tracing::error!("Error liking tale: {:?}", e);
                self.ctx.notifier.error("Failed to like tale");
                Err(e.into())
            }
        }
    }
}
