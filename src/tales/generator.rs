use parking_lot::Mutex;
use validator::Validate;

use crate::{
    context::AppContext,
    error::TaleError,
    nav::Route,
    tales::{in_flight::InFlight, Draft, GenerationRequest, Tale},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Generating,
    Reviewing,
    Saving,
}

impl FormPhase {
    fn name(&self) -> &'static str {
        match self {
            FormPhase::Idle => "idle",
            FormPhase::Generating => "generating",
            FormPhase::Reviewing => "reviewing",
            FormPhase::Saving => "saving",
        }
    }
}

#[derive(Debug)]
struct FormState {
    phase: FormPhase,
    draft: Option<Draft>,
}

/// Drives the create page: generate a draft, review it, then save or
/// discard it. Only one generation or save is in flight at a time.
pub struct GenerationController {
    ctx: AppContext,
    state: Mutex<FormState>,
}

impl GenerationController {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(FormState {
                phase: FormPhase::Idle,
                draft: None,
            }),
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.state.lock().phase
    }

    pub fn draft(&self) -> Option<Draft> {
        self.state.lock().draft.clone()
    }

    pub fn is_generating(&self) -> bool {
        self.phase() == FormPhase::Generating
    }

    pub fn is_saving(&self) -> bool {
        self.phase() == FormPhase::Saving
    }

    pub async fn submit(&self, request: GenerationRequest) -> Result<Draft, TaleError> {
        request.validate()?;

        let Some(identity) = self.ctx.identity.current() else {
            self.ctx.notifier.error("Please sign in to create a tale");
            self.ctx.navigator.navigate(Route::SignIn);
            return Err(TaleError::Unauthenticated);
        };

        {
            let mut state = self.state.lock();
            if matches!(state.phase, FormPhase::Generating | FormPhase::Saving) {
                tracing::debug!(phase = state.phase.name(), "generation rejected");
                return Err(TaleError::Busy("generation"));
            }
            state.phase = FormPhase::Generating;
            state.draft = None;
        }
        let in_flight = InFlight::new(&self.state, |state: &mut FormState| {
            state.phase = FormPhase::Idle;
        });

        tracing::info!(topic = %request.topic, age = ?request.child_age, "generating tale");

        let result = self.ctx.api.generate(&identity.token, &request).await;
        let mut state = in_flight.finish();

        match result {
            Ok(generated) => {
                let draft = Draft::from_generated(generated, request.is_public);
                state.draft = Some(draft.clone());
                state.phase = FormPhase::Reviewing;
                drop(state);
                self.ctx.notifier.success("Tale generated successfully!");
                Ok(draft)
            }
            Err(e) => {
                drop(state);
                tracing::error!("Generation error: {:?}", e);
                self.ctx
                    .notifier
                    .error(e.server_message().unwrap_or("Failed to generate tale"));
                Err(e.into())
            }
        }
    }

    /// Persists the draft. On failure, or when the call is abandoned, the
    /// draft stays so the save can be retried without generating again.
    pub async fn save(&self) -> Result<Option<Tale>, TaleError> {
        let Some(identity) = self.ctx.identity.current() else {
            self.ctx.notifier.error("Please sign in to save your tale");
            return Err(TaleError::Unauthenticated);
        };

        let draft = {
            let mut state = self.state.lock();
            match (state.phase, state.draft.clone()) {
                (FormPhase::Reviewing, Some(draft)) => {
                    state.phase = FormPhase::Saving;
                    draft
                }
                (FormPhase::Generating | FormPhase::Saving, _) => {
                    return Err(TaleError::Busy("save"));
                }
                (phase, _) => {
                    return Err(TaleError::InvalidState {
                        action: "save",
                        phase: phase.name(),
                    });
                }
            }
        };

        let in_flight = InFlight::new(&self.state, |state: &mut FormState| {
            state.phase = FormPhase::Reviewing;
        });

        let result = self.ctx.api.create_tale(&identity.token, &draft).await;
        let mut state = in_flight.finish();

        match result {
            Ok(saved) => {
                state.draft = None;
                state.phase = FormPhase::Idle;
                drop(state);
                tracing::info!(title = %draft.title, is_public = draft.is_public, "tale saved");
                self.ctx.notifier.success("Tale saved to your collection!");
                self.ctx.navigator.navigate(Route::Dashboard);
                Ok(saved)
            }
            Err(e) => {
                drop(state);
                tracing::error!("Save error: {:?}", e);
                self.ctx.notifier.error("Failed to save tale");
                Err(e.into())
            }
        }
    }

    /// "Create another": drops the draft without a network call.
    pub fn discard(&self) -> Result<(), TaleError> {
        let mut state = self.state.lock();
        if state.phase != FormPhase::Reviewing {
            return Err(TaleError::InvalidState {
                action: "discard",
                phase: state.phase.name(),
            });
        }
        state.draft = None;
        state.phase = FormPhase::Idle;
        Ok(())
    }
}
