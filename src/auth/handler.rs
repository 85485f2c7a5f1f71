use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use validator::Validate;

use crate::{
    auth::{session::Session, Credentials, Identity, RegisterRequest},
    context::AppContext,
    error::TaleError,
    nav::Route,
};

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Sign-up, sign-in and sign-out against the API, writing the outcome into
/// the shared [`Session`].
pub struct AccountController {
    ctx: AppContext,
    session: Arc<Session>,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AccountController {
    pub fn new(ctx: AppContext, session: Arc<Session>) -> Self {
        Self {
            ctx,
            session,
            busy: AtomicBool::new(false),
        }
    }

    fn begin(&self) -> Result<BusyGuard<'_>, TaleError> {
        if self.busy.swap(true, Ordering::Acquire) {
            return Err(TaleError::Busy("account"));
        }
        Ok(BusyGuard(&self.busy))
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Identity, TaleError> {
        request.validate()?;
        let _guard = self.begin()?;

        if let Err(e) = self.ctx.api.register(&request).await {
            tracing::error!("Sign up error: {:?}", e);
            self.ctx
                .notifier
                .error(e.server_message().unwrap_or(GENERIC_FAILURE));
            return Err(e.into());
        }
        tracing::info!(email = %request.email, "account registered");

        let credentials = Credentials::from(&request);
        match self.ctx.api.login(&credentials).await {
            Ok(auth) => {
                let identity = Identity::new(auth.user, auth.token);
                self.session.sign_in(identity.clone());
                self.ctx.notifier.success("Account created successfully!");
                self.ctx.navigator.navigate(Route::Dashboard);
                Ok(identity)
            }
            Err(e) => {
                tracing::error!("Sign in after registration failed: {:?}", e);
                self.ctx
                    .notifier
                    .error("Error signing in after registration");
                Err(e.into())
            }
        }
    }

    pub async fn sign_in(&self, credentials: Credentials) -> Result<Identity, TaleError> {
        credentials.validate()?;
        let _guard = self.begin()?;

        match self.ctx.api.login(&credentials).await {
            Ok(auth) => {
                let identity = Identity::new(auth.user, auth.token);
                self.session.sign_in(identity.clone());
                self.ctx.notifier.success("Signed in successfully!");
                self.ctx.navigator.navigate(Route::Dashboard);
                Ok(identity)
            }
            Err(e) => {
                tracing::error!("Sign in error: {:?}", e);
                let message = match e.status() {
                    Some(400 | 401 | 403 | 404) => "Invalid email or password",
                    _ => GENERIC_FAILURE,
                };
                self.ctx.notifier.error(message);
                Err(e.into())
            }
        }
    }

    pub fn sign_out(&self) {
        self.session.sign_out();
        self.ctx.navigator.navigate(Route::Home);
    }
}
