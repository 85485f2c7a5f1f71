use std::sync::Arc;

use crate::{
    api::TaleApi, auth::session::IdentityProvider, nav::Navigator, notify::Notifier,
};

/// Collaborators shared by every controller.
#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<dyn TaleApi>,
    pub identity: Arc<dyn IdentityProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl AppContext {
    pub fn new(
        api: Arc<dyn TaleApi>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            identity,
            notifier,
            navigator,
        }
    }
}
