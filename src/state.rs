use crate::{config::Config, services::CommentTreeService};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub service: CommentTreeService,
    pub config: Config,
}

impl FromRef<AppState> for CommentTreeService {
    fn from_ref(state: &AppState) -> Self {
        state.service.clone()
    }
}
