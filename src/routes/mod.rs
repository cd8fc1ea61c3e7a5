use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod health;
pub mod matches;
pub mod players;
pub mod sse;

/// Assemble every route tree and bind the shared state.
pub fn router(state: SharedState) -> Router<()> {
    Router::<SharedState>::new()
        .merge(health::router())
        .merge(sse::router())
        .merge(matches::router())
        .merge(players::router())
        .merge(docs::router())
        .with_state(state)
}
