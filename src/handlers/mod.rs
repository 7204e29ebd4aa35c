// handlers/mod.rs - Handler tiers
//
// Public    (no session)          → /auth/*, /api/health
// Protected (session cookie)      → page routes behind the session guard
// Api       (bearer token)        → /api/* JSON endpoints

pub mod api;
pub mod protected;
pub mod public;

use axum::response::Redirect;

use crate::types::Tab;

/// Form posts answer with a 303 back to the tab they came from
pub(crate) fn back_to(tab: Tab) -> Redirect {
    Redirect::to(&tab.href())
}
