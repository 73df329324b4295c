use axum::{Router, routing::{get, post}, middleware};
use std::sync::Arc;

use crate::handler::lead_handler::{
    create_lead_handler,
    delete_lead_handler,
    get_lead_handler,
    list_leads_handler,
    update_lead_handler,
};
use crate::middlewares::admin_middleware::{admin_auth, AdminAuthState};
use crate::model::Lead;
use crate::service::lead_service::LeadServiceImpl;

/// Intake and moderation routes for one lead kind, mounted at `E::ROUTE`.
pub fn lead_router<E: Lead>(service: Arc<LeadServiceImpl<E>>, admin_auth_state: Arc<AdminAuthState>) -> Router {
    let item_path = format!("{}/{{id}}", E::ROUTE);

    // Public route
    let public = Router::new()
        .route(E::ROUTE, post(create_lead_handler::<E>));

    // Admin-protected routes
    let admin = Router::new()
        .route(E::ROUTE, get(list_leads_handler::<E>))
        .route(
            &item_path,
            get(get_lead_handler::<E>)
                .patch(update_lead_handler::<E>)
                .delete(delete_lead_handler::<E>),
        )
        .route_layer(middleware::from_fn_with_state(admin_auth_state, admin_auth));

    public
        .merge(admin)
        .with_state(service)
}
