use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::address;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/",
            post(address::create_address).get(address::get_addresses),
        )
        .route(
            "/:id",
            put(address::update_address).delete(address::delete_address),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Division listings are public
        .route("/provinces", get(address::get_provinces))
        .route("/districts/:province_id", get(address::get_districts))
        .route("/wards/:district_id", get(address::get_wards))
        .merge(protected)
}
