//! Route table for one entity's CRUD surface

use crate::core::entity::Entity;
use crate::server::controller::{self, CrudState};
use axum::Router;
use axum::routing::{get, post};

/// Build the routes served under `/<EntityKind>`
///
/// Static segments are registered alongside `/{id}` and win route matching:
/// - GET / - paginated list; POST / - create
/// - GET /count, /exists, /random, /first, /combo - query helpers
/// - GET|PUT|PATCH|DELETE /{id} - single-row operations
/// - POST|DELETE /{id}/{association}/{target} - link and unlink
///
/// `Default` supplies the payload shell the delete handler binds the path
/// id into.
pub fn crud_routes<E: Entity + Default>(state: CrudState<E>) -> Router {
    Router::new()
        .route("/", get(controller::list::<E>).post(controller::create::<E>))
        .route("/count", get(controller::count::<E>))
        .route("/exists", get(controller::exists::<E>))
        .route("/random", get(controller::random::<E>))
        .route("/first", get(controller::first::<E>))
        .route("/combo", get(controller::combo::<E>))
        .route(
            "/{id}",
            get(controller::find_one::<E>)
                .put(controller::update::<E>)
                .patch(controller::update::<E>)
                .delete(controller::delete::<E>),
        )
        .route(
            "/{id}/{association}/{target}",
            post(controller::associate::<E>).delete(controller::dissociate::<E>),
        )
        .with_state(state)
}
