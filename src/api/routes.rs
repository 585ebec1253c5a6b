//! API Routes
//!
//! Configures the Axum router. Routes are split into two groups guarded by
//! [`require_user`] and [`require_manager`]; `/health` is open.

use std::path::Path;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers::*;
use crate::auth::{require_manager, require_user};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Auth: bearer token per route group
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
///
/// When `static_dir` is set, unmatched paths are served from it.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let user_routes = Router::new()
        .route("/staff-members", get(list_staff_members))
        .route("/staff-members/:payroll_number", get(get_staff_member))
        .route("/areas", get(list_areas))
        .route("/cleaning-task-templates/:id", get(get_template))
        .route("/cleaning-task-template-lists", get(list_template_lists))
        .route("/cleaning-task-template-lists/:id", get(get_template_list))
        .route(
            "/cleaning-task-template-lists/:id/cleaning-task-template-ids",
            get(list_template_ids),
        )
        .route(
            "/cleaning-task-template-lists/:id/cleaning-task-templates",
            get(list_templates),
        )
        .route("/cleaning-task-lists", get(list_task_lists))
        .route("/cleaning-task-lists/:id", get(get_task_list))
        .route("/cleaning-task-lists/:id/cleaning-tasks", get(list_tasks))
        .route(
            "/cleaning-task-lists/:id/cleaning-tasks/:task_id/complete",
            put(mark_task_complete),
        )
        .route(
            "/cleaning-task-lists/:id/cleaning-tasks/:task_id/incomplete",
            put(mark_task_incomplete),
        )
        .route(
            "/cleaning-task-lists/:id/staff-member-signature",
            put(sign_as_staff_member),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_user,
        ));

    let manager_routes = Router::new()
        .route("/cleaning-task-templates", post(create_template))
        .route("/cleaning-task-template-lists", post(create_template_list))
        .route(
            "/cleaning-task-template-lists/:id",
            delete(delete_template_list),
        )
        .route(
            "/cleaning-task-template-lists/:id/cleaning-task-templates",
            post(create_template_in_list),
        )
        .route(
            "/cleaning-task-template-lists/:id/cleaning-task-templates/:template_id",
            post(add_template_to_list).delete(remove_template_from_list),
        )
        .route("/cleaning-task-lists", post(create_task_list))
        .route("/cleaning-task-lists/:id", delete(delete_task_list))
        .route("/cleaning-task-lists/:id/cleaning-tasks", post(create_task))
        .route(
            "/cleaning-task-lists/:id/manager-signature",
            put(sign_as_manager),
        )
        .route(
            "/cleaning-task-lists/:id/staff-member",
            put(assign_staff_member),
        )
        .route("/cleaning-tasks/:id", delete(delete_task))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_manager,
        ));

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .merge(user_routes)
        .merge(manager_routes);

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Authenticator;
    use crate::cleaning::CleaningService;
    use crate::config::AuthConfig;
    use crate::db::Gateway;
    use crate::staff::StaticStaffDirectory;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app(auth: Authenticator) -> Router {
        let service = CleaningService::new(
            Gateway::in_memory(),
            Arc::new(StaticStaffDirectory::default()),
        );
        create_router(AppState::new(service, auth), None)
    }

    fn jwt_auth() -> Authenticator {
        Authenticator::from_config(&AuthConfig {
            jwt_secret: Some("route-secret".to_string()),
            ..AuthConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint_is_open() {
        let app = create_test_app(jwt_auth());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_user_route_requires_token() {
        let app = create_test_app(jwt_auth());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/areas")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_same_path_different_scopes() {
        let app = create_test_app(Authenticator::Disabled);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/cleaning-task-lists")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cleaning-task-lists")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"cleaningTaskTemplateListId":99,"date":"2999-01-01"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let app = create_test_app(Authenticator::Disabled);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cleaning-task-lists/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_without_static_dir() {
        let app = create_test_app(Authenticator::Disabled);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nowhere")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
