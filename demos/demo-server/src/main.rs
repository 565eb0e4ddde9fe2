use anyhow::Result;
use baton::prelude::*;
use tower_http::trace::TraceLayer;

mod modules;

use modules::items::controller::items_routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let routes = items_routes().get("/health", health_endpoint());
    for registration in routes.registrations() {
        tracing::info!(
            "Route {} {} -> {}::{}",
            registration.method(),
            registration.path(),
            registration.controller(),
            registration.operation()
        );
    }

    let app = routes.into_router().layer(TraceLayer::new_for_http());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Demo server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

struct HealthController;

/// Liveness route declared inline, outside the feature modules
fn health_endpoint() -> Endpoint {
    Endpoint::new(
        Arc::new(BindingRegistry::of::<HealthController>()),
        "check",
        operation_fn(|_args: Args, _context: CallContext| async move {
            Ok::<_, HandlerError>(serde_json::json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
            }))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_route_reports_the_running_version() {
        let router = Routes::new().get("/health", health_endpoint()).into_router();
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
