//! API Router with Swagger UI

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::dto::*;
use crate::api::handlers::{availability, bookings, health, provisioning, AppState};
use crate::auth::middleware::{identity_middleware, AuthState};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        availability::get_availability,
        bookings::create_booking,
        bookings::update_booking_status,
        bookings::my_bookings,
        bookings::my_active_bookings,
        bookings::guest_booking_count,
        bookings::station_bookings,
        provisioning::provision_point,
    ),
    components(
        schemas(
            ApiResponse<String>,
            EmptyData,
            health::HealthResponse,
            SlotAvailabilityDto,
            CreateBookingRequest,
            UpdateStatusRequest,
            BookingDto,
            GuestCountDto,
            ProvisionRequest,
            ProvisionedDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check for uptime monitoring."),
        (name = "Availability", description = "Free-slot listings per charging point. Slots are half-hour windows numbered 1-48 across the day."),
        (name = "Bookings", description = "Slot reservations. A booking claims 1-4 contiguous slots atomically; concurrent requests for the same slots produce exactly one winner. Statuses: `confirmed` (active), `completed`, `cancelled` (both terminal)."),
        (name = "Provisioning", description = "One-shot slot inventory creation per charging point."),
    ),
    info(
        title = "EV Booking Service API",
        version = "1.0.0",
        description = "REST API for reserving charging slots at EV stations.

## Authentication

Obtain a JWT externally and pass it in the `Authorization: Bearer <token>` header.
Guest tokens carry `is_guest: true` and are limited to 2 bookings per day.

## Response format

All responses use the standard envelope:
```json
{\"success\": true, \"data\": {...}, \"error\": null}
```

On failure:
```json
{\"success\": false, \"data\": null, \"error\": \"description\"}
```

Slot conflicts (409) additionally include `conflicting_slots` with the taken slot numbers."
    )
)]
pub struct ApiDoc;

/// HTTP request metrics. Uses the matched route template so path labels
/// stay low-cardinality.
async fn track_http_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

/// Create the API router with all routes
pub fn create_api_router(
    app_state: AppState,
    auth_state: AuthState,
    metrics_handle: PrometheusHandle,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Booking routes require a resolved identity.
    let protected_routes = Router::new()
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/me", get(bookings::my_bookings))
        .route("/bookings/me/active", get(bookings::my_active_bookings))
        .route("/bookings/guest-count", get(bookings::guest_booking_count))
        .route(
            "/bookings/{id}/status",
            patch(bookings::update_booking_status),
        )
        .route(
            "/stations/{station_id}/bookings",
            get(bookings::station_bookings),
        )
        .route("/admin/points/provision", post(provisioning::provision_point))
        .layer(middleware::from_fn_with_state(
            auth_state,
            identity_middleware,
        ))
        .with_state(app_state.clone());

    let public_routes = Router::new()
        .route("/availability", get(availability::get_availability))
        .with_state(app_state);

    let swagger_routes =
        SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check))
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .nest("/api/v1", public_routes)
        .nest("/api/v1", protected_routes)
        .layer(middleware::from_fn(track_http_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
