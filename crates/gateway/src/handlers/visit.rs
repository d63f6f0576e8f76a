use crate::extract::{client_ip, resolve_route};
use crate::state::AppState;
use autoguard_application::use_cases::{OfferRoute, VisitOutcome};
use autoguard_domain::{Variant, VisitRequest};
use autoguard_infrastructure::pages::{internal_location, page_index_path};
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use std::net::SocketAddr;
use tracing::{error, warn};

const NOT_FOUND_BODY: &str = "<!doctype html>\n<html><head><title>Not Found</title></head>\n<body><h1>404 Not Found</h1></body></html>\n";

const CACHE_CONTROL_VALUE: &str = "no-store, no-cache, must-revalidate";

/// The catch-all route. Exactly one of two responses leaves this handler:
/// a 200 carrying the internal dispatch (or the streamed page itself), or
/// a generic 404. Visitors never observe a redirect.
pub async fn handle_visit(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let headers = request.headers();
    let uri = request.uri();

    let Some(route) = resolve_route(headers, uri.path()) else {
        return not_found();
    };

    let ip = client_ip(headers, peer.ip());
    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();

    let mut visit = VisitRequest::new(
        ip,
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default(),
        url,
    );
    if let Some(referer) = headers.get(header::REFERER).and_then(|v| v.to_str().ok()) {
        visit = visit.with_referer(referer);
    }
    if let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
        visit = visit.with_host(host);
    }

    match state.handle_visit.execute(route.clone(), visit).await {
        Ok(VisitOutcome::NotFound) => not_found(),
        Ok(VisitOutcome::Serve {
            subdomain,
            variant,
            log,
        }) => {
            // Fire-and-forget: the record is enqueued after the response is
            // built and a failed enqueue never affects the visitor.
            let use_case = state.handle_visit.clone();
            tokio::spawn(async move {
                use_case.log(*log).await;
            });

            dispatch(&state, &subdomain, variant).await
        }
        Err(e) => {
            error!(error = %e, "Visit handling failed");
            // Fail toward the Safe variant when the subdomain is known;
            // anything else is indistinguishable from a missing offer.
            match route {
                OfferRoute::Subdomain(subdomain) => dispatch(&state, &subdomain, Variant::B).await,
                OfferRoute::CustomDomain(_) => not_found(),
            }
        }
    }
}

/// Internal dispatch: either the `X-Accel-Redirect` contract with the
/// front proxy, or inline streaming of the same file when no proxy sits in
/// front. The URL-to-file mapping is identical either way.
async fn dispatch(state: &AppState, subdomain: &str, variant: Variant) -> Response {
    if state.accel_redirect {
        let location = internal_location(subdomain, variant);
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        headers.insert(
            "x-accel-redirect",
            HeaderValue::from_str(&location)
                .unwrap_or_else(|_| HeaderValue::from_static("/internal/pages/invalid")),
        );
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_VALUE),
        );
        headers.insert("x-accel-buffering", HeaderValue::from_static("no"));
        return response;
    }

    let path = page_index_path(&state.page_root, subdomain, variant);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => {
            let mut response = Html(html).into_response();
            response.headers_mut().insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static(CACHE_CONTROL_VALUE),
            );
            response
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Page file missing for dispatch");
            not_found()
        }
    }
}

pub fn not_found() -> Response {
    let mut response = (StatusCode::NOT_FOUND, Html(NOT_FOUND_BODY)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL_VALUE),
    );
    response
}
