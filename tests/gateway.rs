//! End-to-end route protection: RouteGuard wired to the real HTTP
//! validator, with the backend's who-am-I endpoint played by wiremock.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{test, web, App, HttpResponse};
use talkdeck_server::gateway::{HttpSessionValidator, RouteGuard};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_COOKIE: &str = "sessionId";

macro_rules! guarded_app {
    ($backend_uri:expr) => {
        test::init_service(
            App::new()
                .wrap(RouteGuard::new(Arc::new(HttpSessionValidator::new(
                    $backend_uri,
                ))))
                .route(
                    "/chat",
                    web::get().to(|| async { HttpResponse::Ok().body("chat page") }),
                )
                .route(
                    "/login",
                    web::get().to(|| async { HttpResponse::Ok().body("login page") }),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn test_valid_session_reaches_protected_page() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&backend)
        .await;

    let app = guarded_app!(backend.uri());
    let req = test::TestRequest::get()
        .uri("/chat")
        .cookie(Cookie::new(SESSION_COOKIE, "tok123"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 200);
}

#[actix_web::test]
async fn test_rejected_session_redirects_and_clears_cookie() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&backend)
        .await;

    let app = guarded_app!(backend.uri());
    let req = test::TestRequest::get()
        .uri("/chat")
        .cookie(Cookie::new(SESSION_COOKIE, "stale"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 307);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("stale cookie must be cleared")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("sessionId="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[actix_web::test]
async fn test_unreachable_backend_logs_user_out() {
    let backend = MockServer::start().await;
    let uri = backend.uri();
    drop(backend);

    let app = guarded_app!(uri);
    let req = test::TestRequest::get()
        .uri("/chat")
        .cookie(Cookie::new(SESSION_COOKIE, "tok123"))
        .to_request();
    let res = test::call_service(&app, req).await;

    // Backend outage collapses to the same user-visible outcome as an
    // invalid session.
    assert_eq!(res.status(), 307);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");
}

#[actix_web::test]
async fn test_no_cookie_skips_the_upstream_call() {
    let backend = MockServer::start().await;
    // Zero expected calls: without a cookie the guard must not
    // validate anything upstream.
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let app = guarded_app!(backend.uri());
    let req = test::TestRequest::get().uri("/chat").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 307);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");
}
