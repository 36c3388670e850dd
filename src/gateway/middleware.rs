use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};
use futures::future::{ready, LocalBoxFuture, Ready};
use tracing::info;

use crate::auth::SESSION_COOKIE;
use crate::gateway::{decide, PathClass, RouteDecision, SessionValidator, CHAT_PATH, LOGIN_PATH};

/// Middleware applying the route-protection decision list to every
/// request: classify the path, run the upstream session check when
/// the rules call for one, then allow or redirect.
pub struct RouteGuard {
    validator: Arc<dyn SessionValidator>,
}

impl RouteGuard {
    pub fn new(validator: Arc<dyn SessionValidator>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardMiddleware {
            service: Rc::new(service),
            validator: Arc::clone(&self.validator),
        }))
    }
}

pub struct RouteGuardMiddleware<S> {
    service: Rc<S>,
    validator: Arc<dyn SessionValidator>,
}

impl<S, B> Service<ServiceRequest> for RouteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let validator = Arc::clone(&self.validator);

        Box::pin(async move {
            let class = PathClass::classify(req.path());
            let cookie = req
                .request()
                .cookie(SESSION_COOKIE)
                .map(|c| c.value().to_string());

            // The upstream check only runs where the rules consume it.
            let check = match (class, &cookie) {
                (PathClass::Protected, Some(token)) => Some(validator.check(token).await),
                _ => None,
            };

            match decide(class, cookie.is_some(), check) {
                RouteDecision::Allow => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                RouteDecision::RedirectToLogin { clear_cookie } => {
                    info!(
                        path = req.path(),
                        ?check,
                        "Redirecting unauthenticated request to login"
                    );
                    let mut response = HttpResponse::TemporaryRedirect()
                        .insert_header((header::LOCATION, LOGIN_PATH))
                        .finish();
                    if clear_cookie {
                        let mut removal = Cookie::new(SESSION_COOKIE, "");
                        removal.set_path("/");
                        response.add_removal_cookie(&removal).map_err(|e| {
                            actix_web::error::ErrorInternalServerError(e.to_string())
                        })?;
                    }
                    let (request, _) = req.into_parts();
                    Ok(ServiceResponse::new(request, response.map_into_right_body()))
                }
                RouteDecision::RedirectToChat => {
                    let response = HttpResponse::TemporaryRedirect()
                        .insert_header((header::LOCATION, CHAT_PATH))
                        .finish();
                    let (request, _) = req.into_parts();
                    Ok(ServiceResponse::new(request, response.map_into_right_body()))
                }
            }
        })
    }
}
