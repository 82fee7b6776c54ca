//! Bearer token middleware.
//!
//! Wrap any scope that needs a logged-in user with [`AuthenticationMiddlewareFactory`]. It checks the
//! `Authorization: Bearer` token, refuses deactivated users, and stores the [`JwtClaims`] in the request extensions
//! where handlers (and the ACL middleware) pick them up.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{
    auth::{bearer_token, TokenVerifier},
    errors::{AuthError, ServerError},
};

pub struct AuthenticationMiddlewareFactory {
    verifier: TokenVerifier,
}

impl AuthenticationMiddlewareFactory {
    pub fn new(verifier: TokenVerifier) -> Self {
        AuthenticationMiddlewareFactory { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthenticationMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AuthenticationMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationMiddlewareService { verifier: self.verifier.clone(), service: Rc::new(service) }))
    }
}

pub struct AuthenticationMiddlewareService<S> {
    verifier: TokenVerifier,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let claims = bearer_token(req.request()).and_then(|token| self.verifier.verify(token));
        Box::pin(async move {
            let claims = claims.map_err(|e| {
                debug!("🔐️ Request to {} refused. {e}", req.path());
                ServerError::AuthenticationError(e)
            })?;
            if !claims.is_active {
                info!("🔐️ Inactive user {} tried to access {}", claims.sub, req.path());
                return Err(ServerError::AuthenticationError(AuthError::Forbidden("User is inactive".into())).into());
            }
            trace!("🔐️ Authenticated user {}", claims.sub);
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
