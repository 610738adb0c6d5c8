//! Acting identity as asserted by the upstream identity provider.
//!
//! The provider authenticates the caller and forwards `X-User-Id`,
//! `X-User-Role` and `X-User-Staff`; this service only reads them.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::domain::identity::{Actor, Role};
use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";
pub const USER_STAFF_HEADER: &str = "X-User-Staff";

fn header<'r>(req: &'r HttpRequest, name: &str) -> Option<&'r str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

pub fn actor_from_request(req: &HttpRequest) -> Result<Actor, AppError> {
    let id = header(req, USER_ID_HEADER)
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .ok_or_else(|| {
            AppError::Unauthorized("Authentication credentials were not provided.".to_string())
        })?;
    let role = match header(req, USER_ROLE_HEADER) {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|e| AppError::Unauthorized(format!("Invalid identity: {}", e)))?,
        None => Role::default(),
    };
    let is_staff = header(req, USER_STAFF_HEADER)
        .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    Ok(Actor::new(id, role, is_staff))
}

impl FromRequest for Actor {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(actor_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn reads_all_identity_headers() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, id.to_string()))
            .insert_header((USER_ROLE_HEADER, "seller"))
            .insert_header((USER_STAFF_HEADER, "true"))
            .to_http_request();
        let actor = actor_from_request(&req).expect("valid identity");
        assert_eq!(actor, Actor::new(id, Role::Seller, true));
    }

    #[test]
    fn defaults_to_non_staff_buyer() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, id.to_string()))
            .to_http_request();
        assert_eq!(actor_from_request(&req).expect("valid identity"), Actor::buyer(id));
    }

    #[test]
    fn missing_user_id_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(actor_from_request(&req), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn malformed_user_id_is_unauthorized() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-uuid"))
            .to_http_request();
        assert!(matches!(actor_from_request(&req), Err(AppError::Unauthorized(_))));
    }
}
