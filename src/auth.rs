// src/auth.rs
// DOCUMENTATION: Request identity supplied by the upstream identity provider
// PURPOSE: Turn gateway headers into an explicit Identity passed to every operation

use crate::config::Config;
use crate::errors::PlacesError;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::User,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), PlacesError> {
        if !self.is_admin() {
            log::warn!("User {} attempted an admin operation", self.user_id);
            return Err(PlacesError::Forbidden);
        }
        Ok(())
    }

    /// Owner-only operations (edit)
    pub fn require_owner(&self, owner_id: Uuid) -> Result<(), PlacesError> {
        if self.user_id != owner_id {
            return Err(PlacesError::Forbidden);
        }
        Ok(())
    }

    /// Owner-or-admin operations (delete)
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> Result<(), PlacesError> {
        if self.user_id != owner_id && !self.is_admin() {
            return Err(PlacesError::Forbidden);
        }
        Ok(())
    }

    /// Read identity headers from a request
    /// DOCUMENTATION: Returns Ok(None) when no user header is present at all
    pub fn from_headers(req: &HttpRequest) -> Result<Option<Self>, PlacesError> {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let Some(raw_id) = header(USER_ID_HEADER) else {
            return Ok(None);
        };

        let user_id = Uuid::parse_str(raw_id).map_err(|_| {
            log::warn!("Rejected malformed {} header", USER_ID_HEADER);
            PlacesError::Unauthorized
        })?;

        let role = match header(USER_ROLE_HEADER).map(str::to_ascii_lowercase).as_deref() {
            None | Some("user") => Role::User,
            Some("admin") => {
                verify_admin_token(header(ADMIN_TOKEN_HEADER), req)?;
                Role::Admin
            }
            Some(other) => {
                return Err(PlacesError::InvalidInput(format!("Unknown role '{}'", other)));
            }
        };

        Ok(Some(Identity { user_id, role }))
    }
}

/// Admin role claims must carry the shared admin token
fn verify_admin_token(token: Option<&str>, req: &HttpRequest) -> Result<(), PlacesError> {
    let config = req.app_data::<web::Data<Config>>().ok_or_else(|| {
        log::error!("Config missing from application data");
        PlacesError::Forbidden
    })?;

    let token = token.ok_or_else(|| {
        log::warn!("Admin request without token");
        PlacesError::Unauthorized
    })?;

    if token != config.admin_token {
        log::warn!("Admin request with invalid token");
        return Err(PlacesError::Forbidden);
    }

    Ok(())
}

impl FromRequest for Identity {
    type Error = PlacesError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Identity::from_headers(req).and_then(|identity| identity.ok_or(PlacesError::Unauthorized)))
    }
}

/// Identity for public endpoints that personalize output when the caller is known
#[derive(Debug, Clone, Copy)]
pub struct MaybeIdentity(pub Option<Identity>);

impl MaybeIdentity {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.map(|identity| identity.user_id)
    }
}

impl FromRequest for MaybeIdentity {
    type Error = PlacesError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Identity::from_headers(req).map(MaybeIdentity))
    }
}

/// Identity that has already passed the admin check
#[derive(Debug, Clone, Copy)]
pub struct AdminIdentity(pub Identity);

impl FromRequest for AdminIdentity {
    type Error = PlacesError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = Identity::from_headers(req)
            .and_then(|identity| identity.ok_or(PlacesError::Unauthorized))
            .and_then(|identity| identity.require_admin().map(|_| AdminIdentity(identity)));
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::test_config;
    use actix_web::test::TestRequest;

    fn request(headers: &[(&'static str, &str)]) -> HttpRequest {
        let mut req = TestRequest::default().app_data(web::Data::new(test_config()));
        for (name, value) in headers {
            req = req.insert_header((*name, value.to_string()));
        }
        req.to_http_request()
    }

    #[actix_rt::test]
    async fn test_regular_user_identity() {
        let user_id = Uuid::new_v4();
        let req = request(&[(USER_ID_HEADER, &user_id.to_string())]);

        let identity = Identity::extract(&req).await.unwrap();
        assert_eq!(identity, Identity::user(user_id));
        assert!(!identity.is_admin());
    }

    #[actix_rt::test]
    async fn test_missing_identity_is_unauthorized() {
        let req = request(&[]);
        assert!(matches!(
            Identity::extract(&req).await,
            Err(PlacesError::Unauthorized)
        ));

        let optional = MaybeIdentity::extract(&req).await.unwrap();
        assert!(optional.user_id().is_none());
    }

    #[actix_rt::test]
    async fn test_malformed_user_id_is_unauthorized() {
        let req = request(&[(USER_ID_HEADER, "not-a-uuid")]);
        assert!(matches!(
            MaybeIdentity::extract(&req).await,
            Err(PlacesError::Unauthorized)
        ));
    }

    #[actix_rt::test]
    async fn test_admin_requires_matching_token() {
        let user_id = Uuid::new_v4().to_string();

        let without_token = request(&[(USER_ID_HEADER, &user_id), (USER_ROLE_HEADER, "admin")]);
        assert!(matches!(
            Identity::extract(&without_token).await,
            Err(PlacesError::Unauthorized)
        ));

        let wrong_token = request(&[
            (USER_ID_HEADER, &user_id),
            (USER_ROLE_HEADER, "admin"),
            (ADMIN_TOKEN_HEADER, "guess"),
        ]);
        assert!(matches!(
            Identity::extract(&wrong_token).await,
            Err(PlacesError::Forbidden)
        ));

        let valid = request(&[
            (USER_ID_HEADER, &user_id),
            (USER_ROLE_HEADER, "Admin"),
            (ADMIN_TOKEN_HEADER, "secret-admin"),
        ]);
        let admin = AdminIdentity::extract(&valid).await.unwrap();
        assert!(admin.0.is_admin());
    }

    #[actix_rt::test]
    async fn test_admin_extractor_rejects_regular_users() {
        let req = request(&[(USER_ID_HEADER, &Uuid::new_v4().to_string())]);
        assert!(matches!(
            AdminIdentity::extract(&req).await,
            Err(PlacesError::Forbidden)
        ));
    }

    #[test]
    fn test_ownership_rules() {
        let owner = Uuid::new_v4();
        let stranger = Identity::user(Uuid::new_v4());
        let admin = Identity::admin(Uuid::new_v4());

        assert!(Identity::user(owner).require_owner(owner).is_ok());
        assert!(matches!(stranger.require_owner(owner), Err(PlacesError::Forbidden)));
        assert!(matches!(admin.require_owner(owner), Err(PlacesError::Forbidden)));

        assert!(admin.require_owner_or_admin(owner).is_ok());
        assert!(Identity::user(owner).require_owner_or_admin(owner).is_ok());
        assert!(matches!(
            stranger.require_owner_or_admin(owner),
            Err(PlacesError::Forbidden)
        ));
    }
}
