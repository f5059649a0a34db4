//! Authentication and role resolution
//!
//! Maps an authenticated principal to one of four roles and answers the
//! permission questions every mutating action asks. The super-admin
//! identity comes from configuration and can never be demoted; the
//! shared-passcode guest always resolves to `viewer`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::config::settings::AuthConfig;
use crate::database::store::UserStore;
use crate::models::{CreateUserRequest, Event, User, UserRole};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::logging::log_admin_action;

/// Identities with a fixed role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleConfig {
    pub super_admin_email: String,
    pub guest_email: String,
}

impl From<&AuthConfig> for RoleConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            super_admin_email: config.super_admin_email.clone(),
            guest_email: config.guest_email.clone(),
        }
    }
}

/// Resolve the effective role of `email`.
///
/// Order: configured super admin, guest viewer, the stored role column,
/// then plain `user`.
pub fn resolve_role(email: Option<&str>, config: &RoleConfig, stored_role: Option<&str>) -> UserRole {
    let Some(email) = email else {
        return UserRole::User;
    };

    if email == config.super_admin_email {
        return UserRole::SuperAdmin;
    }

    if email == config.guest_email {
        return UserRole::Viewer;
    }

    match stored_role {
        Some("admin") => UserRole::Admin,
        Some("viewer") => UserRole::Viewer,
        _ => UserRole::User,
    }
}

/// Identity supplied by the auth provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// A principal together with its resolved role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub principal: Principal,
    pub role: UserRole,
}

impl Session {
    pub fn email(&self) -> &str {
        &self.principal.email
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    pub fn is_viewer(&self) -> bool {
        self.role == UserRole::Viewer
    }
}

/// Require an authenticated session
pub fn require_session(session: Option<&Session>) -> Result<&Session> {
    session.ok_or(EventDeskError::Unauthorized)
}

/// Require an authenticated session that may change data
pub fn require_editor(session: Option<&Session>) -> Result<&Session> {
    let session = require_session(session)?;
    if session.is_viewer() {
        return Err(EventDeskError::Forbidden("Viewers cannot modify data".to_string()));
    }
    Ok(session)
}

/// Require a session with admin dashboard access
pub fn require_admin_access(session: Option<&Session>) -> Result<&Session> {
    let session = require_session(session)?;
    if !session.role.can_access_admin() {
        return Err(EventDeskError::Forbidden("Admin access required".to_string()));
    }
    Ok(session)
}

/// Require the super admin
pub fn require_super_admin<'a>(session: Option<&'a Session>, action: &str) -> Result<&'a Session> {
    let session = require_session(session)?;
    if !session.is_super_admin() {
        return Err(EventDeskError::Forbidden(format!("Only Super Admin can {}", action)));
    }
    Ok(session)
}

/// Authentication service for role lookup and role management
#[derive(Clone)]
pub struct AuthService<S> {
    store: S,
    roles: RoleConfig,
    guest_passcode: String,
}

impl<S: UserStore> AuthService<S> {
    pub fn new(store: S, config: &AuthConfig) -> Self {
        Self {
            store,
            roles: RoleConfig::from(config),
            guest_passcode: config.guest_passcode.clone(),
        }
    }

    pub fn role_config(&self) -> &RoleConfig {
        &self.roles
    }

    /// Shared-passcode login; yields the guest viewer identity
    pub fn passcode_login(&self, passcode: &str) -> Option<Principal> {
        if passcode != self.guest_passcode {
            warn!("Rejected passcode login");
            return None;
        }

        info!("Guest viewer signed in with passcode");
        Some(Principal {
            id: "viewer-guest".to_string(),
            email: self.roles.guest_email.clone(),
            name: Some("Guest Admin".to_string()),
            image: None,
        })
    }

    /// Record an OAuth sign-in, creating or refreshing the user row.
    /// The guest identity never gets a row.
    pub async fn sign_in(&self, principal: Principal) -> Result<Session> {
        if principal.email != self.roles.guest_email {
            self.store
                .upsert_user(CreateUserRequest {
                    email: principal.email.clone(),
                    name: principal.name.clone(),
                    image: principal.image.clone(),
                })
                .await?;
        }

        self.session_for(principal).await
    }

    /// Resolve the role of a principal into a session
    pub async fn session_for(&self, principal: Principal) -> Result<Session> {
        let role = self.get_user_role(Some(&principal.email)).await?;
        debug!(email = %principal.email, role = %role, "Session resolved");
        Ok(Session { principal, role })
    }

    /// Effective role of an email, consulting the stored role column only
    /// when no fixed identity matches
    pub async fn get_user_role(&self, email: Option<&str>) -> Result<UserRole> {
        let fixed = resolve_role(email, &self.roles, None);
        if fixed != UserRole::User {
            return Ok(fixed);
        }

        let Some(email) = email else {
            return Ok(UserRole::User);
        };

        let user = self.store.find_user_by_email(email).await?;
        Ok(resolve_role(Some(email), &self.roles, user.as_ref().map(|u| u.role.as_str())))
    }

    pub async fn can_access_admin(&self, email: Option<&str>) -> Result<bool> {
        Ok(self.get_user_role(email).await?.can_access_admin())
    }

    pub fn is_super_admin(&self, email: Option<&str>) -> bool {
        email == Some(self.roles.super_admin_email.as_str())
    }

    /// Whether `email` belongs to the event's creator. Events without a
    /// creator and emails without a user row are never owned.
    pub async fn is_owner(&self, event: &Event, email: &str) -> Result<bool> {
        let Some(creator_id) = event.creator_id else {
            return Ok(false);
        };

        let user = self.store.find_user_by_email(email).await?;
        Ok(user.map_or(false, |u| u.id == creator_id))
    }

    /// Flip the stored role between `admin` and `user`. Always fails for
    /// the super admin and for unknown emails.
    pub async fn set_user_admin(&self, email: &str, is_admin: bool) -> Result<bool> {
        if self.is_super_admin(Some(email)) {
            warn!(email = %email, "Refusing to change the super admin role");
            return Ok(false);
        }

        let role = if is_admin { UserRole::Admin } else { UserRole::User };
        self.store.set_user_role(email, role.as_str()).await
    }

    /// Role change requested from the admin users page
    pub async fn update_user_role(&self, actor: Option<&Session>, email: &str, make_admin: bool) -> Result<bool> {
        let actor = require_super_admin(actor, "change user roles")?;

        if email.trim().is_empty() {
            return Err(EventDeskError::InvalidInput("Email is required".to_string()));
        }

        let changed = self.set_user_admin(email, make_admin).await?;
        log_admin_action(
            actor.email(),
            if make_admin { "grant_admin" } else { "revoke_admin" },
            Some(email),
            Some(if changed { "applied" } else { "refused" }),
        );
        Ok(changed)
    }

    /// Users with their effective roles, for the admin users page
    pub async fn list_users(&self, actor: Option<&Session>) -> Result<Vec<(User, UserRole)>> {
        require_admin_access(actor)?;

        let users = self.store.list_users().await?;
        Ok(users
            .into_iter()
            .map(|user| {
                let role = resolve_role(Some(&user.email), &self.roles, Some(&user.role));
                (user, role)
            })
            .collect())
    }

    /// User id behind an email, if any
    pub async fn user_id_for(&self, email: &str) -> Result<Option<Uuid>> {
        Ok(self.store.find_user_by_email(email).await?.map(|u| u.id))
    }
}
