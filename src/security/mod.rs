//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Matched request whose service declares a realm:
//!     → Authorizers (lookup by realm, checked at registration)
//!     → Authorizer::authorize(token, realm, method, response)
//!     → true: continue to binding / false: respond with what the authorizer set
//! ```
//!
//! # Design Decisions
//! - Fail closed: a realm without an authorizer never registers
//! - The authorizer owns the rejection response; the dispatcher adds nothing

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::endpoint::types::HttpMethod;
use crate::http::response::ResponseBuilder;

/// Access decision for one realm.
pub trait Authorizer: Send + Sync {
    /// Return false to reject; set the rejection status/body on `response` first.
    fn authorize(
        &self,
        token: Option<&str>,
        realm: &str,
        method: HttpMethod,
        response: &mut ResponseBuilder,
    ) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(Option<&str>, &str, HttpMethod, &mut ResponseBuilder) -> bool + Send + Sync,
{
    fn authorize(
        &self,
        token: Option<&str>,
        realm: &str,
        method: HttpMethod,
        response: &mut ResponseBuilder,
    ) -> bool {
        self(token, realm, method, response)
    }
}

/// Realm keyed authorizer table.
#[derive(Clone, Default)]
pub struct Authorizers {
    table: HashMap<String, Arc<dyn Authorizer>>,
}

impl Authorizers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, realm: impl Into<String>, authorizer: Arc<dyn Authorizer>) {
        self.table.insert(realm.into(), authorizer);
    }

    pub fn get(&self, realm: &str) -> Option<&Arc<dyn Authorizer>> {
        self.table.get(realm)
    }

    pub fn contains(&self, realm: &str) -> bool {
        self.table.contains_key(realm)
    }
}

impl fmt::Debug for Authorizers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_closure_authorizer() {
        let mut authorizers = Authorizers::new();
        authorizers.register(
            "staff",
            Arc::new(
                |token: Option<&str>, _: &str, _: HttpMethod, response: &mut ResponseBuilder| {
                    if token == Some("letmein") {
                        return true;
                    }
                    response.set_status(StatusCode::UNAUTHORIZED);
                    false
                },
            ),
        );

        let authorizer = authorizers.get("staff").unwrap();
        let mut response = ResponseBuilder::new();
        assert!(authorizer.authorize(Some("letmein"), "staff", HttpMethod::Get, &mut response));
        assert!(!authorizer.authorize(None, "staff", HttpMethod::Get, &mut response));
        assert_eq!(response.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(!authorizers.contains("admin"));
    }
}
