/// Per-request scope handed to every collaborator call.
///
/// The business id scopes all reads and writes; the token is forwarded as a
/// bearer credential when present.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub business_id: i64,
    pub auth_token: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn new(business_id: i64, auth_token: Option<String>) -> Self {
        Self {
            business_id,
            auth_token,
        }
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("business_id", &self.business_id)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
