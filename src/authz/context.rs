use actix_web::HttpRequest;

use super::state::AuthorizationState;

/// Everything the guards of one request share.
///
/// Built by the host once per request and passed down the guard chain by
/// mutable reference.
pub struct RequestContext {
    request: HttpRequest,
    state: AuthorizationState,
}

impl RequestContext {
    pub fn new(request: HttpRequest) -> Self {
        Self {
            request,
            state: AuthorizationState::new(),
        }
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// The request target used to identify the request in logs.
    pub fn target(&self) -> String {
        self.request.uri().to_string()
    }

    pub fn state_mut(&mut self) -> &mut AuthorizationState {
        &mut self.state
    }

    /// Marks the request as authorized by the executing guard. Only guards
    /// more general than it skip their check because of the mark.
    pub fn mark_authorized(&mut self) {
        self.state.mark_authorized();
    }

    /// Marks the request as unauthorized. Every guard still to run renders
    /// its failure, even if its own check would pass.
    pub fn mark_unauthorized(&mut self) {
        self.state.mark_unauthorized();
    }

    pub fn is_authorized(&self) -> bool {
        self.state.is_authorized()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.state.is_unauthorized()
    }
}
