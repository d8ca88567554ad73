//! Request-scoped context handed to resources.

use crate::http::request::WebRequest;
use crate::http::response::WebResponse;
use crate::resource::response::ResourceResponse;
use crate::resource::settings::ResourceSettings;

/// The request, the response sink and the settings snapshot for one call.
pub struct Attributes<'a> {
    request: &'a WebRequest,
    response: &'a mut dyn WebResponse,
    settings: &'a ResourceSettings,
}

impl<'a> Attributes<'a> {
    pub fn new(
        request: &'a WebRequest,
        response: &'a mut dyn WebResponse,
        settings: &'a ResourceSettings,
    ) -> Self {
        Self {
            request,
            response,
            settings,
        }
    }

    pub fn request(&self) -> &'a WebRequest {
        self.request
    }

    pub fn response(&mut self) -> &mut (dyn WebResponse + 'a) {
        &mut *self.response
    }

    pub fn settings(&self) -> &'a ResourceSettings {
        self.settings
    }

    /// A fresh descriptor carrying the configured default cache duration.
    pub fn new_resource_response(&self) -> ResourceResponse {
        ResourceResponse::new(self.settings.default_cache_duration())
    }
}
