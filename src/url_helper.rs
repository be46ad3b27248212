use actix_web::error::UrlGenerationError;
use actix_web::HttpRequest;

#[derive(Debug, Clone, Copy, Default)]
pub struct UrlOptions {
    /// Carry the current request's query string over to the generated URL.
    pub reuse_query_params: bool,
}

/// Builds paths to named routes, relative to the application root.
pub struct UrlHelper<'a> {
    request: &'a HttpRequest,
}

impl<'a> UrlHelper<'a> {
    pub fn new(request: &'a HttpRequest) -> Self {
        Self { request }
    }

    pub fn generate<U, I>(
        &self,
        route_name: &str,
        route_params: U,
        options: UrlOptions,
    ) -> Result<String, UrlGenerationError>
    where
        U: IntoIterator<Item = I>,
        I: AsRef<str>,
    {
        let url = self.request.url_for(route_name, route_params)?;
        Ok(self.finish(url.path(), options))
    }

    pub fn generate_static(&self, route_name: &str) -> Result<String, UrlGenerationError> {
        let url = self.request.url_for_static(route_name)?;
        Ok(self.finish(url.path(), UrlOptions::default()))
    }

    fn finish(&self, path: &str, options: UrlOptions) -> String {
        let query = self.request.query_string();
        if options.reuse_query_params && !query.is_empty() {
            format!("{}?{}", path, query)
        } else {
            path.to_string()
        }
    }
}
