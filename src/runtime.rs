//! Runtime boundary types referenced by generated code and by analyzed
//! application source.
//!
//! Nothing in this module hosts requests. The generator emits dispatch
//! functions, a metadata registry, and authentication impls; those artifacts
//! need concrete types to name (methods, outcomes, responses, the raw request
//! surface), and analyzed programs need the traits the discovery and
//! resolution stages match on (`Handler`, `RequestValidator`,
//! `PrepareRequest`). The actual server that feeds [`RequestParts`] and mounts
//! routes through [`RouteHost`] lives outside this crate.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// HTTP methods a route declaration may name.
///
/// The set is fixed: the route attribute's second positional argument must be
/// one of these identifiers, and generated registration tables use the same
/// enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl Method {
    /// Parse a method identifier as written in a route attribute.
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            "CONNECT" => Some(Method::Connect),
            "OPTIONS" => Some(Method::Options),
            "TRACE" => Some(Method::Trace),
            "PATCH" => Some(Method::Patch),
            _ => None,
        }
    }

    /// Upper-case wire name, also the variant spelling used in attributes.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
        }
    }

    /// Variant path as emitted into generated source (`Method::Post`).
    #[must_use]
    pub fn variant(&self) -> &'static str {
        match self {
            Method::Get => "Get",
            Method::Post => "Post",
            Method::Put => "Put",
            Method::Delete => "Delete",
            Method::Connect => "Connect",
            Method::Options => "Options",
            Method::Trace => "Trace",
            Method::Patch => "Patch",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named status-code constants for application error construction.
///
/// Analyzed code writes `RequestError::new(status::NOT_FOUND, "...")`; the
/// inference walker resolves the trailing path segment through the same name
/// table these constants come from.
pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const ACCEPTED: u16 = 202;
    pub const NO_CONTENT: u16 = 204;
    pub const BAD_REQUEST: u16 = 400;
    pub const UNAUTHORIZED: u16 = 401;
    pub const PAYMENT_REQUIRED: u16 = 402;
    pub const FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const METHOD_NOT_ALLOWED: u16 = 405;
    pub const NOT_ACCEPTABLE: u16 = 406;
    pub const REQUEST_TIMEOUT: u16 = 408;
    pub const CONFLICT: u16 = 409;
    pub const GONE: u16 = 410;
    pub const PRECONDITION_FAILED: u16 = 412;
    pub const PAYLOAD_TOO_LARGE: u16 = 413;
    pub const UNSUPPORTED_MEDIA_TYPE: u16 = 415;
    pub const UNPROCESSABLE_ENTITY: u16 = 422;
    pub const TOO_MANY_REQUESTS: u16 = 429;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
    pub const NOT_IMPLEMENTED: u16 = 501;
    pub const BAD_GATEWAY: u16 = 502;
    pub const SERVICE_UNAVAILABLE: u16 = 503;
    pub const GATEWAY_TIMEOUT: u16 = 504;
}

/// An application-level error carrying the HTTP status it should surface as.
///
/// Domain error helpers return these; generated dispatch translates an
/// [`Outcome::Error`] into a problem response with the carried status and
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub status: u16,
    pub message: String,
}

impl RequestError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl std::error::Error for RequestError {}

/// A single validation failure reported by a [`RequestValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Minimal host response value: status plus optional JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Option<Value>,
}

impl Response {
    pub fn ok(body: Value) -> Self {
        Self {
            status: status::OK,
            body: Some(body),
        }
    }

    #[must_use]
    pub fn no_content() -> Self {
        Self {
            status: status::NO_CONTENT,
            body: None,
        }
    }

    pub fn accepted(body: Option<Value>) -> Self {
        Self {
            status: status::ACCEPTED,
            body,
        }
    }

    #[must_use]
    pub fn bad_request() -> Self {
        Self {
            status: status::BAD_REQUEST,
            body: None,
        }
    }

    /// Problem response for a handler error outcome.
    pub fn problem(status: u16, message: &str) -> Self {
        Self {
            status,
            body: Some(serde_json::json!({ "status": status, "detail": message })),
        }
    }

    /// 400 response listing per-field validation failures.
    pub fn validation_problem(errors: Vec<FieldError>) -> Self {
        let body = serde_json::to_value(&errors).unwrap_or(Value::Null);
        Self {
            status: status::BAD_REQUEST,
            body: Some(serde_json::json!({ "status": status::BAD_REQUEST, "errors": body })),
        }
    }
}

/// What a handler invocation produced: a host response or a typed error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(Response),
    Error(RequestError),
}

/// Marker response type for handlers declared without a response payload.
/// Serializes as `null`; as the default for [`Handler`]'s response parameter
/// it must satisfy the same `Serialize` bound as any payload type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoBody;

/// Request handler. Route dispatch locates the single implementation whose
/// first type argument is the route type and calls [`Handler::invoke`] with
/// the bound request.
///
/// The provided methods are the only sanctioned ways to build an [`Outcome`]
/// inside `invoke`; response inference reads their call sites by name.
pub trait Handler<Req, Res = NoBody>
where
    Res: Serialize,
{
    fn invoke(&self, request: Req) -> Outcome;

    /// 200 with a JSON payload.
    fn ok(&self, value: Res) -> Outcome {
        match serde_json::to_value(&value) {
            Ok(body) => Outcome::Success(Response::ok(body)),
            Err(e) => Outcome::Error(RequestError::new(
                status::INTERNAL_SERVER_ERROR,
                e.to_string(),
            )),
        }
    }

    /// 204 with no payload.
    fn no_content(&self) -> Outcome {
        Outcome::Success(Response::no_content())
    }

    /// 202 with an optional payload.
    fn accepted(&self, value: Res) -> Outcome {
        match serde_json::to_value(&value) {
            Ok(body) => Outcome::Success(Response::accepted(Some(body))),
            Err(e) => Outcome::Error(RequestError::new(
                status::INTERNAL_SERVER_ERROR,
                e.to_string(),
            )),
        }
    }

    /// Error outcome from an already-built [`RequestError`].
    fn error(&self, error: RequestError) -> Outcome {
        Outcome::Error(error)
    }

    /// Error outcome from a status code and message.
    fn error_status(&self, status: u16, message: &str) -> Outcome {
        Outcome::Error(RequestError::new(status, message))
    }
}

/// Optional request rewrite step run after binding and before validation.
pub trait PrepareRequest: Sized {
    fn prepare(self, parts: &RequestParts) -> Self;
}

/// Request validator matched to a route type by its type argument.
pub trait RequestValidator<T> {
    fn validate(&self, value: &T) -> Vec<FieldError>;
}

/// Generated per-route impl exposing the authenticated-user member so hosts
/// and filters can read it without knowing the concrete route type.
pub trait AuthenticatedRoute {
    fn set_authenticated_user_id(&mut self, value: String);
    fn authenticated_user_id(&self) -> &str;
}

/// Externally registered filter applied to every mounted route's metadata.
pub trait EndpointFilter {
    fn handle(&self, route: &RouteMetadata);
}

/// Dispatch function signature emitted per route.
pub type DispatchFn = fn(&RequestParts) -> Response;

/// Registration surface the generated mount function drives.
pub trait RouteHost {
    fn register(&mut self, template: &'static str, method: Method, dispatch: DispatchFn);
}

/// An uploaded form file as surfaced to bound request members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Form payload: scalar fields plus uploaded files. Dispatch for a form-bound
/// route fetches this once and reads every form member from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    values: HashMap<String, String>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl FormData {
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// First file uploaded under a field name.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name).and_then(|v| v.first())
    }

    /// All files uploaded under a field name.
    #[must_use]
    pub fn files(&self, name: &str) -> Vec<UploadedFile> {
        self.files.get(name).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.files.is_empty()
    }
}

/// Raw per-request values generated dispatch reads from.
///
/// Owned maps rather than live server handles; a host fills one per request,
/// and tests build them directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParts {
    route_values: HashMap<String, String>,
    query_values: HashMap<String, Vec<String>>,
    header_values: HashMap<String, String>,
    form: FormData,
    json_body: Option<Value>,
    current_user_id: String,
}

impl RequestParts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_route_value(&mut self, name: &str, value: impl Into<String>) {
        self.route_values.insert(name.to_string(), value.into());
    }

    pub fn add_query_value(&mut self, name: &str, value: impl Into<String>) {
        self.query_values
            .entry(name.to_string())
            .or_default()
            .push(value.into());
    }

    pub fn set_header_value(&mut self, name: &str, value: impl Into<String>) {
        self.header_values.insert(name.to_string(), value.into());
    }

    pub fn set_form_value(&mut self, name: &str, value: impl Into<String>) {
        self.form.values.insert(name.to_string(), value.into());
    }

    pub fn add_form_file(&mut self, name: &str, file: UploadedFile) {
        self.form
            .files
            .entry(name.to_string())
            .or_default()
            .push(file);
    }

    pub fn set_json_body(&mut self, body: Value) {
        self.json_body = Some(body);
    }

    pub fn set_current_user_id(&mut self, id: impl Into<String>) {
        self.current_user_id = id.into();
    }

    #[must_use]
    pub fn route_value(&self, name: &str) -> Option<&str> {
        self.route_values.get(name).map(String::as_str)
    }

    /// First value for a query key.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query_values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// All values for a repeated query key.
    #[must_use]
    pub fn query_values(&self, name: &str) -> Vec<String> {
        self.query_values.get(name).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.header_values.get(name).map(String::as_str)
    }

    /// The form payload; empty for routes without form data.
    #[must_use]
    pub fn form(&self) -> &FormData {
        &self.form
    }

    /// Deserialize the JSON body into a bound request type.
    pub fn json_body<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.json_body
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Identity injected by the host's authentication layer.
    #[must_use]
    pub fn current_user_id(&self) -> String {
        self.current_user_id.clone()
    }
}

/// How a bound member fetches its raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FetchSource {
    None,
    Route,
    Query,
    Header,
    Form,
}

impl FetchSource {
    /// Variant path as emitted into generated source.
    #[must_use]
    pub fn variant(&self) -> &'static str {
        match self {
            FetchSource::None => "None",
            FetchSource::Route => "Route",
            FetchSource::Query => "Query",
            FetchSource::Header => "Header",
            FetchSource::Form => "Form",
        }
    }
}

/// How the request body is consumed, derived from members and method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BodyKind {
    None,
    Json,
    Form,
}

impl BodyKind {
    #[must_use]
    pub fn variant(&self) -> &'static str {
        match self {
            BodyKind::None => "None",
            BodyKind::Json => "Json",
            BodyKind::Form => "Form",
        }
    }
}

/// Registry metadata for one bound member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyMeta {
    pub name: &'static str,
    pub type_name: &'static str,
    pub required: bool,
    pub fetch: FetchSource,
    pub summary: &'static str,
    pub hidden: bool,
}

/// Registry metadata for one mounted route; docs tooling and endpoint filters
/// consume these by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMetadata {
    pub template: &'static str,
    pub method: Method,
    pub summary: &'static str,
    pub description: &'static str,
    pub body: BodyKind,
    pub request_type: &'static str,
    pub response_type: &'static str,
    pub handler_type: &'static str,
    pub validator_type: Option<&'static str>,
    pub requires_auth: bool,
    pub auth_policy: &'static str,
    pub properties: Vec<PropertyMeta>,
    pub responses: Vec<(u16, Option<&'static str>)>,
}
