//! Endpoint and outbound-call extraction from source text.
//!
//! Both extractors are driven by tagged pattern tables evaluated in a fixed
//! order. Each entry pairs a family tag (web framework or client family) with
//! a compiled regex whose named groups say how to read a match:
//!
//! - `verb`: HTTP method, optional
//! - `path` / `url`: the captured path or URL
//! - `host` + `path`: an absolute URL split in two, rebuilt as `http://{host}{path}`

use crate::models::{EndpointKind, HttpMethod, ServiceCall, ServiceEndpoint};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Extensions scanned for endpoint declarations.
pub const ENDPOINT_EXTENSIONS: &[&str] = &["py", "js", "ts", "java", "kt", "scala", "rb", "php"];

/// Extensions scanned for outbound calls.
pub const CALL_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "java", "kt", "scala", "rb", "php",
];

/// A family tag paired with one compiled pattern.
#[derive(Debug)]
pub struct TaggedPattern {
    pub family: &'static str,
    pub regex: Regex,
}

fn compile(table: Vec<(&'static str, String)>) -> Vec<TaggedPattern> {
    table
        .into_iter()
        .map(|(family, pattern)| TaggedPattern {
            family,
            regex: Regex::new(&pattern).unwrap(),
        })
        .collect()
}

const VERBS: &str = "get|post|put|delete|patch";

/// Route declarations, in evaluation order.
pub static ENDPOINT_PATTERNS: Lazy<Vec<TaggedPattern>> = Lazy::new(|| {
    let verb = format!(r"(?P<verb>{})", VERBS);
    let quoted = r#"\(['"](?P<path>[^'"]+)['"]"#;
    compile(vec![
        ("flask", format!(r"@app\.route{}", quoted)),
        ("flask", format!(r"@blueprint\.route{}", quoted)),
        ("flask", format!(r"@api\.route{}", quoted)),
        ("fastapi", format!(r"@app\.{}{}", verb, quoted)),
        ("fastapi", format!(r"@router\.{}{}", verb, quoted)),
        ("fastapi", format!(r"@api\.{}{}", verb, quoted)),
        ("express", format!(r"app\.{}{}", verb, quoted)),
        ("express", format!(r"router\.{}{}", verb, quoted)),
        ("spring", format!(r"@RequestMapping{}", quoted)),
        ("spring", format!(r"@GetMapping{}", quoted)),
        ("spring", format!(r"@PostMapping{}", quoted)),
        ("spring", format!(r"@PutMapping{}", quoted)),
        ("spring", format!(r"@DeleteMapping{}", quoted)),
        ("django", format!(r"path{}", quoted)),
        ("django", format!(r"url{}", quoted)),
        ("django", format!(r"re_path{}", quoted)),
        ("rails", r#"get ['"](?P<path>[^'"]+)['"]"#.to_string()),
        ("rails", r#"post ['"](?P<path>[^'"]+)['"]"#.to_string()),
        ("rails", r#"put ['"](?P<path>[^'"]+)['"]"#.to_string()),
        ("rails", r#"delete ['"](?P<path>[^'"]+)['"]"#.to_string()),
        ("generic", r"api/(?P<path>[a-zA-Z0-9/_-]+)".to_string()),
        ("generic", r#"endpoints?['"]?\s*[=:]\s*['"](?P<path>[^'"]+)['"]"#.to_string()),
        ("generic", r#"routes?['"]?\s*[=:]\s*['"](?P<path>[^'"]+)['"]"#.to_string()),
    ])
});

/// Client calls and URL literals, in evaluation order.
pub static CALL_PATTERNS: Lazy<Vec<TaggedPattern>> = Lazy::new(|| {
    let verb = format!(r"(?P<verb>{})", VERBS);
    let quoted = r#"\(['"](?P<url>[^'"]+)['"]"#;
    compile(vec![
        ("python", format!(r"requests\.{}{}", verb, quoted)),
        ("python", format!(r"aiohttp\.{}{}", verb, quoted)),
        ("javascript", format!(r"fetch{}", quoted)),
        ("javascript", format!(r"axios\.{}{}", verb, quoted)),
        ("javascript", format!(r"http\.{}{}", verb, quoted)),
        ("java", format!(r"RestTemplate\(\)\..*{}", quoted)),
        (
            "java",
            format!(r"webClient\.(?:get|post|put|delete)\(\)\.(?:uri|url){}", quoted),
        ),
        ("java", format!(r"HttpClient\..*{}", quoted)),
        ("urls", r#"['"]https?://(?P<host>[^/'"]+)(?P<path>[^'"]+)['"]"#.to_string()),
        ("urls", r#"['"]http://localhost:?\d*(?P<url>[^'"]+)['"]"#.to_string()),
        ("urls", r#"['"]127\.0\.0\.1:?\d*(?P<url>[^'"]+)['"]"#.to_string()),
    ])
});

static RESOURCE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(/\w+)(/\{[^}]+\}|/:\w+)?(/\w+)?").unwrap());

static API_PATH_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"/api/", r"/v\d+/", r"/services?/", r"/\w+/\w+/", r"/graphql", r"/rest/"]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
});

/// Third-party, CDN and static-asset markers. Any hit rejects a URL.
const DENY_MARKERS: &[&str] = &[
    "googleapis.com", "amazonaws.com", "github.com", "gitlab.com",
    "cdn", "fonts.", "maps.", "static.", "assets.", "images.", "img.",
    "jquery", "bootstrap", "fontawesome", "polyfill", "gtag",
    ".png", ".jpg", ".gif", ".css", ".js", ".ico", ".svg", ".woff",
];

/// Internal-service markers. Any hit accepts a URL not already rejected.
const ALLOW_MARKERS: &[&str] = &[
    "api", "service", "srv", "microservice", "micro-service",
    "gateway", "http://localhost", "127.0.0.1", "internal", "endpoint",
    "/v1/", "/v2/", "/v3/", "/rest/", "/graphql", "grpc://",
];

/// Prefixes `/` unless the path is already absolute or URL-like.
pub fn normalize_endpoint_path(path: &str) -> String {
    if path.starts_with('/') || path.starts_with("http") {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Classifies an endpoint by the shape of its path.
///
/// # Example
///
/// ```
/// use project_analyzer_core::extraction::endpoint_kind;
/// use project_analyzer_core::EndpointKind;
///
/// assert_eq!(endpoint_kind("/healthz"), EndpointKind::Health);
/// assert_eq!(endpoint_kind("/orders/{id}"), EndpointKind::Resource);
/// assert_eq!(endpoint_kind("*"), EndpointKind::Other);
/// ```
pub fn endpoint_kind(path: &str) -> EndpointKind {
    let lower = path.to_lowercase();
    let has_any = |terms: &[&str]| terms.iter().any(|term| lower.contains(term));

    if has_any(&["/health", "/ping", "/status", "/heartbeat", "/alive"]) {
        EndpointKind::Health
    } else if has_any(&["/metrics", "/stats", "/telemetry", "/monitor"]) {
        EndpointKind::Metrics
    } else if has_any(&["/auth", "/login", "/token", "/oauth", "/session"]) {
        EndpointKind::Auth
    } else if has_any(&["webhook", "callback"]) {
        EndpointKind::Webhook
    } else if has_any(&["/config", "/settings", "/properties"]) {
        EndpointKind::Config
    } else if lower.contains("/admin") {
        EndpointKind::Admin
    } else if RESOURCE_SHAPE.is_match(path) {
        EndpointKind::Resource
    } else {
        EndpointKind::Other
    }
}

/// Decides whether a URL plausibly targets an internal service.
pub fn is_likely_service_url(url: &str) -> bool {
    let lower = url.to_lowercase();

    if DENY_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return false;
    }
    if ALLOW_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return true;
    }
    API_PATH_SHAPES.iter().any(|shape| shape.is_match(&lower))
}

/// Whether a match starting at `start` sits inside an absolute URL literal.
///
/// Used to keep the bare `api/...` pattern from reading the paths of URLs a
/// project calls as routes the project serves.
fn inside_url_literal(content: &str, start: usize) -> bool {
    let prefix = &content[..start];
    let token_start = prefix
        .char_indices()
        .rev()
        .find(|(_, c)| matches!(c, '"' | '\'' | '`') || c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    prefix[token_start..].contains("://")
}

fn method_of(caps: &Captures<'_>) -> HttpMethod {
    caps.name("verb")
        .map(|verb| HttpMethod::from_verb(verb.as_str()))
        .unwrap_or(HttpMethod::Unknown)
}

/// Extracts endpoint declarations from one file.
///
/// Results keep pattern order and contain no duplicates.
pub fn extract_endpoints(file_name: &str, content: &str) -> Vec<ServiceEndpoint> {
    let mut endpoints: Vec<ServiceEndpoint> = Vec::new();

    for pattern in ENDPOINT_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(content) {
            let Some(raw) = caps.name("path") else {
                continue;
            };
            if pattern.family == "generic" && inside_url_literal(content, raw.start()) {
                continue;
            }

            let path = normalize_endpoint_path(raw.as_str());
            let endpoint = ServiceEndpoint {
                kind: endpoint_kind(&path),
                path,
                method: method_of(&caps),
                file: file_name.to_string(),
                framework: pattern.family.to_string(),
            };
            if !endpoints.contains(&endpoint) {
                endpoints.push(endpoint);
            }
        }
    }

    endpoints
}

/// Extracts outbound calls from one file, keeping only likely service URLs.
///
/// Results keep pattern order and contain no duplicates.
pub fn extract_calls(file_name: &str, content: &str) -> Vec<ServiceCall> {
    let mut calls: Vec<ServiceCall> = Vec::new();

    for pattern in CALL_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(content) {
            let url = match (caps.name("host"), caps.name("path"), caps.name("url")) {
                (Some(host), Some(path), _) => format!("http://{}{}", host.as_str(), path.as_str()),
                (_, _, Some(url)) => url.as_str().to_string(),
                _ => continue,
            };
            if url.is_empty() || !is_likely_service_url(&url) {
                continue;
            }

            let call = ServiceCall {
                url,
                file: file_name.to_string(),
                family: pattern.family.to_string(),
            };
            if !calls.contains(&call) {
                calls.push(call);
            }
        }
    }

    calls
}
