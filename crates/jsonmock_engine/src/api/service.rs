/* 📖 # What does every response look like?

Every response, success or failure, carries the same JSON envelope:

    {"result": {"code": 404, "message": "Not Found",
                "description": "Nothing matches the given URI"}}

A successful GET adds the matched data under `"data"`. Clients of a mock
server usually only look at the status, so the envelope mirrors it in the body
for tools that cannot read response codes.
*/

use jsonmock_base::pal::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpService, HttpStatusCode,
};
use jsonmock_base::{JsonMockError, JsonMockResult};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::processor::RequestProcessor;

/// Status part of the envelope.
#[derive(Serialize)]
struct ResultBody {
    code: u16,
    message: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
struct Envelope {
    result: ResultBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl Envelope {
    fn new(status: HttpStatusCode, data: Option<Value>) -> Self {
        Self {
            result: ResultBody {
                code: status.as_u16(),
                message: status.reason_phrase(),
                description: status.description(),
            },
            data,
        }
    }
}

/// HTTP service serving the mock API from a request processor.
///
/// ```
/// use jsonmock_base::pal::http::{HttpMethod, HttpRequest, HttpService};
/// use jsonmock_engine::{Document, InMemoryStore, MockApiService, RequestProcessor, StoreHandle};
///
/// let document = Document::parse(r#"{"items": []}"#).unwrap();
/// let store = StoreHandle::new(InMemoryStore::new(document));
/// let service = MockApiService::new(RequestProcessor::new(store).unwrap());
///
/// let response = service
///     .handle_request(HttpRequest::new(HttpMethod::Get, "/items"))
///     .unwrap();
/// assert_eq!(response.status().as_u16(), 200);
/// ```
#[derive(Debug, Clone)]
pub struct MockApiService {
    processor: RequestProcessor,
}

impl MockApiService {
    pub fn new(processor: RequestProcessor) -> Self {
        Self { processor }
    }

    pub fn processor(&self) -> &RequestProcessor {
        &self.processor
    }

    fn dispatch(&self, request: &HttpRequest) -> (HttpStatusCode, Option<Value>) {
        let path = request.path();
        let outcome = match request.method() {
            HttpMethod::Get => self.processor.get(path).map(Some),
            HttpMethod::Post => self
                .processor
                .post(path, request.body().as_bytes())
                .map(|_record| None),
            _ => return (HttpStatusCode::NotImplemented, None),
        };
        match outcome {
            Ok(data) => (HttpStatusCode::Ok, data),
            Err(e) => {
                debug!(reason = %e, "request rejected");
                (e.status(), None)
            }
        }
    }

    /// Serialize the envelope and wrap it in an HTTP response.
    fn serialize_json_response(
        status: HttpStatusCode,
        data: Option<Value>,
    ) -> JsonMockResult<HttpResponse> {
        serde_json::to_string(&Envelope::new(status, data))
            .map(|json| HttpResponse::json(status, json))
            .map_err(|e| {
                Box::new(
                    JsonMockError::json(e).context("Failed to serialize response envelope"),
                )
            })
    }
}

impl HttpService for MockApiService {
    fn handle_request(&self, request: HttpRequest) -> JsonMockResult<HttpResponse> {
        let (status, data) = self.dispatch(&request);
        info!(
            method = %request.method(),
            path = request.path(),
            status = status.as_u16(),
            "handled request"
        );
        Self::serialize_json_response(status, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::store::{InMemoryStore, StoreHandle};
    use expect_test::expect;
    use jsonmock_base::pal::http::HttpServerConfig;
    use jsonmock_base::{MockPal, Pal};

    fn create_test_service(content: &str) -> MockApiService {
        let store = StoreHandle::new(InMemoryStore::new(Document::parse(content).unwrap()));
        MockApiService::new(RequestProcessor::new(store).unwrap())
    }

    fn body_of(response: &HttpResponse) -> String {
        response.body().as_string().unwrap()
    }

    #[test]
    fn test_get_collection() {
        let service = create_test_service(r#"{"items": [{"id": 1, "name": "a"}]}"#);
        let response = service
            .handle_request(HttpRequest::new(HttpMethod::Get, "/items"))
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::Ok);
        assert_eq!(
            response.headers().get("Content-Type"),
            Some("application/json")
        );
        expect![[r#"{"result":{"code":200,"message":"OK","description":"Request fulfilled, document follows"},"data":[{"id":1,"name":"a"}]}"#]]
            .assert_eq(&body_of(&response));
    }

    #[test]
    fn test_get_empty_collection_includes_data() {
        let service = create_test_service(r#"{"items": []}"#);
        let response = service
            .handle_request(HttpRequest::new(HttpMethod::Get, "/items"))
            .unwrap();

        expect![[r#"{"result":{"code":200,"message":"OK","description":"Request fulfilled, document follows"},"data":[]}"#]]
            .assert_eq(&body_of(&response));
    }

    #[test]
    fn test_get_not_found() {
        let service = create_test_service(r#"{"items": []}"#);
        let response = service
            .handle_request(HttpRequest::new(HttpMethod::Get, "/orders"))
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::NotFound);
        expect![[r#"{"result":{"code":404,"message":"Not Found","description":"Nothing matches the given URI"}}"#]]
            .assert_eq(&body_of(&response));
    }

    #[test]
    fn test_post_success_has_no_data() {
        let service = create_test_service(r#"{"items": [{"id": 1}]}"#);
        let response = service
            .handle_request(
                HttpRequest::new(HttpMethod::Post, "/items").with_body(r#"{"name": "b"}"#),
            )
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::Ok);
        expect![[r#"{"result":{"code":200,"message":"OK","description":"Request fulfilled, document follows"}}"#]]
            .assert_eq(&body_of(&response));
        assert_eq!(
            service.processor().get("/items").unwrap(),
            serde_json::json!([{"id": 1}, {"name": "b", "id": 2}])
        );
    }

    #[test]
    fn test_post_errors() {
        let service = create_test_service(r#"{"users/:name": [], "config": {}}"#);

        let response = service
            .handle_request(HttpRequest::new(HttpMethod::Post, "/users").with_body("{}"))
            .unwrap();
        expect![[r#"{"result":{"code":400,"message":"Bad Request","description":"Bad request syntax or unsupported method"}}"#]]
            .assert_eq(&body_of(&response));

        let response = service
            .handle_request(HttpRequest::new(HttpMethod::Post, "/config").with_body("{}"))
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::Conflict);
        expect![[r#"{"result":{"code":409,"message":"Conflict","description":"Request conflict"}}"#]]
            .assert_eq(&body_of(&response));
    }

    #[test]
    fn test_other_methods_not_implemented() {
        let service = create_test_service(r#"{"items": []}"#);
        let response = service
            .handle_request(HttpRequest::new(HttpMethod::Delete, "/items"))
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::NotImplemented);
        expect![[r#"{"result":{"code":501,"message":"Not Implemented","description":"Server does not support this operation"}}"#]]
            .assert_eq(&body_of(&response));
    }

    #[test]
    fn test_unknown_method_gets_envelope() {
        let service = create_test_service(r#"{"items": []}"#);
        let response = service
            .handle_request(HttpRequest::new(HttpMethod::parse("TRACE"), "/items"))
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::NotImplemented);
        expect![[r#"{"result":{"code":501,"message":"Not Implemented","description":"Server does not support this operation"}}"#]]
            .assert_eq(&body_of(&response));
    }

    #[test]
    fn test_served_through_mock_pal() {
        let mock = MockPal::new();
        let service = create_test_service(r#"{"items:name": [{"id": 1, "name": "a"}]}"#);
        let handle = mock
            .start_http_server(Box::new(service), HttpServerConfig::new("0.0.0.0").with_port(80))
            .unwrap();

        let response = mock
            .simulate_request(handle.port(), HttpRequest::new(HttpMethod::Get, "/items/a?x=y"))
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::Ok);
        assert!(body_of(&response).ends_with(r#""data":[{"id":1,"name":"a"}]}"#));

        let response = mock
            .simulate_request(handle.port(), HttpRequest::new(HttpMethod::Get, "/items/z"))
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::NotFound);
    }
}
