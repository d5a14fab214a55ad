use log::error;
use serde::Deserialize;
use serde_json::{Value, json};
use tiny_http::Method;

use crate::agent::TaskRouter;

pub const EXECUTE_PATH: &str = "/agent/execute";

#[derive(Debug, Deserialize)]
struct AgentRequest {
    input_data: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    fn detail(status: u16, detail: &str) -> Self {
        Self::new(status, json!({ "detail": detail }))
    }
}

/// Maps one HTTP request onto the router. Bodies that are not a JSON object
/// with a string `input_data` (including non UTF-8 bytes) get 422. Router
/// errors are logged and reported as a plain 500.
pub fn handle(router: &TaskRouter, method: &Method, url: &str, body: &[u8]) -> Reply {
    let path = url.split('?').next().unwrap_or(url);
    if path != EXECUTE_PATH {
        return Reply::detail(404, "Not Found");
    }
    if *method != Method::Post {
        return Reply::detail(405, "Method Not Allowed");
    }

    let request: AgentRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => return Reply::detail(422, &format!("invalid request body: {e}")),
    };

    match router.execute(&request.input_data) {
        Ok(result) => Reply::new(200, json!({ "result": result })),
        Err(e) => {
            error!("Agent task failed: {e:#}");
            Reply::detail(500, "Internal Server Error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{FALLBACK_MESSAGE, IntentDetector, ServiceAdapter};
    use crate::domain::intent::Intent;
    use anyhow::{Result, anyhow};

    struct KeywordDetector;

    impl IntentDetector for KeywordDetector {
        fn detect(&self, input: &str) -> Result<Intent> {
            Ok(if input.contains("weather") {
                Intent::Tool1
            } else if input.contains("explode") {
                Intent::Tool3
            } else {
                Intent::Unknown
            })
        }
    }

    struct Echo;

    impl ServiceAdapter for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn execute(&self, input: &str) -> Result<String> {
            Ok(format!("echo: {input}"))
        }
    }

    struct Broken;

    impl ServiceAdapter for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn execute(&self, _input: &str) -> Result<String> {
            Err(anyhow!("connection refused to 10.0.0.7"))
        }
    }

    fn router() -> TaskRouter {
        TaskRouter::new(
            Box::new(KeywordDetector),
            Box::new(Echo),
            Box::new(Echo),
            Box::new(Broken),
        )
    }

    #[test]
    fn routed_result_is_wrapped() {
        let reply = handle(
            &router(),
            &Method::Post,
            EXECUTE_PATH,
            br#"{"input_data":"weather in Lyon"}"#,
        );
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, json!({ "result": "echo: weather in Lyon" }));
    }

    #[test]
    fn unknown_intent_is_still_a_success() {
        let reply = handle(
            &router(),
            &Method::Post,
            "/agent/execute?trace=1",
            br#"{"input_data":"unknown gibberish"}"#,
        );
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["result"], FALLBACK_MESSAGE);
    }

    #[test]
    fn downstream_failure_is_a_generic_500() {
        let reply = handle(
            &router(),
            &Method::Post,
            EXECUTE_PATH,
            br#"{"input_data":"explode"}"#,
        );
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body, json!({ "detail": "Internal Server Error" }));
    }

    #[test]
    fn missing_input_field_is_unprocessable() {
        let reply = handle(&router(), &Method::Post, EXECUTE_PATH, br#"{"input":"x"}"#);
        assert_eq!(reply.status, 422);

        let reply = handle(&router(), &Method::Post, EXECUTE_PATH, b"not json");
        assert_eq!(reply.status, 422);
    }

    #[test]
    fn non_utf8_body_is_unprocessable() {
        let reply = handle(&router(), &Method::Post, EXECUTE_PATH, b"\xff\xfe");
        assert_eq!(reply.status, 422);
        assert!(reply.body["detail"].as_str().is_some());
    }

    #[test]
    fn wrong_route_or_method() {
        assert_eq!(handle(&router(), &Method::Post, "/other", b"{}").status, 404);
        assert_eq!(handle(&router(), &Method::Get, EXECUTE_PATH, b"").status, 405);
    }
}
