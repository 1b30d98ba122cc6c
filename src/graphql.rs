//! graphql wire types
//!
//! the request payload sent to the server and the response envelope
//! classifier. a response is classified by the first matching key:
//! `data`, then `errors`, then `error`.

use crate::error::{Error, Result, DEFAULT_ERROR_STATUS};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// graphql request payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlRequest {
    /// operation text
    pub query: String,
    /// operation variables, omitted when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

impl GraphQlRequest {
    pub fn new(query: impl Into<String>, variables: Option<Value>) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

/// parsed graphql response envelope
#[derive(Debug, Clone)]
pub struct Envelope {
    data: Option<Value>,
    errors: Option<Value>,
    error: Option<Value>,
    body: String,
}

impl Envelope {
    /// parse a raw response body.
    ///
    /// fails with [`Error::ParseResponse`] when the body is not a json object.
    /// keys holding `null` are treated as absent.
    pub fn parse(body: impl Into<String>) -> Result<Self> {
        let body = body.into();
        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(err) => {
                return Err(Error::parse_response(
                    format!("invalid json response: {err}"),
                    body,
                ))
            }
        };

        let Value::Object(mut object) = value else {
            return Err(Error::parse_response("response is not a json object", body));
        };

        let mut take = |key: &str| object.remove(key).filter(|value| !value.is_null());
        Ok(Self {
            data: take("data"),
            errors: take("errors"),
            error: take("error"),
            body,
        })
    }

    /// raw response body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// decide the outcome of the response.
    ///
    /// the first structured entry in `errors` wins; an `errors` array with no
    /// structured entry becomes an [`Error::Request`] carrying the whole array.
    pub fn classify(self) -> Result<Payload> {
        if let Some(data) = self.data {
            debug!("graphql response carries data");
            return Ok(Payload {
                data,
                body: self.body,
            });
        }

        if let Some(errors) = self.errors {
            let Some(entries) = errors.as_array() else {
                return Err(Error::parse_response("errors is not an array", self.body));
            };
            if entries.iter().any(|entry| !entry.is_object()) {
                return Err(Error::parse_response(
                    "errors contains a non-object entry",
                    self.body,
                ));
            }

            if let Some(err) = entries.iter().find_map(structured_error) {
                debug!(code = err.code(), "graphql response carries a structured error");
                return Err(err);
            }

            let message = entries
                .first()
                .and_then(|entry| entry.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("graphql error")
                .to_string();
            debug!(count = entries.len(), "graphql response carries unstructured errors");
            return Err(Error::request(message, errors));
        }

        if let Some(error) = self.error {
            let message = match error {
                Value::String(message) => message,
                other => other.to_string(),
            };
            debug!(%message, "graphql response carries a generic error");
            return Err(Error::request(message.clone(), Value::String(message)));
        }

        Err(Error::parse_response(
            "response has no data, errors, or error",
            self.body,
        ))
    }
}

/// successful response data
#[derive(Debug, Clone)]
pub struct Payload {
    data: Value,
    body: String,
}

impl Payload {
    /// the full `data` object
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    /// deserialize the sub-tree of `data` keyed by `root`
    pub fn extract_root<T: DeserializeOwned>(mut self, root: &str) -> Result<T> {
        if root.is_empty() {
            return Err(Error::parse_response(
                "operation root field could not be resolved",
                self.body,
            ));
        }

        let Some(value) = self.data.get_mut(root).map(Value::take) else {
            return Err(Error::parse_response(
                format!("root field `{root}` missing from data"),
                self.body,
            ));
        };

        serde_json::from_value(value).map_err(|err| {
            Error::parse_response(
                format!("cannot decode root field `{root}`: {err}"),
                self.body,
            )
        })
    }
}

/// read the `extensions.error` convention from a graphql error entry.
///
/// `status_code` defaults to 400 and `metadata` is only read when a status is
/// present.
fn structured_error(entry: &Value) -> Option<Error> {
    let error = entry.get("extensions")?.get("error")?.as_object()?;
    let code = error.get("error_code")?.as_str()?.to_string();

    let status = error
        .get("status_code")
        .and_then(Value::as_u64)
        .and_then(|status| u16::try_from(status).ok());
    let Some(status) = status else {
        return Some(Error::StructuredRequest {
            code,
            status: DEFAULT_ERROR_STATUS,
            metadata: None,
        });
    };

    let metadata: Option<Map<String, Value>> =
        error.get("metadata").and_then(Value::as_object).cloned();
    Some(Error::StructuredRequest {
        code,
        status,
        metadata,
    })
}
