//! Extractors that validate request input against a declared shape.
//!
//! Each extractor collects the raw input as a JSON value, runs it through the
//! target type's [`Shaped::shape`], and hands the handler the *normalized*
//! value: defaults applied, coercions performed, unknown keys dropped. Any
//! violation short-circuits with a validation failure listing every issue.

use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use contracts::{IssueCode, Shaped, ValidationFailure};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::{Map, Value};

use crate::domain::ApiError;

macro_rules! validated_wrapper {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name<T>(pub T);

        impl<T> $name<T> {
            /// Unwrap the validated value.
            pub fn into_inner(self) -> T {
                self.0
            }
        }

        impl<T> Deref for $name<T> {
            type Target = T;

            fn deref(&self) -> &T {
                &self.0
            }
        }
    };
}

validated_wrapper!(
    /// JSON body validated against `T`'s shape.
    ///
    /// An empty body is validated as `{}`. A body that is not JSON fails with
    /// a single `invalid_json` issue.
    ValidatedJson
);
validated_wrapper!(
    /// Query string validated against `T`'s shape. Values arrive as strings;
    /// repeated keys become arrays.
    ValidatedQuery
);
validated_wrapper!(
    /// Path parameters validated against `T`'s shape. Values arrive as
    /// strings.
    ValidatedPath
);

fn parse_body(bytes: &[u8]) -> Result<Value, ValidationFailure> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|err| {
        ValidationFailure::single(IssueCode::InvalidJson, format!("Malformed JSON body: {err}"))
    })
}

fn query_object(query: &str) -> Result<Value, ValidationFailure> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(query).map_err(|err| {
        ValidationFailure::single(IssueCode::InvalidType, format!("Malformed query string: {err}"))
    })?;
    let mut object = Map::new();
    for (key, value) in pairs.into_inner() {
        match object.get_mut(&key) {
            Some(Value::Array(items)) => items.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                object.insert(key, Value::String(value));
            }
        }
    }
    Ok(Value::Object(object))
}

fn path_object(req: &HttpRequest) -> Value {
    Value::Object(
        req.match_info()
            .iter()
            .map(|(key, value)| (key.to_owned(), Value::String(value.to_owned())))
            .collect(),
    )
}

impl<T: Shaped + 'static> FromRequest for ValidatedJson<T> {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Bytes::from_request(req, payload);
        Box::pin(async move {
            let bytes = body.await?;
            let value = parse_body(&bytes).map_err(ApiError::from)?;
            let parsed = T::parse(&value).map_err(ApiError::from)?;
            Ok(Self(parsed))
        })
    }
}

impl<T: Shaped> FromRequest for ValidatedQuery<T> {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = query_object(req.query_string())
            .and_then(|value| T::parse(&value))
            .map(Self)
            .map_err(ApiError::from);
        ready(result)
    }
}

impl<T: Shaped> FromRequest for ValidatedPath<T> {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(T::parse(&path_object(req)).map(Self).map_err(ApiError::from))
    }
}

#[cfg(test)]
mod tests {
    //! Extractor behaviour against live requests.

    use actix_web::test::TestRequest;
    use contracts::{FieldShape, ObjectShape, Pagination};
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Lookup {
        id: String,
        tags: Vec<String>,
    }

    impl Shaped for Lookup {
        fn shape() -> ObjectShape {
            ObjectShape::new()
                .field("id", FieldShape::string().uuid())
                .field("tags", FieldShape::array(FieldShape::string()).default(json!([])))
        }
    }

    fn issues(error: &ApiError) -> Vec<IssueCode> {
        match error {
            ApiError::Validation(failure) => failure.issues.iter().map(|issue| issue.code).collect(),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[rstest]
    #[case(b"".as_slice(), json!({}))]
    #[case(b"  \n".as_slice(), json!({}))]
    #[case(br#"{"a":1}"#.as_slice(), json!({ "a": 1 }))]
    fn bodies_parse_to_values(#[case] raw: &[u8], #[case] expected: Value) {
        assert_eq!(parse_body(raw).expect("json"), expected);
    }

    #[rstest]
    fn malformed_bodies_are_validation_failures() {
        let failure = parse_body(b"{not json").expect_err("malformed");
        let issue = failure.issues.first().expect("one issue");
        assert_eq!(issue.code, IssueCode::InvalidJson);
        assert!(issue.path.is_empty());
    }

    #[rstest]
    fn repeated_query_keys_collect_into_arrays() {
        let value = query_object("id=1&tags=a&tags=b&tags=c").expect("query");
        assert_eq!(value, json!({ "id": "1", "tags": ["a", "b", "c"] }));
    }

    #[actix_web::test]
    async fn query_extractor_coerces_pagination() {
        let req = TestRequest::get().uri("/users?page=3&limit=50").to_http_request();
        let ValidatedQuery(page) = ValidatedQuery::<Pagination>::extract(&req)
            .await
            .expect("valid pagination");
        assert_eq!((page.page, page.limit), (3, 50));
    }

    #[actix_web::test]
    async fn query_extractor_reports_every_issue() {
        let req = TestRequest::get().uri("/users?page=0&limit=500").to_http_request();
        let error = ValidatedQuery::<Pagination>::extract(&req)
            .await
            .expect_err("out of range");
        assert_eq!(issues(&error), vec![IssueCode::TooSmall, IssueCode::TooBig]);
    }

    #[actix_web::test]
    async fn path_extractor_validates_segments() {
        let req = TestRequest::get().param("id", "nope").to_http_request();
        let error = ValidatedPath::<Lookup>::extract(&req)
            .await
            .expect_err("bad uuid");
        assert_eq!(issues(&error), vec![IssueCode::InvalidString]);
    }

    #[actix_web::test]
    async fn path_extractor_applies_defaults() {
        let req = TestRequest::get()
            .param("id", "3fa85f64-5717-4562-b3fc-2c963f66afa6")
            .to_http_request();
        let ValidatedPath(lookup) = ValidatedPath::<Lookup>::extract(&req)
            .await
            .expect("valid path");
        assert!(lookup.tags.is_empty());
    }
}
