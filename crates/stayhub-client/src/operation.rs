//! Operations travelling through the link chain.

use crate::error::ClientError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use stayhub_core::config::FetchPolicy;
use stayhub_core::graphql::GraphQLRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    /// Infers the kind from the document's leading keyword. Anonymous
    /// `{ ... }` documents are queries.
    pub fn infer(document: &str) -> Self {
        if document.trim_start().starts_with("mutation") {
            OperationKind::Mutation
        } else {
            OperationKind::Query
        }
    }
}

/// A GraphQL request plus the per-request context links may read or rewrite.
#[derive(Debug, Clone)]
pub struct Operation {
    pub request: GraphQLRequest,
    pub kind: OperationKind,
    pub headers: HeaderMap,
    /// `None` defers to the client's default policy.
    pub fetch_policy: Option<FetchPolicy>,
}

impl Operation {
    /// Builds an operation, inferring its kind from `document`.
    pub fn new(document: impl Into<String>) -> Self {
        let query = document.into();
        Self {
            kind: OperationKind::infer(&query),
            request: GraphQLRequest {
                operation_name: None,
                query,
                variables: Value::Object(Default::default()),
            },
            headers: HeaderMap::new(),
            fetch_policy: None,
        }
    }

    pub fn query(document: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Query,
            ..Self::new(document)
        }
    }

    pub fn mutation(document: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Mutation,
            ..Self::new(document)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.request.operation_name = Some(name.into());
        self
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.request.variables = variables;
        self
    }

    pub fn with_fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.fetch_policy = Some(policy);
        self
    }

    pub fn name(&self) -> &str {
        self.request.operation_name.as_deref().unwrap_or("anonymous")
    }

    pub fn is_mutation(&self) -> bool {
        self.kind == OperationKind::Mutation
    }

    /// Sets `Authorization: Bearer <token>`, replacing any previous value.
    pub fn set_bearer(&mut self, token: &str) -> Result<(), ClientError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    pub fn clear_bearer(&mut self) {
        self.headers.remove(AUTHORIZATION);
    }

    /// The bearer token currently attached, if any.
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }

    /// Root key under which the cache stores this operation's result.
    ///
    /// Named operations key by name; anonymous ones by their document.
    /// Variables are appended as compact JSON, whose object keys serialize in
    /// sorted order, so equal variable sets produce equal keys.
    pub fn cache_key(&self) -> String {
        let head = match &self.request.operation_name {
            Some(name) => name.clone(),
            None => self.request.query.split_whitespace().collect::<Vec<_>>().join(" "),
        };
        format!("{}({})", head, self.request.variables)
    }
}

/// A statically described operation with typed variables and result.
///
/// ```ignore
/// struct MeQuery;
///
/// impl GraphQLOperation for MeQuery {
///     const OPERATION_NAME: &'static str = "Me";
///     const QUERY: &'static str = "query Me { me { __typename id name } }";
///     type Variables = ();
///     type Data = MeData;
/// }
/// ```
pub trait GraphQLOperation {
    const OPERATION_NAME: &'static str;
    const QUERY: &'static str;
    const KIND: OperationKind = OperationKind::Query;

    type Variables: Serialize + Send + Sync;
    type Data: DeserializeOwned;

    fn build(variables: &Self::Variables) -> Result<Operation, ClientError> {
        let variables = match serde_json::to_value(variables)
            .map_err(|e| ClientError::Decode(format!("variables: {}", e)))?
        {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let mut operation = Operation::new(Self::QUERY)
            .with_name(Self::OPERATION_NAME)
            .with_variables(variables);
        operation.kind = Self::KIND;
        Ok(operation)
    }
}
