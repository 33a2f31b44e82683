//! Typed operations used by the application services.

use serde::{Deserialize, Serialize};
use stayhub_client::{GraphQLOperation, OperationKind};
use stayhub_core::session::Profile;

#[derive(Debug, Clone, Serialize)]
pub struct LoginVariables {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub profile: Profile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub login: LoginPayload,
}

/// Exchanges credentials for a token pair and the caller's profile.
pub struct LoginMutation;

impl GraphQLOperation for LoginMutation {
    const OPERATION_NAME: &'static str = "Login";
    const QUERY: &'static str = "mutation Login($email: String!, $password: String!) { \
        login(email: $email, password: $password) { \
        accessToken refreshToken profile { __typename id name email avatar } } }";
    const KIND: OperationKind = OperationKind::Mutation;
    type Variables = LoginVariables;
    type Data = LoginData;
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeData {
    pub me: Profile,
}

/// Profile of the authenticated caller.
pub struct MeQuery;

impl GraphQLOperation for MeQuery {
    const OPERATION_NAME: &'static str = "Me";
    const QUERY: &'static str = "query Me { me { __typename id name email avatar } }";
    type Variables = ();
    type Data = MeData;
}
