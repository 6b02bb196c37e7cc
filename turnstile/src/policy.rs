//! The policy document returned to the API gateway

use serde::{Deserialize, Serialize};
use turnstile_jose::jwt::SubjectRef;

/// The principal reported for every denied request
pub const DENIED_PRINCIPAL: &str = "user";

const POLICY_VERSION: &str = "2012-10-17";
const INVOKE_ACTION: &str = "execute-api:Invoke";
const ANY_RESOURCE: &str = "*";

/// Whether a request may proceed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// The request is let through
    Allow,
    /// The request is refused
    Deny,
}

/// A single policy statement
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    action: String,
    effect: Effect,
    resource: String,
}

impl Statement {
    fn invoke_any(effect: Effect) -> Self {
        Self {
            action: INVOKE_ACTION.to_owned(),
            effect,
            resource: ANY_RESOURCE.to_owned(),
        }
    }

    /// The effect of the statement
    #[must_use]
    pub fn effect(&self) -> Effect {
        self.effect
    }
}

/// An IAM policy document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    version: String,
    statement: Vec<Statement>,
}

impl PolicyDocument {
    /// The statements of the policy
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statement
    }
}

/// The outcome of one authorization
///
/// Serializes to the response shape expected from a custom authorizer.
///
/// ```
/// use turnstile::Decision;
///
/// let json = serde_json::to_string(&Decision::deny()).unwrap();
/// assert_eq!(
///     json,
///     r#"{"principalId":"user","policyDocument":{"Version":"2012-10-17","Statement":[{"Action":"execute-api:Invoke","Effect":"Deny","Resource":"*"}]}}"#,
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct Decision {
    principal_id: String,
    policy_document: PolicyDocument,
}

impl Decision {
    fn new(principal_id: String, effect: Effect) -> Self {
        Self {
            principal_id,
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_owned(),
                statement: vec![Statement::invoke_any(effect)],
            },
        }
    }

    /// Lets `principal` invoke any resource
    pub fn allow(principal: &SubjectRef) -> Self {
        Self::new(principal.as_str().to_owned(), Effect::Allow)
    }

    /// Refuses the request
    pub fn deny() -> Self {
        Self::new(DENIED_PRINCIPAL.to_owned(), Effect::Deny)
    }

    /// The principal the decision was made for
    #[must_use]
    pub fn principal_id(&self) -> &str {
        &self.principal_id
    }

    /// The effect of the decision
    #[must_use]
    pub fn effect(&self) -> Effect {
        self.policy_document
            .statements()
            .first()
            .map_or(Effect::Deny, Statement::effect)
    }

    /// Whether the request may proceed
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.effect() == Effect::Allow
    }
}
