use crate::condition::{self, ConditionBlock, Operator};
use crate::{AplError, Principal, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Effect indicates whether a policy statement allows or denies access
#[derive(Serialize, Deserialize, Eq, PartialEq, Debug, Copy, Clone)]
pub enum Effect {
    /// Allow access
    Allow,

    /// Deny access
    Deny,
}

impl Effect {
    /// The legal effect names
    pub const NAMES: &'static [&'static str] = &["Allow", "Deny"];

    /// The serialized name of the effect
    pub fn as_str(&self) -> &'static str {
        match *self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

impl FromStr for Effect {
    type Err = AplError;

    fn from_str(s: &str) -> Result<Effect> {
        match s {
            "Allow" => Ok(Effect::Allow),
            "Deny" => Ok(Effect::Deny),
            _ => Err(AplError::invalid_value("Effect", s, Effect::NAMES)),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SQS_ACTIONS: &[&str] = &[
    "SQS:SendMessage",
    // misspelling emitted by older tooling, still accepted
    "SQS:SendMessge",
    "SQS:ReceiveMessage",
    "SQS:DeleteMessage",
    "SQS:ChangeMessageVisibility",
    "SQS:GetQueueAttributes",
    "SQS:*",
];

/// StatementKind selects the set of actions a statement accepts
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum StatementKind {
    /// Service agnostic statement. No action is recognized for it.
    Generic,

    /// Simple Queue Service statement
    Sqs,
}

impl StatementKind {
    /// The actions a statement of this kind may be assigned
    pub fn allowed_actions(&self) -> &'static [&'static str] {
        match *self {
            StatementKind::Generic => &[],
            StatementKind::Sqs => SQS_ACTIONS,
        }
    }
}

impl Default for StatementKind {
    fn default() -> Self {
        StatementKind::Generic
    }
}

/// Statement contains information about a single permission. Statements are created through
/// [`Policy::new_statement`](crate::Policy::new_statement) which assigns their `Sid`.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Statement {
    #[serde(rename = "Sid")]
    sid: String,

    #[serde(rename = "Effect", default, skip_serializing_if = "Option::is_none")]
    effect: Option<Effect>,

    #[serde(rename = "Principal", default)]
    principal: Principal,

    // always present in the document, `null` until set
    #[serde(rename = "Action", default)]
    action: Option<String>,

    #[serde(rename = "Resource", default, skip_serializing_if = "Option::is_none")]
    resource: Option<Value>,

    #[serde(rename = "Condition", default, skip_serializing_if = "ConditionBlock::is_empty")]
    condition: ConditionBlock,

    #[serde(skip)]
    kind: StatementKind,
}

impl Statement {
    /// Create a statement with an empty principal and no action
    pub fn new<S>(sid: S, kind: StatementKind) -> Self
    where
        S: Into<String>,
    {
        Statement {
            sid: sid.into(),
            effect: None,
            principal: Principal::new(),
            action: None,
            resource: None,
            condition: ConditionBlock::new(),
            kind,
        }
    }

    /// The statement id
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// The kind of statement, which decides the accepted actions
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: StatementKind) {
        self.kind = kind;
    }

    /// The principal this statement applies to
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Mutable access to the principal, e.g. `st.principal_mut().set("AWS", "*")`
    pub fn principal_mut(&mut self) -> &mut Principal {
        &mut self.principal
    }

    /// Set the effect. Only `"Allow"` and `"Deny"` are accepted.
    pub fn set_effect(&mut self, effect: &str) -> Result<()> {
        let effect = effect.parse::<Effect>().map_err(|e| {
            debug!("statement {}: {}", self.sid, e);
            e
        })?;
        self.effect = Some(effect);
        Ok(())
    }

    /// The effect, if one was set
    pub fn effect(&self) -> Option<Effect> {
        self.effect
    }

    /// Set the resource. The value is not validated.
    pub fn set_resource<R>(&mut self, resource: R)
    where
        R: Into<Value>,
    {
        self.resource = Some(resource.into());
    }

    /// The resource, if one was set
    pub fn resource(&self) -> Option<&Value> {
        self.resource.as_ref()
    }

    /// Set the action. It must be one of the actions allowed for this statement's kind.
    pub fn set_action(&mut self, action: &str) -> Result<()> {
        let allowed = self.kind.allowed_actions();
        if !allowed.contains(&action) {
            let err = AplError::invalid_value("Action", action, allowed);
            debug!("statement {}: {}", self.sid, err);
            return Err(err);
        }
        self.action = Some(action.to_owned());
        Ok(())
    }

    /// The action, `None` until one is set
    pub fn action(&self) -> Option<&str> {
        self.action.as_ref().map(|x| x.as_str())
    }

    /// Add a condition restricting when this statement applies. The key must be one of
    /// [`condition::KEYS`] and the operator one of [`Operator::NAMES`]. Values are appended to
    /// any already recorded for the same key and operator; an empty `values` is accepted.
    ///
    /// ```
    /// # use apl::Policy;
    /// let mut policy = Policy::sqs();
    /// let st = policy.new_statement().unwrap();
    /// st.add_condition("AWS:SourceIp", "IpAddress", vec!["10.0.0.0/8"]).unwrap();
    /// assert!(st.add_condition("Foo:Bar", "IpAddress", vec!["10.0.0.0/8"]).is_err());
    /// ```
    pub fn add_condition<I, V>(&mut self, key: &str, operator: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        if !condition::is_valid_key(key) {
            let err = AplError::invalid_value("Condition key", key, condition::KEYS);
            debug!("statement {}: {}", self.sid, err);
            return Err(err);
        }

        let operator = operator.parse::<Operator>().map_err(|e| {
            debug!("statement {}: {}", self.sid, e);
            e
        })?;

        self.condition.insert(operator, key, values);
        Ok(())
    }

    /// The conditions added to this statement
    pub fn condition(&self) -> &ConditionBlock {
        &self.condition
    }
}
