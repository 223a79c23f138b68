use crate::{AplError, Result, Statement, StatementKind};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The access policy language version used when none is given
pub const DEFAULT_VERSION: &str = "2008-10-17";

/// Policy is the root of an access policy document. It owns an ordered list of statements and
/// hands out their statement ids.
///
/// ```
/// # use apl::Policy;
/// let mut policy = Policy::sqs();
/// let st = policy.new_statement().unwrap();
/// st.set_effect("Allow").unwrap();
/// st.set_action("SQS:ReceiveMessage").unwrap();
/// st.set_resource("arn:aws:sqs:us-east-1:123456789012:queue");
/// st.principal_mut().set("AWS", "123456789012");
///
/// assert_eq!("1", policy.statements()[0].sid());
/// assert!(policy.to_json().unwrap().contains(r#""Sid":"1""#));
/// ```
#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct Policy {
    #[serde(rename = "Version")]
    version: String,

    #[serde(rename = "Id")]
    id: Uuid,

    #[serde(rename = "Statement")]
    statements: Vec<Statement>,

    // next Sid to hand out, None once u64::MAX has been used
    #[serde(skip)]
    next_sid: Option<u64>,

    #[serde(skip)]
    kind: StatementKind,
}

// Wire form of a policy, only used to parse documents back
#[derive(Deserialize)]
struct Document {
    #[serde(rename = "Version")]
    version: String,

    #[serde(rename = "Id")]
    id: Uuid,

    #[serde(rename = "Statement", default)]
    statements: Vec<Statement>,
}

impl Policy {
    /// Create a generic policy with the default version
    pub fn new() -> Self {
        Policy::with_version(StatementKind::Generic, DEFAULT_VERSION)
    }

    /// Create a Simple Queue Service policy with the default version
    pub fn sqs() -> Self {
        Policy::with_version(StatementKind::Sqs, DEFAULT_VERSION)
    }

    /// Create a policy whose statements are of the given kind
    pub fn with_version<V>(kind: StatementKind, version: V) -> Self
    where
        V: Into<String>,
    {
        Policy {
            version: version.into(),
            id: Uuid::new_v4(),
            statements: Vec::new(),
            next_sid: Some(1),
            kind,
        }
    }

    /// Configure a policy step by step
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// Parse a policy document. Every statement is tagged with `kind` and new statements
    /// continue numbering after the highest numeric Sid found.
    pub fn from_json(jsp: &str, kind: StatementKind) -> Result<Self> {
        let doc: Document = serde_json::from_str(jsp)?;

        let mut statements = doc.statements;
        statements.iter_mut().for_each(|s| s.set_kind(kind));

        let next_sid = statements
            .iter()
            .filter_map(|s| s.sid().parse::<u64>().ok())
            .max()
            .unwrap_or(statements.len() as u64)
            .checked_add(1);

        Ok(Policy {
            version: doc.version,
            id: doc.id,
            statements,
            next_sid,
            kind,
        })
    }

    /// The policy language version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The unique policy id
    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// The statements in creation order
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Mutable access to the statements. Statements can be modified but not added or removed.
    pub fn statements_mut(&mut self) -> &mut [Statement] {
        &mut self.statements
    }

    /// The kind of statement this policy creates
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Create a new statement, append it to the policy and return it for further editing.
    /// Statement ids are assigned sequentially starting at "1" and are never reused.
    ///
    /// Fails with [`AplError::SidExhausted`] once the id `u64::MAX` has been assigned, which
    /// can only happen to a policy parsed with [`Policy::from_json`].
    pub fn new_statement(&mut self) -> Result<&mut Statement> {
        let sid = self.next_sid.ok_or(AplError::SidExhausted(u64::MAX))?;
        self.next_sid = sid.checked_add(1);
        debug!("policy {}: new statement {}", self.id, sid);

        self.statements.push(Statement::new(sid.to_string(), self.kind));
        let idx = self.statements.len() - 1;
        Ok(&mut self.statements[idx])
    }

    /// Look up a document field by a case-insensitive alias, e.g. `"version"` for `Version`.
    pub fn field(&self, name: &str) -> Result<Value> {
        match capitalize(name).as_str() {
            "Version" => Ok(Value::String(self.version.clone())),
            "Id" => Ok(Value::String(self.id.to_string())),
            "Statement" => Ok(serde_json::to_value(&self.statements)?),
            _ => Err(AplError::KeyNotFound(name.to_owned())),
        }
    }

    /// Render the policy document as compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Render the policy document as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy::new()
    }
}

// first char upper case, the rest lower case
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Builder for [`Policy`]. The version and statement kind are the only settings.
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    version: String,
    kind: StatementKind,
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        PolicyBuilder {
            version: DEFAULT_VERSION.to_owned(),
            kind: StatementKind::Generic,
        }
    }
}

impl PolicyBuilder {
    /// Set the policy language version
    pub fn version<V>(mut self, version: V) -> Self
    where
        V: Into<String>,
    {
        self.version = version.into();
        self
    }

    /// Set the kind of statement the policy creates
    pub fn kind(mut self, kind: StatementKind) -> Self {
        self.kind = kind;
        self
    }

    /// Create the policy
    pub fn build(self) -> Policy {
        Policy::with_version(self.kind, self.version)
    }
}
