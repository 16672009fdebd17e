use serde::Serialize;
use std::fmt;

/// Content-addressed commit identifier (full hex object id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated id as shown in listings
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A commit as returned by a backend query. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: CommitId,
    pub author_name: String,
    pub author_email: String,
    /// Committer time, Unix seconds
    pub timestamp: i64,
    pub summary: String,
}

impl Commit {
    /// Author identity in the usual `Name <email>` form
    pub fn author(&self) -> String {
        format!("{} <{}>", self.author_name, self.author_email)
    }

    /// Whether `identity` names this commit's author.
    ///
    /// The identity matches when it equals either the author e-mail or the
    /// author name, ignoring ASCII case and surrounding whitespace.
    pub fn is_authored_by(&self, identity: &str) -> bool {
        let identity = identity.trim();
        !identity.is_empty()
            && (self.author_email.eq_ignore_ascii_case(identity)
                || self.author_name.eq_ignore_ascii_case(identity))
    }
}
