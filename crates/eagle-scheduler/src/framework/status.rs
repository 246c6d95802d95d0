use serde::Serialize;
use std::fmt;

/// Outcome category of an extension point call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Code {
    /// The plugin ran and the node/pod is fine
    Success,
    /// Internal failure: missing state, unresolvable node, bad input
    Error,
    /// The node cannot host the pod; not a failure of the plugin
    Unschedulable,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Success => write!(f, "Success"),
            Code::Error => write!(f, "Error"),
            Code::Unschedulable => write!(f, "Unschedulable"),
        }
    }
}

/// Result of running a plugin at an extension point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    code: Code,
    reasons: Vec<String>,
}

impl Status {
    /// Create a successful status
    pub fn success() -> Self {
        Self {
            code: Code::Success,
            reasons: Vec::new(),
        }
    }

    /// Create an error status
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: Code::Error,
            reasons: vec![message.into()],
        }
    }

    /// Create an unschedulable status carrying every collected reason
    pub fn unschedulable<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: Code::Unschedulable,
            reasons: reasons.into_iter().map(Into::into).collect(),
        }
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn is_success(&self) -> bool {
        self.code == Code::Success
    }

    pub fn is_unschedulable(&self) -> bool {
        self.code == Code::Unschedulable
    }

    pub fn is_error(&self) -> bool {
        self.code == Code::Error
    }

    /// All reasons joined into one message
    pub fn message(&self) -> String {
        self.reasons.join(", ")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reasons.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message())
        }
    }
}
