use std::fmt;

/// Error codes for all resolver diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E4xxx: Resolution errors
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    // Resolution Errors (E4xxx)
    /// Unable to resolve constant
    E4001,
    /// Cyclic constant definition
    E4002,
    /// Cyclic class or module hierarchy
    E4003,
    /// Superclass is not a class
    E4004,
    /// Mixin target is not a module
    E4005,
    /// Wrong number of type arguments for a generic
    E4006,
    /// Variance declared on a class type member
    E4007,
    /// Signature does not match the method's parameters
    E4008,
    /// Unknown method type parameter
    E4009,
    /// Constant used as a type is not a type
    E4010,
    /// Invalid `mixes_in_class_methods` declaration
    E4011,
    /// Subclass does not redeclare a parent type member
    E4012,
    /// Reopening declares a different superclass
    E4013,

    // Internal Errors (E9xxx)
    /// Internal resolver error
    E9001,
    /// Too many errors
    E9002,
}

impl ErrorCode {
    /// Check if this is a resolution error (E4xxx range).
    pub fn is_resolve_error(&self) -> bool {
        self.as_str().starts_with("E4")
    }

    /// Check if this is an internal error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }

    /// Get the numeric code as a string (e.g., "E4001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E4006 => "E4006",
            ErrorCode::E4007 => "E4007",
            ErrorCode::E4008 => "E4008",
            ErrorCode::E4009 => "E4009",
            ErrorCode::E4010 => "E4010",
            ErrorCode::E4011 => "E4011",
            ErrorCode::E4012 => "E4012",
            ErrorCode::E4013 => "E4013",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line summary, used by tooling that lists codes.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E4001 => "unable to resolve constant",
            ErrorCode::E4002 => "cyclic constant definition",
            ErrorCode::E4003 => "cyclic class hierarchy",
            ErrorCode::E4004 => "superclass must be a class",
            ErrorCode::E4005 => "only modules can be mixed in",
            ErrorCode::E4006 => "wrong number of type arguments",
            ErrorCode::E4007 => "classes can only have invariant type members",
            ErrorCode::E4008 => "signature does not match method parameters",
            ErrorCode::E4009 => "unknown method type parameter",
            ErrorCode::E4010 => "constant is not a type",
            ErrorCode::E4011 => "invalid mixes_in_class_methods",
            ErrorCode::E4012 => "type member must be redeclared",
            ErrorCode::E4013 => "parent class mismatch",
            ErrorCode::E9001 => "internal resolver error",
            ErrorCode::E9002 => "too many errors",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
