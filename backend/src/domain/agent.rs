//! Calling-agent identity supplied by the permission collaborator.
//!
//! The identity layer authenticates the caller and hands the workflows a
//! pre-verified [`AgentContext`]. Roles form a closed set so role checks are
//! exhaustive instead of string comparisons.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::Error;

/// Role held by the calling agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentRole {
    /// Platform administrator.
    Admin,
    /// Financial advisor attached to a front office.
    FinancialAdvisor,
    /// Field agent (huissier) enrolling customers on-site.
    FieldAgent,
    /// Country-level representative account.
    CountryRepresentative,
    /// Front-office operator account.
    FrontOffice,
    /// Support staff account.
    Support,
}

impl AgentRole {
    /// Canonical kebab-case label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::FinancialAdvisor => "financial-advisor",
            Self::FieldAgent => "field-agent",
            Self::CountryRepresentative => "country-representative",
            Self::FrontOffice => "front-office",
            Self::Support => "support",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error carrying the rejected label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAgentRoleError {
    /// The label that failed to parse.
    pub value: String,
}

impl fmt::Display for ParseAgentRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown agent role: {}", self.value)
    }
}

impl std::error::Error for ParseAgentRoleError {}

impl FromStr for AgentRole {
    type Err = ParseAgentRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "financial-advisor" => Ok(Self::FinancialAdvisor),
            "field-agent" => Ok(Self::FieldAgent),
            "country-representative" => Ok(Self::CountryRepresentative),
            "front-office" => Ok(Self::FrontOffice),
            "support" => Ok(Self::Support),
            other => Err(ParseAgentRoleError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Pre-verified caller identity.
///
/// `credentials_rotated` reports whether the agent completed the mandatory
/// rotation of their initially issued credentials; the permission layer
/// computes it, the workflows only consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentContext {
    /// Role held by the caller.
    pub role: AgentRole,
    /// Whether the mandatory credential rotation is complete.
    pub credentials_rotated: bool,
}

impl AgentContext {
    /// Build a context from its parts.
    pub fn new(role: AgentRole, credentials_rotated: bool) -> Self {
        Self {
            role,
            credentials_rotated,
        }
    }

    /// Rotated field-agent context, the common case in fixtures.
    pub fn field_agent() -> Self {
        Self::new(AgentRole::FieldAgent, true)
    }
}

/// Reject callers that may not start code-gated operations.
///
/// Only field agents who completed credential rotation may request
/// verification codes.
pub fn ensure_code_operator(agent: &AgentContext) -> Result<(), Error> {
    if agent.role != AgentRole::FieldAgent {
        return Err(Error::forbidden("only field agents may request codes"));
    }
    if !agent.credentials_rotated {
        return Err(Error::forbidden(
            "credential rotation required before code-gated operations",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(AgentRole::Admin, "admin")]
    #[case(AgentRole::FinancialAdvisor, "financial-advisor")]
    #[case(AgentRole::FieldAgent, "field-agent")]
    #[case(AgentRole::CountryRepresentative, "country-representative")]
    #[case(AgentRole::FrontOffice, "front-office")]
    #[case(AgentRole::Support, "support")]
    fn roles_round_trip_through_labels(#[case] role: AgentRole, #[case] label: &str) {
        assert_eq!(role.as_str(), label);
        assert_eq!(label.parse::<AgentRole>().expect("valid label"), role);
    }

    #[test]
    fn unknown_role_labels_fail_to_parse() {
        let err = "huissier".parse::<AgentRole>().expect_err("free-form label");
        assert_eq!(err.value, "huissier");
    }

    #[rstest]
    #[case(AgentRole::Admin)]
    #[case(AgentRole::FinancialAdvisor)]
    #[case(AgentRole::CountryRepresentative)]
    #[case(AgentRole::FrontOffice)]
    #[case(AgentRole::Support)]
    fn non_field_agents_are_rejected(#[case] role: AgentRole) {
        let err = ensure_code_operator(&AgentContext::new(role, true)).expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn unrotated_field_agents_are_rejected() {
        let agent = AgentContext::new(AgentRole::FieldAgent, false);
        let err = ensure_code_operator(&agent).expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn rotated_field_agents_pass() {
        ensure_code_operator(&AgentContext::field_agent()).expect("allowed");
    }
}
