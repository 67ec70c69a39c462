//! The closed keyword vocabulary.
//!
//! Scenario steps name actions by these wire names; dispatch is a `match`
//! over the enum rather than a string-keyed table, so an unknown action can
//! only exist at the parsing boundary.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::result::PilotarError;

/// Step data payload: field name to JSON value
pub type StepData = HashMap<String, serde_json::Value>;

/// Actions a scenario step can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Navigate to the login page (`url` optional, default `/login`)
    OpenLoginPage,
    /// Type the username (`value` required)
    FillUsername,
    /// Type the password (`value` required)
    FillPassword,
    /// Click the login button
    ClickLogin,
    /// Verify the dashboard greets the user (`expected_text` optional,
    /// default `Welcome`)
    VerifyLoginSuccess,
    /// Click the logout control
    ClickLogout,
    /// Verify the dashboard is loaded
    VerifyDashboardLoaded,
}

impl Keyword {
    /// All keywords, in documentation order
    pub const ALL: [Self; 7] = [
        Self::OpenLoginPage,
        Self::FillUsername,
        Self::FillPassword,
        Self::ClickLogin,
        Self::VerifyLoginSuccess,
        Self::ClickLogout,
        Self::VerifyDashboardLoaded,
    ];

    /// Wire name used in scenario data
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenLoginPage => "open_login_page",
            Self::FillUsername => "fill_username",
            Self::FillPassword => "fill_password",
            Self::ClickLogin => "click_login",
            Self::VerifyLoginSuccess => "verify_login_success",
            Self::ClickLogout => "click_logout",
            Self::VerifyDashboardLoaded => "verify_dashboard_loaded",
        }
    }

    /// Whether this keyword verifies state rather than acting on it
    #[must_use]
    pub const fn is_verification(&self) -> bool {
        matches!(self, Self::VerifyLoginSuccess | Self::VerifyDashboardLoaded)
    }
}

impl FromStr for Keyword {
    type Err = PilotarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|keyword| keyword.as_str() == s)
            .ok_or_else(|| PilotarError::UnknownKeyword {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Keyword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Keyword {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for keyword in Keyword::ALL {
            assert_eq!(keyword.as_str().parse::<Keyword>().unwrap(), keyword);
        }
    }

    #[test]
    fn test_unknown_name_errors() {
        let err = "teleport_home".parse::<Keyword>().unwrap_err();
        assert!(matches!(err, PilotarError::UnknownKeyword { .. }));
        assert!(err.to_string().contains("teleport_home"));
    }

    #[test]
    fn test_verification_split() {
        assert!(Keyword::VerifyLoginSuccess.is_verification());
        assert!(Keyword::VerifyDashboardLoaded.is_verification());
        assert!(!Keyword::ClickLogin.is_verification());
    }

    #[test]
    fn test_serde_round_trip() {
        let keyword: Keyword = serde_yaml_ng::from_str("verify_login_success").unwrap();
        assert_eq!(keyword, Keyword::VerifyLoginSuccess);
        assert_eq!(
            serde_yaml_ng::to_string(&keyword).unwrap().trim(),
            "verify_login_success"
        );
    }

    #[test]
    fn test_serde_unknown_name_errors() {
        let result: Result<Keyword, _> = serde_yaml_ng::from_str("warp_drive");
        let message = result.unwrap_err().to_string();
        assert!(message.contains("warp_drive"));
    }
}
