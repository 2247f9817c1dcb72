use serde::{Deserialize, Serialize};

use super::guard::{GuardOptions, PatternType, RoleMatch};

/// A guard as written in the configuration file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GuardConfig {
    #[serde(rename = "restrict")]
    Restrict {
        roles: Vec<String>,

        #[serde(default, rename = "match")]
        role_match: RoleMatch,

        #[serde(flatten)]
        options: GuardOptions,
    },

    /// Role groups; the request passes if any one group is fully held.
    #[serde(rename = "restrictions")]
    Restrictions {
        groups: Vec<Vec<String>>,

        #[serde(flatten)]
        options: GuardOptions,
    },

    #[serde(rename = "pattern")]
    Pattern {
        value: String,

        #[serde(default)]
        pattern_type: PatternType,

        #[serde(flatten)]
        options: GuardOptions,
    },

    #[serde(rename = "dynamic")]
    Dynamic {
        resource: String,

        #[serde(default)]
        meta: Option<String>,

        #[serde(flatten)]
        options: GuardOptions,
    },

    #[serde(rename = "unrestricted")]
    Unrestricted {
        #[serde(flatten)]
        options: GuardOptions,
    },

    #[serde(rename = "subject_present")]
    SubjectPresent {
        #[serde(flatten)]
        options: GuardOptions,
    },

    #[serde(rename = "subject_not_present")]
    SubjectNotPresent {
        #[serde(flatten)]
        options: GuardOptions,
    },
}

impl GuardConfig {
    pub fn options(&self) -> &GuardOptions {
        match self {
            GuardConfig::Restrict { options, .. }
            | GuardConfig::Restrictions { options, .. }
            | GuardConfig::Pattern { options, .. }
            | GuardConfig::Dynamic { options, .. }
            | GuardConfig::Unrestricted { options }
            | GuardConfig::SubjectPresent { options }
            | GuardConfig::SubjectNotPresent { options } => options,
        }
    }
}
