use serde::{Deserialize, Serialize};

use crate::solver::ChallengeRequest;

pub const PAYLOAD_API_VERSION: &str = "acme.cert-manager.io/v1alpha1";
pub const PAYLOAD_KIND: &str = "ChallengePayload";
pub const SOLVER_VERSION: &str = "v1alpha1";

/// Envelope cert-manager posts to the webhook and expects back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

impl ChallengePayload {
    pub fn respond(response: ChallengeResponse) -> Self {
        Self {
            api_version: PAYLOAD_API_VERSION.to_string(),
            kind: PAYLOAD_KIND.to_string(),
            request: None,
            response: Some(response),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ChallengeResponse {
    pub fn success(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            success: true,
            status: None,
        }
    }

    pub fn failure(uid: &str, message: String, code: u16) -> Self {
        Self {
            uid: uid.to_string(),
            success: false,
            status: Some(Status {
                status: "Failure".to_string(),
                message,
                code,
            }),
        }
    }
}

/// Subset of the Kubernetes `metav1.Status` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub status: String,
    pub message: String,
    pub code: u16,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceList {
    pub kind: &'static str,
    pub api_version: &'static str,
    pub group_version: String,
    pub resources: Vec<ApiResource>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResource {
    pub name: String,
    pub singular_name: String,
    pub namespaced: bool,
    pub kind: &'static str,
    pub verbs: Vec<&'static str>,
}

impl ApiResourceList {
    pub fn for_solver(group_name: &str, solver_name: &str) -> Self {
        Self {
            kind: "APIResourceList",
            api_version: "v1",
            group_version: format!("{}/{}", group_name, SOLVER_VERSION),
            resources: vec![ApiResource {
                name: solver_name.to_string(),
                singular_name: solver_name.to_string(),
                namespaced: false,
                kind: PAYLOAD_KIND,
                verbs: vec!["create"],
            }],
        }
    }
}
