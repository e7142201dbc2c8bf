//! Tagged response envelope for transport collaborators

use serde::{Deserialize, Serialize};

use gf_core::{ErrorCode, GfResult};

/// Outcome of one controller operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Failure { code: ErrorCode, message: String },
}

impl<T> Response<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Response::Success { data } => Some(data),
            Response::Failure { .. } => None,
        }
    }
}

impl<T: Serialize> Response<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(r#"{{"status":"failure","code":"SERIALIZATION","message":"{e}"}}"#)
        })
    }
}

impl<T> From<GfResult<T>> for Response<T> {
    fn from(result: GfResult<T>) -> Self {
        match result {
            Ok(data) => Response::Success { data },
            Err(e) => Response::Failure {
                code: e.code(),
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::GfError;

    #[test]
    fn test_success_shape() {
        let response: Response<u32> = Ok(7).into();
        assert!(response.is_success());
        let json: serde_json::Value = serde_json::from_str(&response.to_json()).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], 7);
    }

    #[test]
    fn test_failure_shape() {
        let response: Response<()> = Err(GfError::PoolNotFound("ghost".into())).into();
        assert!(!response.is_success());
        assert!(response.data().is_none());

        let json: serde_json::Value = serde_json::from_str(&response.to_json()).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["code"], "POOL_NOT_FOUND");
        assert_eq!(json["message"], "Pool not found: ghost");
    }
}
