// src/api.rs

use crate::easyeda_models::{ComponentRef, SourceHost};
use crate::error::{Error, Result};
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

const ENDPOINT_PRODUCT: &str = "https://easyeda.com/api/products/{lcsc_id}/components?version=6.4.19.5";
const ENDPOINT_EASYEDA_COMPONENT: &str = "https://easyeda.com/api/components/{uuid}";
const ENDPOINT_LCEDA_COMPONENT: &str = "https://lceda.cn/api/components/{uuid}";
const USER_AGENT: &str = concat!("easyeda_kiconv/", env!("CARGO_PKG_VERSION"));

/// The envelope every endpoint wraps its payload in.
#[derive(Deserialize, Debug)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: Option<bool>,
    pub result: Option<Value>,
    pub code: Option<i64>,
    pub message: Option<String>,
}

impl ApiResponse {
    /// Unwraps `result`, or reports the failure the envelope describes.
    pub fn into_result(self) -> Result<Value> {
        let code = self.code.unwrap_or(0);
        if self.success == Some(false) || code != 0 {
            return Err(Error::Remote {
                code,
                message: self
                    .message
                    .unwrap_or_else(|| "Unknown API error".to_string()),
            });
        }
        self.result
            .filter(|r| !r.is_null())
            .ok_or_else(|| Error::MissingData("API response missing 'result' field".to_string()))
    }
}

/// The URL `reference` is served from.
pub fn endpoint_for(reference: &ComponentRef) -> String {
    match reference {
        ComponentRef::ByCatalogId(id) => ENDPOINT_PRODUCT.replace("{lcsc_id}", id.trim()),
        ComponentRef::ByUuid { uuid, host } => {
            let template = match host {
                SourceHost::EasyEda => ENDPOINT_EASYEDA_COMPONENT,
                SourceHost::Lceda => ENDPOINT_LCEDA_COMPONENT,
            };
            template.replace("{uuid}", uuid.trim())
        }
    }
}

pub struct EasyedaApi {
    client: reqwest::Client,
}

impl EasyedaApi {
    pub fn new() -> Result<Self> {
        Ok(EasyedaApi {
            client: reqwest::Client::builder().user_agent(USER_AGENT).build()?,
        })
    }

    /// Fetches the component document and returns the envelope's `result`.
    pub async fn fetch(&self, reference: &ComponentRef) -> Result<Value> {
        let url = endpoint_for(reference);
        info!("Load Component -> {}", reference.id());
        debug!("GET {}", url);
        let res = self
            .client
            .get(&url)
            .send()
            .await?
            .json::<ApiResponse>()
            .await?;
        res.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoints_per_reference() {
        assert_eq!(
            endpoint_for(&ComponentRef::ByCatalogId("C2040".into())),
            "https://easyeda.com/api/products/C2040/components?version=6.4.19.5"
        );
        assert_eq!(
            endpoint_for(&ComponentRef::ByUuid {
                uuid: "abc".into(),
                host: SourceHost::Lceda
            }),
            "https://lceda.cn/api/components/abc"
        );
    }

    #[test]
    fn envelope_failure_is_remote_error() {
        let res: ApiResponse =
            serde_json::from_value(json!({"success": false, "code": 404, "message": "nope"})).unwrap();
        match res.into_result() {
            Err(Error::Remote { code, message }) => {
                assert_eq!(code, 404);
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn envelope_success_yields_result() {
        let res: ApiResponse =
            serde_json::from_value(json!({"success": true, "code": 0, "result": {"docType": 2}})).unwrap();
        assert_eq!(res.into_result().unwrap()["docType"], 2);
    }
}
