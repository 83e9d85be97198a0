//! Request DTOs.
//!
//! Responses are the catalog's view types serialized directly; only inbound
//! payloads need separate shapes here.

use serde::Deserialize;

use tripbook_catalog::NewClient;

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: String,
    pub pesel: String,
}

impl From<CreateClientRequest> for NewClient {
    fn from(req: CreateClientRequest) -> Self {
        NewClient {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            telephone: req.telephone,
            pesel: req.pesel,
        }
    }
}
