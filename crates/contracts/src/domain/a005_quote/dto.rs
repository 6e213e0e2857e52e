use serde::{Deserialize, Serialize};

use super::aggregate::{ClientRef, QuoteGroupId};

/// Создание черновика
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    #[serde(default)]
    pub cliente: Option<ClientRef>,
    #[serde(default)]
    pub notas: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetClientRequest {
    pub cliente: Option<ClientRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddGroupRequest {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveItemRequest {
    pub grupo: QuoteGroupId,
}
