use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{QuoteItem, QuoteItemId};

/// Имя группы, создаваемой вместе с черновиком
pub const DEFAULT_GROUP_NAME: &str = "General";

// ============================================================================
// ID Types
// ============================================================================

/// ID черновика котировки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteDraftId(pub Uuid);

impl QuoteDraftId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for QuoteDraftId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(QuoteDraftId)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// ID группы позиций
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteGroupId(pub Uuid);

impl QuoteGroupId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

// ============================================================================
// Группа и клиент
// ============================================================================

/// Группа позиций (этаж, помещение...) для представления котировки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteGroup {
    pub id: QuoteGroupId,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub imagen: Option<String>,
}

impl QuoteGroup {
    pub fn new(nombre: impl Into<String>) -> Self {
        Self {
            id: QuoteGroupId::new_v4(),
            nombre: nombre.into(),
            descripcion: None,
            imagen: None,
        }
    }
}

/// Изменение группы: `None` оставляет поле без изменений
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteGroupPatch {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
}

/// Выбранный клиент
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: String,
    pub nombre: String,
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Черновик котировки: клиент, группы и позиции.
///
/// Итоги не хранятся, а всегда выводятся из позиций.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub id: QuoteDraftId,
    #[serde(default)]
    pub cliente: Option<ClientRef>,
    pub grupos: Vec<QuoteGroup>,
    #[serde(default)]
    pub items: Vec<QuoteItem>,
    #[serde(default)]
    pub notas: Option<String>,
    pub metadata: EntityMetadata,
}

impl QuoteDraft {
    pub fn new() -> Self {
        Self {
            id: QuoteDraftId::new_v4(),
            cliente: None,
            grupos: vec![QuoteGroup::new(DEFAULT_GROUP_NAME)],
            items: Vec::new(),
            notas: None,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    pub fn set_client(&mut self, client: Option<ClientRef>) {
        self.cliente = client;
        self.metadata.touch();
    }

    /// Группа по умолчанию: первая в списке
    pub fn default_group(&self) -> Option<QuoteGroupId> {
        self.grupos.first().map(|g| g.id)
    }

    pub fn group(&self, id: QuoteGroupId) -> Option<&QuoteGroup> {
        self.grupos.iter().find(|g| g.id == id)
    }

    pub fn add_group(&mut self, nombre: impl Into<String>) -> Result<QuoteGroupId, String> {
        let nombre = nombre.into();
        if nombre.trim().is_empty() {
            return Err("Nombre del grupo no puede estar vacío".into());
        }
        let group = QuoteGroup::new(nombre.trim());
        let id = group.id;
        self.grupos.push(group);
        self.metadata.touch();
        Ok(id)
    }

    pub fn update_group(&mut self, id: QuoteGroupId, patch: QuoteGroupPatch) -> Result<(), String> {
        let group = self
            .grupos
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| "Grupo no encontrado".to_string())?;
        if let Some(nombre) = patch.nombre {
            if nombre.trim().is_empty() {
                return Err("Nombre del grupo no puede estar vacío".into());
            }
            group.nombre = nombre.trim().to_string();
        }
        if patch.descripcion.is_some() {
            group.descripcion = patch.descripcion;
        }
        if patch.imagen.is_some() {
            group.imagen = patch.imagen;
        }
        self.metadata.touch();
        Ok(())
    }

    /// Удалить группу; её позиции переходят в первую оставшуюся группу
    pub fn remove_group(&mut self, id: QuoteGroupId) -> Result<(), String> {
        if self.grupos.len() <= 1 {
            return Err("No se puede eliminar el último grupo".into());
        }
        let index = self
            .grupos
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| "Grupo no encontrado".to_string())?;
        self.grupos.remove(index);
        let target = self.grupos[0].id;
        for item in self.items.iter_mut().filter(|i| i.grupo == id) {
            item.grupo = target;
        }
        self.metadata.touch();
        Ok(())
    }

    pub fn add_item(&mut self, item: QuoteItem) -> Result<QuoteItemId, String> {
        if self.group(item.grupo).is_none() {
            return Err("Grupo no encontrado".into());
        }
        if self.items.iter().any(|i| i.id == item.id) {
            return Err("Item duplicado".into());
        }
        let id = item.id;
        self.items.push(item);
        self.metadata.touch();
        Ok(id)
    }

    /// Заменить позицию с тем же ID, сохранив её место в списке
    pub fn replace_item(&mut self, item: QuoteItem) -> Result<(), String> {
        if self.group(item.grupo).is_none() {
            return Err("Grupo no encontrado".into());
        }
        let slot = self
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| "Item no encontrado".to_string())?;
        *slot = item;
        self.metadata.touch();
        Ok(())
    }

    pub fn remove_item(&mut self, id: QuoteItemId) -> Result<QuoteItem, String> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| "Item no encontrado".to_string())?;
        self.metadata.touch();
        Ok(self.items.remove(index))
    }

    pub fn move_item(&mut self, id: QuoteItemId, group: QuoteGroupId) -> Result<(), String> {
        if self.group(group).is_none() {
            return Err("Grupo no encontrado".into());
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| "Item no encontrado".to_string())?;
        item.grupo = group;
        self.metadata.touch();
        Ok(())
    }

    /// Копия позиции с новым ID сразу после оригинала
    pub fn duplicate_item(&mut self, id: QuoteItemId) -> Result<QuoteItemId, String> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| "Item no encontrado".to_string())?;
        let mut copy = self.items[index].clone();
        copy.id = QuoteItemId::new_v4();
        let new_id = copy.id;
        self.items.insert(index + 1, copy);
        self.metadata.touch();
        Ok(new_id)
    }

    pub fn items_in_group(&self, group: QuoteGroupId) -> impl Iterator<Item = &QuoteItem> {
        self.items.iter().filter(move |i| i.grupo == group)
    }
}

impl Default for QuoteDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateRoot for QuoteDraft {
    type Id = QuoteDraftId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn description(&self) -> &str {
        self.cliente
            .as_ref()
            .map(|c| c.nombre.as_str())
            .unwrap_or("")
    }

    fn aggregate_index() -> &'static str {
        "a005"
    }

    fn collection_name() -> &'static str {
        "cotizaciones"
    }

    fn element_name() -> &'static str {
        "Cotización"
    }

    fn list_name() -> &'static str {
        "Cotizaciones"
    }
}

/// Строка списка сохранённых черновиков
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraftListItem {
    pub id: QuoteDraftId,
    #[serde(default)]
    pub cliente: Option<String>,
    pub grupos: usize,
    pub items: usize,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub version: i32,
}

impl From<&QuoteDraft> for QuoteDraftListItem {
    fn from(draft: &QuoteDraft) -> Self {
        Self {
            id: draft.id,
            cliente: draft.cliente.as_ref().map(|c| c.nombre.clone()),
            grupos: draft.grupos.len(),
            items: draft.items.len(),
            updated_at: draft.metadata.updated_at,
            version: draft.metadata.version,
        }
    }
}
