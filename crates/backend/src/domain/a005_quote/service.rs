use std::collections::HashSet;

use contracts::domain::a005_quote::aggregate::QuoteDraft;
use contracts::domain::a005_quote::item::QuoteItem;
use contracts::domain::a005_quote::totals::QuoteSummary;
use contracts::usecases::common::UseCaseError;
use contracts::usecases::u501_price_item::PriceItemRequest;

use crate::shared::catalog::CatalogSnapshot;
use crate::usecases::u501_price_item::aggregator::{group_totals, quote_totals};
use crate::usecases::u501_price_item::{pricing, PriceItemExecutor};

/// Пересчитать позицию из сохранённых входных данных по снимку каталога.
///
/// ID, группа и описание позиции сохраняются.
pub fn reprice_from_snapshot(
    item: &QuoteItem,
    snapshot: &CatalogSnapshot,
) -> Result<QuoteItem, UseCaseError> {
    let priced = pricing::price(&item.entradas, snapshot)?;
    Ok(QuoteItem {
        producto: priced.producto,
        desglose: priced.desglose,
        advertencias: priced.advertencias,
        ..item.clone()
    })
}

/// Пересчитать позицию по текущему каталогу
pub async fn recompute_item(
    item: &QuoteItem,
    executor: &PriceItemExecutor,
) -> Result<QuoteItem, UseCaseError> {
    executor
        .build_item(
            item.entradas.clone(),
            item.grupo,
            item.descripcion.clone(),
            Some(item.id),
        )
        .await
}

/// Пересчитать все позиции черновика; при первой ошибке черновик не меняется
pub async fn reprice_draft(
    draft: &mut QuoteDraft,
    executor: &PriceItemExecutor,
) -> Result<usize, UseCaseError> {
    let mut repriced = Vec::with_capacity(draft.items.len());
    for item in &draft.items {
        repriced.push(recompute_item(item, executor).await?);
    }
    let count = repriced.len();
    for item in repriced {
        draft.replace_item(item).map_err(UseCaseError::internal)?;
    }
    Ok(count)
}

/// Рассчитать позицию и добавить её в черновик.
///
/// Без явной группы позиция попадает в первую группу черновика.
pub async fn add_priced_item(
    draft: &mut QuoteDraft,
    request: PriceItemRequest,
    executor: &PriceItemExecutor,
) -> Result<QuoteItem, UseCaseError> {
    let grupo = request
        .grupo
        .or_else(|| draft.default_group())
        .ok_or_else(|| UseCaseError::internal("El borrador no tiene grupos"))?;
    if draft.group(grupo).is_none() {
        return Err(UseCaseError::validation("Grupo no encontrado"));
    }

    let item = executor
        .build_item(request.entradas, grupo, request.descripcion, None)
        .await?;
    draft
        .add_item(item.clone())
        .map_err(UseCaseError::validation)?;
    Ok(item)
}

/// Проверить черновик, присланный целиком, и пересчитать его позиции.
///
/// Раскладка и итоги позиций от клиента не принимаются: они всегда
/// выводятся из входных данных по текущему каталогу.
pub async fn prepare_replacement(
    draft: &mut QuoteDraft,
    executor: &PriceItemExecutor,
) -> Result<usize, UseCaseError> {
    if draft.grupos.is_empty() {
        return Err(UseCaseError::validation(
            "La cotización debe tener al menos un grupo",
        ));
    }
    let mut seen = HashSet::new();
    for item in &draft.items {
        if draft.group(item.grupo).is_none() {
            return Err(UseCaseError::validation(format!(
                "Item {} pertenece a un grupo inexistente",
                item.id.value()
            )));
        }
        if !seen.insert(item.id) {
            return Err(UseCaseError::validation(format!(
                "Item duplicado: {}",
                item.id.value()
            )));
        }
    }
    reprice_draft(draft, executor).await
}

/// Итоги черновика и итоги по группам
pub fn summary(draft: &QuoteDraft, tax_rate: f64) -> QuoteSummary {
    QuoteSummary {
        cotizacion: draft.id,
        totales: quote_totals(&draft.items, tax_rate),
        grupos: group_totals(draft),
        items_con_advertencias: draft
            .items
            .iter()
            .filter(|i| !i.advertencias.is_empty())
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::catalog::file::tests::{seed_window_catalog, TempCatalogDir};
    use crate::shared::catalog::file::FileCatalog;
    use crate::usecases::u501_price_item::pricing::tests::{window_inputs, window_snapshot};
    use contracts::domain::a002_supplier::aggregate::SupplierId;
    use contracts::domain::a003_variant::aggregate::VariantId;
    use contracts::domain::a004_product::aggregate::ProductId;
    use contracts::domain::a005_quote::aggregate::QuoteGroupId;
    use contracts::domain::a005_quote::item::{
        Dimensions, ItemInputs, LaborOptions, SupplierSelection, VariantSelection,
    };
    use contracts::shared::labor::LaborParams;
    use std::sync::Arc;

    fn file_request() -> PriceItemRequest {
        PriceItemRequest {
            entradas: ItemInputs {
                producto: ProductId::new("ventana"),
                dimensiones: Dimensions::new(1.0, 2.0),
                variantes: VariantSelection {
                    color_pvc: Some(VariantId::new("blanco")),
                    ..Default::default()
                },
                proveedores: SupplierSelection {
                    general: Some(SupplierId::new("prov-general")),
                    vidrio: Some(SupplierId::new("prov-vidrio")),
                },
                margen_ganancia: 25.0,
                cantidad: 1.0,
                mano_obra: LaborOptions::default(),
            },
            grupo: None,
            descripcion: None,
        }
    }

    #[test]
    fn test_recompute_from_stored_inputs_is_idempotent() {
        let snapshot = window_snapshot();
        let mut draft = QuoteDraft::new();
        let group = draft.default_group().unwrap();
        let priced = pricing::price(&window_inputs(), &snapshot).unwrap();
        let item = QuoteItem {
            id: contracts::domain::a005_quote::item::QuoteItemId::new_v4(),
            grupo: group,
            producto: priced.producto,
            descripcion: Some("Dormitorio".into()),
            entradas: window_inputs(),
            desglose: priced.desglose,
            advertencias: priced.advertencias,
        };
        draft.add_item(item.clone()).unwrap();

        let again = reprice_from_snapshot(&item, &snapshot).unwrap();
        assert_eq!(again, item);
        let third = reprice_from_snapshot(&again, &snapshot).unwrap();
        assert_eq!(third.total(), item.total());
    }

    #[test]
    fn test_summary_uses_configured_tax() {
        let snapshot = window_snapshot();
        let mut draft = QuoteDraft::new();
        let first = draft.default_group().unwrap();
        let second = draft.add_group("Cocina").unwrap();
        for group in [first, second] {
            let priced = pricing::price(&window_inputs(), &snapshot).unwrap();
            draft
                .add_item(QuoteItem {
                    id: contracts::domain::a005_quote::item::QuoteItemId::new_v4(),
                    grupo: group,
                    producto: priced.producto,
                    descripcion: None,
                    entradas: window_inputs(),
                    desglose: priced.desglose,
                    advertencias: priced.advertencias,
                })
                .unwrap();
        }

        let s = summary(&draft, 0.15);
        assert_eq!(s.totales.subtotal, 11687.0);
        assert_eq!(s.totales.impuesto, 1753.05);
        assert_eq!(s.totales.total, 13440.05);
        assert_eq!(s.grupos.len(), 2);
        assert_eq!(s.grupos[1].subtotal, 5843.5);
        assert_eq!(s.items_con_advertencias, 0);
    }

    #[tokio::test]
    async fn test_add_and_reprice_through_executor() {
        let dir = TempCatalogDir::new();
        seed_window_catalog(&dir);
        let executor = PriceItemExecutor::new(
            Arc::new(FileCatalog::new(dir.path.clone())),
            LaborParams::default(),
        );

        let mut draft = QuoteDraft::new();
        let item = add_priced_item(&mut draft, file_request(), &executor)
            .await
            .unwrap();
        assert_eq!(item.grupo, draft.default_group().unwrap());
        assert_eq!(item.total(), 2480.0);

        let before = draft.items.clone();
        assert_eq!(reprice_draft(&mut draft, &executor).await.unwrap(), 1);
        assert_eq!(draft.items, before);

        let mut bad = file_request();
        bad.grupo = Some(QuoteGroupId::new_v4());
        let err = add_priced_item(&mut draft, bad, &executor).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(draft.items.len(), 1);
    }

    #[tokio::test]
    async fn test_full_draft_totals_are_recomputed_not_trusted() {
        let dir = TempCatalogDir::new();
        seed_window_catalog(&dir);
        let executor = PriceItemExecutor::new(
            Arc::new(FileCatalog::new(dir.path.clone())),
            LaborParams::default(),
        );
        let mut draft = QuoteDraft::new();
        add_priced_item(&mut draft, file_request(), &executor)
            .await
            .unwrap();

        let mut incoming = draft.clone();
        incoming.items[0].desglose.totales.total = 1.0;
        incoming.items[0].desglose.total_materiales = 0.0;

        assert_eq!(prepare_replacement(&mut incoming, &executor).await.unwrap(), 1);
        assert_eq!(incoming.items[0].total(), 2480.0);
        assert_eq!(incoming.items, draft.items);
        assert_eq!(summary(&incoming, 0.15).totales.subtotal, 2480.0);
    }

    #[tokio::test]
    async fn test_full_draft_rejects_duplicate_items_and_unknown_groups() {
        let dir = TempCatalogDir::new();
        seed_window_catalog(&dir);
        let executor = PriceItemExecutor::new(
            Arc::new(FileCatalog::new(dir.path.clone())),
            LaborParams::default(),
        );
        let mut draft = QuoteDraft::new();
        add_priced_item(&mut draft, file_request(), &executor)
            .await
            .unwrap();

        let mut duplicated = draft.clone();
        duplicated.items.push(draft.items[0].clone());
        let err = prepare_replacement(&mut duplicated, &executor)
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let mut orphan = draft.clone();
        orphan.items[0].grupo = QuoteGroupId::new_v4();
        assert!(prepare_replacement(&mut orphan, &executor)
            .await
            .unwrap_err()
            .is_validation());

        let mut no_groups = draft.clone();
        no_groups.grupos.clear();
        no_groups.items.clear();
        assert!(prepare_replacement(&mut no_groups, &executor)
            .await
            .unwrap_err()
            .is_validation());
    }
}
