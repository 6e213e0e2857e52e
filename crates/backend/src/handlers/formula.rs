use axum::Json;
use contracts::domain::a004_product::validation::{EvaluateFormulaRequest, EvaluateFormulaResponse};

use crate::shared::formula::{Formula, Variables};

/// Пробное вычисление формулы: ошибки формулы возвращаются в теле ответа
pub fn evaluate_trial(request: &EvaluateFormulaRequest) -> EvaluateFormulaResponse {
    let formula = match Formula::parse(&request.formula) {
        Ok(formula) => formula,
        Err(e) => {
            return EvaluateFormulaResponse {
                valor: None,
                variables_desconocidas: Vec::new(),
                referencias: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    };

    let mut variables = request
        .dimensiones
        .as_ref()
        .map(Variables::from_dimensions)
        .unwrap_or_default();
    for (name, value) in &request.variables {
        variables.set(name.clone(), *value);
    }

    let referencias = formula.variables().into_iter().map(String::from).collect();
    match formula.eval(&variables) {
        Ok(evaluation) => EvaluateFormulaResponse {
            valor: Some(evaluation.value),
            variables_desconocidas: evaluation.unknown_variables,
            referencias,
            error: None,
        },
        Err(e) => EvaluateFormulaResponse {
            valor: None,
            variables_desconocidas: Vec::new(),
            referencias,
            error: Some(e.to_string()),
        },
    }
}

/// POST /api/formula/evaluate
pub async fn evaluate(Json(request): Json<EvaluateFormulaRequest>) -> Json<EvaluateFormulaResponse> {
    Json(evaluate_trial(&request))
}
