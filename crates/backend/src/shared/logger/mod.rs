pub mod repository;

use repository::log_event_internal;

/// Логирование события на сервере
///
/// # Примеры
/// ```ignore
/// logger::log("startup", "Servidor iniciado");
/// logger::log("pricing", "material m1: dependency cycle");
/// ```
pub fn log(category: &str, message: &str) {
    log_event_internal("server", category, message);
}
