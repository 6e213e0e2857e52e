//! Общие типы предметной области: каталог, черновики котировок, DTO use case.

pub mod domain;
pub mod enums;
pub mod shared;
pub mod usecases;
