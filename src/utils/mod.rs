//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! conversión de marcas de tiempo y búsqueda local.

pub mod errors;
pub mod filter;
pub mod time;
pub mod validation;

pub use errors::{AppError, AppResult};
