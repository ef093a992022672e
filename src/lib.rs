//! Cliente de control de portaria y flota
//!
//! Registro de entradas y salidas de personas y vehículos en los puestos de
//! control, viajes de la flota propia, datos de referencia, usuarios e
//! informes, sobre el backend REST de portaria.

pub mod clients;
pub mod config;
pub mod dto;
pub mod ledger;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use utils::errors::{AppError, AppResult};
