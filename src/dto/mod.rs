//! DTOs de movimentação
//!
//! Cuerpos de petición y filtros que se envían al backend.

pub mod movement_dto;

pub use movement_dto::*;
