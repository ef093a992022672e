//! Búsqueda en el cliente
//!
//! Las listas de referencia llegan completas; el filtrado por texto
//! (autocompletado, buscadores) se hace localmente.

/// Entidades que pueden filtrarse por texto libre
pub trait Searchable {
    /// Campos sobre los que se aplica la búsqueda
    fn search_fields(&self) -> Vec<&str>;

    /// Coincidencia por subcadena, sin distinguir mayúsculas
    fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Filtrar una colección conservando el orden original
pub fn filter_by_term<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    items.iter().filter(|item| item.matches(term)).collect()
}
