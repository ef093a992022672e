use serde::{Deserialize, Serialize};

/// Resumen del panel (`GET /dashboard/resumo`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub veiculos_no_patio: u64,
    #[serde(default)]
    pub frota_em_acao: u64,
    #[serde(default)]
    pub entradas_hoje: u64,
    #[serde(default)]
    pub saidas_hoje: u64,
    /// Movimientos recientes; el backend no fija su forma
    #[serde(default)]
    pub recentes: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_counts_default_to_zero() {
        let summary: DashboardSummary =
            serde_json::from_str(r#"{"veiculosNoPatio": 4, "recentes": [{"id": 1}]}"#).unwrap();
        assert_eq!(summary.veiculos_no_patio, 4);
        assert_eq!(summary.frota_em_acao, 0);
        assert_eq!(summary.recentes.len(), 1);
    }
}
