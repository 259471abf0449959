//! Prize-tier winner counts, read through the schema versions the source
//! has published over time.

use serde_json::Value;

use super::coerce::{as_count, as_i64};
use crate::models::PrizeTiers;

/// Known layouts of per-tier winner counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierSchema {
    /// `premiacoes: [{faixa, ganhadores}]`, faixa 1 = sena
    Premiacoes,
    /// `listaRateioPremio: [{faixa, numeroDeGanhadores}]` (official service)
    ListaRateioPremio,
    /// `rateio: [{acertos, ganhadores}]`
    RateioByHits,
    /// `rateio: {sena: {quantidadeGanhadores}, quina: .., quadra: ..}`
    RateioByName,
}

/// Tried in order; the first schema whose container is present wins.
pub const TIER_SCHEMAS: &[TierSchema] = &[
    TierSchema::Premiacoes,
    TierSchema::ListaRateioPremio,
    TierSchema::RateioByHits,
    TierSchema::RateioByName,
];

impl TierSchema {
    pub fn label(&self) -> &'static str {
        match self {
            TierSchema::Premiacoes => "premiacoes",
            TierSchema::ListaRateioPremio => "listaRateioPremio",
            TierSchema::RateioByHits => "rateio-list",
            TierSchema::RateioByName => "rateio-object",
        }
    }

    /// Extract tier counts if `raw` uses this layout.
    pub fn extract(&self, raw: &Value) -> Option<PrizeTiers> {
        match self {
            TierSchema::Premiacoes => {
                from_list(raw.get("premiacoes")?, "faixa", [1, 2, 3], &["ganhadores"])
            }
            TierSchema::ListaRateioPremio => from_list(
                raw.get("listaRateioPremio")?,
                "faixa",
                [1, 2, 3],
                &["numeroDeGanhadores", "ganhadores"],
            ),
            TierSchema::RateioByHits => {
                from_list(raw.get("rateio")?, "acertos", [6, 5, 4], &["ganhadores"])
            }
            TierSchema::RateioByName => {
                let rateio = raw.get("rateio")?.as_object()?;
                let count = |name: &str| {
                    rateio
                        .get(name)
                        .and_then(|tier| tier.get("quantidadeGanhadores"))
                        .and_then(as_count)
                        .unwrap_or(0)
                };
                Some(PrizeTiers {
                    sena: count("sena"),
                    quina: count("quina"),
                    quadra: count("quadra"),
                })
            }
        }
    }
}

/// Entries are matched by `selector`; `keys` holds the values for sena, quina,
/// quadra in that order. Missing tiers count as zero.
fn from_list(
    container: &Value,
    selector: &str,
    keys: [i64; 3],
    count_fields: &[&str],
) -> Option<PrizeTiers> {
    let entries = container.as_array()?;
    let count = |wanted: i64| -> u32 {
        entries
            .iter()
            .find(|entry| entry.get(selector).and_then(as_i64) == Some(wanted))
            .and_then(|entry| {
                count_fields
                    .iter()
                    .filter_map(|field| entry.get(field))
                    .find_map(as_count)
            })
            .unwrap_or(0)
    };
    Some(PrizeTiers {
        sena: count(keys[0]),
        quina: count(keys[1]),
        quadra: count(keys[2]),
    })
}

/// Tier counts from the first schema that matches, with its label.
pub fn extract_tiers(raw: &Value) -> Option<(PrizeTiers, TierSchema)> {
    TIER_SCHEMAS
        .iter()
        .find_map(|schema| schema.extract(raw).map(|tiers| (tiers, *schema)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_premiacoes() {
        let raw = json!({
            "premiacoes": [
                {"faixa": 1, "ganhadores": 0},
                {"faixa": 2, "ganhadores": 58},
                {"faixa": 3, "ganhadores": "4102"}
            ]
        });
        let (tiers, schema) = extract_tiers(&raw).unwrap();
        assert_eq!(schema, TierSchema::Premiacoes);
        assert_eq!(
            tiers,
            PrizeTiers {
                sena: 0,
                quina: 58,
                quadra: 4102
            }
        );
    }

    #[test]
    fn test_lista_rateio_premio() {
        let raw = json!({
            "listaRateioPremio": [
                {"faixa": 1, "numeroDeGanhadores": 2},
                {"faixa": 2, "numeroDeGanhadores": 90}
            ]
        });
        let (tiers, schema) = extract_tiers(&raw).unwrap();
        assert_eq!(schema, TierSchema::ListaRateioPremio);
        assert_eq!(tiers.sena, 2);
        assert_eq!(tiers.quina, 90);
        assert_eq!(tiers.quadra, 0);
    }

    #[test]
    fn test_rateio_by_hits() {
        let raw = json!({
            "rateio": [
                {"acertos": 6, "ganhadores": 1, "ganhadores_cidade": []},
                {"acertos": 5, "ganhadores": 30},
                {"acertos": 4, "ganhadores": 2000}
            ]
        });
        let (tiers, schema) = extract_tiers(&raw).unwrap();
        assert_eq!(schema, TierSchema::RateioByHits);
        assert_eq!(tiers.sena, 1);
        assert_eq!(tiers.quadra, 2000);
    }

    #[test]
    fn test_rateio_by_name() {
        let raw = json!({
            "rateio": {
                "sena": {"quantidadeGanhadores": 0},
                "quina": {"quantidadeGanhadores": 12},
                "quadra": {"quantidadeGanhadores": 800}
            }
        });
        let (tiers, schema) = extract_tiers(&raw).unwrap();
        assert_eq!(schema, TierSchema::RateioByName);
        assert_eq!(tiers.quina, 12);
        assert_eq!(schema.label(), "rateio-object");
    }

    #[test]
    fn test_no_tier_data() {
        assert!(extract_tiers(&json!({"concurso": 1})).is_none());
        assert!(extract_tiers(&json!({"rateio": "n/a"})).is_none());
    }
}
