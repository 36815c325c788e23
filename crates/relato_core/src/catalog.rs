//! Static catalog of report bases.
//!
//! The list mirrors the portal's selector options; the reserved `-1`/`TODAS`
//! entry ("all bases") is an ordinary catalog row with no special handling.

use crate::error::{CoreError, CoreResult};
use crate::types::Base;

/// Portal base options in menu order.
const BASES: &[(&str, &str)] = &[
    ("-1", "TODAS"),
    ("1", "BASE BAURU"),
    ("11", "DESCONEXAO"),
    ("12", "BASE PIRACICABA"),
    ("13", "BASE PAULINIA"),
    ("14", "BASE RIBEIRAO PRETO"),
    ("15", "BASE JAGUARIUNA"),
    ("18", "BASE BATATAIS"),
    ("19", "DESCONEXAO GPON"),
    ("20", "BASE SUMARE VT"),
    ("21", "BASE ESTOQUE"),
    ("22", "BASE PIRACICABA VT"),
    ("23", "BASE RIBEIRÃO VT"),
    ("25", "GPON BAURU"),
    ("26", "BASE ARARAS VT"),
    ("27", "BASE LIMEIRA"),
    ("29", "BASE SUMARE"),
    ("31", "BASE BAURU VT"),
    ("32", "BASE BOTUCATU VT"),
    ("33", "BASE BOTUCATU"),
    ("34", "DESCONEXÃO BOTUCATU"),
    ("35", "GPON RIBEIRAO PRETO"),
    ("37", "BASE SOROCABA"),
    ("39", "DESCONEXAO RIBEIRAO PRETO"),
    ("40", "BASE SAO JOSE DO RIO PRETO"),
    ("41", "BASE SERTAOZINHO VT"),
    ("42", "BASE VAR PIRACICABA"),
    ("43", "BASE VAR ARARAS"),
    ("44", "BASE VAR SUMARE"),
    ("45", "BASE VAR BAURU"),
    ("46", "BASE MDU PIRACICABA"),
    ("47", "BASE MDU ARARAS"),
    ("48", "BASE MDU MOGI"),
    ("49", "BASE MDU BAURU"),
    ("50", "BASE MDU RIBEIRÃO PRETO"),
    ("51", "BASE MDU SJRP"),
    ("52", "BASE CAMPINAS"),
    ("54", "DESCONEXÃO CAMPINAS"),
];

/// Ordered, immutable collection of selectable bases.
#[derive(Debug, Clone)]
pub struct BaseCatalog {
    bases: Vec<Base>,
}

impl BaseCatalog {
    /// The standard portal catalog.
    pub fn standard() -> Self {
        Self {
            bases: BASES
                .iter()
                .map(|(id, name)| Base::new(*id, *name))
                .collect(),
        }
    }

    /// Build a catalog from an explicit list (tests, alternate deployments).
    pub fn from_bases(bases: Vec<Base>) -> Self {
        Self { bases }
    }

    /// All bases in menu order.
    pub fn all(&self) -> &[Base] {
        &self.bases
    }

    /// Look up a base by its display name.
    pub fn by_name(&self, name: &str) -> CoreResult<&Base> {
        self.bases
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| CoreError::UnknownBase(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_contents() {
        let catalog = BaseCatalog::standard();
        assert_eq!(catalog.len(), 38);

        let first = &catalog.all()[0];
        assert_eq!(first.id, "-1");
        assert_eq!(first.name, "TODAS");

        let bauru = catalog.by_name("BASE BAURU").unwrap();
        assert_eq!(bauru.id, "1");
    }

    #[test]
    fn test_lookup_is_exact() {
        let catalog = BaseCatalog::standard();
        assert!(catalog.by_name("BASE BAURU VT").is_ok());
        assert!(catalog.by_name("BAURU").is_err());
        assert!(catalog.by_name("base bauru").is_err());
    }
}
