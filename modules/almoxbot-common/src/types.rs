use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Auxiliary attributes of one reference item.
///
/// Column layout of the Produtos worksheet: A name, B material code,
/// C account, D account number, E storage location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemAttributes {
    pub material: String,
    pub conta: String,
    pub num_conta: String,
    pub deposito: String,
}

/// The reference table, rebuilt from the spreadsheet on every request.
///
/// Keeps the names in sheet order (they are embedded in the extraction
/// prompt) alongside an exact-name lookup map.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    names: Vec<String>,
    attrs: HashMap<String, ItemAttributes>,
}

impl Catalog {
    /// Build a catalog from raw sheet rows, header already removed.
    /// Rows with an empty name cell are skipped; missing trailing cells
    /// default to the empty string.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let mut names = Vec::new();
        let mut attrs = HashMap::new();

        for row in rows {
            let name = row.first().map(String::as_str).unwrap_or("");
            if name.is_empty() {
                continue;
            }
            let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
            names.push(name.to_string());
            attrs.insert(
                name.to_string(),
                ItemAttributes {
                    material: cell(1),
                    conta: cell(2),
                    num_conta: cell(3),
                    deposito: cell(4),
                },
            );
        }

        Self { names, attrs }
    }

    /// Item names in sheet order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&ItemAttributes> {
        self.attrs.get(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One requested item as extracted by the model from the user's message.
/// Field names match the JSON contract of the extraction prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedItem {
    pub descricao: String,
    pub quantidade: String,
    pub setor: String,
}

/// One record appended to the Histórico worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub timestamp: String,
    pub descricao: String,
    pub quantidade: String,
    pub setor: String,
    pub deposito: String,
    pub conta: String,
    pub num_conta: String,
    pub material: String,
}

impl LogRow {
    /// Cell order of the Histórico worksheet, columns A through H.
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.timestamp,
            self.descricao,
            self.quantidade,
            self.setor,
            self.deposito,
            self.conta,
            self.num_conta,
            self.material,
        ]
    }
}
