use async_trait::async_trait;
use tracing::info;

use almoxbot_common::{AlmoxError, ExtractedItem};
use gemini_client::GeminiClient;

use crate::ports::ItemExtractor;

/// Sector recorded when the message does not mention one. The prompt
/// instructs the model to emit exactly this value.
pub const UNSPECIFIED_SECTOR: &str = "Não Informado";

/// Build the stock-assistant prompt: the valid-name list, the single-sector
/// rule, the placeholder rule and the quantity normalization rule, followed
/// by the expected JSON shape.
fn build_prompt(text: &str, known_names: &[String]) -> String {
    let lista = known_names.join("\n");
    format!(
        r#"Você é um assistente de estoque. Sua tarefa é analisar uma frase e extrair UMA LISTA de todos os produtos, quantidades e setor.

LISTA DE PRODUTOS VÁLIDOS:
{lista}

FRASE DO USUÁRIO: "{text}"

REGRAS:
1. 'descricao' DEVE ser o nome EXATO da lista. Use correspondência aproximada para encontrar.
2. O 'setor' é o local/departamento (ex: 'limpeza', 'clínica veterinária', 'copa', 'NPJ'). Ele pode ser mencionado apenas uma vez e deve ser aplicado a TODOS os itens da lista.
3. Se o setor não for mencionado, use "{UNSPECIFIED_SECTOR}" para TODOS.
4. 'quantidade' DEVE ser um número (ex: "01" vira "1").

Retorne APENAS um array de objetos JSON no formato:
[
  {{"descricao": "NOME EXATO DO ITEM 1", "quantidade": "NUMERO 1", "setor": "SETOR APLICADO"}},
  {{"descricao": "NOME EXATO DO ITEM 2", "quantidade": "NUMERO 2", "setor": "SETOR APLICADO"}}
]
Se NENHUM produto da lista for encontrado, retorne um array vazio: []"#
    )
}

/// Strip markdown code fences from a model response.
fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse the generated payload into items. Non-JSON text and wrongly shaped
/// elements are malformed responses; anything that is not a non-empty array
/// means no known product was found.
fn parse_items(payload: &str) -> Result<Vec<ExtractedItem>, AlmoxError> {
    let value: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| AlmoxError::Malformed(e.to_string()))?;

    match value {
        serde_json::Value::Array(elements) if !elements.is_empty() => {
            serde_json::from_value(serde_json::Value::Array(elements))
                .map_err(|e| AlmoxError::Malformed(e.to_string()))
        }
        _ => Err(AlmoxError::NoItemsFound),
    }
}

/// Extraction backed by the Gemini generateContent API.
pub struct GeminiExtractor {
    gemini: GeminiClient,
}

impl GeminiExtractor {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }
}

#[async_trait]
impl ItemExtractor for GeminiExtractor {
    async fn extract(
        &self,
        text: &str,
        known_names: &[String],
    ) -> Result<Vec<ExtractedItem>, AlmoxError> {
        let prompt = build_prompt(text, known_names);

        let generated = self
            .gemini
            .generate(&prompt)
            .await
            .map_err(|e| AlmoxError::Extraction(e.to_string()))?;

        let items = parse_items(strip_code_blocks(&generated))?;
        info!(items = items.len(), "Extracted request items");
        Ok(items)
    }
}
