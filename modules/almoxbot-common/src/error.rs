use thiserror::Error;

/// Domain errors raised while processing one inbound message.
///
/// Display strings double as the user-facing chat text: the webhook pipeline
/// forwards `{error}` verbatim in its error reply, so they are written in
/// Portuguese like the rest of the bot's messages.
#[derive(Error, Debug)]
pub enum AlmoxError {
    #[error("Erro ao ler a planilha de produtos: {0}")]
    Catalog(String),

    #[error("Erro da API Gemini: {0}")]
    Extraction(String),

    #[error("Resposta da IA em formato inválido: {0}")]
    Malformed(String),

    #[error("Nenhum produto da lista foi encontrado na sua mensagem.")]
    NoItemsFound,

    #[error("Erro ao gravar no histórico: {0}")]
    Ledger(String),
}
