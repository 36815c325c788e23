//! User-facing message texts.

pub const MSG_SELECT_BASE: &str = "Selecione a BASE desejada:";
pub const MSG_START_PROMPT: &str =
    "Por favor, forneça a data inicial no formato DD/MM/YYYY:";
pub const MSG_START_INVALID: &str =
    "Data inválida. Por favor, forneça a data inicial no formato DD/MM/YYYY:";
pub const MSG_END_PROMPT: &str =
    "Agora, por favor, forneça a data final no formato DD/MM/YYYY:";
pub const MSG_END_INVALID: &str =
    "Data inválida. Por favor, forneça a data final no formato DD/MM/YYYY:";
pub const MSG_END_BEFORE_START: &str =
    "A data final é anterior à data inicial. Por favor, forneça a data final no formato DD/MM/YYYY:";
pub const MSG_GENERATING: &str = "Gerando relatório, por favor aguarde...";
pub const MSG_GENERATION_FAILED: &str = "Ocorreu um erro ao gerar o relatório.";
pub const MSG_CANCELLED: &str = "Operação cancelada.";
pub const MSG_NOTHING_TO_CANCEL: &str = "Não há operação em andamento.";

/// Filename the report is delivered under.
pub const REPORT_FILENAME: &str = "relatorio.pdf";

/// Confirmation shown in place of the menu once a base is picked.
pub fn base_selected(name: &str) -> String {
    format!("Base '{}' selecionada.", name)
}
