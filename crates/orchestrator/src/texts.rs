//! Control tokens and user-facing reply texts.
//!
//! Tokens are matched case-sensitively against exact message bodies; the
//! replies are plain string constants in the deployment language.

/// Activates the assistant for the sender.
pub const ACTIVATE: &str = "/ativar";

/// Deactivates the assistant for the sender.
pub const DEACTIVATE: &str = "/desativar";

/// Requests the static help text.
pub const HELP: &str = "/ajuda";

pub const WELCOME: &str =
    "Olá! Assistente ativado. Envie sua pergunta ou /ajuda para ver os comandos.";

pub const GOODBYE: &str = "Assistente desativado. Até logo!";

pub const PROCESSING: &str = "Processando sua mensagem...";

/// Shown when the whole fallback chain is exhausted.
pub const ERROR_GENERIC: &str = "Desculpe, ocorreu um erro ao processar sua mensagem.";

/// Shown when one of the specialized image paths fails.
pub const ERROR_IMAGE: &str = "Desculpe, não foi possível processar a imagem.";

/// Shown when an arithmetic prompt does not evaluate.
pub const INVALID_EXPRESSION: &str = "Expressão matemática inválida.";

pub const HELP_TEXT: &str = "\
🤖 *Cascata — Assistente de IA*

*Comandos:*
/ativar - Ativa o assistente.
/desativar - Desativa o assistente.
/ajuda - Mostra esta mensagem.

O assistente responde de forma natural usando modelos de IA online e locais, \
realiza cálculos e gera e descreve imagens.";
