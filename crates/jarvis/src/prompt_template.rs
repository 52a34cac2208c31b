use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tera::{Context, Error as TeraError, Tera};

static PROMPTS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/prompts");

/// Language the plain chat persona answers in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Th,
}

#[derive(Serialize)]
struct ChatPromptContext<'a> {
    chat_history: &'a str,
    input: &'a str,
}

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// Render one of the prompts bundled into the binary
pub fn load_prompt_file<T: Serialize>(
    template_file: &str,
    context_data: &T,
) -> Result<String, TeraError> {
    let template_content = PROMPTS_DIR
        .get_file(template_file)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| TeraError::msg(format!("Prompt template not found: {}", template_file)))?;
    load_prompt(template_content, context_data)
}

/// The chat template file used for a language
pub fn chat_template(language: Language) -> &'static str {
    match language {
        Language::En => "chat_en.md",
        Language::Th => "chat_th.md",
    }
}

/// Fill the chat template for `language` with a flattened transcript and the new input
pub fn render_chat_prompt(
    language: Language,
    chat_history: &str,
    input: &str,
) -> Result<String, TeraError> {
    load_prompt_file(
        chat_template(language),
        &ChatPromptContext {
            chat_history,
            input,
        },
    )
}
