/// Turns a post title into the caption that gets published.
///
/// Both flows only ever see this trait, so a real translation backend can
/// replace [`StubTranslator`] without touching them.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str) -> String;
}

const STUB_PREFIX: &str = "Перевод: ";

/// Marks the text as "translated" without changing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubTranslator;

impl Translator for StubTranslator {
    fn translate(&self, text: &str) -> String {
        format!("{STUB_PREFIX}{text}")
    }
}
