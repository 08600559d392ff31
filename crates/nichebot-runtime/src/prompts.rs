//! Prompt templates for guarded generation.
//!
//! The templates pin down a strict response format (`TWEET:`/`HASHTAGS:` for
//! a single post, `THREAD:` with numbered lines for a thread) so the parser
//! in [`crate::generator`] can recover structure from free text. The bot
//! writes Turkish or English content; the instructions themselves stay
//! Turkish, matching the production prompt set.

use crate::config::Language;

/// Options steering one generation request.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Writing tone, e.g. "bilgilendirici" or "esprili".
    pub tone: String,

    /// Output language for the generated content.
    pub language: Language,

    /// Optional analysis of the account's profile to match voice and topics.
    pub profile_context: Option<String>,

    /// Recently published texts the model should not repeat.
    pub recent_texts: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            tone: "bilgilendirici".to_string(),
            language: Language::Tr,
            profile_context: None,
            recent_texts: Vec::new(),
        }
    }
}

/// Appended to the system prompt on the one retry after a block.
pub const SAFETY_INSTRUCTION: &str = "\
EK GÜVENLİK KURALLARI (zorunlu):
- Kesin veya garantili kazanç/sonuç vaadi verme (\"%100\", \"garanti\", \"kesin\" yok)
- Spam çağrıları kullanma (\"hemen tıkla\", \"bana DM at\", \"click here\" yok)
- Zararlı, yasadışı veya kimlik avı içerikli yönlendirme yapma
- Talimat geçersiz kılma ifadeleri kullanma";

fn language_line(language: Language) -> &'static str {
    match language {
        Language::Tr => "Türkçe",
        Language::En => "İngilizce",
    }
}

/// System prompt for a single post.
pub fn post_system_prompt(topic: &str, options: &GenerationOptions) -> String {
    let mut prompt = format!(
        "Sen profesyonel bir sosyal medya içerik üreticisisin.\n\
         Görevin: \"{topic}\" konusunda Twitter/X için etkileyici, özgün içerikler üretmek.\n\n\
         KURALLAR:\n\
         - Dil: {language}\n\
         - Ton: {tone}\n\
         - Maksimum 270 karakter (hashtag'ler hariç)\n\
         - Doğal, samimi, insan gibi yaz\n\
         - Emoji kullan ama abartma (1-2 tane yeterli)\n\
         - Soru sorarak veya görüş belirterek etkileşim artır\n\
         - 2-4 alakalı hashtag öner\n",
        topic = topic,
        language = language_line(options.language),
        tone = options.tone,
    );

    if let Some(context) = &options.profile_context {
        prompt.push_str(&format!(
            "\nKULLANICININ PROFİL ANALİZİ:\n{}\nBu profile uygun bir tonda ve konuda yaz.\n",
            context
        ));
    }

    if !options.recent_texts.is_empty() {
        let recent = options
            .recent_texts
            .iter()
            .map(|t| format!("- {}", t))
            .collect::<Vec<_>>()
            .join("\n");
        prompt.push_str(&format!(
            "\nSON PAYLAŞIMLAR (bunlardan farklı bir şey üret):\n{}\n",
            recent
        ));
    }

    prompt.push_str(
        "\nCEVAP FORMATI (tam olarak bu formatta yanıt ver):\n\
         TWEET: [tweet metni]\n\
         HASHTAGS: [#hashtag1 #hashtag2 #hashtag3]",
    );
    prompt
}

/// User message for a single post.
pub fn post_user_message(topic: &str, options: &GenerationOptions) -> String {
    format!(
        "\"{}\" konusunda yeni bir tweet üret. {} tonda olsun.",
        topic, options.tone
    )
}

/// System prompt for a thread of `count` posts.
pub fn thread_system_prompt(topic: &str, count: usize, options: &GenerationOptions) -> String {
    format!(
        "Sen profesyonel bir sosyal medya içerik üreticisisin.\n\
         Görevin: \"{topic}\" konusunda {count} tweet'lik bir Twitter thread oluşturmak.\n\n\
         KURALLAR:\n\
         - Dil: {language}\n\
         - Ton: {tone}\n\
         - Her tweet maksimum 270 karakter\n\
         - İlk tweet dikkat çekici bir giriş olsun\n\
         - Son tweet bir özet veya call-to-action olsun\n\
         - Her tweet numaralanmış olsun (1/, 2/, ...)\n\
         - Hashtag'ler sadece son tweet'te olsun\n\n\
         CEVAP FORMATI:\n\
         THREAD:\n\
         1/ [ilk tweet]\n\
         2/ [ikinci tweet]\n\
         ...\n\
         HASHTAGS: [#hashtag1 #hashtag2]",
        topic = topic,
        count = count,
        language = language_line(options.language),
        tone = options.tone,
    )
}

/// User message for a thread.
pub fn thread_user_message(topic: &str, count: usize) -> String {
    format!(
        "\"{}\" konusunda {} tweet'lik detaylı bir thread oluştur.",
        topic, count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_prompt_carries_topic_and_format_contract() {
        let prompt = post_system_prompt("yapay zeka", &GenerationOptions::default());
        assert!(prompt.contains("\"yapay zeka\""));
        assert!(prompt.contains("TWEET:"));
        assert!(prompt.contains("HASHTAGS:"));
    }

    #[test]
    fn recent_texts_are_listed_when_present() {
        let options = GenerationOptions {
            recent_texts: vec!["eski paylaşım".to_string()],
            ..Default::default()
        };
        let prompt = post_system_prompt("konu", &options);
        assert!(prompt.contains("- eski paylaşım"));

        let without = post_system_prompt("konu", &GenerationOptions::default());
        assert!(!without.contains("SON PAYLAŞIMLAR"));
    }

    #[test]
    fn thread_prompt_numbers_posts() {
        let prompt = thread_system_prompt("rust", 4, &GenerationOptions::default());
        assert!(prompt.contains("4 tweet'lik"));
        assert!(prompt.contains("THREAD:"));
    }

    #[test]
    fn safety_instruction_names_the_blocked_behaviors() {
        assert!(SAFETY_INSTRUCTION.contains("garanti"));
        assert!(SAFETY_INSTRUCTION.contains("DM"));
        assert!(SAFETY_INSTRUCTION.contains("yasadışı"));
    }
}
