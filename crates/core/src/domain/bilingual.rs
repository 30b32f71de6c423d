use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    He,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualText {
    pub en: String,
    pub he: String,
}

impl BilingualText {
    pub fn new(en: impl Into<String>, he: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            he: he.into(),
        }
    }

    pub fn set(&mut self, lang: Lang, text: impl Into<String>) {
        match lang {
            Lang::En => self.en = text.into(),
            Lang::He => self.he = text.into(),
        }
    }

    pub fn apply(&mut self, value: TextValue) {
        match value {
            TextValue::Slot { lang, text } => self.set(lang, text),
            TextValue::Both(text) => *self = text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextValue {
    Slot { lang: Lang, text: String },
    Both(BilingualText),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_edit_leaves_other_language_untouched() {
        let mut text = BilingualText::new("Question 1", "שאלה 1");
        text.apply(TextValue::Slot { lang: Lang::En, text: "Question 1a".to_string() });

        assert_eq!(text.en, "Question 1a");
        assert_eq!(text.he, "שאלה 1");
    }

    #[test]
    fn full_edit_replaces_both_languages() {
        let mut text = BilingualText::new("a", "b");
        text.apply(TextValue::Both(BilingualText::new("c", "d")));

        assert_eq!(text, BilingualText::new("c", "d"));
    }

    #[test]
    fn text_value_deserializes_both_shapes() {
        let slot: TextValue =
            serde_json::from_str(r#"{"lang":"he","text":"רמז"}"#).expect("slot should parse");
        assert_eq!(slot, TextValue::Slot { lang: Lang::He, text: "רמז".to_string() });

        let both: TextValue =
            serde_json::from_str(r#"{"en":"hint","he":"רמז"}"#).expect("pair should parse");
        assert_eq!(both, TextValue::Both(BilingualText::new("hint", "רמז")));
    }

    #[test]
    fn bilingual_text_requires_both_keys() {
        let result: Result<BilingualText, _> = serde_json::from_str(r#"{"en":"only english"}"#);
        assert!(result.is_err());
    }
}
