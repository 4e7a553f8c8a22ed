use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::PrayerName;

/// Localized unit abbreviations slotted into countdown strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitLabels {
    pub hour: String,
    pub minute: String,
    pub second: String,
}

impl UnitLabels {
    pub fn new(hour: impl Into<String>, minute: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            hour: hour.into(),
            minute: minute.into(),
            second: second.into(),
        }
    }
}

impl Default for UnitLabels {
    fn default() -> Self {
        Language::En.unit_labels()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
    Ar,
    Tr,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Ru, Language::Ar, Language::Tr];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Ar => "ar",
            Language::Tr => "tr",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ru => "Русский",
            Language::Ar => "العربية",
            Language::Tr => "Türkçe",
        }
    }

    pub fn next(&self) -> Language {
        match self {
            Language::En => Language::Ru,
            Language::Ru => Language::Ar,
            Language::Ar => Language::Tr,
            Language::Tr => Language::En,
        }
    }

    pub fn unit_labels(&self) -> UnitLabels {
        match self {
            Language::En => UnitLabels::new("h", "m", "s"),
            Language::Ru => UnitLabels::new("ч", "м", "с"),
            Language::Ar => UnitLabels::new("س", "د", "ث"),
            Language::Tr => UnitLabels::new("s", "d", "sn"),
        }
    }

    pub fn remaining(&self) -> &'static str {
        match self {
            Language::En => "remaining",
            Language::Ru => "осталось",
            Language::Ar => "متبقي",
            Language::Tr => "kaldı",
        }
    }

    pub fn next_prayer(&self) -> &'static str {
        match self {
            Language::En => "Next prayer",
            Language::Ru => "Следующая молитва",
            Language::Ar => "الصلاة القادمة",
            Language::Tr => "Sonraki namaz",
        }
    }

    pub fn prayer_name(&self, name: PrayerName) -> &'static str {
        use PrayerName::*;
        match (self, name) {
            (Language::En, _) => name.display_name(),
            (Language::Ru, Fajr) => "Фаджр",
            (Language::Ru, Sunrise) => "Восход",
            (Language::Ru, Dhuhr) => "Зухр",
            (Language::Ru, Asr) => "Аср",
            (Language::Ru, Maghrib) => "Магриб",
            (Language::Ru, Isha) => "Иша",
            (Language::Ar, Fajr) => "الفجر",
            (Language::Ar, Sunrise) => "الشروق",
            (Language::Ar, Dhuhr) => "الظهر",
            (Language::Ar, Asr) => "العصر",
            (Language::Ar, Maghrib) => "المغرب",
            (Language::Ar, Isha) => "العشاء",
            (Language::Tr, Fajr) => "İmsak",
            (Language::Tr, Sunrise) => "Güneş",
            (Language::Tr, Dhuhr) => "Öğle",
            (Language::Tr, Asr) => "İkindi",
            (Language::Tr, Maghrib) => "Akşam",
            (Language::Tr, Isha) => "Yatsı",
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ru" | "russian" => Ok(Language::Ru),
            "ar" | "arabic" => Ok(Language::Ar),
            "tr" | "turkish" => Ok(Language::Tr),
            _ => Err(anyhow::anyhow!("Unsupported language: {} (use en, ru, ar, tr)", s)),
        }
    }
}
