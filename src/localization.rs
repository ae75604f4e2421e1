//! # Localization
//!
//! Display strings for categories, advice and error messages in English,
//! French and Arabic. Catalogs are Fluent files embedded at compile time and
//! loaded once into an immutable, thread-safe manager.

use std::collections::HashMap;

use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use lazy_static::lazy_static;
use serde::Serialize;
use unic_langid::LanguageIdentifier;

use crate::classifier::{BodyAdvice, BodyCategory, MealCategory};
use crate::errors::{AnalysisError, AppError, AppResult};

/// Supported display languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Fr, Language::Ar];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }

    /// Exact match on a bare, lowercase language code.
    pub fn from_code(code: &str) -> Option<Self> {
        Language::ALL.into_iter().find(|lang| lang.code() == code)
    }

    fn catalog_source(self) -> &'static str {
        match self {
            Language::En => include_str!("../locales/en/main.ftl"),
            Language::Fr => include_str!("../locales/fr/main.ftl"),
            Language::Ar => include_str!("../locales/ar/main.ftl"),
        }
    }
}

/// Keys that must resolve in every language.
pub fn required_keys() -> Vec<&'static str> {
    let mut keys = vec![
        "server-running",
        "error-body-analysis",
        "error-meal-analysis",
        "error-upload-empty",
        "error-upload-too-large",
        "error-upload-unsupported-format",
        "error-upload-unreadable",
    ];
    keys.extend(BodyCategory::ALL.iter().map(|c| c.label_key()));
    keys.extend(BodyAdvice::ALL.iter().map(|a| a.message_key()));
    keys.extend(MealCategory::ALL.iter().map(|c| c.label_key()));
    keys.extend(MealCategory::ALL.iter().map(|c| c.advice_key()));
    keys
}

/// Localization manager for BodyTalk
pub struct LocalizationManager {
    bundles: HashMap<Language, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Parse the embedded catalogs of every supported language
    pub fn new() -> AppResult<Self> {
        let mut bundles = HashMap::new();

        for language in Language::ALL {
            bundles.insert(language, Self::create_bundle(language)?);
        }

        Ok(Self { bundles })
    }

    fn create_bundle(language: Language) -> AppResult<FluentBundle<FluentResource>> {
        let locale: LanguageIdentifier = language.code().parse().map_err(|e| {
            AppError::Config(format!("Invalid locale '{}': {}", language.code(), e))
        })?;

        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Output must be exactly the catalog text, without bidi isolation marks
        bundle.set_use_isolating(false);

        let resource =
            FluentResource::try_new(language.catalog_source().to_string()).map_err(|(_, errs)| {
                AppError::Config(format!(
                    "Failed to parse '{}' catalog: {:?}",
                    language.code(),
                    errs
                ))
            })?;
        bundle.add_resource(resource).map_err(|errs| {
            AppError::Config(format!(
                "Duplicate entries in '{}' catalog: {:?}",
                language.code(),
                errs
            ))
        })?;

        Ok(bundle)
    }

    fn lookup(
        &self,
        key: &str,
        language: Language,
        args: Option<&FluentArgs>,
    ) -> Result<String, AnalysisError> {
        let gap = || AnalysisError::LocalizationGap {
            key: key.to_string(),
            language: language.code().to_string(),
        };

        let bundle = self.bundles.get(&language).ok_or_else(gap)?;
        let pattern = bundle
            .get_message(key)
            .and_then(|msg| msg.value())
            .ok_or_else(gap)?;

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            tracing::warn!(key = %key, language = %language.code(), errors = ?errors, "Message formatted with errors");
        }

        Ok(value.into_owned())
    }

    /// Get a localized message in a specific language
    pub fn get_message(&self, key: &str, language: Language) -> Result<String, AnalysisError> {
        self.lookup(key, language, None)
    }

    /// Get a localized message with arguments in a specific language
    pub fn get_message_with_args(
        &self,
        key: &str,
        language: Language,
        args: &[(&str, &str)],
    ) -> Result<String, AnalysisError> {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, value.to_string());
        }
        self.lookup(key, language, Some(&fluent_args))
    }

    /// Check every required key in every language.
    pub fn verify(&self) -> Result<(), AnalysisError> {
        for language in Language::ALL {
            let bundle = self
                .bundles
                .get(&language)
                .ok_or_else(|| AnalysisError::LocalizationGap {
                    key: "*".to_string(),
                    language: language.code().to_string(),
                })?;
            for key in required_keys() {
                if !bundle.has_message(key) {
                    return Err(AnalysisError::LocalizationGap {
                        key: key.to_string(),
                        language: language.code().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

lazy_static! {
    static ref LOCALIZATION_MANAGER: LocalizationManager =
        LocalizationManager::new().expect("Embedded locale catalogs failed to parse");
}

/// Load and verify the process-wide catalog. Call once at startup.
pub fn init_localization() -> AppResult<()> {
    // Parse separately first so a broken catalog is reported, not panicked on
    LocalizationManager::new()?.verify()?;
    lazy_static::initialize(&LOCALIZATION_MANAGER);
    tracing::info!(languages = ?Language::ALL, "Localization catalogs loaded");
    Ok(())
}

/// The process-wide catalog
pub fn localization_manager() -> &'static LocalizationManager {
    &LOCALIZATION_MANAGER
}

/// Convenience function to get a localized message
pub fn t_lang(key: &str, language: Language) -> Result<String, AnalysisError> {
    localization_manager().get_message(key, language)
}

/// Convenience function to get a localized message with arguments
pub fn t_args_lang(
    key: &str,
    args: &[(&str, &str)],
    language: Language,
) -> Result<String, AnalysisError> {
    localization_manager().get_message_with_args(key, language, args)
}

/// Resolve a requested language code, falling back to English.
///
/// Accepts region-qualified and mixed-case tags (`fr-FR`, `AR`).
pub fn detect_language(language_code: Option<&str>) -> Language {
    language_code
        .map(str::trim)
        .and_then(|code| code.parse::<LanguageIdentifier>().ok())
        .and_then(|langid| Language::from_code(langid.language.as_str()))
        .unwrap_or_default()
}
