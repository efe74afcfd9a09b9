//! Manual entry of details a filename does not give up.

use colored::*;
use dialoguer::{theme::ColorfulTheme, Input};

use crate::classifier::FieldResolver;
use crate::error::Field;

/// Asks the operator on the terminal. An empty answer leaves the field missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptResolver;

impl PromptResolver {
    fn hint(field: Field) -> &'static str {
        match field {
            Field::Board => "e.g. Cambridge, Edexcel",
            Field::Code => "syllabus code, e.g. 9709",
            Field::Session => "e.g. May-June, w, 11",
            Field::Year => "e.g. 2021",
            Field::Type => "e.g. qp, ms, Syllabus",
            Field::Level | Field::Subject => "",
        }
    }
}

impl FieldResolver for PromptResolver {
    fn resolve(&self, field: Field, name: &str) -> Option<String> {
        println!("{} {} has no {}", "❓".yellow(), name.bold(), field);

        let answer: Result<String, _> = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} ({})", field.as_str(), Self::hint(field)))
            .allow_empty(true)
            .interact_text();

        match answer {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Could not read {} for {}: {}", field, name, e);
                None
            }
        }
    }
}
