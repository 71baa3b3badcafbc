//! Prompt template system.
//!
//! Every agent operation renders exactly one of the templates below from
//! its request fields.
//!
//! # Example
//!
//! ```rust
//! use agrismart_core::prompts::{PromptContext, PromptTemplate};
//!
//! let template = PromptTemplate::from_static("Frost risk in {{location}} for {{crop_type|Soja}}");
//! let mut context = PromptContext::new();
//! context.set("location", "Guarapuava");
//! assert_eq!(template.render(&context), "Frost risk in Guarapuava for Soja");
//! ```

pub mod climate;
pub mod crop;
pub mod farm;
pub mod templates;
pub mod water;
pub mod yields;

pub use templates::{MISSING_VALUE, PromptContext, PromptTemplate, RenderOptions, render_value};

#[cfg(test)]
mod tests {
    use super::*;

    fn all_templates() -> Vec<(&'static str, PromptTemplate)> {
        vec![
            ("analyze_climate", climate::ANALYZE_CLIMATE),
            ("irrigation_recommendation", climate::IRRIGATION_RECOMMENDATION),
            ("weather_impact", climate::WEATHER_IMPACT),
            ("frost_risk", climate::FROST_RISK),
            ("drought_assessment", climate::DROUGHT_ASSESSMENT),
            ("analyze_crop_image", crop::ANALYZE_CROP_IMAGE),
            ("identify_disease", crop::IDENTIFY_DISEASE),
            ("nutrient_deficiency", crop::NUTRIENT_DEFICIENCY),
            ("crop_rotation", crop::CROP_ROTATION),
            ("irrigation_schedule", water::IRRIGATION_SCHEDULE),
            ("water_efficiency", water::WATER_EFFICIENCY),
            ("irrigation_issues", water::IRRIGATION_ISSUES),
            ("irrigation_technology", water::IRRIGATION_TECHNOLOGY),
            ("predict_yield", yields::PREDICT_YIELD),
            ("yield_gaps", yields::YIELD_GAPS),
            ("market_timing", yields::MARKET_TIMING),
            ("planting_schedule", yields::PLANTING_SCHEDULE),
            ("daily_briefing", farm::DAILY_BRIEFING),
            ("routing", farm::ROUTING),
            ("comprehensive_answer", farm::COMPREHENSIVE_ANSWER),
            ("action_plan", farm::ACTION_PLAN),
            ("farm_performance", farm::FARM_PERFORMANCE),
            ("emergency", farm::EMERGENCY),
        ]
    }

    #[test]
    fn test_every_template_renders_without_context() {
        for (name, template) in all_templates() {
            assert!(!template.list_placeholders().is_empty(), "{name} has no placeholders");
            let rendered = template.render(&PromptContext::new());
            assert!(!rendered.contains("{{"), "{name} left a placeholder behind");
        }
    }

    #[test]
    fn test_portuguese_instruction_where_expected() {
        for template in [
            climate::ANALYZE_CLIMATE,
            climate::FROST_RISK,
            climate::DROUGHT_ASSESSMENT,
            farm::DAILY_BRIEFING,
            farm::COMPREHENSIVE_ANSWER,
        ] {
            assert!(template.content().contains("Brazilian Portuguese"));
        }
    }
}
