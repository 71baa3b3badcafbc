//! Crop health prompts.

use super::PromptTemplate;

pub const ANALYZE_CROP_IMAGE: PromptTemplate = PromptTemplate::from_static(
    r"You are an expert agricultural crop health analyst. Analyze this image of {{crop_type}}.

Additional context: {{additional_info|None provided}}

Provide a detailed analysis including:
1. Overall health status (healthy, stressed, diseased, etc.)
2. Identified issues (diseases, pests, nutrient deficiencies, etc.)
3. Severity level (low, medium, high, critical)
4. Specific recommendations for treatment or intervention
5. Preventive measures for the future
6. Confidence level of the diagnosis

Format your response as JSON with keys: health_status, issues, severity, recommendations, prevention, confidence.",
);

pub const IDENTIFY_DISEASE: PromptTemplate = PromptTemplate::from_static(
    r"As a crop disease expert, identify the disease affecting {{crop_type}} with these symptoms:

{{symptoms}}

Provide:
1. Most likely disease(s), top 3 possibilities with probability
2. Detailed description of each disease
3. Treatment options (organic and chemical)
4. Expected recovery timeline
5. Risk of spread to other crops
6. Prevention strategies

Format as JSON with keys: diseases (array), treatments, recovery_time, spread_risk, prevention.",
);

pub const NUTRIENT_DEFICIENCY: PromptTemplate = PromptTemplate::from_static(
    r"Analyze these observations for {{crop_type}} to identify nutrient deficiencies:

Leaf color: {{observations.leaf_color}}
Leaf patterns: {{observations.leaf_patterns}}
Growth rate: {{observations.growth_rate}}
Stem condition: {{observations.stem_condition}}
Other notes: {{observations.notes}}

Provide:
1. Identified nutrient deficiencies (N, P, K, micronutrients)
2. Confidence level for each deficiency
3. Recommended fertilizer type and amount
4. Application method and timing
5. Expected improvement timeline

Format as JSON.",
);

pub const CROP_ROTATION: PromptTemplate = PromptTemplate::from_static(
    r"Recommend an optimal crop rotation strategy:

Current crop: {{current_crop}}
Soil condition: {{soil_condition}}
Previous crops (last 3 seasons): {{previous_crops|None}}

Provide:
1. Recommended next crop(s), top 3 options
2. Reasoning for each recommendation
3. Expected soil health improvements
4. Pest and disease management benefits
5. Economic considerations
6. Timeline and seasonal considerations

Format as JSON with detailed explanations.",
);
