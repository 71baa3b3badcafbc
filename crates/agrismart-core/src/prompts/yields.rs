//! Yield and market prompts.

use super::PromptTemplate;

pub const PREDICT_YIELD: PromptTemplate = PromptTemplate::from_static(
    r"Predict the expected crop yield for this season:

Crop type: {{crop_type}}
Field size: {{field_size}} hectares
Planting date: {{planting_date}}

Current conditions:
- Growth stage: {{current_conditions.growth_stage}}
- Health status: {{current_conditions.health_status}}
- Soil quality: {{current_conditions.soil_quality}}
- Weather: {{current_conditions.weather}}
- Irrigation: {{current_conditions.irrigation}}
- Fertilization: {{current_conditions.fertilization}}

Historical yields:
{{historical_summary}}

Provide:
1. Expected yield (tons per hectare and total)
2. Confidence level (low, medium, high)
3. Yield range (minimum, expected, maximum)
4. Key factors influencing the prediction
5. Risks that could reduce yield
6. Opportunities to increase yield
7. Expected harvest date

Format as JSON with detailed predictions and analysis.",
);

pub const YIELD_GAPS: PromptTemplate = PromptTemplate::from_static(
    r"Analyze the yield gap and provide improvement strategies:

Crop: {{crop_type}}
Actual yield: {{actual_yield}} tons/ha
Potential yield: {{potential_yield}} tons/ha
Yield gap: {{yield_gap}} tons/ha ({{yield_gap_percent}}%)

Current practices:
- Seed variety: {{farming_practices.seed_variety}}
- Planting method: {{farming_practices.planting_method}}
- Fertilization: {{farming_practices.fertilization}}
- Irrigation: {{farming_practices.irrigation}}
- Pest control: {{farming_practices.pest_control}}
- Harvest method: {{farming_practices.harvest_method}}

Provide:
1. Main causes of the yield gap
2. Prioritized recommendations to close the gap
3. Expected yield improvement from each recommendation
4. Cost-benefit analysis for each improvement
5. Implementation timeline and steps
6. Realistic yield target for next season

Format as JSON with actionable recommendations.",
);

pub const MARKET_TIMING: PromptTemplate = PromptTemplate::from_static(
    r"Provide market timing recommendations for crop sales:

Crop: {{crop_type}}
Expected harvest: {{expected_harvest_date}}
Expected quantity: {{expected_quantity}} tons

Market data:
- Current price: {{market_data.current_price}} per ton
- Price trend: {{market_data.price_trend}}
- Demand forecast: {{market_data.demand_forecast}}
- Storage costs: {{market_data.storage_cost}} per ton/month

Provide:
1. Optimal selling strategy (immediate sale vs. storage)
2. Expected price movements (next 3-6 months)
3. Revenue optimization recommendations
4. Risk assessment (price volatility, storage risks)
5. Recommended portion to sell immediately vs. store
6. Expected ROI for different strategies

Format as JSON with detailed financial projections.",
);

pub const PLANTING_SCHEDULE: PromptTemplate = PromptTemplate::from_static(
    r"Create an optimized planting schedule for maximum productivity:

Crops to plan: {{crops}}
Total field size: {{field_size}} hectares
Climate zone: {{climate_zone}}
Objectives: {{objectives}}

Provide:
1. Recommended planting calendar (month by month)
2. Field allocation for each crop
3. Crop rotation strategy
4. Expected total annual yield
5. Expected revenue projection
6. Resource requirements (water, labor, inputs)
7. Risk mitigation through diversification

Format as JSON with a detailed monthly schedule and financial projections.",
);
