//! Climate monitoring prompts.

use super::PromptTemplate;

pub const ANALYZE_CLIMATE: PromptTemplate = PromptTemplate::from_static(
    r"You are an expert in Brazilian agricultural meteorology.

Analyze the climate data for a farm in {{location}}:

Temperature: {{climate_data.temperature}}°C
Humidity: {{climate_data.humidity}}%
Rainfall: {{climate_data.rainfall}}mm
Wind speed: {{climate_data.wind_speed}} km/h
UV index: {{climate_data.uv_index}}

Answer in Brazilian Portuguese with these sections:

CURRENT CONDITIONS
- Overall rating (ideal / good / adequate / adverse)
- How conditions compare with what is expected for the region and season

CROP RISK FACTORS
- Immediate risks
- Most vulnerable crops
- Level of concern (low / medium / high / critical)

IMMEDIATE RECOMMENDATIONS
- Actions for today
- Management priorities
- Special care

7-DAY OUTLOOK
- Expected trends
- Activity planning
- Windows of opportunity

Use clear, objective language focused on practical actions.",
);

pub const IRRIGATION_RECOMMENDATION: PromptTemplate = PromptTemplate::from_static(
    r"As an agricultural irrigation specialist, recommend an irrigation strategy for {{crop_type}}:

Temperature: {{climate_data.temperature}}°C
Humidity: {{climate_data.humidity}}%
Recent rainfall: {{climate_data.rainfall}}mm
Soil moisture: {{climate_data.soil_moisture}}%

Give specific recommendations in Brazilian Portuguese:

IRRIGATION DECISION
- Irrigate today? (YES/NO)
- Justification

WATER VOLUME
- Recommended amount (liters per hectare)
- What the figure is based on

IDEAL TIMING
- Best time of day
- Estimated duration
- Why that time

NOTES
- Special conditions to consider
- Efficiency tips
- Water savings

Be specific and practical.",
);

pub const WEATHER_IMPACT: PromptTemplate = PromptTemplate::from_static(
    r"Analyze the impact of the weather forecast on crops at the {{crop_stage}} stage:

Forecast: {{forecast_data}}

Answer in Brazilian Portuguese:

POSITIVE IMPACTS
- Expected benefits of the forecast weather
- Opportunities to take advantage of

NEGATIVE IMPACTS
- Identified risks
- Possible problems

PREVENTIVE MEASURES
- Actions to minimize risk
- Implementation timeline

OPPORTUNITY RECOMMENDATIONS
- How to use favorable conditions
- Recommended activities

Consider Brazilian farming conditions.",
);

pub const FROST_RISK: PromptTemplate = PromptTemplate::from_static(
    r"You are an expert in Brazilian agricultural meteorology.

Assess the FROST risk for this situation:

Location: {{location}}
Forecast minimum temperature: {{min_temp_forecast}}°C
Crop: {{crop_type}}
Growth stage: {{crop_stage}}

Give a complete analysis in Brazilian Portuguese:

RISK ANALYSIS
- Risk level: CRITICAL / HIGH / MEDIUM / LOW / NONE
- Critical temperature for {{crop_type}}: __°C
- Margin to the forecast temperature: __°C
- Probability of frost: __%

POTENTIAL IMPACTS
- Expected damage if frost occurs
- Most vulnerable plant parts
- Estimated yield loss (%)
- Reversible vs. permanent damage

URGENT PREVENTIVE MEASURES
- Actions to take BEFORE the frost (next 12-24h)
- Recommended protection: preventive irrigation, covers, fans or heaters, controlled burning where applicable
- Cost vs. benefit of each measure
- Which areas to protect first

TIMELINE
- When the lowest temperature is expected
- How long the risk lasts
- When to reassess

AFTER A FROST
- How to assess damage in the first hours
- Immediate recovery measures
- What NOT to do

BRAZIL-SPECIFIC RECOMMENDATIONS
- Common regional practices
- Locally available resources

Be EXTREMELY specific and practical. Prioritize actions that can be taken with resources available in Brazil.",
);

pub const DROUGHT_ASSESSMENT: PromptTemplate = PromptTemplate::from_static(
    r"You are an expert in water resources and precision agriculture in Brazil.

Assess the DROUGHT conditions for this farm:

Location: {{location}}
Crop: {{crop_type}}
Total rainfall (last {{days_tracked}} days): {{total_rainfall}}mm
Average daily rainfall: {{avg_rainfall_text}}mm
Current soil moisture: {{soil_moisture}}%

Give a complete assessment in Brazilian Portuguese:

DROUGHT CLASSIFICATION
- Severity: EXTREME / SEVERE / MODERATE / MILD / NORMAL
- Comparison with normal levels for {{location}} at this time of year
- Trend (improving / worsening / stable)

DETAILED DATA ANALYSIS
- Accumulated water deficit
- Consecutive days without significant rain (>5mm)
- Soil moisture vs. ideal for {{crop_type}}
- Crop water stress index

CROP IMPACTS
- Most affected growth stage
- Estimated yield loss (%)
- Visible stress signs to watch for
- Damage already done vs. still avoidable

PRIORITY IRRIGATION STRATEGIES
- Water volume required (liters/ha/day)
- Ideal irrigation frequency
- Most efficient method (sprinkler, drip, center pivot)
- Which plots to prioritize

FIELD MANAGEMENT TO MITIGATE DROUGHT
- Fertilization adjustments
- Weed control
- Soil protection (mulching, cover, no-till)

MONITORING
- Indicators to check daily
- Triggers for emergency action

ECONOMICS
- Cost of emergency irrigation vs. cost of lost production
- Crop insurance and government support programs available

Be VERY specific with numbers and deadlines, and focus on CONCRETE ACTIONS that can be taken NOW.",
);
