//! Water and irrigation prompts.

use super::PromptTemplate;

pub const IRRIGATION_SCHEDULE: PromptTemplate = PromptTemplate::from_static(
    r"Create an optimal irrigation schedule for the next 14 days:

Crop type: {{crop_type}}
Field size: {{field_size}} hectares
Soil type: {{soil_type}}
Current temperature: {{climate_data.temperature}}°C
Humidity: {{climate_data.humidity}}%
Rainfall forecast: {{climate_data.rainfall_forecast}}
Water availability: {{water_availability}}

Provide a detailed 14-day irrigation schedule including:
1. Daily irrigation requirements (yes/no, volume in liters)
2. Best time for irrigation each day
3. Expected total water consumption
4. Water-saving opportunities
5. Efficiency optimization tips
6. Contingency plans for water shortage

Format as JSON with a daily schedule array and summary statistics.",
);

pub const WATER_EFFICIENCY: PromptTemplate = PromptTemplate::from_static(
    r"Calculate and analyze water usage efficiency:

Crop: {{crop_type}}
Water used: {{water_used}} m³
Field size: {{field_size}} hectares
Crop yield: {{crop_yield}} tons

Provide:
1. Water productivity (kg per m³)
2. Comparison with industry benchmarks for {{crop_type}}
3. Efficiency rating (poor, fair, good, excellent)
4. Specific recommendations to improve water efficiency
5. Potential water savings (percentage and volume)
6. ROI of implementing water-saving technologies

Format as JSON with detailed metrics and actionable recommendations.",
);

pub const IRRIGATION_ISSUES: PromptTemplate = PromptTemplate::from_static(
    r"Analyze irrigation system performance and detect issues:

System type: {{irrigation_system}}

Sensor data:
- Soil moisture zones: {{sensor_data.moisture_zones}}
- Water pressure: {{sensor_data.water_pressure}} bar
- Flow rate: {{sensor_data.flow_rate}} L/min
- Coverage uniformity: {{sensor_data.coverage_uniformity}}%

Identify:
1. Potential system issues (leaks, clogs, pressure problems)
2. Uneven water distribution areas
3. Maintenance requirements
4. System efficiency rating
5. Repair or upgrade recommendations
6. Preventive maintenance schedule

Format as JSON with an issues array and recommendations.",
);

pub const IRRIGATION_TECHNOLOGY: PromptTemplate = PromptTemplate::from_static(
    r"Recommend the best irrigation technology for this farm:

Farm size: {{farm_details.size}} hectares
Crops: {{farm_details.crops}}
Terrain: {{farm_details.terrain}}
Current system: {{farm_details.current_system|None}}
Budget: {{budget}}
Water source: {{water_source}}

Provide:
1. Top 3 recommended irrigation technologies
2. Cost estimates for each option
3. Water savings potential (%)
4. Installation complexity and timeline
5. Maintenance requirements
6. Expected ROI and payback period
7. Environmental benefits

Format as JSON with a detailed comparison and a final recommendation.",
);
