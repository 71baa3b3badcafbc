//! Farm management and coordination prompts.

use super::PromptTemplate;

pub const DAILY_BRIEFING: PromptTemplate = PromptTemplate::from_static(
    r"Generate a comprehensive daily farm management briefing:

Farm overview:
- Location: {{farm_data.location}}
- Total area: {{farm_data.total_area}} hectares
- Active crops: {{farm_data.active_crops}}
- Current season: {{farm_data.season}}

Weather:
- Temperature: {{farm_data.temperature}}°C
- Conditions: {{farm_data.weather_conditions}}
- Forecast: {{farm_data.forecast}}

Current status:
- Pending tasks: {{farm_data.pending_tasks}}
- Alerts: {{farm_data.alerts}}

Write a structured daily briefing in Brazilian Portuguese with:

TODAY'S PRIORITIES
- The most important actions

WEATHER AND IMPACTS
- Conditions and how they affect operations

CROP HEALTH
- General state of the fields

IRRIGATION
- Water needs today

ALERTS AND RISKS
- Issues that need attention

OPPORTUNITIES
- Recommended actions to improve results

Use clear, objective language.",
);

/// Advisory routing call. `agent_catalogue` is one `- name: description` line per agent.
pub const ROUTING: PromptTemplate = PromptTemplate::from_static(
    r#"Analyze this farm management query and determine which specialized agents should handle it:

Query: {{query}}
Context: {{context|None provided}}

Available agents:
{{agent_catalogue}}

Respond with a JSON array of agents to consult: ["agent1", "agent2", ...]"#,
);

pub const COMPREHENSIVE_ANSWER: PromptTemplate = PromptTemplate::from_static(
    r"As a comprehensive farm management AI, answer this query:

Query: {{query}}

Farm context:
{{context|None provided}}

Give a detailed, actionable answer in clear Brazilian Portuguese covering:
- A direct answer to the question
- Supporting data and reasoning
- Step-by-step recommendations
- Potential risks and considerations
- Expected results

Use clear formatting with bullet points and short paragraphs. Be objective and practical.",
);

pub const ACTION_PLAN: PromptTemplate = PromptTemplate::from_static(
    r"Create a comprehensive action plan for this farming goal:

Goal: {{goal}}
Timeframe: {{timeframe}}

Current farm status:
{{farm_status}}

Constraints: {{constraints|None specified}}

Provide a detailed action plan including:
1. Milestones and phases
2. Week-by-week or month-by-month tasks
3. Resource requirements (labor, equipment, inputs)
4. Budget estimates
5. Success metrics and KPIs
6. Risk mitigation strategies
7. Contingency plans
8. Expected outcomes and ROI

Format as JSON with timeline, tasks, resources, and metrics.",
);

pub const FARM_PERFORMANCE: PromptTemplate = PromptTemplate::from_static(
    r"Analyze farm performance for {{period}}:

Performance metrics:
- Total yield: {{performance_data.total_yield}} tons
- Revenue: ${{performance_data.revenue}}
- Costs: ${{performance_data.costs}}
- Profit margin: {{performance_data.profit_margin}}%
- Water usage: {{performance_data.water_usage}} m³
- Crop health incidents: {{performance_data.health_incidents}}
- Yield per hectare: {{performance_data.yield_per_ha}} tons

Benchmarks:
{{performance_data.benchmarks}}

Provide a comprehensive analysis:
1. Overall performance rating
2. Strengths and successes
3. Areas for improvement
4. Comparison with benchmarks and previous periods
5. Key insights and patterns
6. Strategic recommendations for the next period
7. Efficiency opportunities
8. Investment priorities

Format as JSON with detailed analysis and action items.",
);

pub const EMERGENCY: PromptTemplate = PromptTemplate::from_static(
    r"EMERGENCY RESPONSE REQUIRED

Emergency type: {{emergency_type}}
Details: {{details}}

Provide an immediate emergency response plan:
1. IMMEDIATE ACTIONS (next 1-4 hours)
2. SHORT-TERM ACTIONS (next 24-48 hours)
3. Resources needed urgently
4. Expected damage and impact assessment
5. Prevention of further damage
6. Recovery plan
7. Long-term mitigation strategies
8. Contacts and resources to mobilize

Format as JSON with URGENT actions clearly marked.
Prioritize crop and livestock safety.",
);
