// Job analysis prompt templates.

pub const ANALYSIS_SYSTEM: &str = "\
You are a career advisor helping job seekers analyze job descriptions. \
Provide a concise summary and suggest relevant skills.";

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Please analyze this job description and provide:
1. A brief summary (2-3 sentences)
2. The top 3 skills a candidate should highlight in their resume

Job Description:
{job_description}

Respond ONLY with valid JSON in this exact format:
{
  "summary": "Brief summary here",
  "skills": ["skill1", "skill2", "skill3"]
}
Do not include any extra explanation."#;
