use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field value that asks the model to infer the answer itself.
pub const AI_TO_ANSWER: &str = "AI to answer";

/// ========================================
/// Generation models
/// ========================================

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gemini-2.5-flash-latest")]
    #[value(name = "gemini-2.5-flash-latest", alias = "flash")]
    Gemini25Flash,
    #[serde(rename = "gemini-2.5-pro-latest")]
    #[value(name = "gemini-2.5-pro-latest", alias = "pro")]
    Gemini25Pro,
    #[serde(rename = "gemini-3-pro-preview")]
    #[value(name = "gemini-3-pro-preview", alias = "3-pro")]
    Gemini3Pro,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [ModelId::Gemini25Flash, ModelId::Gemini25Pro, ModelId::Gemini3Pro];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gemini25Flash => "gemini-2.5-flash-latest",
            ModelId::Gemini25Pro => "gemini-2.5-pro-latest",
            ModelId::Gemini3Pro => "gemini-3-pro-preview",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::Gemini25Flash => "Gemini 2.5 Flash",
            ModelId::Gemini25Pro => "Gemini 2.5 Pro",
            ModelId::Gemini3Pro => "Gemini 3.0 Pro",
        }
    }

    fn capability_rank(&self) -> u8 {
        match self {
            ModelId::Gemini25Flash => 1,
            ModelId::Gemini25Pro => 2,
            ModelId::Gemini3Pro => 3,
        }
    }

    /// The most capable model we know about; chat always runs on it.
    pub fn highest_capability() -> ModelId {
        Self::ALL
            .into_iter()
            .max_by_key(|m| m.capability_rank())
            .unwrap_or_default()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ========================================
/// Requested output kinds
/// ========================================

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    #[default]
    #[serde(rename = "Personas")]
    #[value(name = "personas")]
    Personas,
    #[serde(rename = "Marketing Playbook")]
    #[value(name = "playbook")]
    Playbook,
    #[serde(rename = "7-Day Content Calendar")]
    #[value(name = "calendar-7")]
    Calendar7,
    #[serde(rename = "14-Day Content Calendar")]
    #[value(name = "calendar-14")]
    Calendar14,
    #[serde(rename = "21-Day Content Calendar")]
    #[value(name = "calendar-21")]
    Calendar21,
    #[serde(rename = "30-Day Content Calendar")]
    #[value(name = "calendar-30")]
    Calendar30,
}

impl OutputKind {
    pub const ALL: [OutputKind; 6] = [
        OutputKind::Personas,
        OutputKind::Playbook,
        OutputKind::Calendar7,
        OutputKind::Calendar14,
        OutputKind::Calendar21,
        OutputKind::Calendar30,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Personas => "Personas",
            OutputKind::Playbook => "Marketing Playbook",
            OutputKind::Calendar7 => "7-Day Content Calendar",
            OutputKind::Calendar14 => "14-Day Content Calendar",
            OutputKind::Calendar21 => "21-Day Content Calendar",
            OutputKind::Calendar30 => "30-Day Content Calendar",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ========================================
/// Business profile form
/// ========================================

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProfileField {
    BusinessName,
    Industry,
    Products,
    TargetAudience,
    PainPoints,
    Goals,
    Competitors,
    Usp,
    MarketingDetails,
}

impl ProfileField {
    /// Display order; the prompt numbers fields in this order.
    pub const ALL: [ProfileField; 9] = [
        ProfileField::BusinessName,
        ProfileField::Industry,
        ProfileField::Products,
        ProfileField::TargetAudience,
        ProfileField::PainPoints,
        ProfileField::Goals,
        ProfileField::Competitors,
        ProfileField::Usp,
        ProfileField::MarketingDetails,
    ];

    /// Label used inside the prompt.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            ProfileField::BusinessName => "Business Name",
            ProfileField::Industry => "Industry/Type",
            ProfileField::Products => "Products/Services",
            ProfileField::TargetAudience => "Target Audience",
            ProfileField::PainPoints => "Pain Points",
            ProfileField::Goals => "Business Goals",
            ProfileField::Competitors => "Competitors",
            ProfileField::Usp => "Unique Selling Proposition",
            ProfileField::MarketingDetails => "Marketing Details",
        }
    }

    /// Label shown on the questionnaire.
    pub fn form_label(&self) -> &'static str {
        match self {
            ProfileField::BusinessName => "Business Name",
            ProfileField::Industry => "Type / Industry",
            ProfileField::Products => "Products / Services",
            ProfileField::TargetAudience => "Target Audience",
            ProfileField::PainPoints => "Customer Pain Points",
            ProfileField::Goals => "Business Goals",
            ProfileField::Competitors => "Competitors",
            ProfileField::Usp => "Unique Selling Proposition",
            ProfileField::MarketingDetails => "Marketing Details",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            ProfileField::BusinessName => "e.g. Karma Kitchen Marrakech",
            ProfileField::Industry => "e.g. Gift Economy Restaurant",
            ProfileField::Products => "e.g. Volunteer driven meals...",
            ProfileField::TargetAudience => "Who are your ideal customers?",
            ProfileField::PainPoints => "What keeps them up at night?",
            ProfileField::Goals => "e.g. 1000 customers in 3 months",
            ProfileField::Competitors => "Local and online competitors",
            ProfileField::Usp => "What makes you remarkable?",
            ProfileField::MarketingDetails => "Channels, budget, existing assets...",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessProfile {
    pub business_name: String,
    pub industry: String,
    pub products: String,
    pub target_audience: String,
    pub pain_points: String,
    pub goals: String,
    pub competitors: String,
    pub usp: String,
    pub marketing_details: String,
    pub selected_output: OutputKind,
}

impl BusinessProfile {
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::BusinessName => &self.business_name,
            ProfileField::Industry => &self.industry,
            ProfileField::Products => &self.products,
            ProfileField::TargetAudience => &self.target_audience,
            ProfileField::PainPoints => &self.pain_points,
            ProfileField::Goals => &self.goals,
            ProfileField::Competitors => &self.competitors,
            ProfileField::Usp => &self.usp,
            ProfileField::MarketingDetails => &self.marketing_details,
        }
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let slot = match field {
            ProfileField::BusinessName => &mut self.business_name,
            ProfileField::Industry => &mut self.industry,
            ProfileField::Products => &mut self.products,
            ProfileField::TargetAudience => &mut self.target_audience,
            ProfileField::PainPoints => &mut self.pain_points,
            ProfileField::Goals => &mut self.goals,
            ProfileField::Competitors => &mut self.competitors,
            ProfileField::Usp => &mut self.usp,
            ProfileField::MarketingDetails => &mut self.marketing_details,
        };
        *slot = value.into();
    }

    pub fn use_ai_to_answer(&mut self, field: ProfileField) {
        self.set(field, AI_TO_ANSWER);
    }

    /// Title used in history listings.
    pub fn title(&self) -> &str {
        if self.business_name.trim().is_empty() {
            "Unnamed Project"
        } else {
            &self.business_name
        }
    }
}

/// Current time at the millisecond precision we persist, so stored records
/// compare equal after a reload.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// ========================================
/// Generation results (history items)
/// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub form_data: BusinessProfile,
    pub content: String,
    pub model: ModelId,
}

impl GenerationResult {
    /// `snapshot` is moved in, so later edits to the live form cannot reach it.
    pub fn new(snapshot: BusinessProfile, content: String, model: ModelId) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now_millis(),
            form_data: snapshot,
            content,
            model,
        }
    }
}

/// ========================================
/// Conversation turns
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into(), timestamp: now_millis() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into(), timestamp: now_millis() }
    }
}
