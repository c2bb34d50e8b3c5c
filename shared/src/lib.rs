use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend primary key of a journal entry
pub type EntryId = i64;

/// Number of characters kept in a listing preview before the ellipsis
pub const CONTENT_PREVIEW_CHARS: usize = 150;

/// Kind of AI assistance requested alongside a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelpType {
    AcuteValidation,
    AcuteSkills,
    ChronicEducation,
    ChronicValidation,
    MaxValidation,
    MaxAssessment,
    SaveOnly,
}

impl HelpType {
    pub const ALL: [HelpType; 7] = [
        HelpType::AcuteValidation,
        HelpType::AcuteSkills,
        HelpType::ChronicEducation,
        HelpType::ChronicValidation,
        HelpType::MaxValidation,
        HelpType::MaxAssessment,
        HelpType::SaveOnly,
    ];

    /// Wire name, identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            HelpType::AcuteValidation => "acute_validation",
            HelpType::AcuteSkills => "acute_skills",
            HelpType::ChronicEducation => "chronic_education",
            HelpType::ChronicValidation => "chronic_validation",
            HelpType::MaxValidation => "max_validation",
            HelpType::MaxAssessment => "max_assessment",
            HelpType::SaveOnly => "save_only",
        }
    }

    /// How many previous entries the backend feeds the model as context
    pub fn context_window_size(&self) -> u32 {
        match self {
            HelpType::AcuteValidation | HelpType::AcuteSkills | HelpType::SaveOnly => 0,
            HelpType::ChronicEducation | HelpType::ChronicValidation => 7,
            HelpType::MaxValidation | HelpType::MaxAssessment => 30,
        }
    }

    /// Anonymous users may only ask for the acute help types
    pub fn requires_authentication(&self) -> bool {
        !matches!(self, HelpType::AcuteValidation | HelpType::AcuteSkills)
    }

    pub fn description(&self) -> &'static str {
        match self {
            HelpType::AcuteValidation => "Immediate emotional validation for what you're feeling right now",
            HelpType::AcuteSkills => "Quick coping techniques and strategies you can use immediately",
            HelpType::ChronicValidation => "Validation based on patterns in your recent entries (last 7 days)",
            HelpType::ChronicEducation => "Understanding and insights about ongoing patterns in your mental health",
            HelpType::MaxValidation => "Deep emotional pattern analysis based on your full journal history (30 entries)",
            HelpType::MaxAssessment => "Comprehensive mental health assessment based on your journal history",
            HelpType::SaveOnly => "Save your entry without requesting AI support",
        }
    }

    /// Short button label
    pub fn label(&self) -> &'static str {
        match self {
            HelpType::AcuteValidation => "Just Listen",
            HelpType::AcuteSkills => "Quick Help",
            HelpType::ChronicValidation => "Ongoing Support",
            HelpType::ChronicEducation => "Learn Patterns",
            HelpType::MaxValidation => "Deep Reflection",
            HelpType::MaxAssessment => "Full Assessment",
            HelpType::SaveOnly => "Save Only (No Response)",
        }
    }
}

impl fmt::Display for HelpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known help type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHelpTypeError(pub String);

impl fmt::Display for ParseHelpTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown help type: {}", self.0)
    }
}

impl std::error::Error for ParseHelpTypeError {}

impl FromStr for HelpType {
    type Err = ParseHelpTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HelpType::ALL
            .iter()
            .copied()
            .find(|help_type| help_type.as_str() == s.trim())
            .ok_or_else(|| ParseHelpTypeError(s.to_string()))
    }
}

/// Lightweight listing record for a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: EntryId,
    #[serde(default)]
    pub title: Option<String>,
    pub content_preview: String,
    #[serde(default)]
    pub requested_help_type: Option<HelpType>,
    /// RFC 3339 timestamp as sent by the backend
    pub created_at: DateTime<FixedOffset>,
}

/// Full record for a journal entry, fetched only when a day is selected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDetail {
    pub id: EntryId,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub requested_help_type: Option<HelpType>,
    #[serde(default)]
    pub is_continuation: bool,
    #[serde(default)]
    pub references_past_entries: bool,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub context_window_size: u32,
    #[serde(default)]
    pub ai_interaction: Option<AiInteraction>,
}

impl EntryDetail {
    /// Listing view of this entry, as the backend would serialize it
    pub fn summary(&self) -> EntrySummary {
        EntrySummary {
            id: self.id,
            title: self.title.clone(),
            content_preview: content_preview(&self.content),
            requested_help_type: self.requested_help_type,
            created_at: self.created_at,
        }
    }

    /// AI response text, if an interaction was recorded for this entry
    pub fn ai_response(&self) -> Option<&str> {
        self.ai_interaction
            .as_ref()
            .map(|interaction| interaction.claude_response.as_str())
    }
}

/// One recorded exchange with the model, embedded in exactly one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiInteraction {
    pub id: EntryId,
    pub claude_response: String,
    #[serde(default)]
    pub context_entries_count: u32,
    #[serde(default)]
    pub tokens_used: Option<u32>,
    /// Decimal cost, serialized by the backend as a string (e.g. "0.0025")
    #[serde(default)]
    pub api_cost: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

/// Preview rule used by the entry listing: first 150 characters plus "..."
pub fn content_preview(content: &str) -> String {
    if content.chars().count() > CONTENT_PREVIEW_CHARS {
        let head: String = content.chars().take(CONTENT_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_help_type: Option<HelpType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_continuation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_past_entries: Option<bool>,
}

/// AI response for an anonymous user; nothing is saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymousAiResponse {
    pub message: String,
    pub ai_response: String,
    pub tokens_used: u32,
    pub estimated_cost: f64,
    pub help_type: HelpType,
}

/// Saved entry together with the generated AI response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryWithAiResponse {
    pub id: EntryId,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub requested_help_type: Option<HelpType>,
    pub created_at: DateTime<FixedOffset>,
    pub ai_response: String,
    pub tokens_used: u32,
    pub estimated_cost: f64,
}

/// Saved entry whose AI generation failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryWithAiError {
    pub id: EntryId,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub requested_help_type: Option<HelpType>,
    pub created_at: DateTime<FixedOffset>,
    pub ai_error: String,
}

/// Every shape the backend answers an authenticated create with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedEntry {
    WithResponse(EntryWithAiResponse),
    AiFailed(EntryWithAiError),
    Saved(EntryDetail),
}

impl CreatedEntry {
    pub fn id(&self) -> EntryId {
        match self {
            CreatedEntry::WithResponse(entry) => entry.id,
            CreatedEntry::AiFailed(entry) => entry.id,
            CreatedEntry::Saved(entry) => entry.id,
        }
    }
}

/// Entries the backend used as model context for a given entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntries {
    pub context_window_size: u32,
    pub actual_entries_count: u32,
    pub entries: Vec<EntrySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub date_joined: DateTime<FixedOffset>,
}

impl User {
    /// First name when known, otherwise the email address
    pub fn display_name(&self) -> &str {
        if self.first_name.trim().is_empty() {
            &self.email
        } else {
            &self.first_name
        }
    }
}

/// Body of login, signup and user-info responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterCredentials {
    pub email: String,
    pub password1: String,
    pub password2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrfResponse {
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
}

/// Response of the backend connectivity check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTestResponse {
    pub message: String,
    pub status: String,
}

/// Error body shapes the backend uses (`{"error": ..}` or `{"detail": ..}`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().or(self.detail.as_deref())
    }
}

/// A day cell of the calendar grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// Day of month, 1-based
    pub day: u32,
    pub entry: Option<EntrySummary>,
}

/// A grid slot: `None` is leading padding before day 1
pub type CalendarSlot = Option<CalendarDay>;

/// Display-ready month: leading padding followed by one slot per day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: i32,
    pub days_in_month: u32,
    pub first_day_of_week: u32, // 0 = Sunday, 1 = Monday, etc.
    pub slots: Vec<CalendarSlot>,
}

impl CalendarMonth {
    /// Entries shown in this month, in day order
    pub fn entries(&self) -> impl Iterator<Item = &EntrySummary> {
        self.slots
            .iter()
            .flatten()
            .filter_map(|day| day.entry.as_ref())
    }

    pub fn entry_count(&self) -> usize {
        self.entries().count()
    }

    /// The slot for a day of month, if the day exists
    pub fn day(&self, day: u32) -> Option<&CalendarDay> {
        self.slots.iter().flatten().find(|slot| slot.day == day)
    }
}

/// Direction for month navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationDirection {
    Previous,
    Next,
}

impl NavigationDirection {
    pub fn month_delta(&self) -> i32 {
        match self {
            NavigationDirection::Previous => -1,
            NavigationDirection::Next => 1,
        }
    }
}
