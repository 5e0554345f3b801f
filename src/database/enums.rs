use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::Pg;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use utoipa::ToSchema;

/// Lead pipeline status
///
/// Represents where a prospect sits in the sales pipeline. Transitions are
/// free-form (sales reps move leads both ways), only the set of values is
/// fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum LeadStatus {
    #[serde(rename = "new")]
    New,

    #[serde(rename = "contacted")]
    Contacted,

    #[serde(rename = "offer_sent")]
    OfferSent,

    #[serde(rename = "won")]
    Won,

    #[serde(rename = "lost")]
    Lost,
}

impl LeadStatus {
    /// Convert enum to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::OfferSent => "offer_sent",
            LeadStatus::Won => "won",
            LeadStatus::Lost => "lost",
        }
    }

    /// Parse string to LeadStatus enum
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(LeadStatus::New),
            "contacted" => Some(LeadStatus::Contacted),
            "offer_sent" => Some(LeadStatus::OfferSent),
            "won" => Some(LeadStatus::Won),
            "lost" => Some(LeadStatus::Lost),
            _ => None,
        }
    }

    /// Get all status variants
    pub fn all() -> Vec<Self> {
        vec![
            LeadStatus::New,
            LeadStatus::Contacted,
            LeadStatus::OfferSent,
            LeadStatus::Won,
            LeadStatus::Lost,
        ]
    }

    /// Closed statuses drop out of the active pipeline
    pub fn is_closed(&self) -> bool {
        matches!(self, LeadStatus::Won | LeadStatus::Lost)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql<Text, Pg> for LeadStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for LeadStatus {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        LeadStatus::from_str(&text)
            .ok_or_else(|| format!("Invalid lead status value: {}", text).into())
    }
}

/// Where a lead entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum LeadSource {
    #[serde(rename = "manual")]
    Manual,

    #[serde(rename = "csv")]
    Csv,

    #[serde(rename = "mailbox")]
    Mailbox,

    #[serde(rename = "ocr")]
    Ocr,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Manual => "manual",
            LeadSource::Csv => "csv",
            LeadSource::Mailbox => "mailbox",
            LeadSource::Ocr => "ocr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(LeadSource::Manual),
            "csv" => Some(LeadSource::Csv),
            "mailbox" => Some(LeadSource::Mailbox),
            "ocr" => Some(LeadSource::Ocr),
            _ => None,
        }
    }
}

impl fmt::Display for LeadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql<Text, Pg> for LeadSource {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for LeadSource {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        LeadSource::from_str(&text)
            .ok_or_else(|| format!("Invalid lead source value: {}", text).into())
    }
}

/// Account role for authorization checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum UserRole {
    #[serde(rename = "user")]
    User,

    #[serde(rename = "admin")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql<Text, Pg> for UserRole {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for UserRole {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        UserRole::from_str(&text)
            .ok_or_else(|| format!("Invalid user role value: {}", text).into())
    }
}

/// Chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum ChatRole {
    #[serde(rename = "system")]
    System,

    #[serde(rename = "user")]
    User,

    #[serde(rename = "assistant")]
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "system" => Some(ChatRole::System),
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql<Text, Pg> for ChatRole {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for ChatRole {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        ChatRole::from_str(&text)
            .ok_or_else(|| format!("Invalid chat role value: {}", text).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_status_round_trip() {
        for status in LeadStatus::all() {
            assert_eq!(LeadStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(LeadStatus::from_str("invalid"), None);
    }

    #[test]
    fn test_lead_status_is_closed() {
        assert!(LeadStatus::Won.is_closed());
        assert!(LeadStatus::Lost.is_closed());
        assert!(!LeadStatus::New.is_closed());
        assert!(!LeadStatus::OfferSent.is_closed());
    }

    #[test]
    fn test_lead_source_from_str() {
        assert_eq!(LeadSource::from_str("csv"), Some(LeadSource::Csv));
        assert_eq!(LeadSource::from_str("ocr"), Some(LeadSource::Ocr));
        assert_eq!(LeadSource::from_str(""), None);
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!(UserRole::User.to_string(), "user");
    }

    #[test]
    fn test_chat_role_from_str() {
        assert_eq!(ChatRole::from_str("assistant"), Some(ChatRole::Assistant));
        assert_eq!(ChatRole::from_str("bot"), None);
    }
}
