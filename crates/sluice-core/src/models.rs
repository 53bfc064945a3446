//! Core domain models and strongly-typed identifiers.
//!
//! Defines raw ingestion records, ad change events, and newtype ID wrappers
//! for compile-time type safety. Includes database serialization impls for
//! the text and bigint representations used in PostgreSQL.

use std::fmt;

use serde::{Deserialize, Serialize};

type PgDb = sqlx::Postgres;
type PgValueRef<'r> = sqlx::postgres::PgValueRef<'r>;
type PgTypeInfo = sqlx::postgres::PgTypeInfo;
type PgArgumentBuffer = sqlx::postgres::PgArgumentBuffer;
type EncodeResult =
    Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Strongly-typed raw record identifier.
///
/// Wraps the `BIGSERIAL` primary key of the `raw_ingest` table to prevent
/// mixing with other ID types. Assigned by the database on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl sqlx::Type<PgDb> for RecordId {
    fn type_info() -> PgTypeInfo {
        <i64 as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for RecordId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let id = <i64 as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(id))
    }
}

impl sqlx::Encode<'_, PgDb> for RecordId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <i64 as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// Strongly-typed change event identifier.
///
/// Wraps the `BIGSERIAL` primary key of the `ad_change_events` table.
/// Assigned by the database on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeEventId(pub i64);

impl fmt::Display for ChangeEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChangeEventId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl sqlx::Type<PgDb> for ChangeEventId {
    fn type_info() -> PgTypeInfo {
        <i64 as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for ChangeEventId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let id = <i64 as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(id))
    }
}

impl sqlx::Encode<'_, PgDb> for ChangeEventId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <i64 as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// Campaign change action accepted on the ad change event endpoint.
///
/// The set of valid actions is closed. Unknown actions are rejected at the
/// API boundary before anything touches the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    /// Campaign switched on.
    Enable,
    /// Campaign switched off.
    Disable,
    /// Bid amount changed.
    BidSet,
    /// Keyword added to the campaign.
    KwAdd,
    /// Keyword removed from the campaign.
    KwRemove,
}

impl ChangeAction {
    /// Parses the wire representation of an action.
    ///
    /// Returns `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "enable" => Some(Self::Enable),
            "disable" => Some(Self::Disable),
            "bid_set" => Some(Self::BidSet),
            "kw_add" => Some(Self::KwAdd),
            "kw_remove" => Some(Self::KwRemove),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enable => write!(f, "enable"),
            Self::Disable => write!(f, "disable"),
            Self::BidSet => write!(f, "bid_set"),
            Self::KwAdd => write!(f, "kw_add"),
            Self::KwRemove => write!(f, "kw_remove"),
        }
    }
}

impl sqlx::Type<PgDb> for ChangeAction {
    fn type_info() -> PgTypeInfo {
        <&str as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for ChangeAction {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as sqlx::Decode<PgDb>>::decode(value)?;
        Self::parse(s).ok_or_else(|| format!("invalid change action: {s}").into())
    }
}

impl sqlx::Encode<'_, PgDb> for ChangeAction {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <String as sqlx::Encode<PgDb>>::encode_by_ref(&self.to_string(), buf)
    }
}

/// One accepted raw telemetry payload with its envelope.
///
/// Rows in `raw_ingest` are immutable once written; downstream pipelines
/// read them by `(source, kind, occurred_at_ms)`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RawRecord {
    /// Database-assigned identifier.
    pub id: RecordId,

    /// Originating system, e.g. `"wb"`.
    pub source: String,

    /// Payload category, e.g. `"ads_stats"`, `"sales_funnel"`,
    /// `"search_queries"`.
    pub kind: String,

    /// Shop the payload belongs to, when the sender scopes it.
    pub shop_id: Option<String>,

    /// Sender timestamp in Unix milliseconds.
    ///
    /// Falls back to `received_at_ms` when the sender omits it.
    pub occurred_at_ms: i64,

    /// Server receive time in Unix milliseconds.
    pub received_at_ms: i64,

    /// Arbitrary JSON payload as delivered by the sender.
    pub payload: sqlx::types::Json<serde_json::Value>,
}

/// Fields required to insert a raw record.
///
/// The id is assigned by the database; everything else is provided by the
/// ingestion handler.
#[derive(Debug, Clone)]
pub struct NewRawRecord {
    /// Originating system.
    pub source: String,
    /// Payload category.
    pub kind: String,
    /// Optional shop scope.
    pub shop_id: Option<String>,
    /// Sender timestamp in Unix milliseconds.
    pub occurred_at_ms: i64,
    /// Server receive time in Unix milliseconds.
    pub received_at_ms: i64,
    /// Arbitrary JSON payload.
    pub payload: serde_json::Value,
}

/// A recorded advertising campaign change.
///
/// Captures who changed what and when, with free-form metadata. Rows are
/// immutable audit records.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AdChangeEvent {
    /// Database-assigned identifier.
    pub id: ChangeEventId,

    /// Shop the campaign belongs to, when the sender scopes it.
    pub shop_id: Option<String>,

    /// Campaign the change applies to.
    pub campaign_id: String,

    /// What changed.
    pub action: ChangeAction,

    /// Originator label.
    ///
    /// Free-form; `"n8n"`, `"ui"`, and `"system"` are the conventional
    /// values.
    pub actor: String,

    /// When the change happened, in Unix milliseconds.
    ///
    /// Falls back to receive time when the sender omits it.
    pub occurred_at_ms: i64,

    /// Free-form metadata about the change (old/new bid, keyword, etc.).
    pub meta: sqlx::types::Json<serde_json::Value>,
}

/// Fields required to insert a change event.
#[derive(Debug, Clone)]
pub struct NewChangeEvent {
    /// Optional shop scope.
    pub shop_id: Option<String>,
    /// Campaign the change applies to.
    pub campaign_id: String,
    /// What changed.
    pub action: ChangeAction,
    /// Originator label.
    pub actor: String,
    /// When the change happened, in Unix milliseconds.
    pub occurred_at_ms: i64,
    /// Free-form metadata.
    pub meta: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_action_wire_format_round_trips() {
        for action in [
            ChangeAction::Enable,
            ChangeAction::Disable,
            ChangeAction::BidSet,
            ChangeAction::KwAdd,
            ChangeAction::KwRemove,
        ] {
            assert_eq!(ChangeAction::parse(&action.to_string()), Some(action));
        }
    }

    #[test]
    fn change_action_rejects_unknown_values() {
        assert_eq!(ChangeAction::parse("pause"), None);
        assert_eq!(ChangeAction::parse("ENABLE"), None);
        assert_eq!(ChangeAction::parse(""), None);
    }

    #[test]
    fn change_action_serde_matches_wire_format() {
        let json = serde_json::to_string(&ChangeAction::BidSet).unwrap();
        assert_eq!(json, "\"bid_set\"");

        let parsed: ChangeAction = serde_json::from_str("\"kw_remove\"").unwrap();
        assert_eq!(parsed, ChangeAction::KwRemove);
    }

    #[test]
    fn ids_display_as_plain_integers() {
        assert_eq!(RecordId(42).to_string(), "42");
        assert_eq!(ChangeEventId(7).to_string(), "7");
    }

    #[test]
    fn ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&RecordId(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&ChangeEventId(7)).unwrap(), "7");
    }
}
