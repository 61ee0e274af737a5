//! Value Objects
//!
//! 識別子や表示名などのプリミティブな値をラップし、生成時に検証します。

use std::fmt;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

use super::ValueObjectError;

/// 表示名が未設定の接続に使われる名前
pub const DEFAULT_DISPLAY_NAME: &str = "nameless";

/// プラットフォームが未設定の接続に使われるプラットフォーム
pub const DEFAULT_PLATFORM: &str = "general";

fn non_empty(value: String, field: &'static str) -> Result<String, ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    Ok(value)
}

/// 接続 ID（トランスポート層が接続ごとに割り当てる）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        non_empty(value, "connection id").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ConnectionId の生成
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// UUID v4 で新しい ConnectionId を生成
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4().to_string())
    }
}

/// ルーム ID（プラットフォームと組み合わせてルームを識別する）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        non_empty(value, "room id").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// プラットフォーム（ブロードキャストとルームの識別に使う区分）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Platform(String);

impl Platform {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        non_empty(value, "platform").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self(DEFAULT_PLATFORM.to_string())
    }
}

impl TryFrom<String> for Platform {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 表示名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        non_empty(value, "display name").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DisplayName {
    fn default() -> Self {
        Self(DEFAULT_DISPLAY_NAME.to_string())
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// クライアントが申告する外部ユーザー ID（一意性は保証しない）
///
/// 受け取った形（数値 / 文字列）を保持し、そのまま返す。
/// 比較は値のみで行うため `7` と `"7"` は同じユーザーとして扱う。
#[derive(Debug, Clone)]
pub struct UserId {
    value: String,
    numeric: bool,
}

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        non_empty(value, "user id").map(|value| Self {
            value,
            numeric: false,
        })
    }

    pub fn from_number(value: i64) -> Self {
        Self {
            value: value.to_string(),
            numeric: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// 数値として受け取った場合はその値
    pub fn as_number(&self) -> Option<i64> {
        if self.numeric {
            self.value.parse().ok()
        } else {
            None
        }
    }
}

impl PartialEq for UserId {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for UserId {}

impl Hash for UserId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// ルームに適用された個別イベントの ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventId(String);

impl EventId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        non_empty(value, "event id").map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// ルームの複合キー (roomId, platform)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomKey {
    pub platform: Platform,
    pub room_id: RoomId,
}

impl RoomKey {
    pub fn new(room_id: RoomId, platform: Platform) -> Self {
        Self { platform, room_id }
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.platform, self.room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_reject_blank_values() {
        // テスト項目: 空白のみの識別子は生成できない
        // given (前提条件):
        let blank = "   ".to_string();

        // when (操作):
        let connection_id = ConnectionId::new(blank.clone());
        let room_id = RoomId::new(blank.clone());
        let platform = Platform::new(blank);

        // then (期待する結果):
        assert_eq!(
            connection_id,
            Err(ValueObjectError::Empty("connection id"))
        );
        assert_eq!(room_id, Err(ValueObjectError::Empty("room id")));
        assert_eq!(platform, Err(ValueObjectError::Empty("platform")));
    }

    #[test]
    fn test_defaults_use_sentinel_values() {
        // テスト項目: 未設定の表示名とプラットフォームは既定値になる
        // given (前提条件):

        // when (操作):
        let name = DisplayName::default();
        let platform = Platform::default();

        // then (期待する結果):
        assert_eq!(name.as_str(), "nameless");
        assert_eq!(platform.as_str(), "general");
    }

    #[test]
    fn test_generated_connection_ids_are_unique() {
        // テスト項目: 生成される ConnectionId は毎回異なる
        // given (前提条件):

        // when (操作):
        let first = ConnectionIdFactory::generate();
        let second = ConnectionIdFactory::generate();

        // then (期待する結果):
        assert_ne!(first, second);
    }

    #[test]
    fn test_room_key_distinguishes_platforms() {
        // テスト項目: 同じ roomId でもプラットフォームが異なれば別のキーになる
        // given (前提条件):
        let web = RoomKey::new(
            RoomId::new("R1".to_string()).unwrap(),
            Platform::new("web".to_string()).unwrap(),
        );
        let mobile = RoomKey::new(
            RoomId::new("R1".to_string()).unwrap(),
            Platform::new("mobile".to_string()).unwrap(),
        );

        // when (操作):
        let equal = web == mobile;

        // then (期待する結果):
        assert!(!equal);
        assert_eq!(web.to_string(), "web/R1");
    }
}
