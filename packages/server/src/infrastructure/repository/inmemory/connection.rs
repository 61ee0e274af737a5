//! InMemory Connection Repository 実装（User Registry）
//!
//! 接続順を保持する `Vec` をインメモリ DB として使用します。
//! 一覧系の操作は常に接続順で結果を返します。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Connection, ConnectionId, ConnectionRepository, IdentityUpdate, Platform, RepositoryError,
    ResolvedRecipients, Timestamp, UserId,
};

/// インメモリ Connection Repository 実装
#[derive(Default)]
pub struct InMemoryConnectionRepository {
    /// 接続順の Connection 一覧
    connections: Mutex<Vec<Connection>>,
}

impl InMemoryConnectionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn add_connection(&self, connection_id: ConnectionId, connected_at: Timestamp) {
        let mut connections = self.connections.lock().await;
        connections.push(Connection::new(connection_id, connected_at));
    }

    async fn configure_connection(
        &self,
        connection_id: &ConnectionId,
        update: IdentityUpdate,
    ) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        let connection = connections.iter_mut().find(|c| &c.id == connection_id)?;
        connection.apply(update);
        Some(connection.clone())
    }

    async fn get_connection(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let connections = self.connections.lock().await;
        connections.iter().find(|c| &c.id == connection_id).cloned()
    }

    async fn remove_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Connection, RepositoryError> {
        let mut connections = self.connections.lock().await;
        let index = connections
            .iter()
            .position(|c| &c.id == connection_id)
            .ok_or_else(|| RepositoryError::ConnectionNotFound(connection_id.to_string()))?;
        Ok(connections.remove(index))
    }

    async fn list_all(&self) -> Vec<Connection> {
        self.connections.lock().await.clone()
    }

    async fn list_by_platform(&self, platform: &Platform) -> Vec<Connection> {
        let connections = self.connections.lock().await;
        connections
            .iter()
            .filter(|c| &c.platform == platform)
            .cloned()
            .collect()
    }

    async fn list_by_ids(
        &self,
        connection_ids: &[ConnectionId],
        platform: &Platform,
    ) -> Vec<Connection> {
        let connections = self.connections.lock().await;
        connections
            .iter()
            .filter(|c| &c.platform == platform && connection_ids.contains(&c.id))
            .cloned()
            .collect()
    }

    async fn resolve_user_ids(
        &self,
        user_ids: &[UserId],
        platform: &Platform,
    ) -> ResolvedRecipients {
        let connections = self.connections.lock().await;
        let matched: Vec<Connection> = connections
            .iter()
            .filter(|c| &c.platform == platform)
            .filter(|c| c.user_id.as_ref().is_some_and(|id| user_ids.contains(id)))
            .cloned()
            .collect();

        ResolvedRecipients {
            connection_ids: matched.iter().map(|c| c.id.clone()).collect(),
            connections: matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisplayName;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 接続の登録・識別情報の更新・削除
    // - プラットフォーム単位の一覧と、ユーザー ID からの接続解決
    //
    // 【なぜこのテストが必要か】
    // - ブロードキャストと通知の宛先はすべてこのレジストリから決まる
    // - 切断と設定イベントが競合しても panic しないことを保証する
    // ========================================

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn platform(value: &str) -> Platform {
        Platform::new(value.to_string()).unwrap()
    }

    fn user(value: &str) -> UserId {
        UserId::new(value.to_string()).unwrap()
    }

    async fn configured(
        repo: &InMemoryConnectionRepository,
        id: &str,
        user_id: Option<&str>,
        platform_name: &str,
    ) {
        repo.add_connection(conn(id), Timestamp::new(1000)).await;
        repo.configure_connection(
            &conn(id),
            IdentityUpdate {
                display_name: None,
                user_id: user_id.map(user),
                platform: Some(platform(platform_name)),
            },
        )
        .await;
    }

    #[tokio::test]
    async fn test_add_connection_uses_default_identity() {
        // テスト項目: 登録直後の接続は既定の識別情報を持つ
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();

        // when (操作):
        repo.add_connection(conn("s1"), Timestamp::new(1000)).await;

        // then (期待する結果):
        let connection = repo.get_connection(&conn("s1")).await.unwrap();
        assert_eq!(connection.display_name.as_str(), "nameless");
        assert_eq!(connection.platform.as_str(), "general");
        assert!(connection.user_id.is_none());
    }

    #[tokio::test]
    async fn test_configure_connection_updates_given_fields() {
        // テスト項目: 設定イベントで指定されたフィールドが更新される
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        repo.add_connection(conn("s1"), Timestamp::new(1000)).await;

        // when (操作):
        let updated = repo
            .configure_connection(
                &conn("s1"),
                IdentityUpdate {
                    display_name: Some(DisplayName::new("Alice".to_string()).unwrap()),
                    user_id: Some(user("7")),
                    platform: Some(platform("web")),
                },
            )
            .await;

        // then (期待する結果):
        let updated = updated.unwrap();
        assert_eq!(updated.display_name.as_str(), "Alice");
        assert_eq!(updated.user_id, Some(user("7")));
        assert_eq!(updated.platform, platform("web"));
    }

    #[tokio::test]
    async fn test_configure_unknown_connection_is_noop() {
        // テスト項目: 存在しない接続の設定は何もせず None を返す
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();

        // when (操作):
        let result = repo
            .configure_connection(&conn("ghost"), IdentityUpdate::default())
            .await;

        // then (期待する結果):
        assert!(result.is_none());
        assert!(repo.list_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_connection_returns_removed_or_not_found() {
        // テスト項目: 削除は削除した接続を返し、2 回目は NotFound になる
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        configured(&repo, "s1", None, "web").await;

        // when (操作):
        let first = repo.remove_connection(&conn("s1")).await;
        let second = repo.remove_connection(&conn("s1")).await;

        // then (期待する結果):
        assert_eq!(first.unwrap().platform, platform("web"));
        assert_eq!(
            second,
            Err(RepositoryError::ConnectionNotFound("s1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_list_by_platform_keeps_connection_order() {
        // テスト項目: プラットフォーム単位の一覧は接続順で返される
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        configured(&repo, "s1", None, "web").await;
        configured(&repo, "s2", None, "mobile").await;
        configured(&repo, "s3", None, "web").await;

        // when (操作):
        let web = repo.list_by_platform(&platform("web")).await;

        // then (期待する結果):
        let ids: Vec<&str> = web.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s3"]);
    }

    #[tokio::test]
    async fn test_resolve_user_ids_skips_unknown_and_other_platforms() {
        // テスト項目: ユーザー ID の解決はプラットフォームが一致する接続のみを返す
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        configured(&repo, "s1", Some("u1"), "web").await;
        configured(&repo, "s2", Some("u2"), "mobile").await;
        configured(&repo, "s3", None, "web").await;

        // when (操作):
        let resolved = repo
            .resolve_user_ids(&[user("u1"), user("u2"), user("u9")], &platform("web"))
            .await;

        // then (期待する結果):
        assert_eq!(resolved.connection_ids, vec![conn("s1")]);
        assert_eq!(resolved.connections.len(), 1);
        assert_eq!(resolved.connections[0].user_id, Some(user("u1")));
    }

    #[tokio::test]
    async fn test_list_by_ids_filters_platform() {
        // テスト項目: 接続 ID の一覧からプラットフォームが一致する接続を返す
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        configured(&repo, "s1", None, "web").await;
        configured(&repo, "s2", None, "mobile").await;

        // when (操作):
        let result = repo
            .list_by_ids(&[conn("s1"), conn("s2"), conn("s9")], &platform("web"))
            .await;

        // then (期待する結果):
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, conn("s1"));
    }
}
