//! UseCase: 接続受付処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - WebSocket 接続の受付（接続 ID の採番、送信チャンネルの登録）
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続ごとに別の接続 ID が振られる
//! - 登録前の接続は在席情報に現れない

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use uketsuke_shared::time::now_millis;

use crate::domain::{ConnectionId, ConnectionIdFactory, RelayRepository, Timestamp};

/// 接続受付のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    /// 接続を受け付け、採番した接続 ID を返す
    ///
    /// 身元（ID・役割）はまだ不明で、`user_connected` を受け取るまで
    /// 在席情報には登録されません。
    pub async fn execute(&self, sender: UnboundedSender<String>) -> ConnectionId {
        let connection = ConnectionIdFactory::generate();
        self.repository
            .open_connection(connection.clone(), sender, Timestamp::new(now_millis()))
            .await;
        connection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repository::InMemoryRelayRepository;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_connect_assigns_unique_connection_ids() {
        // テスト項目: 接続ごとに異なる接続 ID が振られる
        // given (前提条件):
        let repository = Arc::new(InMemoryRelayRepository::new());
        let usecase = ConnectParticipantUseCase::new(repository.clone());
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        // when (操作):
        let first = usecase.execute(tx1).await;
        let second = usecase.execute(tx2).await;

        // then (期待する結果):
        assert_ne!(first, second);
        let snapshot = repository.snapshot().await;
        assert_eq!(snapshot.connections, 2);
        assert!(snapshot.agents.is_empty());
        assert!(snapshot.customers.is_empty());
    }
}
